//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use miette::Diagnostic;
use thiserror::Error;
use tpl2helm_convert::ConvertError;
use tpl2helm_core::CoreError;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// The input is not a usable OpenShift template
    #[error("Invalid template: {message}")]
    #[diagnostic(code(tpl2helm::cli::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// An object could not be converted or the chart could not be written
    #[error("Chart error: {message}")]
    #[diagnostic(code(tpl2helm::cli::chart))]
    Chart {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(tpl2helm::cli::io))]
    Io { message: String },

    /// Invalid option value
    #[error("Usage error: {message}")]
    #[diagnostic(code(tpl2helm::cli::usage))]
    Usage { message: String },

    /// Wrapped error for passthrough (stores the formatted message)
    #[error("{message}")]
    #[diagnostic(code(tpl2helm::cli::error))]
    Other { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Input { .. } => exit_codes::INPUT_ERROR,
            CliError::Chart { .. } => exit_codes::CHART_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    fn input(err: &ConvertError) -> Self {
        Self::Input {
            message: err.to_string(),
            help: help_text(err),
        }
    }

    fn chart(err: &ConvertError) -> Self {
        Self::Chart {
            message: err.to_string(),
            help: help_text(err),
        }
    }
}

fn help_text(err: &ConvertError) -> Option<String> {
    Diagnostic::help(err).map(|h| h.to_string())
}

impl From<ConvertError> for CliError {
    fn from(err: ConvertError) -> Self {
        match &err {
            ConvertError::Io(_) | ConvertError::FileNotFound(_) => CliError::Io {
                message: err.to_string(),
            },
            ConvertError::Decode { .. }
            | ConvertError::MissingKind { .. }
            | ConvertError::InvalidObject { .. }
            | ConvertError::Yaml(_)
            | ConvertError::Json(_) => CliError::input(&err),
            ConvertError::Translation { .. } | ConvertError::OutputExists(_) => {
                CliError::chart(&err)
            }
            ConvertError::Core(core) => match core {
                CoreError::TemplateNotFound { .. } | CoreError::Io(_) => CliError::Io {
                    message: err.to_string(),
                },
                CoreError::InvalidTemplate { .. }
                | CoreError::YamlParse(_)
                | CoreError::JsonParse(_)
                | CoreError::MissingField { .. }
                | CoreError::InvalidChartName { .. } => CliError::input(&err),
                CoreError::InvalidVersion(_) => CliError::Usage {
                    message: err.to_string(),
                },
                CoreError::ChartExists { .. } => CliError::chart(&err),
                CoreError::ValuesNotMapping => CliError::Other {
                    message: err.to_string(),
                },
            },
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes() {
        let missing: CliError = ConvertError::FileNotFound(PathBuf::from("t.yaml")).into();
        assert_eq!(missing.exit_code(), exit_codes::IO_ERROR);

        let exists: CliError = ConvertError::OutputExists(PathBuf::from("out/app")).into();
        assert_eq!(exists.exit_code(), exit_codes::CHART_ERROR);

        let no_kind: CliError = ConvertError::MissingKind {
            index: 0,
            raw: "metadata: {}".to_string(),
        }
        .into();
        assert_eq!(no_kind.exit_code(), exit_codes::INPUT_ERROR);

        let core = tpl2helm_core::ChartMetadata::application("app", "not-a-version").unwrap_err();
        assert!(matches!(core, CoreError::InvalidVersion(_)));
        let version: CliError = ConvertError::Core(core).into();
        assert_eq!(version.exit_code(), exit_codes::USAGE_ERROR);
    }

    #[test]
    fn test_help_carried_over() {
        let err: CliError = ConvertError::OutputExists(PathBuf::from("out/app")).into();
        match err {
            CliError::Chart { help, .. } => {
                assert_eq!(help.as_deref(), Some("pass --force to overwrite it"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
