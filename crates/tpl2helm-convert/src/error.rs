//! Error and warning types for the converter
//!
//! Fatal problems abort the whole conversion with a `ConvertError`.
//! Everything else is collected as a `ConversionWarning` and reported
//! next to the generated chart.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Converter error
#[derive(Debug, Error, Diagnostic)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    #[diagnostic(code(tpl2helm::convert::io))]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(tpl2helm::convert::core))]
    Core(#[from] tpl2helm_core::CoreError),

    #[error("YAML error: {0}")]
    #[diagnostic(code(tpl2helm::convert::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    #[diagnostic(code(tpl2helm::convert::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to decode {context}: {source}")]
    #[diagnostic(code(tpl2helm::convert::decode))]
    Decode {
        context: String,
        /// Offending document, shown as help text
        #[help]
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Object #{index} has no kind")]
    #[diagnostic(code(tpl2helm::convert::missing_kind))]
    MissingKind {
        index: usize,
        #[help]
        raw: String,
    },

    #[error("Invalid {kind} '{name}': {message}")]
    #[diagnostic(code(tpl2helm::convert::invalid_object))]
    InvalidObject {
        kind: String,
        name: String,
        message: String,
        #[help]
        raw: String,
    },

    #[error("Unable to convert DeploymentConfig '{name}' to a Deployment: {message}")]
    #[diagnostic(code(tpl2helm::convert::translation))]
    Translation { name: String, message: String },

    #[error("File not found: {0}")]
    #[diagnostic(code(tpl2helm::convert::not_found))]
    FileNotFound(PathBuf),

    #[error("Output chart already exists: {0}")]
    #[diagnostic(
        code(tpl2helm::convert::output_exists),
        help("pass --force to overwrite it")
    )]
    OutputExists(PathBuf),
}

impl ConvertError {
    /// Build a decode error that keeps the offending document for diagnosis
    pub fn decode(context: impl Into<String>, raw: &serde_json::Value, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            raw: render_raw(raw),
            source,
        }
    }

    /// Build an error for a malformed substructure of `object`
    pub fn invalid(
        kind: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
        object: &serde_json::Value,
    ) -> Self {
        Self::InvalidObject {
            kind: kind.into(),
            name: name.into(),
            message: message.into(),
            raw: render_raw(object),
        }
    }
}

/// Best-effort YAML rendering of an object for error messages
pub(crate) fn render_raw(raw: &serde_json::Value) -> String {
    serde_yaml::to_string(raw).unwrap_or_else(|_| raw.to_string())
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

// =============================================================================
// WARNING SYSTEM
// =============================================================================

/// Warning severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WarningSeverity {
    /// Informational - conversion succeeded, something was dropped on purpose
    Info,
    /// Warning - conversion succeeded but manual review recommended
    Warning,
    /// Unsupported - construct has no equivalent in the chart values
    Unsupported,
}

impl WarningSeverity {
    /// Get the display color for terminal output
    pub fn color(&self) -> &'static str {
        match self {
            Self::Info => "cyan",
            Self::Warning => "yellow",
            Self::Unsupported => "magenta",
        }
    }

    /// Get the icon for this severity
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Info => "ℹ",
            Self::Warning => "⚠",
            Self::Unsupported => "✗",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Warning category for grouping related warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCategory {
    /// Pod volumes and mounts
    Volume,
    /// Controller extraction
    Controller,
    /// Template parameters
    Parameter,
    /// Objects left out of the chart
    DroppedKind,
    /// values.yaml layout
    Values,
}

impl WarningCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::Controller => "controller",
            Self::Parameter => "parameter",
            Self::DroppedKind => "dropped",
            Self::Values => "values",
        }
    }
}

/// Warning with context and an optional fix
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionWarning {
    pub severity: WarningSeverity,
    pub category: WarningCategory,
    /// Object or parameter the warning is about, e.g. `Deployment/web`
    pub subject: String,
    /// The construct that triggered the warning
    pub pattern: String,
    /// Human-readable message
    pub message: String,
    /// Suggested fix
    pub suggestion: Option<String>,
}

impl ConversionWarning {
    pub fn info(category: WarningCategory, subject: &str, pattern: &str, message: &str) -> Self {
        Self {
            severity: WarningSeverity::Info,
            category,
            subject: subject.to_string(),
            pattern: pattern.to_string(),
            message: message.to_string(),
            suggestion: None,
        }
    }

    pub fn warning(category: WarningCategory, subject: &str, pattern: &str, message: &str) -> Self {
        Self {
            severity: WarningSeverity::Warning,
            ..Self::info(category, subject, pattern, message)
        }
    }

    pub fn unsupported(category: WarningCategory, subject: &str, pattern: &str, message: &str) -> Self {
        Self {
            severity: WarningSeverity::Unsupported,
            ..Self::info(category, subject, pattern, message)
        }
    }

    /// Add suggestion to warning
    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }
}

impl std::fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: [severity] subject - message
        write!(f, "[{}] {} - {}", self.severity.label(), self.subject, self.message)?;

        if let Some(ref suggestion) = self.suggestion {
            write!(f, "\n  {} {}", self.severity.icon(), suggestion)?;
        }

        Ok(())
    }
}

// =============================================================================
// PREDEFINED WARNINGS
// =============================================================================

/// Factory functions for the warnings the converter emits
pub mod warnings {
    use super::*;

    pub fn unsupported_volume(subject: &str, volume: &str) -> ConversionWarning {
        ConversionWarning::unsupported(
            WarningCategory::Volume,
            subject,
            volume,
            &format!(
                "Volume '{}' has a source other than configMap, secret or persistentVolumeClaim",
                volume
            ),
        )
        .with_suggestion("Mount it through an extra template or a values override")
    }

    pub fn unmounted_volume(subject: &str, volume: &str) -> ConversionWarning {
        ConversionWarning::warning(
            WarningCategory::Volume,
            subject,
            volume,
            &format!(
                "Volume '{}' is not mounted by the first container and was left out of volumeMounts",
                volume
            ),
        )
    }

    pub fn undeclared_volume(subject: &str, volume: &str) -> ConversionWarning {
        ConversionWarning::warning(
            WarningCategory::Volume,
            subject,
            volume,
            &format!("Container mounts '{}' but the pod declares no such volume", volume),
        )
    }

    pub fn repeated_controller(subject: &str, previous: &str) -> ConversionWarning {
        ConversionWarning::warning(
            WarningCategory::Controller,
            subject,
            "multiple controllers",
            &format!("Settings extracted from '{}' were overwritten", previous),
        )
        .with_suggestion("Split the template so each chart holds a single controller")
    }

    pub fn extra_containers(subject: &str, count: usize) -> ConversionWarning {
        ConversionWarning::warning(
            WarningCategory::Controller,
            subject,
            "containers",
            &format!("Only the first of {} containers was converted", count),
        )
    }

    pub fn dropped_kind(subject: &str, kind: &str) -> ConversionWarning {
        ConversionWarning::info(
            WarningCategory::DroppedKind,
            subject,
            kind,
            &format!("{} objects are not carried into the chart", kind),
        )
    }

    pub fn missing_default(name: &str, key: &str) -> ConversionWarning {
        ConversionWarning::warning(
            WarningCategory::Parameter,
            name,
            &format!("${{{}}}", name),
            &format!("Parameter has no default; .Values.{} must be set", key),
        )
    }

    pub fn generated_parameter(name: &str, from: Option<&str>) -> ConversionWarning {
        ConversionWarning::unsupported(
            WarningCategory::Parameter,
            name,
            "generate",
            &format!(
                "OpenShift generates this value from '{}'; Helm will not",
                from.unwrap_or("")
            ),
        )
        .with_suggestion("Provide the value at install time or use an external secret")
    }

    pub fn duplicate_parameter(name: &str, key: &str) -> ConversionWarning {
        ConversionWarning::warning(
            WarningCategory::Parameter,
            name,
            key,
            &format!("Another parameter already maps to .Values.{}", key),
        )
    }

    pub fn shadowed_parameter(key: &str) -> ConversionWarning {
        ConversionWarning::warning(
            WarningCategory::Values,
            key,
            key,
            &format!("Parameter value .{} clashes with a chart values key and was skipped", key),
        )
        .with_suggestion("Rename the parameter in the template")
    }
}
