//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Template not found: {path}")]
    TemplateNotFound { path: String },

    #[error("Invalid template: {message}")]
    InvalidTemplate { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid chart version: {0}")]
    InvalidVersion(#[from] semver::Error),

    #[error("Invalid chart name '{name}': {message}")]
    InvalidChartName { name: String, message: String },

    #[error("Chart directory already exists: {path}")]
    ChartExists { path: String },

    #[error("Values document must be a mapping")]
    ValuesNotMapping,

    #[error("Missing required field: {field}")]
    MissingField { field: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
