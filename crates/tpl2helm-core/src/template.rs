//! OpenShift Template definition and loading

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{CoreError, Result};

/// Kind tag expected on a template document
pub const TEMPLATE_KIND: &str = "Template";

/// An OpenShift Template: a list of raw objects plus declared parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// API version (template.openshift.io/v1 or v1)
    #[serde(default)]
    pub api_version: Option<String>,

    /// Document kind, normally `Template`
    #[serde(default)]
    pub kind: Option<String>,

    /// Template metadata
    #[serde(default)]
    pub metadata: TemplateMetadata,

    /// Raw object definitions, kept opaque until classified
    #[serde(default)]
    pub objects: Vec<serde_json::Value>,

    /// Declared parameters
    #[serde(default)]
    pub parameters: Vec<Parameter>,

    /// Labels applied to every object (order preserved)
    #[serde(default)]
    pub labels: IndexMap<String, String>,

    /// Message shown after instantiation
    #[serde(default)]
    pub message: Option<String>,
}

/// Template metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateMetadata {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub namespace: Option<String>,

    #[serde(default)]
    pub annotations: BTreeMap<String, String>,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// A declared template parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    /// Parameter name as referenced by `${NAME}`
    pub name: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Literal default value
    #[serde(default)]
    pub value: Option<String>,

    /// Generator name (only `expression` exists upstream)
    #[serde(default)]
    pub generate: Option<String>,

    /// Generator input, e.g. `[a-z0-9]{16}`
    #[serde(default)]
    pub from: Option<String>,

    #[serde(default)]
    pub required: bool,
}

impl Parameter {
    /// Create a parameter with an optional default
    pub fn new(name: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            value: value.map(str::to_string),
            ..Default::default()
        }
    }

    /// The literal default, if one is set and non-empty
    #[inline]
    pub fn default_value(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.is_empty())
    }

    /// Whether OpenShift would generate the value at instantiation time
    #[inline]
    pub fn is_generated(&self) -> bool {
        self.generate.is_some()
    }
}

impl Template {
    /// Load a template from a YAML or JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CoreError::TemplateNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a template from a YAML string (JSON is accepted as a YAML subset)
    pub fn from_yaml(content: &str) -> Result<Self> {
        let template: Template = serde_yaml::from_str(content)?;

        if let Some(kind) = template.kind.as_deref() {
            if kind != TEMPLATE_KIND {
                return Err(CoreError::InvalidTemplate {
                    message: format!("expected kind {}, found {}", TEMPLATE_KIND, kind),
                });
            }
        }

        for (index, parameter) in template.parameters.iter().enumerate() {
            if parameter.name.is_empty() {
                return Err(CoreError::MissingField {
                    field: format!("parameters[{}].name", index),
                });
            }
        }

        Ok(template)
    }

    /// Template name from metadata, if set
    pub fn name(&self) -> Option<&str> {
        self.metadata.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Template description annotation
    pub fn description(&self) -> Option<&str> {
        self.metadata
            .annotations
            .get("description")
            .map(String::as_str)
            .filter(|d| !d.is_empty())
    }
}
