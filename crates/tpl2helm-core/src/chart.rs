//! Helm chart model and on-disk layout

use semver::Version;
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// Chart API version written to Chart.yaml
pub const CHART_API_VERSION: &str = "v2";
pub const CHART_FILE: &str = "Chart.yaml";
pub const VALUES_FILE: &str = "values.yaml";

/// A named file inside the chart, e.g. `templates/configmap.yaml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartFile {
    /// Path relative to the chart root
    pub name: String,
    /// Raw content
    pub data: Vec<u8>,
}

impl ChartFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Content as text (lossy for non UTF-8 data)
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

/// Chart.yaml structure
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    pub api_version: String,

    pub name: String,

    #[serde(serialize_with = "serialize_version")]
    pub version: Version,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub chart_type: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<ChartDependency>,
}

/// Chart dependency
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDependency {
    pub name: String,

    /// Version constraint, e.g. `>=1.1.0`
    pub version: String,

    pub repository: String,
}

fn serialize_version<S: Serializer>(version: &Version, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(version)
}

impl ChartMetadata {
    /// Metadata for an application chart
    pub fn application(name: impl Into<String>, version: &str) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(CoreError::MissingField {
                field: "name".to_string(),
            });
        }
        // The name becomes a directory under the output root
        if name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(CoreError::InvalidChartName {
                name,
                message: "must be a single path component".to_string(),
            });
        }

        Ok(Self {
            api_version: CHART_API_VERSION.to_string(),
            name,
            version: Version::parse(version)?,
            description: None,
            chart_type: "application".to_string(),
            dependencies: Vec::new(),
        })
    }

    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.description = description.map(str::to_string);
        self
    }

    pub fn with_dependency(mut self, dependency: ChartDependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// A chart ready to be written to disk
#[derive(Debug, Clone)]
pub struct Chart {
    pub metadata: ChartMetadata,

    /// Rendered values.yaml
    pub values_yaml: String,

    /// Template files, in output order
    pub templates: Vec<ChartFile>,
}

impl Chart {
    /// Directory the chart is written to under `dest`
    pub fn dir(&self, dest: &Path) -> PathBuf {
        dest.join(&self.metadata.name)
    }

    /// Every file `save_dir` would write, in write order
    pub fn planned_files(&self, dest: &Path) -> Vec<PathBuf> {
        let root = self.dir(dest);
        let mut files = vec![root.join(CHART_FILE), root.join(VALUES_FILE)];
        files.extend(self.templates.iter().map(|t| root.join(&t.name)));
        files
    }

    /// Write the chart to `<dest>/<name>/`
    ///
    /// Fails if the chart directory already exists unless `force` is set.
    pub fn save_dir(&self, dest: &Path, force: bool) -> Result<Vec<PathBuf>> {
        let root = self.dir(dest);
        if root.exists() && !force {
            return Err(CoreError::ChartExists {
                path: root.display().to_string(),
            });
        }

        std::fs::create_dir_all(&root)?;

        let mut written = Vec::with_capacity(self.templates.len() + 2);

        let chart_path = root.join(CHART_FILE);
        std::fs::write(&chart_path, self.metadata.to_yaml()?)?;
        written.push(chart_path);

        let values_path = root.join(VALUES_FILE);
        std::fs::write(&values_path, &self.values_yaml)?;
        written.push(values_path);

        for template in &self.templates {
            let path = root.join(&template.name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &template.data)?;
            tracing::debug!("Wrote {}", path.display());
            written.push(path);
        }

        Ok(written)
    }
}
