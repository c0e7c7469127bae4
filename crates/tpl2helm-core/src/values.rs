//! Chart values record
//!
//! `Values` is the single document written to `values.yaml`. It is filled
//! from the recognized objects of a template (controller, service, route)
//! on top of a fixed baseline consumed by the shared application chart.

use indexmap::IndexMap;
use k8s_openapi::api::core::v1::{EnvVar, Probe, ResourceRequirements};
use serde::Serialize;
use serde_yaml::{Mapping, Value as YamlValue};
use std::collections::BTreeMap;

use crate::error::{CoreError, Result};

/// Autoscaler ceiling applied before any object is read
pub const DEFAULT_HPA_MAX_REPLICAS: i32 = 2;
/// Autoscaler CPU target applied before any object is read
pub const DEFAULT_HPA_TARGET_CPU: i32 = 80;
/// Disruption budget floor
pub const DEFAULT_PDB_MIN_AVAILABLE: i32 = 1;
/// Rollout strategy type
pub const DEFAULT_STRATEGY_TYPE: &str = "RollingUpdate";
pub const DEFAULT_MAX_SURGE: &str = "100%";
pub const DEFAULT_MAX_UNAVAILABLE: &str = "25%";
/// Image tag left for the chart user to fill in
pub const PLACEHOLDER_IMAGE_TAG: &str = " ";

/// Consolidated settings extracted from a template
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Values {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,

    pub image: ImageSpec,

    pub service: ServiceValues,

    #[serde(rename = "serviceAccount")]
    pub service_account: ServiceAccountValues,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,

    #[serde(skip_serializing_if = "Probes::is_empty")]
    pub probes: Probes,

    pub controller: ControllerValues,

    pub strategy: StrategyValues,

    pub route: RouteValues,

    #[serde(rename = "volumeMounts")]
    pub volume_spec: VolumeSpec,

    pub replicas: Replicas,

    pub configs: Configs,

    pub hpa: Hpa,

    pub pdb: Pdb,
}

/// Container image coordinates
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSpec {
    pub repository: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    pub name: String,

    pub tag: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_policy: Option<String>,
}

/// Network exposure (Service) settings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServiceValues {
    pub enabled: bool,

    #[serde(rename = "type")]
    pub service_type: String,

    pub ports: Vec<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServiceAccountValues {
    #[serde(skip_serializing_if = "is_false")]
    pub create: bool,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// Readiness and liveness probes of the first container
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Probes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liveness: Option<Probe>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness: Option<Probe>,
}

impl Probes {
    pub fn is_empty(&self) -> bool {
        self.liveness.is_none() && self.readiness.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ControllerValues {
    pub enabled: bool,

    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub controller_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyValues {
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub strategy_type: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub max_surge: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub max_unavailable: String,
}

/// External route settings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteValues {
    pub enabled: bool,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub hostname: String,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination: Option<RouteTls>,
}

/// TLS settings of a route
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTls {
    pub termination: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure_edge_termination_policy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VolumeSpec {
    pub enabled: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mounts: Vec<Mount>,
}

/// Where a mounted volume gets its content from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum MountSource {
    #[serde(rename = "configmap")]
    ConfigMap,
    #[serde(rename = "secret")]
    Secret,
    #[serde(rename = "pvc")]
    Claim,
    #[default]
    #[serde(rename = "unsupported")]
    Unsupported,
}

/// A normalized volume mount
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mount {
    /// Referenced config map, secret or claim; the pod volume name for
    /// unsupported sources
    pub name: String,

    #[serde(rename = "type")]
    pub source_type: MountSource,

    /// Pod volume the entry was resolved from, when `name` differs from it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub mount_path: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,

    /// Octal file mode, e.g. `0644`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_mode: Option<String>,
}

/// Scaling bounds mirrored from the controller replica count
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Replicas {
    pub min: i32,
    pub max: i32,
}

/// Config maps and secrets referenced through `envFrom`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Configs {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub configmaps: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hpa {
    pub enabled: bool,

    #[serde(skip_serializing_if = "is_zero")]
    pub maxreplicas: i32,

    #[serde(skip_serializing_if = "is_zero")]
    pub minreplicas: i32,

    #[serde(skip_serializing_if = "is_zero")]
    pub targetcpuutilizationpercentage: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Pdb {
    pub enabled: bool,

    #[serde(skip_serializing_if = "is_zero")]
    pub minavailable: i32,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

/// Rendered `values.yaml` content
#[derive(Debug, Clone)]
pub struct ValuesDocument {
    /// YAML text
    pub yaml: String,
    /// Parameter keys dropped because the record already uses them
    pub shadowed: Vec<String>,
}

impl Values {
    /// Values pre-filled with the baseline every converted chart starts from
    pub fn with_baseline(image_registry: &str) -> Self {
        let mut values = Self::default();

        values.hpa.enabled = true;
        values.hpa.maxreplicas = DEFAULT_HPA_MAX_REPLICAS;
        values.hpa.targetcpuutilizationpercentage = DEFAULT_HPA_TARGET_CPU;

        values.image.repository = image_registry.to_string();
        values.image.tag = PLACEHOLDER_IMAGE_TAG.to_string();

        values.pdb.enabled = true;
        values.pdb.minavailable = DEFAULT_PDB_MIN_AVAILABLE;

        values.strategy.strategy_type = DEFAULT_STRATEGY_TYPE.to_string();
        values.strategy.max_surge = DEFAULT_MAX_SURGE.to_string();
        values.strategy.max_unavailable = DEFAULT_MAX_UNAVAILABLE.to_string();

        values.service_account.create = true;
        values.service_account.name = String::new();

        values
    }

    /// Convert to a YAML mapping
    pub fn to_mapping(&self) -> Result<Mapping> {
        match serde_yaml::to_value(self)? {
            YamlValue::Mapping(mapping) => Ok(mapping),
            _ => Err(CoreError::ValuesNotMapping),
        }
    }

    /// Render the values document, followed by one top-level key per
    /// template parameter
    ///
    /// A parameter whose key is already used by the record is skipped and
    /// reported in [`ValuesDocument::shadowed`].
    pub fn render(&self, parameters: &IndexMap<String, String>) -> Result<ValuesDocument> {
        let mut mapping = self.to_mapping()?;
        let mut shadowed = Vec::new();

        for (key, value) in parameters {
            if mapping.contains_key(key.as_str()) {
                tracing::warn!("Parameter value .{} shadowed by chart values", key);
                shadowed.push(key.clone());
                continue;
            }
            mapping.insert(
                YamlValue::String(key.clone()),
                YamlValue::String(value.clone()),
            );
        }

        let yaml = serde_yaml::to_string(&YamlValue::Mapping(mapping))?;
        Ok(ValuesDocument { yaml, shadowed })
    }
}
