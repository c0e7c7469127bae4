//! OpenShift-only object shapes
//!
//! Only the fields the converter reads are modelled; unknown fields are
//! ignored by serde.

use k8s_openapi::api::core::v1::PodTemplateSpec;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::Deserialize;
use std::collections::BTreeMap;

/// route.openshift.io/v1 Route
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: RouteSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteSpec {
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsConfig {
    /// edge, passthrough or reencrypt
    #[serde(default)]
    pub termination: String,

    #[serde(default)]
    pub insecure_edge_termination_policy: Option<String>,
}

/// apps.openshift.io/v1 DeploymentConfig
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeploymentConfig {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: DeploymentConfigSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigSpec {
    #[serde(default)]
    pub strategy: Option<DeploymentStrategy>,

    #[serde(default)]
    pub min_ready_seconds: Option<i32>,

    #[serde(default)]
    pub replicas: Option<i32>,

    #[serde(default)]
    pub revision_history_limit: Option<i32>,

    #[serde(default)]
    pub test: bool,

    #[serde(default)]
    pub paused: bool,

    /// Plain label selector (no expressions in DeploymentConfigs)
    #[serde(default)]
    pub selector: BTreeMap<String, String>,

    #[serde(default)]
    pub template: Option<PodTemplateSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStrategy {
    /// Rolling, Recreate or Custom
    #[serde(default, rename = "type")]
    pub strategy_type: Option<String>,

    #[serde(default)]
    pub rolling_params: Option<RollingParams>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingParams {
    #[serde(default)]
    pub max_unavailable: Option<IntOrString>,

    #[serde(default)]
    pub max_surge: Option<IntOrString>,
}
