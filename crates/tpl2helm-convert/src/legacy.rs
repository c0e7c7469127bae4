//! DeploymentConfig to Deployment translation
//!
//! A one-to-one schema mapping: OpenShift-specific bookkeeping (triggers,
//! test mode, lifecycle hooks) has no Deployment counterpart and is dropped.

use k8s_openapi::api::apps::v1::{
    Deployment, DeploymentSpec, DeploymentStrategy as RolloutStrategy, RollingUpdateDeployment,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use std::collections::BTreeMap;

use crate::error::{ConvertError, Result};
use crate::openshift::{DeploymentConfig, DeploymentStrategy};

pub const LAST_APPLIED_ANNOTATION: &str = "kubectl.kubernetes.io/last-applied-configuration";
pub const GENERATED_BY_ANNOTATION: &str = "openshift.io/generated-by";
/// Annotations never carried over to the Deployment
pub const STRIP_ANNOTATIONS: [&str; 2] = [LAST_APPLIED_ANNOTATION, GENERATED_BY_ANNOTATION];

pub const DEPLOYMENT_CONFIG_POD_LABEL: &str = "deploymentconfig";
pub const DEPLOYMENT_POD_LABEL: &str = "deployment";

/// Translate a DeploymentConfig into an apps/v1 Deployment
pub fn translate(dc: DeploymentConfig) -> Result<Deployment> {
    let name = dc.metadata.name.clone().unwrap_or_default();
    let spec = dc.spec;

    let mut template = spec.template.ok_or_else(|| ConvertError::Translation {
        name: name.clone(),
        message: "spec.template is missing".to_string(),
    })?;

    if spec.test {
        tracing::warn!("DeploymentConfig {} runs in test mode; the Deployment will not scale down", name);
    }

    let strategy = spec
        .strategy
        .map(|s| translate_strategy(&name, s))
        .transpose()?;

    let pod_metadata = template.metadata.get_or_insert_with(ObjectMeta::default);
    pod_metadata.labels = pod_metadata.labels.take().map(rename_labels);

    let mut match_labels = rename_labels(spec.selector);
    if match_labels.is_empty() {
        // DeploymentConfigs default their selector to the pod labels
        match_labels = pod_metadata.labels.clone().unwrap_or_default();
    }

    Ok(Deployment {
        metadata: translate_metadata(dc.metadata),
        spec: Some(DeploymentSpec {
            replicas: spec.replicas,
            min_ready_seconds: spec.min_ready_seconds,
            revision_history_limit: spec.revision_history_limit,
            paused: spec.paused.then_some(true),
            selector: LabelSelector {
                match_labels: (!match_labels.is_empty()).then_some(match_labels),
                match_expressions: None,
            },
            strategy,
            template,
            ..Default::default()
        }),
        status: None,
    })
}

fn translate_strategy(name: &str, strategy: DeploymentStrategy) -> Result<RolloutStrategy> {
    match strategy.strategy_type.as_deref() {
        None | Some("Rolling") => Ok(RolloutStrategy {
            type_: Some("RollingUpdate".to_string()),
            rolling_update: strategy.rolling_params.map(|params| RollingUpdateDeployment {
                max_surge: params.max_surge,
                max_unavailable: params.max_unavailable,
            }),
        }),
        Some("Recreate") => Ok(RolloutStrategy {
            type_: Some("Recreate".to_string()),
            rolling_update: None,
        }),
        Some(other) => Err(ConvertError::Translation {
            name: name.to_string(),
            message: format!("strategy type {} has no Deployment equivalent", other),
        }),
    }
}

fn translate_metadata(mut metadata: ObjectMeta) -> ObjectMeta {
    metadata.labels = metadata.labels.take().map(rename_labels);

    if let Some(mut annotations) = metadata.annotations.take() {
        for key in STRIP_ANNOTATIONS {
            annotations.remove(key);
        }
        metadata.annotations = (!annotations.is_empty()).then_some(annotations);
    }

    // Server-populated fields do not belong in a chart
    metadata.resource_version = None;
    metadata.uid = None;
    metadata.generation = None;
    metadata.creation_timestamp = None;
    metadata.managed_fields = None;

    metadata
}

/// Rename the `deploymentconfig` pod label to `deployment`
fn rename_labels(mut labels: BTreeMap<String, String>) -> BTreeMap<String, String> {
    if let Some(value) = labels.remove(DEPLOYMENT_CONFIG_POD_LABEL) {
        labels
            .entry(DEPLOYMENT_POD_LABEL.to_string())
            .or_insert(value);
    }
    labels
}
