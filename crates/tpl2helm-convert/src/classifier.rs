//! Object classification and field extraction
//!
//! Every template object gets the inherited labels merged in, then is routed
//! by kind: controllers, services and routes are read into typed updates for
//! the values record, the other recognized kinds are dropped, and anything
//! else becomes a passthrough body.

use indexmap::IndexMap;
use k8s_openapi::api::core::v1::{
    Container, EnvVar, PodTemplateSpec, Probe, ResourceRequirements, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tpl2helm_core::RouteTls;

use crate::aggregator::PassthroughBody;
use crate::error::{ConvertError, Result, render_raw};
use crate::kind::KnownKind;
use crate::legacy;
use crate::openshift::{DeploymentConfig, Route};
use crate::volumes::{self, VolumeResolution};

/// Service type when the object does not set one
pub const DEFAULT_SERVICE_TYPE: &str = "ClusterIP";
/// Replica count when the controller does not set one
pub const DEFAULT_REPLICAS: i32 = 1;

/// Outcome of classifying one object
#[derive(Debug, Clone)]
pub enum Classified {
    Controller(Box<ControllerUpdate>),
    Service(ServiceUpdate),
    Route(RouteUpdate),
    Passthrough(PassthroughBody),
    /// Recognized kind with no standalone output and nothing extracted
    Suppressed { kind: KnownKind, name: String },
}

/// Settings read from a controller's first container
#[derive(Debug, Clone, Default)]
pub struct ControllerUpdate {
    /// Kind as written in the template (before any translation)
    pub source_kind: String,
    pub name: String,
    pub env: Vec<EnvVar>,
    pub resources: Option<ResourceRequirements>,
    pub liveness: Option<Probe>,
    pub readiness: Option<Probe>,
    pub pull_policy: Option<String>,
    pub replicas: i32,
    pub configmaps: Vec<String>,
    pub secrets: Vec<String>,
    pub volumes: VolumeResolution,
    /// Number of containers in the pod (only the first one is read)
    pub container_count: usize,
}

impl ControllerUpdate {
    pub fn subject(&self) -> String {
        format!("{}/{}", self.source_kind, self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceUpdate {
    pub name: String,
    pub annotations: BTreeMap<String, String>,
    pub service_type: String,
    pub ports: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteUpdate {
    pub name: String,
    pub annotations: BTreeMap<String, String>,
    pub host: String,
    pub tls: Option<RouteTls>,
}

/// Only the controller fields that are read; the full apps/v1 shape would
/// reject deployments written without a selector
#[derive(Debug, Default, Deserialize)]
struct ControllerDoc {
    #[serde(default)]
    metadata: ObjectMeta,
    #[serde(default)]
    spec: ControllerSpec,
}

#[derive(Debug, Default, Deserialize)]
struct ControllerSpec {
    #[serde(default)]
    replicas: Option<i32>,
    #[serde(default)]
    template: Option<PodTemplateSpec>,
}

#[derive(Debug, Default, Deserialize)]
struct ServiceDoc {
    #[serde(default)]
    metadata: ObjectMeta,
    #[serde(default)]
    spec: Option<ServiceSpec>,
}

/// Classify the object at `index` of the template object list
pub fn classify(
    index: usize,
    mut object: Value,
    labels: &IndexMap<String, String>,
) -> Result<Classified> {
    merge_labels(&mut object, labels)?;

    let kind = match object.get("kind").and_then(Value::as_str) {
        Some(kind) if !kind.is_empty() => kind.to_string(),
        _ => {
            return Err(ConvertError::MissingKind {
                index,
                raw: render_raw(&object),
            });
        }
    };
    let name = object_name(&object);

    let Some(known) = KnownKind::from_kind(&kind) else {
        tracing::debug!("{}/{} passed through", kind, name);
        let body = serde_yaml::to_string(&object)?.into_bytes();
        return Ok(Classified::Passthrough(PassthroughBody { kind, body }));
    };

    if known.is_extracted() {
        tracing::debug!("{}/{} routed to values", kind, name);
    }
    let context = format!("{} '{}'", kind, name);

    match known {
        KnownKind::Deployment => {
            let doc: ControllerDoc = serde_json::from_value(object.clone())
                .map_err(|e| ConvertError::decode(&context, &object, e))?;
            let update = extract_controller(
                &kind,
                &doc.metadata,
                doc.spec.replicas,
                doc.spec.template.as_ref(),
                &object,
            )?;
            Ok(Classified::Controller(Box::new(update)))
        }
        KnownKind::DeploymentConfig => {
            let dc: DeploymentConfig = serde_json::from_value(object.clone())
                .map_err(|e| ConvertError::decode(&context, &object, e))?;
            let deployment = legacy::translate(dc)?;
            let spec = deployment.spec.unwrap_or_default();
            let update = extract_controller(
                &kind,
                &deployment.metadata,
                spec.replicas,
                Some(&spec.template),
                &object,
            )?;
            Ok(Classified::Controller(Box::new(update)))
        }
        KnownKind::Service => {
            let doc: ServiceDoc = serde_json::from_value(object.clone())
                .map_err(|e| ConvertError::decode(&context, &object, e))?;
            Ok(Classified::Service(extract_service(doc)))
        }
        KnownKind::Route => {
            let route: Route = serde_json::from_value(object.clone())
                .map_err(|e| ConvertError::decode(&context, &object, e))?;
            Ok(Classified::Route(extract_route(route)))
        }
        KnownKind::Job | KnownKind::CronJob | KnownKind::ImageStream => {
            Ok(Classified::Suppressed { kind: known, name })
        }
    }
}

/// Merge inherited labels into `metadata.labels`; the object's own values
/// win on collision
pub fn merge_labels(object: &mut Value, labels: &IndexMap<String, String>) -> Result<()> {
    if labels.is_empty() {
        return Ok(());
    }

    if let Some(message) = label_shape_error(object) {
        return Err(ConvertError::invalid(
            object_kind(object),
            object_name(object),
            message,
            object,
        ));
    }

    let Some(root) = object.as_object_mut() else {
        return Ok(());
    };
    let metadata = root
        .entry("metadata")
        .or_insert_with(|| Value::Object(Map::new()));
    if metadata.is_null() {
        *metadata = Value::Object(Map::new());
    }
    let Some(metadata) = metadata.as_object_mut() else {
        return Ok(());
    };
    let existing = metadata
        .entry("labels")
        .or_insert_with(|| Value::Object(Map::new()));
    if existing.is_null() {
        *existing = Value::Object(Map::new());
    }
    let Some(existing) = existing.as_object_mut() else {
        return Ok(());
    };

    for (key, value) in labels {
        existing
            .entry(key.clone())
            .or_insert_with(|| Value::String(value.clone()));
    }

    Ok(())
}

/// Describe why `object` cannot take inherited labels, if it cannot
fn label_shape_error(object: &Value) -> Option<&'static str> {
    let Some(root) = object.as_object() else {
        return Some("object is not a mapping");
    };
    let metadata = match root.get("metadata") {
        None | Some(Value::Null) => return None,
        Some(Value::Object(metadata)) => metadata,
        Some(_) => return Some("metadata is not a mapping"),
    };
    match metadata.get("labels") {
        None | Some(Value::Null) | Some(Value::Object(_)) => None,
        Some(_) => Some("metadata.labels is not a mapping"),
    }
}

fn object_kind(object: &Value) -> String {
    object
        .get("kind")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn object_name(object: &Value) -> String {
    object
        .pointer("/metadata/name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn extract_controller(
    source_kind: &str,
    metadata: &ObjectMeta,
    replicas: Option<i32>,
    template: Option<&PodTemplateSpec>,
    raw: &Value,
) -> Result<ControllerUpdate> {
    let name = metadata.name.clone().unwrap_or_default();

    let pod = template.and_then(|t| t.spec.as_ref());
    let containers: &[Container] = pod.map(|p| p.containers.as_slice()).unwrap_or_default();
    let Some(container) = containers.first() else {
        return Err(ConvertError::invalid(
            source_kind,
            name,
            "pod template declares no containers",
            raw,
        ));
    };
    let pod_volumes = pod.and_then(|p| p.volumes.as_deref()).unwrap_or_default();

    let mut configmaps = Vec::new();
    let mut secrets = Vec::new();
    for source in container.env_from.iter().flatten() {
        if let Some(config_map) = source.config_map_ref.as_ref().filter(|r| !r.name.is_empty()) {
            configmaps.push(config_map.name.clone());
        }
        if let Some(secret) = source.secret_ref.as_ref().filter(|r| !r.name.is_empty()) {
            secrets.push(secret.name.clone());
        }
    }

    Ok(ControllerUpdate {
        source_kind: source_kind.to_string(),
        env: container.env.clone().unwrap_or_default(),
        resources: container.resources.clone(),
        liveness: container.liveness_probe.clone(),
        readiness: container.readiness_probe.clone(),
        pull_policy: container.image_pull_policy.clone(),
        replicas: replicas.unwrap_or(DEFAULT_REPLICAS),
        configmaps,
        secrets,
        volumes: volumes::resolve(pod_volumes, container),
        container_count: containers.len(),
        name,
    })
}

fn extract_service(doc: ServiceDoc) -> ServiceUpdate {
    let spec = doc.spec.unwrap_or_default();

    ServiceUpdate {
        name: doc.metadata.name.unwrap_or_default(),
        annotations: doc.metadata.annotations.unwrap_or_default(),
        service_type: spec
            .type_
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVICE_TYPE.to_string()),
        ports: spec
            .ports
            .iter()
            .flatten()
            .map(|p| p.port.to_string())
            .collect(),
    }
}

fn extract_route(route: Route) -> RouteUpdate {
    RouteUpdate {
        name: route.metadata.name.unwrap_or_default(),
        annotations: route.metadata.annotations.unwrap_or_default(),
        host: route.spec.host.unwrap_or_default(),
        tls: route
            .spec
            .tls
            .filter(|tls| !tls.termination.is_empty())
            .map(|tls| RouteTls {
                termination: tls.termination,
                insecure_edge_termination_policy: tls.insecure_edge_termination_policy,
            }),
    }
}
