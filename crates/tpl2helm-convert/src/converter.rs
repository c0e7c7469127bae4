//! Main converter logic
//!
//! Orchestrates the conversion of an OpenShift template to a Helm chart:
//! classify every object in order, fold the recognized ones into a single
//! values record, aggregate the rest into per-kind templates, then rewrite
//! parameter placeholders.

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tpl2helm_core::{
    Chart, ChartDependency, ChartFile, ChartMetadata, CoreError, Parameter, Probes, Template,
    Values,
};

use crate::aggregator::{self, PassthroughBody};
use crate::classifier::{self, Classified, ControllerUpdate, RouteUpdate, ServiceUpdate};
use crate::error::{ConversionWarning, ConvertError, Result, warnings};
use crate::kind::KnownKind;
use crate::parameters;

pub const DEFAULT_IMAGE_REGISTRY: &str = "quay.io";
pub const DEFAULT_COMMON_CHART: &str = "app-helm-common";
pub const DEFAULT_HELM_REPO: &str = "https://pages.github.com";
pub const DEFAULT_COMMON_CHART_VERSION: &str = ">=1.1.0";
pub const DEFAULT_CHART_VERSION: &str = "1.0.0";

/// Controller type the shared application chart renders
pub const CONTROLLER_TYPE: &str = "deployment";

/// Options for the converter
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Registry written to `image.repository`
    pub image_registry: String,
    /// Shared chart every generated chart depends on
    pub common_chart_name: String,
    pub common_chart_repository: String,
    /// Version constraint on the shared chart
    pub common_chart_version: String,
    /// Version of the generated chart
    pub chart_version: String,
    /// Overwrite an existing chart directory
    pub force: bool,
    /// Only show what would be written
    pub dry_run: bool,
    /// Verbose output
    pub verbose: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            image_registry: DEFAULT_IMAGE_REGISTRY.to_string(),
            common_chart_name: DEFAULT_COMMON_CHART.to_string(),
            common_chart_repository: DEFAULT_HELM_REPO.to_string(),
            common_chart_version: DEFAULT_COMMON_CHART_VERSION.to_string(),
            chart_version: DEFAULT_CHART_VERSION.to_string(),
            force: false,
            dry_run: false,
            verbose: false,
        }
    }
}

/// Values record under construction
///
/// Starts from the baseline and takes one typed update per recognized
/// object. A second controller overwrites the first and is reported.
#[derive(Debug)]
pub struct ValuesBuilder {
    values: Values,
    controller: Option<String>,
    warnings: Vec<ConversionWarning>,
}

impl ValuesBuilder {
    pub fn new(image_registry: &str) -> Self {
        Self {
            values: Values::with_baseline(image_registry),
            controller: None,
            warnings: Vec::new(),
        }
    }

    pub fn controller(&mut self, update: ControllerUpdate) -> &mut Self {
        let subject = update.subject();

        if let Some(previous) = self.controller.replace(subject.clone()) {
            tracing::warn!("{} overwrites controller settings from {}", subject, previous);
            self.warnings
                .push(warnings::repeated_controller(&subject, &previous));
        }
        if update.container_count > 1 {
            self.warnings
                .push(warnings::extra_containers(&subject, update.container_count));
        }

        let values = &mut self.values;
        values.env = update.env;
        values.resources = update.resources;
        if update.readiness.is_some() || update.liveness.is_some() {
            values.probes = Probes {
                liveness: update.liveness.or(values.probes.liveness.take()),
                readiness: update.readiness.or(values.probes.readiness.take()),
            };
        }
        values.image.pull_policy = update.pull_policy;
        values.image.name = update.name;
        values.controller.enabled = true;
        values.controller.controller_type = CONTROLLER_TYPE.to_string();
        values.replicas.min = update.replicas;
        values.replicas.max = update.replicas;
        values.configs.configmaps = update.configmaps;
        values.configs.secrets = update.secrets;

        let resolution = update.volumes;
        for volume in &resolution.unsupported {
            self.warnings
                .push(warnings::unsupported_volume(&subject, volume));
        }
        for volume in &resolution.undeclared {
            self.warnings
                .push(warnings::undeclared_volume(&subject, volume));
        }
        for volume in &resolution.unmounted {
            tracing::warn!("{}: volume {} is not mounted", subject, volume);
            self.warnings
                .push(warnings::unmounted_volume(&subject, volume));
        }
        values.volume_spec.enabled = resolution.has_volumes;
        values.volume_spec.mounts = resolution.mounts;

        self
    }

    pub fn service(&mut self, update: ServiceUpdate) -> &mut Self {
        let service = &mut self.values.service;
        service.enabled = true;
        service.annotations = update.annotations;
        service.service_type = update.service_type;
        service.ports = update.ports;
        self
    }

    pub fn route(&mut self, update: RouteUpdate) -> &mut Self {
        let route = &mut self.values.route;
        route.enabled = true;
        route.annotations = update.annotations;
        route.hostname = update.host;
        route.termination = update.tls;
        self
    }

    /// Record an object deliberately left out of the chart
    pub fn dropped(&mut self, kind: KnownKind, name: &str) -> &mut Self {
        tracing::debug!("Dropping {}/{}", kind, name);
        self.warnings.push(warnings::dropped_kind(
            &format!("{}/{}", kind, name),
            kind.as_str(),
        ));
        self
    }

    pub fn build(self) -> (Values, Vec<ConversionWarning>) {
        (self.values, self.warnings)
    }
}

/// In-memory result of converting a template's objects
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// Chart templates, base template last
    pub templates: Vec<ChartFile>,
    pub values: Values,
    /// Flattened parameter values, in declaration order
    pub parameter_values: IndexMap<String, String>,
    pub warnings: Vec<ConversionWarning>,
}

/// Convert template objects into chart templates and values
///
/// Objects are processed strictly in order. The first fatal error aborts the
/// whole conversion.
pub fn convert_objects(
    objects: Vec<serde_json::Value>,
    labels: &IndexMap<String, String>,
    parameters: &[Parameter],
    options: &ConvertOptions,
) -> Result<ConversionOutput> {
    let mut builder = ValuesBuilder::new(&options.image_registry);
    let mut passthrough: Vec<PassthroughBody> = Vec::new();

    for (index, object) in objects.into_iter().enumerate() {
        match classifier::classify(index, object, labels)? {
            Classified::Controller(update) => {
                builder.controller(*update);
            }
            Classified::Service(update) => {
                builder.service(update);
            }
            Classified::Route(update) => {
                builder.route(update);
            }
            Classified::Suppressed { kind, name } => {
                builder.dropped(kind, &name);
            }
            Classified::Passthrough(body) => passthrough.push(body),
        }
    }

    let mut templates = aggregator::aggregate(passthrough);
    let rewritten = parameters::rewrite(parameters, &mut templates);

    let (values, mut warnings) = builder.build();
    warnings.extend(rewritten.warnings);

    Ok(ConversionOutput {
        templates,
        values,
        parameter_values: rewritten.values,
        warnings,
    })
}

/// Result of a conversion
#[derive(Debug)]
pub struct ConversionResult {
    /// Chart name
    pub chart_name: String,
    /// Chart directory (written or planned)
    pub chart_dir: PathBuf,
    /// Files that were written, or would be on a dry run
    pub files: Vec<PathBuf>,
    /// Number of template objects read
    pub object_count: usize,
    /// Number of parameters converted to values
    pub parameter_count: usize,
    /// Warnings generated during conversion
    pub warnings: Vec<ConversionWarning>,
}

/// Convert an OpenShift template to a Helm chart
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Convert the template at `template_path` into `<output_dir>/<name>/`
    pub fn convert(&self, template_path: &Path, output_dir: &Path) -> Result<ConversionResult> {
        if !template_path.exists() {
            return Err(ConvertError::FileNotFound(template_path.to_path_buf()));
        }

        let template = Template::from_file(template_path)?;
        let chart_name = chart_name(&template, template_path);
        let description = template.description().map(str::to_string);
        let object_count = template.objects.len();
        let parameter_count = template.parameters.len();

        tracing::info!(
            "Converting template {} ({} objects, {} parameters)",
            chart_name,
            object_count,
            parameter_count
        );

        let Template {
            objects,
            parameters,
            labels,
            ..
        } = template;
        let output = convert_objects(objects, &labels, &parameters, &self.options)?;
        let mut notes = output.warnings;

        let document = output.values.render(&output.parameter_values)?;
        notes.extend(
            document
                .shadowed
                .iter()
                .map(|key| warnings::shadowed_parameter(key)),
        );

        let metadata = ChartMetadata::application(&chart_name, &self.options.chart_version)?
            .with_description(description.as_deref())
            .with_dependency(ChartDependency {
                name: self.options.common_chart_name.clone(),
                version: self.options.common_chart_version.clone(),
                repository: self.options.common_chart_repository.clone(),
            });

        let chart = Chart {
            metadata,
            values_yaml: document.yaml,
            templates: output.templates,
        };
        let chart_dir = chart.dir(output_dir);

        let files = if self.options.dry_run {
            if chart_dir.exists() && !self.options.force {
                return Err(ConvertError::OutputExists(chart_dir));
            }
            chart.planned_files(output_dir)
        } else {
            chart
                .save_dir(output_dir, self.options.force)
                .map_err(|e| match e {
                    CoreError::ChartExists { .. } => ConvertError::OutputExists(chart_dir.clone()),
                    other => ConvertError::Core(other),
                })?
        };

        Ok(ConversionResult {
            chart_name,
            chart_dir,
            files,
            object_count,
            parameter_count,
            warnings: notes,
        })
    }
}

/// Template name, else the file stem
fn chart_name(template: &Template, path: &Path) -> String {
    template
        .name()
        .map(str::to_string)
        .or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
        })
        .unwrap_or_default()
}

// =============================================================================
// Public API
// =============================================================================

/// Quick convert function
pub fn convert(template_path: &Path, output_dir: &Path) -> Result<ConversionResult> {
    let converter = Converter::new(ConvertOptions::default());
    converter.convert(template_path, output_dir)
}

/// Convert with options
pub fn convert_with_options(
    template_path: &Path,
    output_dir: &Path,
    options: ConvertOptions,
) -> Result<ConversionResult> {
    let converter = Converter::new(options);
    converter.convert(template_path, output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{WarningCategory, WarningSeverity};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;
    use tpl2helm_core::MountSource;

    const TEMPLATE: &str = r#"
apiVersion: template.openshift.io/v1
kind: Template
metadata:
  name: shop
  annotations:
    description: Online shop
labels:
  app: shop
objects:
  - apiVersion: apps.openshift.io/v1
    kind: DeploymentConfig
    metadata:
      name: shop
    spec:
      replicas: 2
      selector:
        deploymentconfig: shop
      template:
        metadata:
          labels:
            deploymentconfig: shop
        spec:
          containers:
            - name: shop
              image: shop:latest
              env:
                - name: DB_HOST
                  value: ${DB_HOST}
  - apiVersion: v1
    kind: Service
    metadata:
      name: shop
    spec:
      type: ClusterIP
      ports:
        - port: 8080
  - apiVersion: v1
    kind: ConfigMap
    metadata:
      name: shop-config
    data:
      greeting: ${GREETING}
  - apiVersion: v1
    kind: ConfigMap
    metadata:
      name: shop-extra
    data:
      mode: ${{MODE}}
  - apiVersion: image.openshift.io/v1
    kind: ImageStream
    metadata:
      name: shop
parameters:
  - name: DB_HOST
    value: db.local
  - name: GREETING
  - name: MODE
    value: fast
"#;

    fn write_template(dir: &Path) -> PathBuf {
        let path = dir.join("shop.yaml");
        fs::write(&path, TEMPLATE).unwrap();
        path
    }

    fn labels(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn deployment(name: &str, replicas: i32) -> serde_json::Value {
        json!({
            "kind": "Deployment",
            "metadata": {"name": name},
            "spec": {
                "replicas": replicas,
                "template": {"spec": {"containers": [{
                    "name": name,
                    "env": [{"name": "FOO", "value": "bar"}],
                    "envFrom": [{"configMapRef": {"name": "app-config"}}]
                }]}}
            }
        })
    }

    #[test]
    fn test_controller_scenario() {
        let output = convert_objects(
            vec![deployment("web", 3)],
            &IndexMap::new(),
            &[],
            &ConvertOptions::default(),
        )
        .unwrap();

        let values = &output.values;
        assert_eq!(values.replicas.min, 3);
        assert_eq!(values.replicas.max, 3);
        assert_eq!(values.env[0].name, "FOO");
        assert_eq!(values.env[0].value.as_deref(), Some("bar"));
        assert_eq!(values.configs.configmaps, vec!["app-config".to_string()]);
        assert!(values.controller.enabled);
        assert_eq!(values.controller.controller_type, CONTROLLER_TYPE);
        assert_eq!(values.image.name, "web");
        // Baseline survives extraction
        assert!(values.hpa.enabled);
        assert_eq!(values.strategy.max_surge, "100%");
    }

    #[test]
    fn test_suppressed_kinds_never_emitted() {
        let objects = vec![
            deployment("web", 1),
            json!({"kind": "Service", "metadata": {"name": "web"}, "spec": {"ports": [{"port": 80}]}}),
            json!({"kind": "Route", "metadata": {"name": "web"}, "spec": {"host": "web.example.com"}}),
            json!({"kind": "Job", "metadata": {"name": "migrate"}}),
            json!({"kind": "CronJob", "metadata": {"name": "cleanup"}}),
            json!({"kind": "ImageStream", "metadata": {"name": "web"}}),
        ];
        let output =
            convert_objects(objects, &IndexMap::new(), &[], &ConvertOptions::default()).unwrap();

        let names: Vec<&str> = output.templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec![parameters::BASE_TEMPLATE_NAME]);

        assert!(output.values.service.enabled);
        assert_eq!(output.values.service.ports, vec!["80".to_string()]);
        assert!(output.values.route.enabled);
        assert_eq!(output.values.route.hostname, "web.example.com");

        let dropped = output
            .warnings
            .iter()
            .filter(|w| w.category == WarningCategory::DroppedKind)
            .count();
        assert_eq!(dropped, 3);
    }

    #[test]
    fn test_repeated_controller_last_wins() {
        let output = convert_objects(
            vec![deployment("first", 1), deployment("second", 4)],
            &IndexMap::new(),
            &[],
            &ConvertOptions::default(),
        )
        .unwrap();

        assert_eq!(output.values.image.name, "second");
        assert_eq!(output.values.replicas.max, 4);
        assert!(
            output
                .warnings
                .iter()
                .any(|w| w.category == WarningCategory::Controller
                    && w.subject == "Deployment/second")
        );
    }

    #[test]
    fn test_labels_reach_passthrough_bodies() {
        let objects = vec![json!({
            "kind": "ConfigMap",
            "metadata": {"name": "cfg", "labels": {"app": "own"}}
        })];
        let output = convert_objects(
            objects,
            &labels(&[("app", "shop"), ("tier", "web")]),
            &[],
            &ConvertOptions::default(),
        )
        .unwrap();

        let body: serde_yaml::Value = serde_yaml::from_slice(&output.templates[0].data).unwrap();
        assert_eq!(body["metadata"]["labels"]["app"], serde_yaml::Value::from("own"));
        assert_eq!(body["metadata"]["labels"]["tier"], serde_yaml::Value::from("web"));
    }

    #[test]
    fn test_fatal_on_decode() {
        let objects = vec![
            json!({"kind": "ConfigMap", "metadata": {"name": "ok"}}),
            json!({"kind": "Route", "metadata": {"name": "bad"}, "spec": {"host": 42}}),
        ];
        let err = convert_objects(objects, &IndexMap::new(), &[], &ConvertOptions::default())
            .unwrap_err();

        assert!(matches!(err, ConvertError::Decode { .. }));
    }

    #[test]
    fn test_volume_warnings() {
        let objects = vec![json!({
            "kind": "Deployment",
            "metadata": {"name": "web"},
            "spec": {"template": {"spec": {
                "volumes": [
                    {"name": "cfg", "configMap": {"name": "cfg"}},
                    {"name": "scratch", "emptyDir": {}},
                    {"name": "unused", "secret": {"secretName": "s"}}
                ],
                "containers": [{
                    "name": "web",
                    "volumeMounts": [
                        {"name": "cfg", "mountPath": "/etc/cfg"},
                        {"name": "scratch", "mountPath": "/tmp"}
                    ]
                }]
            }}}
        })];
        let output =
            convert_objects(objects, &IndexMap::new(), &[], &ConvertOptions::default()).unwrap();

        let volume_spec = &output.values.volume_spec;
        assert!(volume_spec.enabled);
        assert_eq!(volume_spec.mounts.len(), 2);
        assert_eq!(volume_spec.mounts[1].source_type, MountSource::Unsupported);

        let volume_warnings: Vec<&ConversionWarning> = output
            .warnings
            .iter()
            .filter(|w| w.category == WarningCategory::Volume)
            .collect();
        assert_eq!(volume_warnings.len(), 2);
        assert!(
            volume_warnings
                .iter()
                .any(|w| w.severity == WarningSeverity::Unsupported && w.pattern == "scratch")
        );
        assert!(volume_warnings.iter().any(|w| w.pattern == "unused"));
    }

    #[test]
    fn test_convert_template() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let template_path = write_template(input.path());

        let result = convert(&template_path, output.path()).unwrap();
        let chart_dir = output.path().join("shop");

        assert_eq!(result.chart_name, "shop");
        assert_eq!(result.chart_dir, chart_dir);
        assert_eq!(result.object_count, 5);
        assert_eq!(result.parameter_count, 3);
        assert!(chart_dir.join("Chart.yaml").exists());
        assert!(chart_dir.join("templates/configmap.yaml").exists());
        assert!(chart_dir.join("templates/basic_deployment.yaml").exists());
        assert!(!chart_dir.join("templates/imagestream.yaml").exists());
        assert!(!chart_dir.join("templates/service.yaml").exists());

        let configmaps = fs::read_to_string(chart_dir.join("templates/configmap.yaml")).unwrap();
        assert!(configmaps.contains("{{ .Values.greeting }}"));
        assert!(configmaps.contains("{{ .Values.mode }}"));
        assert_eq!(configmaps.lines().filter(|l| *l == "---").count(), 1);

        let chart: serde_yaml::Value =
            serde_yaml::from_str(&fs::read_to_string(chart_dir.join("Chart.yaml")).unwrap())
                .unwrap();
        assert_eq!(chart["name"], serde_yaml::Value::from("shop"));
        assert_eq!(chart["version"], serde_yaml::Value::from("1.0.0"));
        assert_eq!(chart["description"], serde_yaml::Value::from("Online shop"));
        assert_eq!(
            chart["dependencies"][0]["name"],
            serde_yaml::Value::from(DEFAULT_COMMON_CHART)
        );

        let values: serde_yaml::Value =
            serde_yaml::from_str(&fs::read_to_string(chart_dir.join("values.yaml")).unwrap())
                .unwrap();
        assert_eq!(values["db_host"], serde_yaml::Value::from("db.local"));
        assert_eq!(
            values["greeting"],
            serde_yaml::Value::from("# TODO: must define a default value for .greeting")
        );
        assert_eq!(values["replicas"]["min"], serde_yaml::Value::from(2));
        assert_eq!(values["controller"]["type"], serde_yaml::Value::from("deployment"));
        assert_eq!(values["image"]["repository"], serde_yaml::Value::from("quay.io"));
    }

    #[test]
    fn test_dry_run() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let template_path = write_template(input.path());

        let options = ConvertOptions {
            dry_run: true,
            ..Default::default()
        };
        let result = convert_with_options(&template_path, output.path(), options).unwrap();

        // Should report files but not create them
        assert!(!result.files.is_empty());
        assert!(!output.path().join("shop").exists());
    }

    #[test]
    fn test_force_overwrite() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let template_path = write_template(input.path());

        convert(&template_path, output.path()).unwrap();

        let err = convert(&template_path, output.path()).unwrap_err();
        assert!(matches!(err, ConvertError::OutputExists(_)));

        let options = ConvertOptions {
            force: true,
            ..Default::default()
        };
        assert!(convert_with_options(&template_path, output.path(), options).is_ok());
    }

    #[test]
    fn test_custom_registry_and_versions() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let template_path = write_template(input.path());

        let options = ConvertOptions {
            image_registry: "registry.example.com".to_string(),
            chart_version: "2.3.4".to_string(),
            common_chart_version: "~2.0".to_string(),
            ..Default::default()
        };
        convert_with_options(&template_path, output.path(), options).unwrap();

        let chart_dir = output.path().join("shop");
        let values: serde_yaml::Value =
            serde_yaml::from_str(&fs::read_to_string(chart_dir.join("values.yaml")).unwrap())
                .unwrap();
        assert_eq!(
            values["image"]["repository"],
            serde_yaml::Value::from("registry.example.com")
        );

        let chart: serde_yaml::Value =
            serde_yaml::from_str(&fs::read_to_string(chart_dir.join("Chart.yaml")).unwrap())
                .unwrap();
        assert_eq!(chart["version"], serde_yaml::Value::from("2.3.4"));
        assert_eq!(chart["dependencies"][0]["version"], serde_yaml::Value::from("~2.0"));
    }

    #[test]
    fn test_missing_template() {
        let output = TempDir::new().unwrap();
        let err = convert(Path::new("/nonexistent/template.yaml"), output.path()).unwrap_err();

        assert!(matches!(err, ConvertError::FileNotFound(_)));
    }

    #[test]
    fn test_chart_name_falls_back_to_file_stem() {
        let template = Template::default();
        assert_eq!(chart_name(&template, Path::new("dir/my-app.yaml")), "my-app");
    }
}
