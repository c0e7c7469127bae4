//! Integration tests for CLI commands

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Helper to run tpl2helm command
fn tpl2helm(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_tpl2helm"))
        .args(args)
        .env_remove("TPL2HELM_COMMON_CHART")
        .env_remove("TPL2HELM_HELM_REPO")
        .env_remove("TPL2HELM_HELM_DEP_VERSION")
        .env_remove("TPL2HELM_IMAGE_REGISTRY")
        .output()
        .expect("Failed to execute tpl2helm")
}

/// Get the fixtures path
fn fixtures_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures")
}

fn fixture(name: &str) -> String {
    format!("{}/{}", fixtures_path(), name)
}

fn read_yaml(path: &Path) -> serde_yaml::Value {
    serde_yaml::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

mod convert_command {
    use super::*;

    fn convert_sample(out: &TempDir, extra: &[&str]) -> std::process::Output {
        let template = fixture("sample-app.yaml");
        let chart = out.path().to_str().unwrap();
        let mut args = vec!["convert", "-t", template.as_str(), "-c", chart];
        args.extend_from_slice(extra);
        tpl2helm(&args)
    }

    #[test]
    fn test_convert_sample() {
        let out = TempDir::new().unwrap();
        let output = convert_sample(&out, &[]);

        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Generated Files"));
        assert!(stdout.contains("helm dependency update"));

        let chart_dir = out.path().join("sample-app");
        assert!(chart_dir.join("Chart.yaml").exists());
        assert!(chart_dir.join("values.yaml").exists());
        assert!(chart_dir.join("templates/configmap.yaml").exists());
        assert!(chart_dir.join("templates/secret.yaml").exists());
        assert!(chart_dir.join("templates/basic_deployment.yaml").exists());

        for suppressed in ["deploymentconfig", "service", "route", "imagestream"] {
            assert!(
                !chart_dir
                    .join(format!("templates/{}.yaml", suppressed))
                    .exists(),
                "{} should not get a template",
                suppressed
            );
        }
    }

    #[test]
    fn test_values_document() {
        let out = TempDir::new().unwrap();
        assert!(convert_sample(&out, &[]).status.success());

        let values = read_yaml(&out.path().join("sample-app/values.yaml"));

        assert_eq!(values["controller"]["enabled"], serde_yaml::Value::from(true));
        assert_eq!(values["controller"]["type"], serde_yaml::Value::from("deployment"));
        assert_eq!(values["replicas"]["min"], serde_yaml::Value::from(2));
        assert_eq!(values["replicas"]["max"], serde_yaml::Value::from(2));
        assert_eq!(values["image"]["name"], serde_yaml::Value::from("sample-app"));
        assert_eq!(values["image"]["repository"], serde_yaml::Value::from("quay.io"));
        assert_eq!(values["image"]["pullPolicy"], serde_yaml::Value::from("IfNotPresent"));
        assert_eq!(values["env"][0]["name"], serde_yaml::Value::from("LOG_LEVEL"));
        assert_eq!(
            values["configs"]["configmaps"][0],
            serde_yaml::Value::from("sample-app-env")
        );
        assert_eq!(
            values["configs"]["secrets"][0],
            serde_yaml::Value::from("sample-app-credentials")
        );
        assert!(values["probes"]["readiness"].is_mapping());
        assert!(values["probes"]["liveness"].is_mapping());

        assert_eq!(values["service"]["enabled"], serde_yaml::Value::from(true));
        assert_eq!(values["service"]["type"], serde_yaml::Value::from("ClusterIP"));
        assert_eq!(values["service"]["ports"][0], serde_yaml::Value::from("8080"));

        assert_eq!(values["route"]["enabled"], serde_yaml::Value::from(true));
        assert_eq!(
            values["route"]["termination"]["termination"],
            serde_yaml::Value::from("edge")
        );

        let mounts = values["volumeMounts"]["mounts"].as_sequence().unwrap();
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0]["name"], serde_yaml::Value::from("sample-app-settings"));
        assert_eq!(mounts[0]["volume"], serde_yaml::Value::from("settings"));
        assert_eq!(mounts[0]["type"], serde_yaml::Value::from("configmap"));
        assert_eq!(mounts[0]["mountPath"], serde_yaml::Value::from("/etc/sample-app"));
        assert_eq!(mounts[0]["defaultMode"], serde_yaml::Value::from("0644"));
        assert_eq!(mounts[0]["keys"][0], serde_yaml::Value::from("app.properties"));

        assert_eq!(values["hpa"]["enabled"], serde_yaml::Value::from(true));
        assert_eq!(values["pdb"]["minavailable"], serde_yaml::Value::from(1));

        assert_eq!(
            values["app_hostname"],
            serde_yaml::Value::from("sample-app.apps.example.com")
        );
        assert_eq!(values["workers"], serde_yaml::Value::from("4"));
        assert_eq!(
            values["feature_flag"],
            serde_yaml::Value::from("# TODO: must define a default value for .feature_flag")
        );
    }

    #[test]
    fn test_templates_rewritten() {
        let out = TempDir::new().unwrap();
        assert!(convert_sample(&out, &[]).status.success());

        let chart_dir = out.path().join("sample-app");
        let configmaps = fs::read_to_string(chart_dir.join("templates/configmap.yaml")).unwrap();
        assert!(configmaps.contains("greeting={{ .Values.greeting }}"));
        assert!(configmaps.contains("workers={{ .Values.workers }}"));
        assert!(configmaps.contains("{{ .Values.feature_flag }}"));
        assert!(!configmaps.contains("${"));
        assert_eq!(configmaps.lines().filter(|l| *l == "---").count(), 1);

        // Object labels win over template labels
        assert!(configmaps.contains("app: overridden"));
        assert!(configmaps.contains("template: sample-app"));

        let secret = fs::read_to_string(chart_dir.join("templates/secret.yaml")).unwrap();
        assert!(secret.contains("{{ .Values.db_password }}"));

        let base = fs::read_to_string(chart_dir.join("templates/basic_deployment.yaml")).unwrap();
        assert_eq!(base, "{{- include \"common.appSpec\" . -}}");
    }

    #[test]
    fn test_chart_metadata_options() {
        let out = TempDir::new().unwrap();
        let output = convert_sample(
            &out,
            &[
                "-n",
                "platform-common",
                "-r",
                "https://charts.example.com",
                "-d",
                "~2.1",
                "--chart-version",
                "0.3.0",
            ],
        );
        assert!(output.status.success());

        let chart = read_yaml(&out.path().join("sample-app/Chart.yaml"));
        assert_eq!(chart["apiVersion"], serde_yaml::Value::from("v2"));
        assert_eq!(chart["version"], serde_yaml::Value::from("0.3.0"));
        assert_eq!(chart["type"], serde_yaml::Value::from("application"));

        let dependency = &chart["dependencies"][0];
        assert_eq!(dependency["name"], serde_yaml::Value::from("platform-common"));
        assert_eq!(
            dependency["repository"],
            serde_yaml::Value::from("https://charts.example.com")
        );
        assert_eq!(dependency["version"], serde_yaml::Value::from("~2.1"));
    }

    #[test]
    fn test_image_registry_from_env() {
        let out = TempDir::new().unwrap();
        let template = fixture("sample-app.yaml");
        let output = Command::new(env!("CARGO_BIN_EXE_tpl2helm"))
            .args(["convert", "-t", &template, "-c", out.path().to_str().unwrap()])
            .env("TPL2HELM_IMAGE_REGISTRY", "registry.example.com")
            .output()
            .expect("Failed to execute tpl2helm");
        assert!(output.status.success());

        let values = read_yaml(&out.path().join("sample-app/values.yaml"));
        assert_eq!(
            values["image"]["repository"],
            serde_yaml::Value::from("registry.example.com")
        );
    }

    #[test]
    fn test_conversion_notes() {
        let out = TempDir::new().unwrap();
        let output = convert_sample(&out, &["--verbose"]);
        assert!(output.status.success());

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Conversion Notes"));
        // Unmounted emptyDir volume
        assert!(stdout.contains("cache"));
        // Parameter without a default
        assert!(stdout.contains("${FEATURE_FLAG}"));
        // Generated parameter
        assert!(stdout.contains("generate"));
        // Dropped image stream, only listed in verbose mode
        assert!(stdout.contains("ImageStream/sample-app"));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let out = TempDir::new().unwrap();
        let output = convert_sample(&out, &["--dry-run"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Planned Files"));
        assert!(stdout.contains("Dry run mode"));
        assert!(!out.path().join("sample-app").exists());
    }

    #[test]
    fn test_existing_chart_requires_force() {
        let out = TempDir::new().unwrap();
        assert!(convert_sample(&out, &[]).status.success());

        let again = convert_sample(&out, &[]);
        assert_eq!(again.status.code(), Some(4));
        let stderr = String::from_utf8_lossy(&again.stderr);
        assert!(stderr.contains("--force"));

        assert!(convert_sample(&out, &["--force"]).status.success());
    }

    #[test]
    fn test_missing_template() {
        let out = TempDir::new().unwrap();
        let output = tpl2helm(&[
            "convert",
            "-t",
            &fixture("does-not-exist.yaml"),
            "-c",
            out.path().to_str().unwrap(),
        ]);

        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_malformed_object() {
        let out = TempDir::new().unwrap();
        let output = tpl2helm(&[
            "convert",
            "-t",
            &fixture("malformed.yaml"),
            "-c",
            out.path().to_str().unwrap(),
        ]);

        assert_eq!(output.status.code(), Some(2));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Service 'broken'"));
        // No partial chart
        assert!(!out.path().join("malformed").exists());
    }

    #[test]
    fn test_not_a_template() {
        let out = TempDir::new().unwrap();
        let output = tpl2helm(&[
            "convert",
            "-t",
            &fixture("not-a-template.yaml"),
            "-c",
            out.path().to_str().unwrap(),
        ]);

        assert_eq!(output.status.code(), Some(2));
    }

    #[test]
    fn test_chart_name_cannot_leave_output_dir() {
        let root = TempDir::new().unwrap();
        let out = root.path().join("charts");
        fs::create_dir(&out).unwrap();
        let output = tpl2helm(&[
            "convert",
            "-t",
            &fixture("escaping-name.yaml"),
            "-c",
            out.to_str().unwrap(),
        ]);

        assert_eq!(output.status.code(), Some(2));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("../escaped"));
        assert!(!root.path().join("escaped").exists());
    }

    #[test]
    fn test_invalid_chart_version() {
        let out = TempDir::new().unwrap();
        let output = convert_sample(&out, &["--chart-version", "one"]);

        assert_eq!(output.status.code(), Some(64));
    }

    #[test]
    fn test_template_flag_required() {
        let output = tpl2helm(&["convert"]);
        assert!(!output.status.success());
    }
}
