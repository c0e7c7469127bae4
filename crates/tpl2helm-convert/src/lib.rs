//! tpl2helm Convert - OpenShift template to Helm chart converter
//!
//! This crate turns an OpenShift `Template` into a Helm chart built on a
//! shared application chart:
//!
//! | Template object                 | Chart output                          |
//! |---------------------------------|---------------------------------------|
//! | `Deployment`, `DeploymentConfig`| `values.yaml` (image, env, probes...) |
//! | `Service`                       | `values.yaml` `service`               |
//! | `Route`                         | `values.yaml` `route`                 |
//! | `Job`, `CronJob`, `ImageStream` | dropped                               |
//! | anything else                   | `templates/<kind>.yaml`               |
//! | `${PARAM}` / `${{PARAM}}`       | `{{ .Values.param }}`                 |
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use tpl2helm_convert::{convert, convert_with_options, ConvertOptions};
//!
//! let result = convert(Path::new("./template.yaml"), Path::new("./charts")).unwrap();
//! println!("Wrote {} files", result.files.len());
//!
//! for warning in &result.warnings {
//!     if warning.severity == tpl2helm_convert::WarningSeverity::Unsupported {
//!         println!("Unsupported: {} - {}", warning.pattern, warning.message);
//!     }
//! }
//!
//! let options = ConvertOptions {
//!     image_registry: "registry.example.com".to_string(),
//!     force: true,
//!     ..Default::default()
//! };
//! let result = convert_with_options(
//!     Path::new("./template.yaml"),
//!     Path::new("./charts"),
//!     options,
//! ).unwrap();
//! ```

pub mod aggregator;
pub mod classifier;
pub mod converter;
pub mod error;
pub mod kind;
pub mod legacy;
pub mod openshift;
pub mod parameters;
pub mod volumes;

// Re-exports
pub use aggregator::{PassthroughBody, aggregate};
pub use classifier::{Classified, classify, merge_labels};
pub use converter::{
    ConversionOutput, ConversionResult, ConvertOptions, Converter, ValuesBuilder, convert,
    convert_objects, convert_with_options,
};
pub use error::{ConversionWarning, ConvertError, Result, WarningCategory, WarningSeverity};
pub use kind::{KnownKind, is_suppressed};
pub use parameters::{RewriteOutput, rewrite};
pub use volumes::{VolumeResolution, resolve};
