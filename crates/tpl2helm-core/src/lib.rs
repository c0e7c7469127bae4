//! tpl2helm Core - shared types for converting OpenShift templates to Helm charts
//!
//! This crate provides the foundational types used throughout tpl2helm:
//! - `Template`: the OpenShift template being converted, with its parameters
//! - `Values`: the consolidated chart values record
//! - `Chart`: the generated chart and its on-disk layout

pub mod chart;
pub mod error;
pub mod template;
pub mod values;

pub use chart::{Chart, ChartDependency, ChartFile, ChartMetadata};
pub use error::{CoreError, Result};
pub use template::{Parameter, Template, TemplateMetadata};
pub use values::{
    Configs, ControllerValues, Hpa, ImageSpec, Mount, MountSource, Pdb, Probes, Replicas,
    RouteTls, RouteValues, ServiceAccountValues, ServiceValues, StrategyValues, Values,
    ValuesDocument, VolumeSpec,
};
