//! Object kinds the converter recognizes
//!
//! Every recognized kind is folded into `values.yaml` (or deliberately
//! dropped) and never gets a standalone template. Anything else is passed
//! through. `KNOWN_KINDS` is the one place that decides which is which.

use phf::phf_map;

/// Kinds with special handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownKind {
    /// apps/v1 Deployment, the standard controller
    Deployment,
    /// OpenShift DeploymentConfig, translated to a Deployment first
    DeploymentConfig,
    /// Network exposure
    Service,
    /// OpenShift external route
    Route,
    Job,
    CronJob,
    ImageStream,
}

static KNOWN_KINDS: phf::Map<&'static str, KnownKind> = phf_map! {
    "Deployment" => KnownKind::Deployment,
    "DeploymentConfig" => KnownKind::DeploymentConfig,
    "Service" => KnownKind::Service,
    "Route" => KnownKind::Route,
    "Job" => KnownKind::Job,
    "CronJob" => KnownKind::CronJob,
    "ImageStream" => KnownKind::ImageStream,
};

impl KnownKind {
    /// Look up a kind tag; `None` means the object is passed through
    pub fn from_kind(kind: &str) -> Option<Self> {
        KNOWN_KINDS.get(kind).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deployment => "Deployment",
            Self::DeploymentConfig => "DeploymentConfig",
            Self::Service => "Service",
            Self::Route => "Route",
            Self::Job => "Job",
            Self::CronJob => "CronJob",
            Self::ImageStream => "ImageStream",
        }
    }

    /// Whether objects of this kind are read into `values.yaml`
    pub fn is_extracted(&self) -> bool {
        matches!(
            self,
            Self::Deployment | Self::DeploymentConfig | Self::Service | Self::Route
        )
    }
}

impl std::fmt::Display for KnownKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a kind must never produce a standalone template
#[inline]
pub fn is_suppressed(kind: &str) -> bool {
    KNOWN_KINDS.contains_key(kind)
}
