//! Volume resolution
//!
//! Turns a pod's volume definitions and a container's mount points into the
//! flat `volumeMounts.mounts` list of the chart values.
//!
//! Only config maps, secrets and persistent volume claims have an
//! equivalent in the values; any other source is kept as `unsupported` so
//! its mount point still shows up.

use k8s_openapi::api::core::v1::{Container, Volume};
use std::collections::HashMap;
use tpl2helm_core::{Mount, MountSource};

/// Result of resolving one container against its pod volumes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeResolution {
    /// One entry per container mount point, in container order
    pub mounts: Vec<Mount>,
    /// True iff the pod declares at least one volume
    pub has_volumes: bool,
    /// Declared volumes no mount point refers to (not in `mounts`)
    pub unmounted: Vec<String>,
    /// Volumes with a source the values cannot express
    pub unsupported: Vec<String>,
    /// Mount points naming a volume the pod does not declare
    pub undeclared: Vec<String>,
}

/// Resolve the mount points of `container` against `volumes`
pub fn resolve(volumes: &[Volume], container: &Container) -> VolumeResolution {
    let mut resolution = VolumeResolution {
        has_volumes: !volumes.is_empty(),
        ..Default::default()
    };

    // Declaration order is kept for the unmounted report
    let mut by_name: HashMap<&str, Mount> = HashMap::with_capacity(volumes.len());
    let mut declared: Vec<&str> = Vec::with_capacity(volumes.len());

    for volume in volumes {
        let mount = describe(volume);
        if mount.source_type == MountSource::Unsupported {
            tracing::warn!("Volume {} has an unsupported source", volume.name);
            resolution.unsupported.push(volume.name.clone());
        }
        if by_name.insert(volume.name.as_str(), mount).is_none() {
            declared.push(volume.name.as_str());
        }
    }

    let mut bound: Vec<&str> = Vec::new();
    for volume_mount in container.volume_mounts.iter().flatten() {
        let name = volume_mount.name.as_str();
        let mut mount = match by_name.get(name) {
            Some(mount) => mount.clone(),
            None => {
                tracing::warn!("Mount {} refers to an undeclared volume", name);
                resolution.undeclared.push(name.to_string());
                Mount {
                    name: name.to_string(),
                    source_type: MountSource::Unsupported,
                    ..Default::default()
                }
            }
        };
        mount.mount_path = volume_mount.mount_path.clone();
        resolution.mounts.push(mount);
        bound.push(name);
    }

    resolution.unmounted = declared
        .into_iter()
        .filter(|name| !bound.contains(name))
        .map(str::to_string)
        .collect();

    if !resolution.unmounted.is_empty() {
        tracing::debug!(
            "Volumes without a mount point: {}",
            resolution.unmounted.join(", ")
        );
    }

    resolution
}

/// Build the partial mount description of a volume (no mount path yet)
fn describe(volume: &Volume) -> Mount {
    let mut mount = Mount {
        name: volume.name.clone(),
        ..Default::default()
    };

    if let Some(config_map) = volume.config_map.as_ref().filter(|c| !c.name.is_empty()) {
        mount.source_type = MountSource::ConfigMap;
        mount.name = config_map.name.clone();
        mount.volume = Some(volume.name.clone());
        mount.keys = config_map
            .items
            .iter()
            .flatten()
            .map(|item| item.key.clone())
            .collect();
        mount.default_mode = config_map.default_mode.map(octal_mode);
    } else if let Some((secret, secret_name)) = volume
        .secret
        .as_ref()
        .and_then(|s| s.secret_name.as_deref().filter(|n| !n.is_empty()).map(|n| (s, n)))
    {
        mount.source_type = MountSource::Secret;
        mount.name = secret_name.to_string();
        mount.volume = Some(volume.name.clone());
        mount.keys = secret
            .items
            .iter()
            .flatten()
            .map(|item| item.key.clone())
            .collect();
        mount.default_mode = secret.default_mode.map(octal_mode);
    } else if let Some(claim) = volume
        .persistent_volume_claim
        .as_ref()
        .filter(|c| !c.claim_name.is_empty())
    {
        mount.source_type = MountSource::Claim;
        mount.name = claim.claim_name.clone();
        mount.volume = Some(volume.name.clone());
    }

    mount
}

fn octal_mode(mode: i32) -> String {
    format!("{:04o}", mode)
}
