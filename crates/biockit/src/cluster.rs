//! Cluster detection and per-cluster profiles.
//!
//! Detection is an ordered list of filesystem-existence probes, first match
//! wins. When nothing matches the caller gets a typed
//! [`Error::ClusterNotDetected`] - there is deliberately no default profile,
//! since guessing would risk installing into the wrong shared location.
//!
//! Profile contents (paths, partitions, resource tiers) are configuration
//! data; the detection logic never inspects them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Placeholder substituted with the Bioconductor version in path templates.
const VERSION_SLOT: &str = "{version}";

/// A batch-job resource tier: cpu count, memory ceiling, wall-time limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTier {
    /// CPU cores per job
    pub cpus: u32,
    /// Memory ceiling in scheduler syntax (e.g. "64G")
    pub mem: String,
    /// Wall-time limit in scheduler syntax (e.g. "12:00:00")
    pub walltime: String,
}

impl ResourceTier {
    fn new(cpus: u32, mem: &str, walltime: &str) -> Self {
        Self {
            cpus,
            mem: mem.to_string(),
            walltime: walltime.to_string(),
        }
    }
}

/// Everything cluster-specific the rest of the pipeline needs.
///
/// Constructed once at startup and passed by parameter; nothing downstream
/// reads ambient environment state to decide paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterProfile {
    /// Cluster name (e.g. "gemini")
    pub name: String,
    /// Slurm partition jobs are submitted to
    pub partition: String,
    /// Container image path template (`{version}` slot)
    pub image_template: String,
    /// Package library path template (`{version}` slot)
    pub lib_template: String,
    /// Paths bind-mounted into the container
    pub bind_paths: Vec<String>,
    /// Resource tier for the single phase-1 job
    pub phase1_tier: ResourceTier,
    /// Resource tier for each leaf chunk job
    pub leaf_tier: ResourceTier,
}

impl ClusterProfile {
    /// Container image path for a Bioconductor version.
    pub fn image_path(&self, version: &str) -> PathBuf {
        PathBuf::from(self.image_template.replace(VERSION_SLOT, version))
    }

    /// Package library path for a Bioconductor version.
    pub fn lib_path(&self, version: &str) -> PathBuf {
        PathBuf::from(self.lib_template.replace(VERSION_SLOT, version))
    }
}

/// One detection probe: profile applies when `probe` exists on disk.
struct Probe {
    probe: &'static str,
    profile: fn() -> ClusterProfile,
}

fn gemini() -> ClusterProfile {
    ClusterProfile {
        name: "gemini".to_string(),
        partition: "batch".to_string(),
        image_template: format!("/gpfs/apps/bioc/containers/bioc-{VERSION_SLOT}.sif"),
        lib_template: format!("/gpfs/apps/bioc/{VERSION_SLOT}/library"),
        bind_paths: vec!["/gpfs/data".to_string(), "/gpfs/scratch".to_string()],
        phase1_tier: ResourceTier::new(16, "64G", "12:00:00"),
        leaf_tier: ResourceTier::new(4, "16G", "06:00:00"),
    }
}

fn apollo() -> ClusterProfile {
    ClusterProfile {
        name: "apollo".to_string(),
        partition: "normal".to_string(),
        image_template: format!("/lustre/shared/bioc/containers/bioc-{VERSION_SLOT}.sif"),
        lib_template: format!("/lustre/shared/bioc/{VERSION_SLOT}/library"),
        bind_paths: vec![
            "/lustre/projects".to_string(),
            "/lustre/scratch".to_string(),
        ],
        phase1_tier: ResourceTier::new(24, "96G", "12:00:00"),
        leaf_tier: ResourceTier::new(8, "24G", "08:00:00"),
    }
}

/// Ordered probe table. Order matters: first existing path wins.
const PROBES: &[Probe] = &[
    Probe {
        probe: "/gpfs/apps/bioc",
        profile: gemini,
    },
    Probe {
        probe: "/lustre/shared/bioc",
        profile: apollo,
    },
];

/// Names of all known profiles, for error messages and `--cluster` help.
pub fn known_clusters() -> Vec<&'static str> {
    vec!["gemini", "apollo"]
}

/// Look up a profile by name (the `--cluster` override path).
pub fn by_name(name: &str) -> Result<ClusterProfile> {
    match name {
        "gemini" => Ok(gemini()),
        "apollo" => Ok(apollo()),
        other => Err(Error::UnknownCluster {
            name: other.to_string(),
            known: known_clusters().join(", "),
        }),
    }
}

/// Detect the current cluster from the local filesystem.
pub fn detect() -> Result<ClusterProfile> {
    detect_at(Path::new("/"))
}

/// Detect against an alternate filesystem root (tests fabricate clusters
/// under a tempdir).
pub fn detect_at(root: &Path) -> Result<ClusterProfile> {
    for probe in PROBES {
        let candidate = root.join(probe.probe.trim_start_matches('/'));
        if candidate.exists() {
            let profile = (probe.profile)();
            log::debug!("cluster probe hit: {} -> {}", candidate.display(), profile.name);
            return Ok(profile);
        }
        log::debug!("cluster probe miss: {}", candidate.display());
    }
    Err(Error::ClusterNotDetected)
}

/// Resolve the active profile: explicit override first, then detection.
pub fn resolve(override_name: Option<&str>) -> Result<ClusterProfile> {
    match override_name {
        Some(name) => by_name(name),
        None => detect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name_known() {
        assert_eq!(by_name("gemini").unwrap().partition, "batch");
        assert_eq!(by_name("apollo").unwrap().partition, "normal");
    }

    #[test]
    fn test_by_name_unknown_is_fatal() {
        let err = by_name("titan").unwrap_err();
        assert!(matches!(err, Error::UnknownCluster { .. }));
        assert!(err.to_string().contains("apollo"));
    }

    #[test]
    fn test_detect_no_probe_match() {
        let dir = tempfile::tempdir().unwrap();
        let err = detect_at(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ClusterNotDetected));
    }

    #[test]
    fn test_detect_first_match_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("gpfs/apps/bioc")).unwrap();
        std::fs::create_dir_all(dir.path().join("lustre/shared/bioc")).unwrap();
        // Both probes exist; the gemini probe is listed first.
        assert_eq!(detect_at(dir.path()).unwrap().name, "gemini");
    }

    #[test]
    fn test_detect_apollo() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("lustre/shared/bioc")).unwrap();
        assert_eq!(detect_at(dir.path()).unwrap().name, "apollo");
    }

    #[test]
    fn test_path_templates() {
        let p = by_name("gemini").unwrap();
        assert_eq!(
            p.image_path("3.19"),
            PathBuf::from("/gpfs/apps/bioc/containers/bioc-3.19.sif")
        );
        assert_eq!(
            p.lib_path("3.19"),
            PathBuf::from("/gpfs/apps/bioc/3.19/library")
        );
    }
}
