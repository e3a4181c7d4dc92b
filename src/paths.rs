//! Path resolution for the CLI.
//!
//! # Environment Variables
//!
//! - `BIOCBOX_MANIFEST` - Override the manifest path (missing file is a
//!   hard error, never silently created)
//! - `BIOCBOX_LIB_DIR` - Override the package library directory (created
//!   if absent)
//!
//! Flag values take priority over environment variables; clap wires both
//! into the same argument. Without either, the manifest defaults to
//! `DESCRIPTION` in the current directory and the library defaults to the
//! cluster profile's library path for the manifest's Bioconductor version.

use anyhow::{Context, Result};
use biockit::ClusterProfile;
use std::path::{Path, PathBuf};

/// Environment variable for the manifest path override
pub const ENV_MANIFEST: &str = "BIOCBOX_MANIFEST";

/// Environment variable for the package library override
pub const ENV_LIB_DIR: &str = "BIOCBOX_LIB_DIR";

/// Default manifest filename in the current directory
const DEFAULT_MANIFEST: &str = "DESCRIPTION";

/// Resolve the manifest path from an optional flag/env override.
pub fn manifest_path(override_path: Option<&Path>) -> PathBuf {
    match override_path {
        Some(path) => {
            let expanded = expand(&path.to_string_lossy());
            log::debug!("manifest path override: {}", expanded.display());
            expanded
        }
        None => PathBuf::from(DEFAULT_MANIFEST),
    }
}

/// Resolve the package library directory.
///
/// An explicit override is created if absent; the cluster default is not
/// (a missing shared library is a real configuration problem and surfaces
/// as a scan error instead).
pub fn lib_dir(
    override_path: Option<&Path>,
    profile: &ClusterProfile,
    version: &str,
) -> Result<PathBuf> {
    match override_path {
        Some(path) => {
            let expanded = expand(&path.to_string_lossy());
            if !expanded.exists() {
                std::fs::create_dir_all(&expanded).with_context(|| {
                    format!("could not create library directory {}", expanded.display())
                })?;
                log::debug!("created library dir: {}", expanded.display());
            }
            Ok(expanded)
        }
        None => Ok(profile.lib_path(version)),
    }
}

/// Snapshot directory: `snapshots/` next to the manifest.
pub fn snapshots_dir(manifest: &Path) -> PathBuf {
    manifest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("snapshots"), |p| p.join("snapshots"))
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_default() {
        assert_eq!(manifest_path(None), PathBuf::from("DESCRIPTION"));
    }

    #[test]
    fn test_manifest_override() {
        let p = manifest_path(Some(Path::new("/etc/bioc/DESCRIPTION")));
        assert_eq!(p, PathBuf::from("/etc/bioc/DESCRIPTION"));
    }

    #[test]
    fn test_lib_dir_override_created() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("library");
        let profile = biockit::cluster::by_name("gemini").unwrap();
        let resolved = lib_dir(Some(&target), &profile, "3.19").unwrap();
        assert_eq!(resolved, target);
        assert!(target.is_dir());
    }

    #[test]
    fn test_lib_dir_cluster_default() {
        let profile = biockit::cluster::by_name("gemini").unwrap();
        let resolved = lib_dir(None, &profile, "3.19").unwrap();
        assert_eq!(resolved, PathBuf::from("/gpfs/apps/bioc/3.19/library"));
    }

    #[test]
    fn test_snapshots_dir_next_to_manifest() {
        assert_eq!(
            snapshots_dir(Path::new("/env/DESCRIPTION")),
            PathBuf::from("/env/snapshots")
        );
        assert_eq!(
            snapshots_dir(Path::new("DESCRIPTION")),
            PathBuf::from("snapshots")
        );
    }

    #[test]
    fn test_expand_with_tilde() {
        let result = expand("~/env/DESCRIPTION");
        let home = dirs::home_dir().unwrap();
        assert_eq!(result, home.join("env").join("DESCRIPTION"));
    }

    #[test]
    fn test_expand_absolute() {
        assert_eq!(expand("/absolute/path"), PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_env_var_constants() {
        assert_eq!(ENV_MANIFEST, "BIOCBOX_MANIFEST");
        assert_eq!(ENV_LIB_DIR, "BIOCBOX_LIB_DIR");
    }
}
