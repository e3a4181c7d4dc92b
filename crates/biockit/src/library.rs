//! Observed-state scanner for an installed package library.
//!
//! Each subdirectory of the library path is one installed package; its
//! `DESCRIPTION` metadata carries the provenance fields the installer wrote
//! (`Repository` for registry installs, `RemoteType`/`RemoteUsername`/... for
//! remote installs). Packages whose metadata is missing or unreadable are
//! skipped with a warning, never fatal - a single broken install must not
//! abort a scan.

use crate::error::{Error, Result};
use crate::remote::RemoteRef;
use crate::types::{InstalledPackage, Origin};
use std::path::Path;

/// Scan a library directory for installed packages, sorted by name.
pub fn scan(lib_dir: &Path) -> Result<Vec<InstalledPackage>> {
    if !lib_dir.is_dir() {
        return Err(Error::LibraryNotFound(lib_dir.to_path_buf()));
    }

    let mut packages = Vec::new();
    for entry in std::fs::read_dir(lib_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let desc = entry.path().join("DESCRIPTION");
        if !desc.is_file() {
            // Not an installed package (lock dirs, caches).
            continue;
        }
        match read_metadata(&desc) {
            Ok(pkg) => packages.push(pkg),
            Err(e) => log::warn!(
                "skipping unreadable package metadata {}: {e}",
                desc.display()
            ),
        }
    }

    packages.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(packages)
}

/// Read one installed package's DESCRIPTION metadata.
fn read_metadata(path: &Path) -> Result<InstalledPackage> {
    let content = std::fs::read_to_string(path)?;

    let field = |name: &str| -> Option<String> {
        content.lines().find_map(|line| {
            line.strip_prefix(name)
                .and_then(|rest| rest.strip_prefix(':'))
                .map(|v| v.trim().to_string())
        })
    };

    let name = field("Package").ok_or_else(|| Error::Other("missing Package field".to_string()))?;
    let version = field("Version").unwrap_or_default();

    let (origin, remote) = classify(&field);

    Ok(InstalledPackage {
        name,
        version,
        origin,
        remote,
    })
}

/// Classify provenance from the installer-written metadata fields.
fn classify(field: &dyn Fn(&str) -> Option<String>) -> (Origin, Option<RemoteRef>) {
    match field("RemoteType").as_deref() {
        Some("github" | "gitlab" | "git") => {
            let owner = field("RemoteUsername");
            let repo = field("RemoteRepo");
            if let (Some(owner), Some(repo)) = (owner, repo) {
                let remote = RemoteRef::Repo {
                    owner,
                    repo,
                    subdir: field("RemoteSubdir"),
                    reference: field("RemoteRef").filter(|r| r != "HEAD"),
                };
                return (Origin::Remote, Some(remote));
            }
            (Origin::Remote, None)
        }
        Some("url") => {
            let remote = field("RemoteUrl").map(RemoteRef::Url);
            (Origin::Remote, remote)
        }
        Some(_) => (Origin::Remote, None),
        None => {
            if field("Repository").is_some() || field("biocViews").is_some() {
                (Origin::Registry, None)
            } else {
                (Origin::Unknown, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn install(lib: &Path, name: &str, desc: &str) {
        let dir = lib.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("DESCRIPTION"), desc).unwrap();
    }

    #[test]
    fn test_scan_missing_library() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::LibraryNotFound(_)));
    }

    #[test]
    fn test_scan_classifies_origins() {
        let dir = tempfile::tempdir().unwrap();
        install(
            dir.path(),
            "Matrix",
            "Package: Matrix\nVersion: 1.6-5\nRepository: CRAN\n",
        );
        install(
            dir.path(),
            "scran",
            "Package: scran\nVersion: 1.32.0\nbiocViews: Normalization\n",
        );
        install(
            dir.path(),
            "SeuratData",
            "Package: SeuratData\nVersion: 0.2.2\nRemoteType: github\n\
             RemoteUsername: satijalab\nRemoteRepo: seurat-data\nRemoteRef: v1.0\n",
        );
        install(dir.path(), "mystery", "Package: mystery\nVersion: 0.1\n");

        let pkgs = scan(dir.path()).unwrap();
        assert_eq!(pkgs.len(), 4);
        // Sorted by name
        assert_eq!(pkgs[0].name, "Matrix");
        assert_eq!(pkgs[0].origin, Origin::Registry);
        assert_eq!(pkgs[1].name, "SeuratData");
        assert_eq!(pkgs[1].origin, Origin::Remote);
        assert_eq!(
            pkgs[1].remote.as_ref().unwrap().locator(),
            "satijalab/seurat-data@v1.0"
        );
        assert_eq!(pkgs[2].origin, Origin::Registry);
        assert_eq!(pkgs[3].origin, Origin::Unknown);
    }

    #[test]
    fn test_scan_skips_non_package_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("00LOCK-scran")).unwrap();
        fs::write(dir.path().join("stray.txt"), "x").unwrap();
        install(
            dir.path(),
            "scran",
            "Package: scran\nVersion: 1.32.0\nbiocViews: x\n",
        );
        let pkgs = scan(dir.path()).unwrap();
        assert_eq!(pkgs.len(), 1);
    }

    #[test]
    fn test_scan_skips_broken_metadata() {
        let dir = tempfile::tempdir().unwrap();
        install(dir.path(), "broken", "Version: 1.0\n"); // no Package field
        install(
            dir.path(),
            "ok",
            "Package: ok\nVersion: 1.0\nRepository: CRAN\n",
        );
        let pkgs = scan(dir.path()).unwrap();
        assert_eq!(pkgs.len(), 1);
        assert_eq!(pkgs[0].name, "ok");
    }

    #[test]
    fn test_url_remote_metadata() {
        let dir = tempfile::tempdir().unwrap();
        install(
            dir.path(),
            "foo",
            "Package: foo\nVersion: 1.2\nRemoteType: url\n\
             RemoteUrl: https://example.org/foo_1.2.tar.gz\n",
        );
        let pkgs = scan(dir.path()).unwrap();
        assert_eq!(pkgs[0].origin, Origin::Remote);
        assert!(matches!(
            pkgs[0].remote,
            Some(RemoteRef::Url(ref u)) if u.ends_with("foo_1.2.tar.gz")
        ));
    }
}
