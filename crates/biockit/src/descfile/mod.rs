//! Manifest store: DESCRIPTION-style DCF files.
//!
//! The manifest is a Debian-control-format record with a `Version` field
//! (the targeted Bioconductor release), an `Imports` field (comma-separated
//! package identities with optional parenthesized constraints), and an
//! optional `Remotes` field (external-reference locators). Reads happen at
//! the start of every operation; writes are whole-file rewrites in fixed
//! field order with entries sorted for deterministic diffs.

mod parser;
mod writer;

pub use parser::parse_str;
pub use writer::to_string;

use crate::error::{Error, Result};
use crate::types::Manifest;
use std::path::Path;

/// Read a manifest from a path.
pub fn read(path: &Path) -> Result<Manifest> {
    if !path.exists() {
        return Err(Error::ManifestNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let mut manifest = parse_str(&content)?;
    manifest.path = Some(path.to_path_buf());
    Ok(manifest)
}

/// Write a manifest to a path (whole-file rewrite).
pub fn write(manifest: &Manifest, path: &Path) -> Result<()> {
    std::fs::write(path, to_string(manifest))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PackageEntry;

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read(&dir.path().join("DESCRIPTION")).unwrap_err();
        assert!(matches!(err, Error::ManifestNotFound(_)));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DESCRIPTION");

        let mut manifest = Manifest::new("scrnaseq-env", "3.19.2");
        manifest.insert(PackageEntry::registry("scran"));
        manifest.insert(PackageEntry::registry("Matrix").with_constraint(">= 1.6"));
        write(&manifest, &path).unwrap();

        let back = read(&path).unwrap();
        assert_eq!(back.version, "3.19.2");
        assert_eq!(back.names(), vec!["Matrix", "scran"]);
        assert_eq!(back.entries["Matrix"].constraint.as_deref(), Some(">= 1.6"));
        assert_eq!(back.path.as_deref(), Some(path.as_path()));
    }
}
