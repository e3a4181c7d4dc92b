//! Core types for manifest reconciliation.

use crate::remote::RemoteRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Where a package is installed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// A package registry (CRAN or Bioconductor)
    Registry,
    /// An external reference (GitHub-style repo or direct URL)
    Remote(RemoteRef),
}

impl Source {
    /// Whether this source is an external reference.
    pub fn is_remote(&self) -> bool {
        matches!(self, Source::Remote(_))
    }
}

/// A declared dependency in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEntry {
    /// Package name (unique within a manifest)
    pub name: String,
    /// Version constraint, preserved verbatim (e.g. ">= 1.6"), informational only
    pub constraint: Option<String>,
    /// Installation source
    pub source: Source,
}

impl PackageEntry {
    /// Create a registry entry.
    pub fn registry(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
            source: Source::Registry,
        }
    }

    /// Create a remote entry.
    pub fn remote(name: impl Into<String>, remote: RemoteRef) -> Self {
        Self {
            name: name.into(),
            constraint: None,
            source: Source::Remote(remote),
        }
    }

    /// Set the version constraint.
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }

    /// Whether this entry is a `url::` form remote.
    ///
    /// These represent packages that cannot be observed by a live library
    /// scan (archived sources) and are preserved by sync unconditionally.
    pub fn is_url_remote(&self) -> bool {
        matches!(self.source, Source::Remote(RemoteRef::Url(_)))
    }
}

/// A declarative package manifest.
///
/// Entries are keyed by name; `BTreeMap` keeps iteration (and therefore
/// every write-back and plan) in deterministic sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Path the manifest was read from, if any
    pub path: Option<PathBuf>,
    /// Environment name (DCF `Package` field)
    pub name: String,
    /// Targeted Bioconductor release (DCF `Version` field)
    pub version: String,
    /// Declared packages, keyed by name
    pub entries: BTreeMap<String, PackageEntry>,
}

impl Manifest {
    /// Create an empty manifest for a given environment name and version.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            path: None,
            name: name.into(),
            version: version.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Insert an entry, replacing any previous entry with the same name.
    pub fn insert(&mut self, entry: PackageEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    /// Whether a package name is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Sorted package names.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Entries with a remote source, in sorted order.
    pub fn remotes(&self) -> Vec<&PackageEntry> {
        self.entries.values().filter(|e| e.source.is_remote()).collect()
    }
}

/// Provenance of an observed installed package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Installed from a registry
    Registry,
    /// Installed from an external reference
    Remote,
    /// Provenance metadata absent (treated as registry for inclusion)
    Unknown,
}

/// A package observed in a live library scan. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    /// Package name
    pub name: String,
    /// Installed version
    pub version: String,
    /// Provenance classification
    pub origin: Origin,
    /// Remote locator recovered from provenance metadata, if any
    pub remote: Option<RemoteRef>,
}

impl InstalledPackage {
    /// Create an observed registry package.
    pub fn registry(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            origin: Origin::Registry,
            remote: None,
        }
    }

    /// Create an observed remote package.
    pub fn remote(
        name: impl Into<String>,
        version: impl Into<String>,
        remote: RemoteRef,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            origin: Origin::Remote,
            remote: Some(remote),
        }
    }
}

/// Registry availability classification for a declared package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// Present and installable
    Available,
    /// Formally deprecated upstream; eligible for automatic removal
    Deprecated,
    /// Only an archived source remains; requires manual action
    ArchiveOnly,
    /// Present but failing upstream build checks; requires manual action
    BuildFailure,
    /// Could not be classified (including network failure)
    Unknown,
}

impl Availability {
    /// Only deprecated packages may be removed automatically.
    pub fn auto_removable(&self) -> bool {
        matches!(self, Self::Deprecated)
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Available => "available",
            Self::Deprecated => "deprecated",
            Self::ArchiveOnly => "archive-only",
            Self::BuildFailure => "build-failure",
            Self::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// One row of an availability check report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRow {
    /// Package name
    pub name: String,
    /// Classification
    pub availability: Availability,
    /// Human-readable reason
    pub reason: String,
}

/// Result of an availability check pass over a manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckReport {
    /// Per-package rows, in manifest order
    pub rows: Vec<CheckRow>,
}

impl CheckReport {
    /// Names that may be removed automatically (deprecated only).
    pub fn removable(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|r| r.availability.auto_removable())
            .map(|r| r.name.as_str())
            .collect()
    }

    /// Rows that need manual attention (unavailable but not auto-removable).
    pub fn needs_attention(&self) -> Vec<&CheckRow> {
        self.rows
            .iter()
            .filter(|r| {
                !matches!(r.availability, Availability::Available) && !r.availability.auto_removable()
            })
            .collect()
    }

    /// Count of rows not classified `Available`.
    pub fn unavailable_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| !matches!(r.availability, Availability::Available))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_constructors() {
        let reg = PackageEntry::registry("scran").with_constraint(">= 1.2");
        assert_eq!(reg.name, "scran");
        assert_eq!(reg.constraint.as_deref(), Some(">= 1.2"));
        assert!(!reg.source.is_remote());

        let rem = PackageEntry::remote(
            "SeuratData",
            RemoteRef::parse("satijalab/seurat-data@v1.0").unwrap(),
        );
        assert!(rem.source.is_remote());
        assert!(!rem.is_url_remote());

        let url = PackageEntry::remote(
            "foo",
            RemoteRef::parse("url::https://example.org/foo_1.2.tar.gz").unwrap(),
        );
        assert!(url.is_url_remote());
    }

    #[test]
    fn test_manifest_insert_replaces() {
        let mut m = Manifest::new("env", "3.19");
        m.insert(PackageEntry::registry("Matrix"));
        m.insert(PackageEntry::registry("Matrix").with_constraint(">= 1.6"));
        assert_eq!(m.entries.len(), 1);
        assert_eq!(
            m.entries["Matrix"].constraint.as_deref(),
            Some(">= 1.6")
        );
    }

    #[test]
    fn test_manifest_names_sorted() {
        let mut m = Manifest::new("env", "3.19");
        m.insert(PackageEntry::registry("zlibbioc"));
        m.insert(PackageEntry::registry("BiocManager"));
        m.insert(PackageEntry::registry("Matrix"));
        assert_eq!(m.names(), vec!["BiocManager", "Matrix", "zlibbioc"]);
    }

    #[test]
    fn test_availability_auto_removable() {
        assert!(Availability::Deprecated.auto_removable());
        assert!(!Availability::ArchiveOnly.auto_removable());
        assert!(!Availability::BuildFailure.auto_removable());
        assert!(!Availability::Unknown.auto_removable());
    }

    #[test]
    fn test_check_report_partitions() {
        let report = CheckReport {
            rows: vec![
                CheckRow {
                    name: "a".into(),
                    availability: Availability::Available,
                    reason: "on CRAN".into(),
                },
                CheckRow {
                    name: "b".into(),
                    availability: Availability::Deprecated,
                    reason: "deprecated".into(),
                },
                CheckRow {
                    name: "c".into(),
                    availability: Availability::ArchiveOnly,
                    reason: "archived".into(),
                },
            ],
        };
        assert_eq!(report.removable(), vec!["b"]);
        assert_eq!(report.needs_attention().len(), 1);
        assert_eq!(report.unavailable_count(), 2);
    }
}
