//! Snapshot files: the audit trail written by `sync --apply`.
//!
//! A snapshot is an immutable, labeled copy of the manifest's package set,
//! tagged with the cluster and Bioconductor release it was captured from.
//! Snapshots feed changelog reporting only; nothing ever reads one back
//! into the live reconciliation path.

use crate::error::Result;
use crate::types::{Manifest, Source};
use chrono::Utc;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Write a snapshot of `manifest` into `dir`, returning the file path.
pub fn write(manifest: &Manifest, cluster: &str, dir: &Path) -> Result<PathBuf> {
    let stamp = Utc::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("{cluster}-bioc{}-{stamp}.txt", manifest.version));
    std::fs::create_dir_all(dir)?;
    std::fs::write(&path, render(manifest, cluster))?;
    Ok(path)
}

/// Render snapshot text: commented header plus the sorted package set.
pub fn render(manifest: &Manifest, cluster: &str) -> String {
    let mut out = String::new();
    writeln!(out, "# Package snapshot").unwrap();
    writeln!(out, "# Cluster: {cluster}").unwrap();
    writeln!(out, "# Bioc Version: {}", manifest.version).unwrap();
    writeln!(out, "# Date: {}", Utc::now().format("%Y-%m-%d %H:%M")).unwrap();
    writeln!(out, "# Packages: {}", manifest.entries.len()).unwrap();
    writeln!(out).unwrap();

    for entry in manifest.entries.values() {
        match &entry.source {
            Source::Remote(r) => writeln!(out, "{}  [{}]", entry.name, r.locator()).unwrap(),
            Source::Registry => writeln!(out, "{}", entry.name).unwrap(),
        }
    }
    out
}
