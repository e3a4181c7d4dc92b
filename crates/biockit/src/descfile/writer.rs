//! Writer for the DCF manifest format.
//!
//! Field order is fixed and entries are written one per continuation line
//! in sorted order, so rewrites produce stable, reviewable diffs.

use crate::types::{Manifest, Source};
use std::fmt::Write;

/// Render a manifest to DCF text.
pub fn to_string(manifest: &Manifest) -> String {
    let mut out = String::new();

    writeln!(out, "Package: {}", manifest.name).unwrap();
    writeln!(out, "Version: {}", manifest.version).unwrap();

    // Every entry is named in Imports; remote-sourced entries additionally
    // carry their locator in Remotes.
    if !manifest.entries.is_empty() {
        writeln!(out, "Imports:").unwrap();
        let total = manifest.entries.len();
        for (i, entry) in manifest.entries.values().enumerate() {
            let sep = if i + 1 < total { "," } else { "" };
            match &entry.constraint {
                Some(c) => writeln!(out, "    {} ({c}){sep}", entry.name).unwrap(),
                None => writeln!(out, "    {}{sep}", entry.name).unwrap(),
            }
        }
    }

    let locators: Vec<String> = manifest
        .entries
        .values()
        .filter_map(|e| match &e.source {
            Source::Remote(r) if r.package_name() == e.name => Some(r.locator()),
            // Pin the name when the locator alone would not re-derive it,
            // so a write/read round-trip keeps the name set intact.
            Source::Remote(r) => Some(format!("{}={}", e.name, r.locator())),
            Source::Registry => None,
        })
        .collect();

    if !locators.is_empty() {
        writeln!(out, "Remotes:").unwrap();
        let total = locators.len();
        for (i, locator) in locators.iter().enumerate() {
            let sep = if i + 1 < total { "," } else { "" };
            writeln!(out, "    {locator}{sep}").unwrap();
        }
    }

    out
}
