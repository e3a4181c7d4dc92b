//! Parser for the DCF manifest format.
//!
//! Handles the DESCRIPTION-file conventions the environment manifests use:
//!
//! ```text
//! Package: scrnaseq-env
//! Version: 3.19.2
//! Imports:
//!     BiocManager,
//!     Matrix (>= 1.6),  # pinned for irlba
//!     scran
//! Remotes:
//!     satijalab/seurat-data@v1.0
//! ```
//!
//! Continuation lines (leading whitespace) belong to the preceding field.
//! `#` comments run to end of line and are stripped before entries are
//! split on commas; entries that are empty after stripping are discarded.

use crate::error::{Error, Result};
use crate::remote::RemoteRef;
use crate::types::{Manifest, PackageEntry, Source};

/// A raw field collected from the DCF text.
struct RawField {
    name: String,
    /// 1-indexed line where the field starts, for error messages
    line: usize,
    value: String,
}

/// Parse a manifest from DCF text.
pub fn parse_str(content: &str) -> Result<Manifest> {
    let fields = collect_fields(content)?;

    let mut manifest = Manifest {
        name: "bioc-env".to_string(),
        ..Manifest::default()
    };

    let mut imports: Option<&RawField> = None;
    let mut remotes: Option<&RawField> = None;
    let mut version_seen = false;

    for field in &fields {
        match field.name.as_str() {
            "Package" => manifest.name = field.value.trim().to_string(),
            "Version" => {
                let v = field.value.trim();
                if v.is_empty() {
                    return Err(Error::Parse {
                        field: "Version".to_string(),
                        line: field.line,
                        message: "empty value".to_string(),
                    });
                }
                manifest.version = v.to_string();
                version_seen = true;
            }
            "Imports" => imports = Some(field),
            "Remotes" => remotes = Some(field),
            // Unknown fields are tolerated and dropped on rewrite.
            _ => log::debug!("ignoring manifest field '{}'", field.name),
        }
    }

    if !version_seen {
        return Err(Error::Parse {
            field: "Version".to_string(),
            line: 0,
            message: "missing required field".to_string(),
        });
    }

    if let Some(field) = imports {
        for entry_text in split_entries(&field.value) {
            let entry = parse_import(&entry_text, field.line)?;
            manifest.insert(entry);
        }
    }

    // Remotes attach a locator to the matching Imports entry (carrying its
    // constraint over), or declare a new entry outright. Locator wins for
    // installation purposes either way. A `name=locator` entry pins the
    // package name explicitly for remotes whose name cannot be derived
    // from the locator alone.
    if let Some(field) = remotes {
        for entry_text in split_entries(&field.value) {
            let (pinned_name, locator_text) = split_named_remote(&entry_text);
            let remote = RemoteRef::parse(locator_text).map_err(|e| Error::Parse {
                field: "Remotes".to_string(),
                line: field.line,
                message: e.to_string(),
            })?;
            let name = pinned_name.map_or_else(|| remote.package_name(), ToString::to_string);
            let constraint = manifest.entries.get(&name).and_then(|e| e.constraint.clone());
            let mut entry = PackageEntry::remote(name, remote);
            entry.constraint = constraint;
            manifest.insert(entry);
        }
    }

    Ok(manifest)
}

/// Gather `Field: value` records, folding continuation lines.
fn collect_fields(content: &str) -> Result<Vec<RawField>> {
    let mut fields: Vec<RawField> = Vec::new();

    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw_line);

        if line.trim().is_empty() {
            continue;
        }

        // Continuation line: starts with whitespace.
        if raw_line.starts_with([' ', '\t']) {
            match fields.last_mut() {
                Some(field) => {
                    field.value.push(' ');
                    field.value.push_str(line.trim());
                }
                None => {
                    return Err(Error::Parse {
                        field: "(none)".to_string(),
                        line: line_no,
                        message: "continuation line before any field".to_string(),
                    });
                }
            }
            continue;
        }

        match line.split_once(':') {
            Some((name, value)) => fields.push(RawField {
                name: name.trim().to_string(),
                line: line_no,
                value: value.trim().to_string(),
            }),
            None => {
                return Err(Error::Parse {
                    field: line.trim().to_string(),
                    line: line_no,
                    message: "expected 'Field: value'".to_string(),
                });
            }
        }
    }

    Ok(fields)
}

/// Split an optional `name=` prefix off a Remotes entry.
///
/// The prefix only counts when the left side is a bare package name; an
/// `=` inside a locator (URL query strings) is left alone.
fn split_named_remote(text: &str) -> (Option<&str>, &str) {
    match text.split_once('=') {
        Some((name, rest)) if !name.trim().is_empty() && !name.contains(['/', ':']) => {
            (Some(name.trim()), rest.trim())
        }
        _ => (None, text),
    }
}

/// Strip a `#` comment to end of line.
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Split a field value on commas, discarding empty entries.
fn split_entries(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Parse one `Imports` entry: `name` or `name (constraint)`.
fn parse_import(text: &str, line: usize) -> Result<PackageEntry> {
    match text.split_once('(') {
        Some((name, rest)) => {
            let constraint = rest.strip_suffix(')').ok_or_else(|| Error::Parse {
                field: "Imports".to_string(),
                line,
                message: format!("unclosed constraint in '{text}'"),
            })?;
            Ok(PackageEntry {
                name: name.trim().to_string(),
                constraint: Some(constraint.trim().to_string()),
                source: Source::Registry,
            })
        }
        None => Ok(PackageEntry::registry(text.trim())),
    }
}
