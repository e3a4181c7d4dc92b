//! Registry availability queries.
//!
//! Declared registry packages are checked against two registry classes: a
//! CRAN-style archive and a Bioconductor-style release tree. Classification
//! is substring-heuristic by nature (the registries publish status as HTML
//! prose, not an API) and deliberately approximate; the one hard rule is
//! that transport failures degrade the affected package to `Unknown`
//! instead of aborting the check pass.

use crate::types::{Availability, CheckReport, CheckRow, Manifest, Source};

/// A "does this package exist, and in what state" oracle.
///
/// Injectable so the check pass can be tested without network access.
pub trait RegistryClient {
    /// Classify one package against the registries for a Bioconductor release.
    fn query(&self, name: &str, bioc_version: &str) -> (Availability, String);
}

/// Run an availability pass over a manifest's registry entries.
///
/// Remote-sourced entries are not registry-resident and are skipped.
pub fn check_manifest(client: &dyn RegistryClient, manifest: &Manifest) -> CheckReport {
    let mut report = CheckReport::default();
    for entry in manifest.entries.values() {
        if let Source::Remote(_) = entry.source {
            continue;
        }
        let (availability, reason) = client.query(&entry.name, &manifest.version);
        report.rows.push(CheckRow {
            name: entry.name.clone(),
            availability,
            reason,
        });
    }
    report
}

/// Drop a report's auto-removable entries from a manifest.
///
/// Only `Deprecated` rows qualify; archive-only, build-failure, and
/// unknown packages stay declared and are left for manual action. The
/// input manifest is untouched, so a dry run is simply not persisting
/// the returned one.
pub fn apply_check(manifest: &Manifest, report: &CheckReport) -> (Manifest, Vec<String>) {
    let mut next = manifest.clone();
    let mut removed = Vec::new();
    for name in report.removable() {
        if next.entries.remove(name).is_some() {
            removed.push(name.to_string());
        }
    }
    (next, removed)
}

/// HTTP registry client over a CRAN base and a Bioconductor base.
pub struct HttpRegistry {
    agent: ureq::Agent,
    cran_base: String,
    bioc_base: String,
}

impl HttpRegistry {
    /// Client against the public registries.
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            cran_base: "https://cran.r-project.org".to_string(),
            bioc_base: "https://bioconductor.org".to_string(),
        }
    }

    /// Client against custom base URLs (for testing).
    #[must_use]
    pub fn with_bases(cran_base: impl Into<String>, bioc_base: impl Into<String>) -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            cran_base: cran_base.into(),
            bioc_base: bioc_base.into(),
        }
    }

    /// CRAN package page URL.
    fn cran_url(&self, name: &str) -> String {
        format!("{}/web/packages/{name}/index.html", self.cran_base)
    }

    /// Bioconductor package landing page URL for a release.
    fn bioc_url(&self, name: &str, bioc_version: &str) -> String {
        format!(
            "{}/packages/{bioc_version}/bioc/html/{name}.html",
            self.bioc_base
        )
    }

    /// Fetch a page, mapping 404 to `None` and transport failure to `Err`.
    fn fetch(&self, url: &str) -> Result<Option<String>, String> {
        match self.agent.get(url).header("User-Agent", "biocbox").call() {
            Ok(mut resp) => resp
                .body_mut()
                .read_to_string()
                .map(Some)
                .map_err(|e| e.to_string()),
            Err(ureq::Error::StatusCode(404)) => Ok(None),
            Err(e) => Err(e.to_string()),
        }
    }
}

impl Default for HttpRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryClient for HttpRegistry {
    fn query(&self, name: &str, bioc_version: &str) -> (Availability, String) {
        // CRAN first, then the curated Bioconductor tree.
        match self.fetch(&self.cran_url(name)) {
            Ok(Some(body)) => return (classify_cran(&body), "CRAN".to_string()),
            Ok(None) => {}
            Err(e) => {
                return (Availability::Unknown, format!("registry unreachable: {e}"));
            }
        }

        match self.fetch(&self.bioc_url(name, bioc_version)) {
            Ok(Some(body)) => (
                classify_bioc(&body),
                format!("Bioconductor {bioc_version}"),
            ),
            Ok(None) => (
                Availability::Unknown,
                "not found on CRAN or Bioconductor".to_string(),
            ),
            Err(e) => (Availability::Unknown, format!("registry unreachable: {e}")),
        }
    }
}

/// Heuristic classification of a CRAN package page.
fn classify_cran(body: &str) -> Availability {
    let lower = body.to_lowercase();
    if lower.contains("was removed from the cran repository")
        || lower.contains("archived on")
    {
        Availability::ArchiveOnly
    } else {
        Availability::Available
    }
}

/// Heuristic classification of a Bioconductor landing page.
fn classify_bioc(body: &str) -> Availability {
    let lower = body.to_lowercase();
    if lower.contains("this package is deprecated") || lower.contains("package has been deprecated")
    {
        Availability::Deprecated
    } else if lower.contains("build results: error") || lower.contains("build error") {
        Availability::BuildFailure
    } else {
        Availability::Available
    }
}
