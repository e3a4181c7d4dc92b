//! Manifest reconciliation: sync and install-phase planning.
//!
//! Both operations are pure functions of the current manifest and an
//! observed installed-package set. Sync merges observation into declaration
//! (union-only by default, so repeated syncs from different clusters
//! accumulate a superset); planning partitions declared packages into a
//! core phase and parallel leaf chunks so that shared native dependencies
//! compile exactly once before leaf jobs fan out.

use crate::types::{InstalledPackage, Manifest, PackageEntry, Source};
use std::collections::BTreeSet;

/// Packages treated as phase-1 core regardless of source.
///
/// Allow-list classification: compiled workhorses with many reverse
/// dependents, which must be present (and their shared libraries built)
/// before leaf chunks run in parallel. Configuration data.
pub const CORE_PACKAGES: &[&str] = &[
    "BH",
    "BiocManager",
    "Matrix",
    "Rcpp",
    "RcppArmadillo",
    "RcppEigen",
    "cpp11",
    "igraph",
    "remotes",
    "reticulate",
];

/// Result of a sync operation. `manifest` is the proposed new state; the
/// caller decides whether to persist it (`--apply`).
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// The reconciled manifest
    pub manifest: Manifest,
    /// Names newly added from the observed set
    pub added: BTreeSet<String>,
    /// Names dropped (replace mode only; always empty in merge mode)
    pub removed: BTreeSet<String>,
}

/// Reconcile an observed installed-package set into a manifest.
///
/// Merge mode unions observation into the declaration and never removes.
/// Replace mode makes the manifest exactly the observed set - except
/// `url::` remotes, which cannot be observed by a live scan and are
/// preserved unconditionally in both modes.
pub fn sync(manifest: &Manifest, observed: &[InstalledPackage], merge: bool) -> SyncOutcome {
    let mut next = Manifest::new(manifest.name.clone(), manifest.version.clone());
    next.path = manifest.path.clone();

    if merge {
        next.entries = manifest.entries.clone();
    } else {
        for entry in manifest.entries.values() {
            if entry.is_url_remote() {
                next.insert(entry.clone());
            }
        }
    }

    let mut added = BTreeSet::new();
    for pkg in observed {
        if !manifest.contains(&pkg.name) {
            added.insert(pkg.name.clone());
        }
        next.insert(observed_entry(manifest, pkg));
    }

    let mut removed = BTreeSet::new();
    if !merge {
        for name in manifest.entries.keys() {
            if !next.contains(name) {
                removed.insert(name.clone());
            }
        }
    }

    SyncOutcome {
        manifest: next,
        added,
        removed,
    }
}

/// Build the manifest entry for one observed package.
///
/// A declared constraint survives re-sync; a freshly observed remote
/// locator replaces whatever locator was declared before (observed wins
/// for updates), while an observed package with no provenance keeps the
/// declared source rather than downgrading a remote entry to registry.
fn observed_entry(manifest: &Manifest, pkg: &InstalledPackage) -> PackageEntry {
    let declared = manifest.entries.get(&pkg.name);

    let source = match &pkg.remote {
        Some(remote) => Source::Remote(remote.clone()),
        None => declared.map_or(Source::Registry, |e| e.source.clone()),
    };

    PackageEntry {
        name: pkg.name.clone(),
        constraint: declared.and_then(|e| e.constraint.clone()),
        source,
    }
}

/// Whether an entry belongs in phase 1: core allow-list membership or any
/// remote source (remotes must resolve before packages that depend on them).
pub fn is_phase1(entry: &PackageEntry) -> bool {
    entry.source.is_remote() || CORE_PACKAGES.contains(&entry.name.as_str())
}

/// A phase-partitioned install plan over package names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhasePlan {
    /// Phase 1: core/shared dependencies, one high-resource job
    pub phase1: Vec<String>,
    /// Leaf chunks, each a parallel moderate-resource job
    pub chunks: Vec<Vec<String>>,
}

impl PhasePlan {
    /// Total number of packages across all phases.
    pub fn package_count(&self) -> usize {
        self.phase1.len() + self.chunks.iter().map(Vec::len).sum::<usize>()
    }

    /// Whether there is nothing to install.
    pub fn is_empty(&self) -> bool {
        self.phase1.is_empty() && self.chunks.is_empty()
    }
}

/// Partition names into phase 1 and `jobs` leaf chunks.
///
/// The leaf set is sorted and split into contiguous chunks of
/// `ceil(|leaf| / jobs)`; the last chunk may be shorter and empty chunks
/// are dropped. Deterministic for fixed inputs, and the chunks partition
/// the leaf set exactly - chunk jobs install disjoint subsets of a shared
/// library, so overlap or omission would be a correctness bug, not a
/// balancing one.
pub fn partition<F>(names: &[String], phase1_predicate: F, jobs: usize) -> PhasePlan
where
    F: Fn(&str) -> bool,
{
    let jobs = jobs.max(1);

    let mut phase1 = Vec::new();
    let mut leaf = Vec::new();
    for name in names {
        if phase1_predicate(name) {
            phase1.push(name.clone());
        } else {
            leaf.push(name.clone());
        }
    }
    phase1.sort();
    leaf.sort();

    let chunk_size = leaf.len().div_ceil(jobs).max(1);
    let chunks = leaf
        .chunks(chunk_size)
        .map(<[String]>::to_vec)
        .collect::<Vec<_>>();

    PhasePlan { phase1, chunks }
}

/// Build the plan for a manifest, using the built-in phase-1 rule.
pub fn plan(manifest: &Manifest, jobs: usize) -> PhasePlan {
    let names = manifest.names();
    partition(
        &names,
        |name| manifest.entries.get(name).is_some_and(is_phase1),
        jobs,
    )
}

/// Split declared names into (satisfied, missing) against an observed set.
pub fn installed_split(
    manifest: &Manifest,
    observed: &[InstalledPackage],
) -> (Vec<String>, Vec<String>) {
    let installed: BTreeSet<&str> = observed.iter().map(|p| p.name.as_str()).collect();
    let mut satisfied = Vec::new();
    let mut missing = Vec::new();
    for name in manifest.entries.keys() {
        if installed.contains(name.as_str()) {
            satisfied.push(name.clone());
        } else {
            missing.push(name.clone());
        }
    }
    (satisfied, missing)
}
