//! # biockit
//!
//! Pure Rust library for managing containerized Bioconductor package
//! environments on HPC clusters.
//!
//! This crate provides functionality for:
//! - Resolving which cluster the tool is running on via filesystem probes
//! - Parsing and rewriting DESCRIPTION-style package manifests
//! - Scanning installed R libraries and reconciling them with a manifest
//! - Checking declared packages against CRAN and Bioconductor
//! - Planning and rendering phased Slurm installation jobs
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! // Resolve the cluster and load the manifest
//! let cluster = biockit::cluster::detect().expect("unknown cluster");
//! let manifest = biockit::descfile::read(Path::new("DESCRIPTION")).expect("parse failed");
//!
//! // Reconcile against what is actually installed
//! let lib_dir = cluster.lib_path(&manifest.version);
//! let observed = biockit::library::scan(&lib_dir).expect("scan failed");
//! let outcome = biockit::reconcile::sync(&manifest, &observed, true);
//! for name in &outcome.added {
//!     println!("new: {name}");
//! }
//!
//! // Plan phased installation jobs for whatever is missing
//! let plan = biockit::reconcile::plan(&outcome.manifest, 4);
//! println!("{} packages across {} leaf chunks", plan.package_count(), plan.chunks.len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cluster;
pub mod descfile;
pub mod error;
pub mod library;
pub mod reconcile;
pub mod registry;
pub mod remote;
pub mod slurm;
pub mod snapshot;
pub mod types;

pub use cluster::ClusterProfile;
pub use error::{Error, ErrorCategory, Result};
pub use reconcile::{PhasePlan, SyncOutcome};
pub use remote::RemoteRef;
pub use types::{
    Availability, CheckReport, CheckRow, InstalledPackage, Manifest, Origin, PackageEntry, Source,
};
