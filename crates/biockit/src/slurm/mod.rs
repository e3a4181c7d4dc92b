//! Slurm job-description building and plan rendering.
//!
//! The system never talks to the scheduler itself: it renders job scripts,
//! companion package-chunk files, and a submission script that wires the
//! phase dependency chain (`afterok` from leaf chunks to phase 1,
//! `afterany` from the summary job to every leaf chunk). All blocking and
//! parallelism happens inside the submitted jobs.

mod job;
mod render;

pub use job::{DependencyKind, SbatchJob};
pub use render::{RenderedPlan, render};
