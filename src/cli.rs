use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "biocbox")]
#[command(version)]
#[command(about = "Keep a containerized Bioconductor HPC environment in sync", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile the manifest with the installed package library
    Sync(SyncArgs),

    /// Check declared packages against CRAN and Bioconductor
    Check(CheckArgs),

    /// Plan phased Slurm install jobs for missing packages
    Plan(PlanArgs),

    /// Change the targeted Bioconductor release in the manifest
    Bump(BumpArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct SyncArgs {
    /// Write the reconciled manifest (and a snapshot) instead of previewing
    #[arg(long)]
    pub apply: bool,

    /// Make the manifest exactly the observed set instead of merging
    #[arg(long)]
    pub replace: bool,

    /// Cluster profile to use instead of filesystem detection
    #[arg(long)]
    pub cluster: Option<String>,

    /// Manifest path (default: DESCRIPTION in the current directory)
    #[arg(long, env = "BIOCBOX_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Package library to scan (default: the cluster's library for the
    /// manifest's Bioconductor version)
    #[arg(long, env = "BIOCBOX_LIB_DIR")]
    pub lib: Option<PathBuf>,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Remove deprecated packages and rewrite the manifest
    #[arg(long)]
    pub apply: bool,

    /// Manifest path (default: DESCRIPTION in the current directory)
    #[arg(long, env = "BIOCBOX_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct PlanArgs {
    /// Number of parallel leaf chunk jobs
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,

    /// Plan every declared package, not just missing ones
    #[arg(long)]
    pub all: bool,

    /// Cluster profile to use instead of filesystem detection
    #[arg(long)]
    pub cluster: Option<String>,

    /// Manifest path (default: DESCRIPTION in the current directory)
    #[arg(long, env = "BIOCBOX_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Package library to diff against
    #[arg(long, env = "BIOCBOX_LIB_DIR")]
    pub lib: Option<PathBuf>,

    /// Directory to render job scripts into
    #[arg(short, long, default_value = "jobs")]
    pub output: PathBuf,
}

#[derive(Parser)]
pub struct BumpArgs {
    /// Target Bioconductor release (e.g. 3.20)
    #[arg(long)]
    pub to: String,

    /// Rewrite the manifest instead of previewing
    #[arg(long)]
    pub apply: bool,

    /// Manifest path (default: DESCRIPTION in the current directory)
    #[arg(long, env = "BIOCBOX_MANIFEST")]
    pub manifest: Option<PathBuf>,
}
