//! Typed sbatch job descriptions.
//!
//! Planning code fills named fields; a single serializer turns them into
//! `#SBATCH` script text, so scheduler-format knowledge lives in one place
//! instead of being string-interpolated at every call site.

use crate::cluster::ResourceTier;
use std::fmt::Write as _;

/// How a job waits on a prior job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// Start only after the dependency succeeds (`afterok`)
    AfterSuccess,
    /// Start after the dependency terminates with any outcome (`afterany`)
    AfterAny,
}

impl DependencyKind {
    /// The Slurm `--dependency` type keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::AfterSuccess => "afterok",
            Self::AfterAny => "afterany",
        }
    }
}

/// One batch job description.
#[derive(Debug, Clone)]
pub struct SbatchJob {
    /// Job name
    pub name: String,
    /// Partition to submit to
    pub partition: String,
    /// Resource tier (cpus, memory, walltime)
    pub tier: ResourceTier,
    /// Stdout/stderr log path
    pub output: String,
    /// Script body below the `#SBATCH` header
    pub body: String,
}

impl SbatchJob {
    /// Create a job with an empty body.
    pub fn new(name: impl Into<String>, partition: impl Into<String>, tier: ResourceTier) -> Self {
        let name = name.into();
        let output = format!("{name}.log");
        Self {
            name,
            partition: partition.into(),
            tier,
            output,
            body: String::new(),
        }
    }

    /// Set the log path.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Set the script body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialize to sbatch script text.
    pub fn to_script(&self) -> String {
        let mut out = String::new();
        writeln!(out, "#!/usr/bin/env bash").unwrap();
        writeln!(out, "#SBATCH --job-name={}", self.name).unwrap();
        writeln!(out, "#SBATCH --partition={}", self.partition).unwrap();
        writeln!(out, "#SBATCH --cpus-per-task={}", self.tier.cpus).unwrap();
        writeln!(out, "#SBATCH --mem={}", self.tier.mem).unwrap();
        writeln!(out, "#SBATCH --time={}", self.tier.walltime).unwrap();
        writeln!(out, "#SBATCH --output={}", self.output).unwrap();
        writeln!(out).unwrap();
        out.push_str(&self.body);
        if !self.body.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier() -> ResourceTier {
        ResourceTier {
            cpus: 4,
            mem: "16G".to_string(),
            walltime: "06:00:00".to_string(),
        }
    }

    #[test]
    fn test_dependency_keywords() {
        assert_eq!(DependencyKind::AfterSuccess.keyword(), "afterok");
        assert_eq!(DependencyKind::AfterAny.keyword(), "afterany");
    }

    #[test]
    fn test_script_header() {
        let job = SbatchJob::new("bioc-leaf01", "batch", tier())
            .with_output("logs/leaf01.log")
            .with_body("echo hello");
        let script = job.to_script();
        assert!(script.starts_with("#!/usr/bin/env bash\n"));
        assert!(script.contains("#SBATCH --job-name=bioc-leaf01\n"));
        assert!(script.contains("#SBATCH --partition=batch\n"));
        assert!(script.contains("#SBATCH --cpus-per-task=4\n"));
        assert!(script.contains("#SBATCH --mem=16G\n"));
        assert!(script.contains("#SBATCH --time=06:00:00\n"));
        assert!(script.contains("#SBATCH --output=logs/leaf01.log\n"));
        assert!(script.ends_with("echo hello\n"));
    }

    #[test]
    fn test_default_output_from_name() {
        let job = SbatchJob::new("p1", "batch", tier());
        assert!(job.to_script().contains("#SBATCH --output=p1.log"));
    }
}
