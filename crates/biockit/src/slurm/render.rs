//! Render a phase plan into scheduler artifacts.
//!
//! Per phase: one sbatch script plus a companion `.pkgs` chunk file (one
//! package per line) - chunk files stay out of the script text so they can
//! be reviewed and edited independently. One `submit.sh` wires the
//! dependency chain. Re-rendering overwrites the same paths.

use crate::cluster::ClusterProfile;
use crate::error::Result;
use crate::reconcile::PhasePlan;
use crate::slurm::job::{DependencyKind, SbatchJob};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Paths of everything render produced.
#[derive(Debug, Clone)]
pub struct RenderedPlan {
    /// Job scripts in submission order (core, leaf chunks, summary)
    pub job_scripts: Vec<PathBuf>,
    /// Companion package-chunk files
    pub chunk_files: Vec<PathBuf>,
    /// The submission script
    pub submit_script: PathBuf,
}

/// Render `plan` for `profile` into `out_dir`.
pub fn render(
    plan: &PhasePlan,
    profile: &ClusterProfile,
    version: &str,
    out_dir: &Path,
) -> Result<RenderedPlan> {
    std::fs::create_dir_all(out_dir)?;

    let mut job_scripts = Vec::new();
    let mut chunk_files = Vec::new();
    let mut leaf_stems = Vec::new();

    if !plan.phase1.is_empty() {
        let chunk = out_dir.join("core.pkgs");
        std::fs::write(&chunk, chunk_text(&plan.phase1))?;
        chunk_files.push(chunk);

        let job = SbatchJob::new(
            "bioc-core",
            profile.partition.clone(),
            profile.phase1_tier.clone(),
        )
        .with_output("core.log")
        .with_body(install_body(profile, version, "core"));
        let path = out_dir.join("core.sbatch");
        std::fs::write(&path, job.to_script())?;
        job_scripts.push(path);
    }

    for (i, names) in plan.chunks.iter().enumerate() {
        let stem = format!("leaf{:02}", i + 1);
        let chunk = out_dir.join(format!("{stem}.pkgs"));
        std::fs::write(&chunk, chunk_text(names))?;
        chunk_files.push(chunk);

        let job = SbatchJob::new(
            format!("bioc-{stem}"),
            profile.partition.clone(),
            profile.leaf_tier.clone(),
        )
        .with_output(format!("{stem}.log"))
        .with_body(install_body(profile, version, &stem));
        let path = out_dir.join(format!("{stem}.sbatch"));
        std::fs::write(&path, job.to_script())?;
        job_scripts.push(path);
        leaf_stems.push(stem);
    }

    let summary = SbatchJob::new(
        "bioc-summary",
        profile.partition.clone(),
        profile.leaf_tier.clone(),
    )
    .with_output("summary.log")
    .with_body(summary_body());
    let summary_path = out_dir.join("summary.sbatch");
    std::fs::write(&summary_path, summary.to_script())?;
    job_scripts.push(summary_path);

    let submit_script = out_dir.join("submit.sh");
    std::fs::write(
        &submit_script,
        submit_text(!plan.phase1.is_empty(), &leaf_stems),
    )?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&submit_script, std::fs::Permissions::from_mode(0o755))?;
    }

    Ok(RenderedPlan {
        job_scripts,
        chunk_files,
        submit_script,
    })
}

/// One package name per line.
fn chunk_text(names: &[String]) -> String {
    let mut out = names.join("\n");
    out.push('\n');
    out
}

/// The per-package install loop for one phase.
///
/// Installs into the shared library but through a job-private compile
/// cache, and records `OK`/`FAIL` per package without ever aborting the
/// phase.
fn install_body(profile: &ClusterProfile, version: &str, stem: &str) -> String {
    let image = profile.image_path(version);
    let lib = profile.lib_path(version);
    let binds = profile.bind_paths.join(",");

    format!(
        r#"set -u

image="{image}"
lib="{lib}"
chunk="{stem}.pkgs"
results="{stem}.results"
# Job-private cache: chunk jobs share the library, never a compile cache.
cache="${{TMPDIR:-/tmp}}/bioc-cache-${{SLURM_JOB_ID:-$$}}"
mkdir -p "$cache" "$lib"
: > "$results"

while IFS= read -r pkg; do
    [ -z "$pkg" ] && continue
    if apptainer exec --bind {binds} --bind "$lib" \
        --env R_PKG_CACHE_DIR="$cache" "$image" \
        Rscript -e "BiocManager::install('$pkg', lib = '$lib', update = FALSE, ask = FALSE)"
    then
        echo "OK $pkg" >> "$results"
    else
        echo "FAIL $pkg" >> "$results"
    fi
done < "$chunk"
"#,
        image = image.display(),
        lib = lib.display(),
    )
}

/// The terminal aggregation job: counts only, no installation.
fn summary_body() -> String {
    r#"set -u

total="install.results"
cat ./*.results > "$total" 2>/dev/null || : > "$total"
ok=$(grep -c '^OK ' "$total" || true)
fail=$(grep -c '^FAIL ' "$total" || true)
echo "installed: ${ok:-0}  failed: ${fail:-0}"
if [ "${fail:-0}" -gt 0 ]; then
    grep '^FAIL ' "$total"
fi
"#
    .to_string()
}

/// The submission chain: core, then leaf chunks gated on core success,
/// then the summary gated (any outcome) on every leaf chunk.
fn submit_text(has_core: bool, leaf_stems: &[String]) -> String {
    let afterok = DependencyKind::AfterSuccess.keyword();
    let afterany = DependencyKind::AfterAny.keyword();

    let mut out = String::new();
    writeln!(out, "#!/usr/bin/env bash").unwrap();
    writeln!(out, "set -euo pipefail").unwrap();
    writeln!(out, "cd \"$(dirname \"$0\")\"").unwrap();
    writeln!(out).unwrap();

    if has_core {
        writeln!(out, "core=$(sbatch --parsable core.sbatch)").unwrap();
        writeln!(out, "echo \"core: $core\"").unwrap();
    }

    let mut wait_ids = Vec::new();
    for stem in leaf_stems {
        if has_core {
            writeln!(
                out,
                "{stem}=$(sbatch --parsable --dependency={afterok}:$core {stem}.sbatch)"
            )
            .unwrap();
        } else {
            writeln!(out, "{stem}=$(sbatch --parsable {stem}.sbatch)").unwrap();
        }
        writeln!(out, "echo \"{stem}: ${stem}\"").unwrap();
        wait_ids.push(format!("${stem}"));
    }

    if wait_ids.is_empty() && has_core {
        wait_ids.push("$core".to_string());
    }

    writeln!(out).unwrap();
    if wait_ids.is_empty() {
        writeln!(out, "summary=$(sbatch --parsable summary.sbatch)").unwrap();
    } else {
        writeln!(
            out,
            "summary=$(sbatch --parsable --dependency={afterany}:{} summary.sbatch)",
            wait_ids.join(":")
        )
        .unwrap();
    }
    writeln!(out, "echo \"summary: $summary\"").unwrap();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster;

    fn plan() -> PhasePlan {
        PhasePlan {
            phase1: vec!["BiocManager".into(), "Rcpp".into()],
            chunks: vec![
                vec!["scater".into(), "scran".into()],
                vec!["zellkonverter".into()],
            ],
        }
    }

    #[test]
    fn test_render_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let profile = cluster::by_name("gemini").unwrap();
        let rendered = render(&plan(), &profile, "3.19", dir.path()).unwrap();

        assert_eq!(rendered.job_scripts.len(), 4); // core, 2 leaves, summary
        assert_eq!(rendered.chunk_files.len(), 3);

        let core = std::fs::read_to_string(dir.path().join("core.sbatch")).unwrap();
        assert!(core.contains("#SBATCH --partition=batch"));
        assert!(core.contains("#SBATCH --cpus-per-task=16"));
        assert!(core.contains("bioc-3.19.sif"));
        assert!(core.contains("done < \"$chunk\""));

        let chunk = std::fs::read_to_string(dir.path().join("core.pkgs")).unwrap();
        assert_eq!(chunk, "BiocManager\nRcpp\n");

        let leaf = std::fs::read_to_string(dir.path().join("leaf01.sbatch")).unwrap();
        assert!(leaf.contains("#SBATCH --cpus-per-task=4"));
        assert!(leaf.contains("leaf01.pkgs"));
    }

    #[test]
    fn test_submit_chain() {
        let dir = tempfile::tempdir().unwrap();
        let profile = cluster::by_name("apollo").unwrap();
        let rendered = render(&plan(), &profile, "3.19", dir.path()).unwrap();

        let submit = std::fs::read_to_string(&rendered.submit_script).unwrap();
        assert!(submit.contains("core=$(sbatch --parsable core.sbatch)"));
        assert!(submit.contains("--dependency=afterok:$core leaf01.sbatch"));
        assert!(submit.contains("--dependency=afterok:$core leaf02.sbatch"));
        assert!(submit.contains("--dependency=afterany:$leaf01:$leaf02 summary.sbatch"));
    }

    #[test]
    fn test_render_without_core_phase() {
        let dir = tempfile::tempdir().unwrap();
        let profile = cluster::by_name("gemini").unwrap();
        let leaf_only = PhasePlan {
            phase1: vec![],
            chunks: vec![vec!["scran".into()]],
        };
        let rendered = render(&leaf_only, &profile, "3.19", dir.path()).unwrap();
        assert!(!dir.path().join("core.sbatch").exists());

        let submit = std::fs::read_to_string(&rendered.submit_script).unwrap();
        assert!(submit.contains("leaf01=$(sbatch --parsable leaf01.sbatch)"));
        assert!(submit.contains("--dependency=afterany:$leaf01 summary.sbatch"));
    }

    #[test]
    fn test_rerender_overwrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let profile = cluster::by_name("gemini").unwrap();
        let first = render(&plan(), &profile, "3.19", dir.path()).unwrap();
        let second = render(&plan(), &profile, "3.19", dir.path()).unwrap();
        assert_eq!(first.job_scripts, second.job_scripts);

        let a = std::fs::read_to_string(&first.submit_script).unwrap();
        let b = std::fs::read_to_string(&second.submit_script).unwrap();
        assert_eq!(a, b);
    }
}
