use anyhow::{Context as _, Result};
use biockit::{cluster, descfile, library, reconcile, slurm};

use crate::Context;
use crate::cli::PlanArgs;
use crate::paths;
use crate::ui;

pub fn run(ctx: &Context, args: PlanArgs) -> Result<()> {
    ui::header("Planning install jobs");

    let manifest_path = paths::manifest_path(args.manifest.as_deref());
    let manifest = descfile::read(&manifest_path)
        .with_context(|| format!("could not load manifest {}", manifest_path.display()))?;
    let profile = cluster::resolve(args.cluster.as_deref())?;

    if !ctx.quiet {
        ui::kv("cluster", &profile.name);
        ui::kv("manifest", &manifest_path.display().to_string());
        ui::kv("bioc version", &manifest.version);
    }

    let plan = if args.all {
        reconcile::plan(&manifest, args.jobs)
    } else {
        let lib = paths::lib_dir(args.lib.as_deref(), &profile, &manifest.version)?;
        let observed = library::scan(&lib)
            .with_context(|| format!("could not scan library {}", lib.display()))?;
        let (satisfied, missing) = reconcile::installed_split(&manifest, &observed);
        ui::info(&format!(
            "{} installed, {} missing",
            ui::count(satisfied.len(), "package"),
            missing.len()
        ));
        reconcile::partition(
            &missing,
            |name| manifest.entries.get(name).is_some_and(reconcile::is_phase1),
            args.jobs,
        )
    };

    if plan.is_empty() {
        ui::success("nothing to install");
        ui::summary(0, 0, 0, 0);
        return Ok(());
    }

    ui::section("Phases");
    ui::kv("phase 1 (core)", &ui::count(plan.phase1.len(), "package"));
    for (i, chunk) in plan.chunks.iter().enumerate() {
        ui::kv(
            &format!("leaf chunk {:02}", i + 1),
            &ui::count(chunk.len(), "package"),
        );
    }

    let rendered = slurm::render(&plan, &profile, &manifest.version, &args.output)
        .with_context(|| format!("could not render into {}", args.output.display()))?;

    ui::success(&format!(
        "rendered {} and {} into {}",
        ui::count(rendered.job_scripts.len(), "job script"),
        ui::count(rendered.chunk_files.len(), "chunk file"),
        args.output.display()
    ));
    ui::dim(&format!("submit with: {}", rendered.submit_script.display()));

    ui::summary(0, 0, 0, 0);
    Ok(())
}
