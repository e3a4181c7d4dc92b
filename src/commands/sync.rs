use anyhow::{Context as _, Result};
use biockit::{cluster, descfile, library, reconcile, snapshot};

use crate::Context;
use crate::cli::SyncArgs;
use crate::paths;
use crate::ui;

pub fn run(ctx: &Context, args: SyncArgs) -> Result<()> {
    ui::header("Syncing manifest");

    let manifest_path = paths::manifest_path(args.manifest.as_deref());
    let manifest = descfile::read(&manifest_path)
        .with_context(|| format!("could not load manifest {}", manifest_path.display()))?;
    let profile = cluster::resolve(args.cluster.as_deref())?;
    let lib = paths::lib_dir(args.lib.as_deref(), &profile, &manifest.version)?;

    if !ctx.quiet {
        ui::kv("cluster", &profile.name);
        ui::kv("manifest", &manifest_path.display().to_string());
        ui::kv("library", &lib.display().to_string());
    }

    let observed = library::scan(&lib)
        .with_context(|| format!("could not scan library {}", lib.display()))?;
    log::info!("scanned {} installed packages", observed.len());

    let outcome = reconcile::sync(&manifest, &observed, !args.replace);

    for name in &outcome.added {
        ui::success(&format!("add {name}"));
    }
    for name in &outcome.removed {
        ui::warn(&format!("remove {name}"));
    }

    let changed = !outcome.added.is_empty() || !outcome.removed.is_empty();
    if !changed {
        ui::info("manifest already in sync");
    }

    if args.apply {
        descfile::write(&outcome.manifest, &manifest_path)
            .with_context(|| format!("could not write manifest {}", manifest_path.display()))?;
        ui::success(&format!(
            "wrote {} ({})",
            manifest_path.display(),
            ui::count(outcome.manifest.entries.len(), "package")
        ));

        let snap = snapshot::write(
            &outcome.manifest,
            &profile.name,
            &paths::snapshots_dir(&manifest_path),
        )
        .context("could not write snapshot")?;
        ui::dim(&format!("snapshot: {}", snap.display()));
    } else if changed {
        ui::dim("dry run; pass --apply to write the manifest");
    }

    ui::summary(outcome.added.len(), outcome.removed.len(), 0, 0);
    Ok(())
}
