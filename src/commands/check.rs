use anyhow::{Context as _, Result};
use biockit::types::Availability;
use biockit::{descfile, registry};

use crate::Context;
use crate::cli::CheckArgs;
use crate::paths;
use crate::ui;

pub fn run(ctx: &Context, args: CheckArgs) -> Result<()> {
    let manifest_path = paths::manifest_path(args.manifest.as_deref());
    let manifest = descfile::read(&manifest_path)
        .with_context(|| format!("could not load manifest {}", manifest_path.display()))?;

    if !args.json {
        ui::header("Checking registry availability");
        if !ctx.quiet {
            ui::kv("manifest", &manifest_path.display().to_string());
            ui::kv("bioc version", &manifest.version);
        }
    }

    let client = registry::HttpRegistry::new();
    let report = registry::check_manifest(&client, &manifest);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for row in &report.rows {
            match row.availability {
                Availability::Available => {
                    if ctx.verbose > 0 {
                        ui::dim(&format!("{}: available ({})", row.name, row.reason));
                    }
                }
                Availability::Deprecated => {
                    ui::warn(&format!("{}: deprecated ({})", row.name, row.reason));
                }
                Availability::ArchiveOnly | Availability::BuildFailure => {
                    ui::error(&format!(
                        "{}: {} ({})",
                        row.name, row.availability, row.reason
                    ));
                }
                Availability::Unknown => {
                    ui::warn(&format!("{}: unknown ({})", row.name, row.reason));
                }
            }
        }
    }

    // Only formally deprecated packages may be dropped automatically;
    // archive-only and build failures need a human decision.
    let (next, dropped) = registry::apply_check(&manifest, &report);
    let mut removed = 0;
    if args.apply && !dropped.is_empty() {
        descfile::write(&next, &manifest_path)
            .with_context(|| format!("could not write manifest {}", manifest_path.display()))?;
        removed = dropped.len();
        if !args.json {
            ui::success(&format!(
                "removed {} from {}",
                ui::count(removed, "deprecated package"),
                manifest_path.display()
            ));
        }
    } else if !args.json && !dropped.is_empty() {
        ui::dim("dry run; pass --apply to remove deprecated packages");
    }

    if !args.json {
        for row in report.needs_attention() {
            ui::dim(&format!("needs attention: {}", row.name));
        }
        ui::summary(0, removed, report.unavailable_count(), 0);
    }
    Ok(())
}
