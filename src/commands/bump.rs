use anyhow::{Context as _, Result};
use biockit::descfile;

use crate::Context;
use crate::cli::BumpArgs;
use crate::paths;
use crate::ui;

pub fn run(_ctx: &Context, args: BumpArgs) -> Result<()> {
    let manifest_path = paths::manifest_path(args.manifest.as_deref());
    let mut manifest = descfile::read(&manifest_path)
        .with_context(|| format!("could not load manifest {}", manifest_path.display()))?;

    if manifest.version == args.to {
        ui::info(&format!("manifest already targets Bioconductor {}", args.to));
        ui::summary(0, 0, 0, 0);
        return Ok(());
    }

    ui::info(&format!(
        "Bioconductor {} -> {}",
        manifest.version, args.to
    ));
    manifest.version.clone_from(&args.to);

    if args.apply {
        descfile::write(&manifest, &manifest_path)
            .with_context(|| format!("could not write manifest {}", manifest_path.display()))?;
        ui::success(&format!("wrote {}", manifest_path.display()));
    } else {
        ui::dim("dry run; pass --apply to write the manifest");
    }

    ui::summary(0, 0, 0, 0);
    Ok(())
}
