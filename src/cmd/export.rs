use super::Context;
use clap::Args;
use keyoverlay::error::OverlayResult;
use keyoverlay::store;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Layout file, preset id/name, or saved layout name
    pub layout: String,

    /// Write the document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Store it in the config directory under this name
    #[arg(long)]
    pub save_as: Option<String>,
}

pub fn run(args: ExportArgs, ctx: &Context) -> OverlayResult<()> {
    let layout = ctx.resolve_layout(&args.layout)?;

    if let Some(name) = &args.save_as {
        let path = ctx.dir.save_layout(name, &layout)?;
        println!("💾 Saved '{}' to {}", layout.name, path.display());
    }
    match &args.output {
        Some(path) => {
            store::save_layout(&layout, path)?;
            println!("💾 Wrote {}", path.display());
        }
        None if args.save_as.is_none() => println!("{}", store::layout_to_string(&layout)?),
        None => {}
    }
    Ok(())
}
