use super::Context;
use crate::reports;
use clap::{Args, Subcommand};
use keyoverlay::config::LayoutRef;
use keyoverlay::error::OverlayResult;
use keyoverlay::layouts;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct LayoutsArgs {
    #[command(subcommand)]
    pub action: LayoutsAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum LayoutsAction {
    /// Saved layouts and whether each still loads
    List,
    Delete {
        name: String,
    },
    Rename {
        name: String,
        new_name: String,
    },
    Duplicate {
        name: String,
        new_name: String,
    },
    Import {
        path: PathBuf,
    },
    Export {
        name: String,
        dest: PathBuf,
    },
    /// Remember a layout (saved name or preset id) for the next start
    Use {
        name: String,
        #[arg(long, default_value_t = false)]
        preset: bool,
    },
}

pub fn run(args: LayoutsArgs, ctx: &Context) -> OverlayResult<()> {
    let dir = &ctx.dir;
    match args.action {
        LayoutsAction::List => {
            println!("📂 {}", dir.layouts_dir().display());
            let entries: Vec<_> = dir
                .list_layouts()?
                .into_iter()
                .map(|name| {
                    let status = dir
                        .load_layout(&name)
                        .map(|l| l.len())
                        .map_err(|e| e.to_string());
                    (name, status)
                })
                .collect();
            reports::print_saved_layouts(&entries);
        }
        LayoutsAction::Delete { name } => {
            dir.delete_layout(&name)?;
            println!("🗑️  Deleted {}", name);
        }
        LayoutsAction::Rename { name, new_name } => {
            dir.rename_layout(&name, &new_name)?;
            println!("Renamed {} -> {}", name, new_name);
        }
        LayoutsAction::Duplicate { name, new_name } => {
            dir.duplicate_layout(&name, &new_name)?;
            println!("Duplicated {} -> {}", name, new_name);
        }
        LayoutsAction::Import { path } => {
            let name = dir.import_layout(&path)?;
            println!("📥 Imported as '{}'", name);
        }
        LayoutsAction::Export { name, dest } => {
            dir.export_layout(&name, &dest)?;
            println!("📤 Exported to {}", dest.display());
        }
        LayoutsAction::Use { name, preset } => {
            let (layout, reference) = if preset {
                (layouts::build(&name)?, LayoutRef::Preset(name))
            } else {
                (dir.load_layout(&name)?, LayoutRef::Saved(name))
            };
            let mut settings = dir.load_settings()?;
            settings.last_layout = Some(reference);
            dir.save_settings(&settings)?;
            println!("Startup layout: {}", layout.name);
        }
    }
    Ok(())
}
