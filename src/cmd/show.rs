use super::Context;
use crate::reports;
use clap::Args;
use keyoverlay::error::OverlayResult;
use keyoverlay::keycodes::{KeyRegistry, Normalizer};
use keyoverlay::render::{canvas_size, compose_frame};
use std::collections::HashSet;

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Layout file, preset id/name, or saved layout name
    pub layout: String,

    /// Keys to draw as held, by name (w, shift_r, mouse:left, KEY_F1, ...)
    #[arg(short, long, value_delimiter = ',')]
    pub pressed: Vec<String>,

    /// Print the per-cell table
    #[arg(short, long, default_value_t = false)]
    pub table: bool,
}

pub fn run(args: ShowArgs, ctx: &Context) -> OverlayResult<()> {
    let layout = ctx.resolve_layout(&args.layout)?;
    let settings = ctx.dir.load_settings()?;
    let normalizer = Normalizer::new(KeyRegistry::new_with_defaults(), layout.locale)
        .with_modifiers(layout.modifiers);

    let mut held = HashSet::new();
    for name in &args.pressed {
        match normalizer.resolve_name(name) {
            Some(id) => {
                held.insert(id);
            }
            None => eprintln!("⚠️  Unknown key '{}' ignored", name),
        }
    }

    if args.table {
        reports::print_cell_table(&layout);
    }

    let frame = compose_frame(&layout, &settings.theme, |cell| {
        cell.bound_key.as_ref().is_some_and(|k| held.contains(k))
    });
    println!("\n{} ({} cells)", layout.name, layout.len());
    reports::print_frame_grid(&layout, &frame);

    let (w, h) = canvas_size(&layout, &settings.theme);
    println!("Overlay size: {}x{} px", w, h);
    Ok(())
}
