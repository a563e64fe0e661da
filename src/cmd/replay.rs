use super::Context;
use crate::reports;
use clap::Args;
use keyoverlay::api::OverlaySession;
use keyoverlay::error::OverlayResult;
use keyoverlay::input::ScriptedListener;
use keyoverlay::keycodes::{KeyboardLocale, ModifierPolicy};
use keyoverlay::render::RecordingRenderer;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Layout file, preset id/name, or saved layout name
    pub layout: String,

    /// Input script (`down w`, `up w`, `focus-lost`, `revoke <reason>`)
    pub script: PathBuf,

    /// Treat left and right modifiers as one key
    #[arg(long, default_value_t = false)]
    pub collapse_modifiers: bool,

    /// Override the layout's keyboard locale
    #[arg(long)]
    pub locale: Option<KeyboardLocale>,

    /// Print each cell transition
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

pub fn run(args: ReplayArgs, ctx: &Context) -> OverlayResult<()> {
    let mut layout = ctx.resolve_layout(&args.layout)?;
    if args.collapse_modifiers {
        layout.modifiers = ModifierPolicy::collapsed();
    }
    if let Some(locale) = args.locale {
        layout.locale = locale;
    }

    let listener = ScriptedListener::from_script(&fs::read_to_string(&args.script)?)?;
    let settings = ctx.dir.load_settings()?;

    println!("▶️  Replaying {} on '{}'", args.script.display(), layout.name);
    let mut session = OverlaySession::new(layout, settings, RecordingRenderer::new());
    session.start_capture(Box::new(listener))?;
    session.wait_for_listener();

    let changes = session.pump();
    if args.verbose {
        reports::print_transitions(&changes);
    }

    let frame = session.renderer().last.clone();
    reports::print_frame_grid(session.layout(), &frame);

    let stats = session.engine().map(|e| e.stats()).unwrap_or_default();
    reports::print_engine_stats(&stats, session.renderer().frames, session.discarded());
    println!("Listener: {:?}", session.status());

    let held = session.pressed_cells();
    if !held.is_empty() {
        println!("Still held at end of script: {}", held.join(", "));
    }
    Ok(())
}
