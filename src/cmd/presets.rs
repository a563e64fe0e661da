use crate::reports;
use clap::Args;
use keyoverlay::error::OverlayResult;
use keyoverlay::layouts::all_presets;

#[derive(Args, Debug, Clone)]
pub struct PresetsArgs {
    /// Print the cell table of every preset as well
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

pub fn run(args: PresetsArgs) -> OverlayResult<()> {
    let built: Vec<_> = all_presets().map(|p| (p, p.build().ok())).collect();
    reports::print_preset_list(&built);

    if args.verbose {
        for layout in built.iter().filter_map(|(_, l)| l.as_ref()) {
            reports::print_cell_table(layout);
        }
    }
    Ok(())
}
