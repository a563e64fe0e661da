use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{debug, error, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about = "Keyboard and mouse overlay layouts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this directory instead of the per-user config directory
    #[arg(global = true, long)]
    config_dir: Option<PathBuf>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the built-in layouts
    Presets(cmd::presets::PresetsArgs),
    /// Draw a layout, optionally with keys held
    Show(cmd::show::ShowArgs),
    /// Write a layout document
    Export(cmd::export::ExportArgs),
    /// Check layout or settings documents
    Validate(cmd::validate::ValidateArgs),
    /// Apply editor operations to a layout
    Edit(cmd::edit::EditArgs),
    /// Feed an input script through a live session
    Replay(cmd::replay::ReplayArgs),
    /// Manage saved layouts
    Layouts(cmd::layouts::LayoutsArgs),
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    debug!("{:?}", cli);

    let result = cmd::Context::new(cli.config_dir).and_then(|ctx| match cli.command {
        Commands::Presets(args) => cmd::presets::run(args),
        Commands::Show(args) => cmd::show::run(args, &ctx),
        Commands::Export(args) => cmd::export::run(args, &ctx),
        Commands::Validate(args) => cmd::validate::run(args),
        Commands::Edit(args) => cmd::edit::run(args, &ctx),
        Commands::Replay(args) => cmd::replay::run(args, &ctx),
        Commands::Layouts(args) => cmd::layouts::run(args, &ctx),
    });

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("❌ {}", e);
        process::exit(1);
    }
}
