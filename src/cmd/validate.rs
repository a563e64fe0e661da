use clap::Args;
use keyoverlay::error::{OverlayError, OverlayResult};
use keyoverlay::store;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Layout or settings documents to check
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Treat the files as settings documents
    #[arg(long, default_value_t = false)]
    pub settings: bool,
}

pub fn run(args: ValidateArgs) -> OverlayResult<()> {
    let mut failed = 0;
    for path in &args.files {
        let result = if args.settings {
            store::load_settings(path).map(|_| "settings".to_string())
        } else {
            store::load_layout(path).map(|l| format!("'{}', {} cells", l.name, l.len()))
        };
        match result {
            Ok(summary) => println!("✅ {} ({})", path.display(), summary),
            Err(e) => {
                failed += 1;
                println!("❌ {}: {}", path.display(), e);
            }
        }
    }

    if failed > 0 {
        return Err(OverlayError::Corrupt(format!(
            "{} of {} documents failed validation",
            failed,
            args.files.len()
        )));
    }
    Ok(())
}
