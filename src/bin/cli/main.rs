//! CLI tool that folds the reef overlay pack into the base archive.

mod exit_codes;

use clap::Parser;
use std::path::PathBuf;

use exit_codes::ExitCode;
use reefmerge::{MergeOutcome, MergeRules, Merger};

/// Merge the dota_reef overlay map pack into the stock dota.vpk archive
#[derive(Parser)]
#[command(name = "reefmerge")]
#[command(author, version, about = "Merge the dota_reef overlay map pack into the stock dota.vpk archive", long_about = None)]
pub struct Cli {
    /// Directory containing dota.vpk and dota_reef.vpk
    #[arg(value_name = "MAPS_DIR", env = "REEFMERGE_MAPS_DIR")]
    maps_dir: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    let rules = MergeRules::dota();
    let merger = Merger::new(rules.clone());

    let code = match merger.run(&cli.maps_dir) {
        Ok(MergeOutcome::Skipped { digest }) => {
            println!(
                "{} already contains the merged content ({digest})",
                rules.base_name()
            );
            ExitCode::Success
        }
        Ok(MergeOutcome::Merged(report)) => {
            println!(
                "merged {} into {}: {} entries ({} from overlay, {} dropped)",
                rules.overlay_name(),
                rules.base_name(),
                report.entries_written(),
                report.entries_from_overlay,
                report.overlay_dropped
            );
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("error: {e}");
            exit_codes::error_to_exit_code(&e)
        }
    };

    std::process::exit(code.code());
}
