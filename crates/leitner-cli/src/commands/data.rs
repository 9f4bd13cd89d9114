use std::path::PathBuf;

use clap::Subcommand;
use leitner_core::{store, Clock, SystemClock};

use super::{load_required, persistence, CliResult};

#[derive(Subcommand)]
pub enum DataAction {
    /// Write the schedule to a JSON file
    Export {
        /// Output path (defaults to leitner-schedule-export-<today>.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace the stored schedule with one from a JSON file
    Import {
        /// File to import
        file: PathBuf,
    },
    /// Wipe the schedule and return to the welcome state
    Reset {
        /// Confirm; reset clears the start date, due dates, and history
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: DataAction) -> CliResult {
    match action {
        DataAction::Export { output } => {
            let store_handle = persistence()?;
            let state = load_required(&store_handle)?;
            let path = output
                .unwrap_or_else(|| PathBuf::from(store::export_file_name(SystemClock.today())));
            std::fs::write(&path, store::export_json(&state)?)?;
            println!("exported to {}", path.display());
        }
        DataAction::Import { file } => {
            let bytes = std::fs::read(&file)?;
            let mut store_handle = persistence()?;
            let state = store_handle.import(&bytes)?;
            println!(
                "imported schedule started {} ({} log entries)",
                state
                    .settings
                    .start_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                state.log.len()
            );
        }
        DataAction::Reset { yes } => {
            if !yes {
                return Err(
                    "refusing to reset without --yes; this clears your start date, due dates, and history".into(),
                );
            }
            let mut store_handle = persistence()?;
            store_handle.wipe()?;
            println!("schedule reset");
        }
    }
    Ok(())
}
