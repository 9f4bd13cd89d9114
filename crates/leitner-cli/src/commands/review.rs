use clap::Subcommand;
use leitner_core::{Clock, SystemClock};

use super::{date_or_today, load_required, persistence, CliResult};

#[derive(Subcommand)]
pub enum ReviewAction {
    /// Mark the actionable level reviewed
    Done {
        /// Level number (defaults to the actionable level; any other level
        /// is refused while older reviews are outstanding)
        level: Option<u8>,
        /// Date the review was performed (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Revert a completion
    Undo {
        /// Level number
        level: u8,
        /// Date the review was recorded on (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
}

pub fn run(action: ReviewAction) -> CliResult {
    let clock = SystemClock;
    let mut store = persistence()?;
    let mut state = load_required(&store)?;

    match action {
        ReviewAction::Done { level, date } => {
            let today = clock.today();
            let on_date = date_or_today(date, today)?;

            // Strict in-order processing: only the oldest due level may be
            // completed.
            let actionable = state
                .classify(today)
                .actionable
                .ok_or("nothing is due right now")?;
            let number = level.unwrap_or(actionable.level);
            if number != actionable.level {
                return Err(format!(
                    "level {number} is not up next; level {} (due {}) must be reviewed first",
                    actionable.level, actionable.next_due
                )
                .into());
            }

            state.complete(number, on_date, clock.now_ms())?;
            store.save(&state)?;
            let level = state
                .level(number)
                .ok_or("level disappeared after completion")?;
            println!("level {number} done on {on_date}; next due {}", level.next_due);
        }
        ReviewAction::Undo { level, date } => {
            let on_date = date_or_today(date, clock.today())?;
            let entry = state.undo(level, on_date)?;
            store.save(&state)?;
            println!("level {level} restored to due {}", entry.original_due);
        }
    }
    Ok(())
}
