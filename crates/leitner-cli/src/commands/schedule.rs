use clap::Subcommand;
use leitner_core::{Clock, ScheduleState, SystemClock};

use super::{date_or_today, load_required, persistence, CliResult};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Start a new schedule
    Init {
        /// Start date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show the day counter, backlog, and what is due
    Status,
    /// List all seven levels with their due dates
    Levels {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List overdue dates, oldest first
    Backlog,
}

pub fn run(action: ScheduleAction) -> CliResult {
    let clock = SystemClock;
    match action {
        ScheduleAction::Init { date } => {
            let mut persistence = persistence()?;
            if persistence.load()?.is_some() {
                return Err(
                    "a schedule already exists; run `leitner data reset --yes` first".into(),
                );
            }
            let start = date_or_today(date, clock.today())?;
            let state = ScheduleState::initialize(start);
            persistence.save(&state)?;
            println!("schedule started on {start}");
            for level in &state.levels {
                println!("  level {} first due {}", level.level, level.next_due);
            }
        }
        ScheduleAction::Status => {
            let persistence = persistence()?;
            let today = clock.today();
            let Some(state) = persistence.load()? else {
                println!("no schedule yet; run `leitner schedule init` to start one");
                return Ok(());
            };
            if let Some(day) = state.day_number(today) {
                println!("today: {today} (day {day})");
            }

            let backlog = state.backlog_dates(today);
            if !backlog.is_empty() {
                let days = backlog.len();
                println!(
                    "backlog: {days} day{} pending (oldest: {})",
                    if days > 1 { "s" } else { "" },
                    backlog[0]
                );
            }

            let classification = state.classify(today);
            match classification.actionable {
                Some(level) => {
                    println!("next up: level {} (due {})", level.level, level.next_due);
                    if !classification.pending.is_empty() {
                        let pending: Vec<String> = classification
                            .pending
                            .iter()
                            .map(|l| format!("L{}", l.level))
                            .collect();
                        println!("blocked behind it: {}", pending.join(", "));
                    }
                }
                None => {
                    println!("all caught up");
                    if let Some(next) = classification.upcoming.first() {
                        println!("next due: level {} on {}", next.level, next.next_due);
                    }
                }
            }
        }
        ScheduleAction::Levels { json } => {
            let persistence = persistence()?;
            let state = load_required(&persistence)?;
            let today = clock.today();
            if json {
                println!("{}", serde_json::to_string_pretty(&state.levels)?);
            } else {
                for level in &state.levels {
                    let marker = if level.last_completed == Some(today) {
                        " (done today)"
                    } else if level.next_due < today {
                        " (overdue)"
                    } else if level.next_due == today {
                        " (due today)"
                    } else {
                        ""
                    };
                    println!("level {}  next due {}{marker}", level.level, level.next_due);
                }
            }
        }
        ScheduleAction::Backlog => {
            let persistence = persistence()?;
            let state = load_required(&persistence)?;
            let backlog = state.backlog_dates(clock.today());
            if backlog.is_empty() {
                println!("no backlog");
            } else {
                for date in backlog {
                    let levels: Vec<String> = state
                        .due_on(date)
                        .iter()
                        .map(|l| format!("L{}", l.level))
                        .collect();
                    println!("{date}  {}", levels.join(", "));
                }
            }
        }
    }
    Ok(())
}
