use clap::Subcommand;
use leitner_core::Theme;

use super::{load_required, persistence, CliResult};

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Print the current theme
    Get,
    /// Set the theme (system, light, or dark)
    Set {
        /// Theme name
        theme: String,
    },
}

pub fn run(action: ThemeAction) -> CliResult {
    let mut store = persistence()?;
    let mut state = load_required(&store)?;
    match action {
        ThemeAction::Get => {
            println!("{}", state.settings.theme.as_str());
        }
        ThemeAction::Set { theme } => {
            let theme = Theme::parse(&theme)
                .ok_or_else(|| format!("unknown theme '{theme}'; expected system, light, or dark"))?;
            state.settings.theme = theme;
            store.save(&state)?;
            println!("theme set to {}", theme.as_str());
        }
    }
    Ok(())
}
