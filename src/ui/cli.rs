use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::engine::protocol::EngineCommand;
use crate::model::activity::Activity;

#[derive(Parser, Debug)]
#[command(name = "monarch", version, about = "SISTEMA: MONARCA - level up your real life")]
pub struct Cli {
    /// Save file to use instead of the configured one
    #[arg(long, global = true)]
    pub save: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show rank, level, stats, combos and penalties
    Status,

    /// Log a preset activity
    Log {
        #[arg(value_enum)]
        activity: ActivityArg,
    },

    /// Describe your effort and let the oracle judge it
    Oracle {
        #[arg(required = true, num_args = 1..)]
        report: Vec<String>,
    },

    /// Manage outstanding penalties
    Penalty {
        #[command(subcommand)]
        action: PenaltyAction,
    },

    /// Use this week's rest
    Rest,

    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum PenaltyAction {
    /// Add an outstanding penalty; blocks XP until paid
    Add {
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },
    /// List outstanding penalties
    List,
    /// Mark every penalty as paid
    Clear,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityArg {
    /// Ward / maternity rotation (+20 XP, SEN)
    Ward,
    /// 12h on-call shift (+40 XP, VIT)
    Shift,
    /// Gym session (+30 XP, STR)
    Workout,
}

impl From<ActivityArg> for Activity {
    fn from(arg: ActivityArg) -> Self {
        match arg {
            ActivityArg::Ward => Activity::Ward,
            ActivityArg::Shift => Activity::Shift,
            ActivityArg::Workout => Activity::Workout,
        }
    }
}

impl Command {
    /// `None` for commands the front end answers without mutating anything.
    pub fn into_engine_command(self) -> Option<EngineCommand> {
        match self {
            Command::Status => Some(EngineCommand::Status),
            Command::Log { activity } => Some(EngineCommand::LogActivity(activity.into())),
            Command::Oracle { report } => Some(EngineCommand::ConsultOracle(report.join(" "))),
            Command::Penalty { action } => match action {
                PenaltyAction::Add { description } => {
                    Some(EngineCommand::AddPenalty(description.join(" ")))
                }
                PenaltyAction::List => None,
                PenaltyAction::Clear => Some(EngineCommand::ClearPenalties),
            },
            Command::Rest => Some(EngineCommand::TakeWeeklyRest),
            Command::InitConfig { .. } => None,
        }
    }

    pub fn needs_oracle(&self) -> bool {
        matches!(self, Command::Oracle { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_oracle_joins_words() {
        let cli = Cli::try_parse_from(["monarch", "oracle", "long", "shift", "in", "GO"]).unwrap();
        let command = cli.command.unwrap();
        assert!(command.needs_oracle());
        match command.into_engine_command() {
            Some(EngineCommand::ConsultOracle(text)) => assert_eq!(text, "long shift in GO"),
            _ => panic!("expected oracle command"),
        }
    }

    #[test]
    fn test_parse_log_and_globals() {
        let cli = Cli::try_parse_from(["monarch", "log", "workout", "--save", "/tmp/x.json"]).unwrap();
        assert_eq!(cli.save, Some(PathBuf::from("/tmp/x.json")));
        assert_eq!(
            cli.command,
            Some(Command::Log {
                activity: ActivityArg::Workout
            })
        );
        assert!(Cli::try_parse_from(["monarch", "log", "nap"]).is_err());
    }

    #[test]
    fn test_penalty_add() {
        let cli = Cli::try_parse_from(["monarch", "penalty", "add", "skipped", "cardio"]).unwrap();
        match cli.command.and_then(Command::into_engine_command) {
            Some(EngineCommand::AddPenalty(text)) => assert_eq!(text, "skipped cardio"),
            _ => panic!("expected penalty command"),
        }
    }
}
