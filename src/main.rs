use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use monarch_system::config::settings::AppConfig;
use monarch_system::config::settings_io::{self, load_config, save_config};
use monarch_system::engine::llm_client::{LlmClient, TextGenerator};
use monarch_system::engine::store::{default_save_path, JsonFileStore};
use monarch_system::error::{OracleError, SystemError};
use monarch_system::ui::cli::{Cli, Command, PenaltyAction};
use monarch_system::ui::status_view::{render_penalties, render_response};
use monarch_system::Session;

/// Exit code for refusals the user can act on (debt, rest used, oracle offline).
const EXIT_REFUSED: u8 = 2;

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("monarch=info,monarch_system=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(settings_io::config_path);
    let command = cli.command.unwrap_or(Command::Status);

    if let Command::InitConfig { force } = command {
        return init_config(&config_path, force);
    }

    let config = load_config(&config_path)
        .with_context(|| format!("failed to read config {}", config_path.display()))?;

    let save_path = cli
        .save
        .or_else(|| config.save_path.clone())
        .unwrap_or_else(default_save_path);
    let today = Local::now().date_naive();

    let mut session = Session::open(JsonFileStore::new(&save_path), today, config.reset_weekday)
        .with_context(|| format!("failed to load progress from {}", save_path.display()))?;
    info!(path = %save_path.display(), level = session.state().level, rank = %session.state().rank, "session opened");

    if command.needs_oracle() {
        let oracle = LlmClient::from_config(&config).map(|c| Box::new(c) as Box<dyn TextGenerator>);
        session = session.with_oracle(oracle);
    }

    if command == (Command::Penalty { action: PenaltyAction::List }) {
        print!("{}", render_penalties(&session.state().penalties_active));
        return Ok(ExitCode::SUCCESS);
    }

    let Some(engine_command) = command.into_engine_command() else {
        return Ok(ExitCode::SUCCESS);
    };

    match session.handle(engine_command) {
        Ok(response) => {
            print!("{}", render_response(&response));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if is_refusal(&e) => {
            eprintln!("{}", e);
            Ok(ExitCode::from(EXIT_REFUSED))
        }
        Err(e) => Err(e).context("action failed, save file left as it was"),
    }
}

fn is_refusal(err: &SystemError) -> bool {
    matches!(
        err,
        SystemError::Blocked(_)
            | SystemError::RestAlreadyUsed
            | SystemError::InvalidPenalty
            | SystemError::Oracle(OracleError::NoServiceConfigured)
            | SystemError::Oracle(OracleError::EmptyNarrative)
    )
}

fn init_config(path: &Path, force: bool) -> Result<ExitCode> {
    if path.exists() && !force {
        eprintln!("{} already exists (use --force to overwrite)", path.display());
        return Ok(ExitCode::from(EXIT_REFUSED));
    }

    save_config(path, &AppConfig::default())
        .with_context(|| format!("failed to write config {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(ExitCode::SUCCESS)
}
