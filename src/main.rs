mod cli;
mod render;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use gupsik_core::{AppError, Config, ConfigError, LocaleIdentity, NetworkError, StorageError};
use gupsik_neis::{MealRecord, NeisClient, Outcome, SchoolRecord};
use gupsik_store::{JsonFileStore, SelectedSchool, SelectionStore};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = gupsik_core::init(cli.log_filter()) {
        eprintln!("{}", e);
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            let app_err = classify(e);
            eprintln!("{}\n{}", app_err.user_message(), app_err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let (config, _) = Config::load_validated(cli.config.as_deref())?;
    let selection = SelectionStore::new(JsonFileStore::new(config.store_path()));

    match cli.command {
        Commands::Meals {
            date,
            slot,
            all_slots,
            edu,
            school,
            json,
        } => {
            let locale = match (edu, school) {
                (Some(edu), Some(school)) => LocaleIdentity::new(edu, school),
                _ => selection.resolve_locale(config.neis.default_locale()),
            };
            tracing::info!("Fetching meals for {}", locale);

            let client = NeisClient::new(config.neis.clone())?;
            let outcome = if all_slots {
                client.fetch_daily_meals(&locale, date.as_ref()).await
            } else {
                client.fetch_meals(&locale, date.as_ref(), slot).await
            };

            Ok(print_meals(outcome, json)?)
        }

        Commands::Search { name, json } => {
            let client = NeisClient::new(config.neis.clone())?;
            let outcome = client.search_schools(&name).await;
            Ok(print_schools(outcome, json)?)
        }

        Commands::Select {
            edu_code,
            school_code,
            name,
        } => {
            let school = SelectedSchool::new(LocaleIdentity::new(edu_code, school_code), name);
            selection.select(&school)?;
            println!("Selected {}", describe(&school));
            Ok(ExitCode::SUCCESS)
        }

        Commands::Selection => {
            match selection.current()? {
                Some(school) => println!("{}", describe(&school)),
                None => println!(
                    "No school selected; using default {}",
                    config.neis.default_locale()
                ),
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Clear => {
            selection.clear()?;
            println!(
                "Selection cleared; using default {}",
                config.neis.default_locale()
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_meals(outcome: Outcome<MealRecord>, json: bool) -> Result<ExitCode> {
    match outcome {
        Outcome::Success(meals) if json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&meals).context("Failed to serialize meals")?
            );
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Success(meals) => {
            print!("{}", render::render_meals(&meals));
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Failure(message) => Ok(print_failure(&message)),
    }
}

fn print_schools(outcome: Outcome<SchoolRecord>, json: bool) -> Result<ExitCode> {
    match outcome {
        Outcome::Success(schools) if json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&schools).context("Failed to serialize schools")?
            );
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Success(schools) => {
            print!("{}", render::render_schools(&schools));
            if let Some(first) = schools.first() {
                println!("\n{}", select_hint(first));
            }
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Failure(message) => Ok(print_failure(&message)),
    }
}

/// NEIS failures are shown verbatim; "no data" and real errors look alike.
fn print_failure(message: &str) -> ExitCode {
    eprintln!("{}", message);
    ExitCode::FAILURE
}

/// Names are quoted so the hint can be pasted into a shell as-is.
fn select_hint(school: &SchoolRecord) -> String {
    format!(
        "Save one with: gupsik select {} {} --name {:?}",
        school.edu_code, school.school_code, school.school_name
    )
}

fn describe(school: &SelectedSchool) -> String {
    match &school.school_name {
        Some(name) => format!("{} ({})", name, school.locale()),
        None => school.locale().to_string(),
    }
}

/// Recover the typed error behind an anyhow chain for a friendlier message.
fn classify(err: anyhow::Error) -> AppError {
    let err = match err.downcast::<ConfigError>() {
        Ok(e) => return AppError::Config(e),
        Err(err) => err,
    };
    let err = match err.downcast::<StorageError>() {
        Ok(e) => return AppError::Storage(e),
        Err(err) => err,
    };
    let err = match err.downcast::<NetworkError>() {
        Ok(e) => return AppError::Network(e),
        Err(err) => err,
    };
    match err.downcast::<std::io::Error>() {
        Ok(e) => AppError::Io(e),
        Err(err) => AppError::Other(err),
    }
}
