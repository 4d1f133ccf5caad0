use clap::{Parser, Subcommand};
use gupsik_neis::{MealDate, MealSlot};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gupsik")]
#[command(about = "School meal menus from the NEIS open API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: <config dir>/gupsik/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Cli {
    /// Log filter used when RUST_LOG is unset
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the meal menu for a day
    Meals {
        /// Service date, YYYYMMDD or YYYY-MM-DD (default: today)
        #[arg(short, long, value_parser = parse_date_arg)]
        date: Option<MealDate>,

        /// breakfast, lunch, dinner or 1-3 (default: configured slot)
        #[arg(short, long, conflicts_with = "all_slots")]
        slot: Option<MealSlot>,

        /// Show every meal served that day
        #[arg(short, long)]
        all_slots: bool,

        /// Education office code, overrides the saved school
        #[arg(long, requires = "school")]
        edu: Option<String>,

        /// School code, overrides the saved school
        #[arg(long, requires = "edu")]
        school: Option<String>,

        /// Print raw records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search schools by name
    Search {
        /// School name or part of it
        #[arg(required = true)]
        name: String,

        /// Print raw records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Save the school used by later `meals` calls
    Select {
        /// Education office code (ATPT_OFCDC_SC_CODE)
        edu_code: String,

        /// School code (SD_SCHUL_CODE)
        school_code: String,

        /// School name shown by `selection`
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show the saved school
    Selection,

    /// Forget the saved school and fall back to the configured default
    Clear,
}

/// Accepts the date picker's `YYYY-MM-DD` as well as `YYYYMMDD`.
fn parse_date_arg(s: &str) -> Result<MealDate, String> {
    MealDate::parse(&s.replace('-', "")).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_arg_accepts_both_forms() {
        assert_eq!(parse_date_arg("2024-03-05").unwrap().as_str(), "20240305");
        assert_eq!(parse_date_arg("20240305").unwrap().as_str(), "20240305");
        assert!(parse_date_arg("2024/03/05").is_err());
    }

    #[test]
    fn test_meals_args() {
        let cli = Cli::parse_from(["gupsik", "meals", "--date", "2024-03-05", "--slot", "dinner"]);
        match cli.command {
            Commands::Meals { date, slot, all_slots, edu, .. } => {
                assert_eq!(date.unwrap().as_str(), "20240305");
                assert_eq!(slot, Some(MealSlot::Dinner));
                assert!(!all_slots);
                assert!(edu.is_none());
            }
            _ => panic!("expected meals"),
        }
    }

    #[test]
    fn test_edu_requires_school() {
        assert!(Cli::try_parse_from(["gupsik", "meals", "--edu", "B10"]).is_err());
        assert!(Cli::try_parse_from(["gupsik", "meals", "--edu", "B10", "--school", "7010057"]).is_ok());
    }

    #[test]
    fn test_slot_conflicts_with_all_slots() {
        assert!(Cli::try_parse_from(["gupsik", "meals", "--slot", "1", "--all-slots"]).is_err());
    }

    #[test]
    fn test_verbosity_maps_to_filter() {
        let cli = Cli::parse_from(["gupsik", "-vv", "selection"]);
        assert_eq!(cli.log_filter(), "debug");
        let cli = Cli::parse_from(["gupsik", "clear"]);
        assert_eq!(cli.log_filter(), "warn");
    }
}
