//! Command-line interface for xiaoxian-survey.
//!
//! This module provides the CLI structure for the `xsurvey` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AverageCommand, ConfigCommand, DashboardCommand, ListCommand, OutputFormat, SeedCommand,
    ShareCommand, StatusCommand, SubmitCommand,
};

/// xsurvey - Player questionnaire for 啸仙丹心
///
/// Collects game experience questionnaires on this machine and summarizes
/// them as a dashboard.
#[derive(Debug, Parser)]
#[command(name = "xsurvey")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fill in the questionnaire interactively
    Fill,

    /// Submit a completed questionnaire from a JSON file
    Submit(SubmitCommand),

    /// Show aggregate statistics
    Dashboard(DashboardCommand),

    /// Average one or more scale fields over all responses
    Average(AverageCommand),

    /// List collected responses
    List(ListCommand),

    /// Append demonstration responses
    Seed(SeedCommand),

    /// Show the survey link as a QR code
    Share(ShareCommand),

    /// Show storage status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ScaleField;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Fill,
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "xsurvey");
    }

    #[test]
    fn test_verbosity() {
        use crate::logging::Verbosity;

        assert_eq!(cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fill() {
        let cli = Cli::try_parse_from(["xsurvey", "fill"]).unwrap();
        assert!(matches!(cli.command, Command::Fill));
    }

    #[test]
    fn test_parse_submit() {
        let cli = Cli::try_parse_from(["xsurvey", "submit", "answers.json"]).unwrap();
        match cli.command {
            Command::Submit(cmd) => assert_eq!(cmd.file, PathBuf::from("answers.json")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_dashboard_json() {
        let cli = Cli::try_parse_from(["xsurvey", "dashboard", "--format", "json"]).unwrap();
        match cli.command {
            Command::Dashboard(cmd) => assert_eq!(cmd.format, OutputFormat::Json),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_average_fields() {
        let cli =
            Cli::try_parse_from(["xsurvey", "average", "c4_immersion", "c5_funFactor"]).unwrap();
        match cli.command {
            Command::Average(cmd) => assert_eq!(
                cmd.fields,
                vec![ScaleField::C4Immersion, ScaleField::C5FunFactor]
            ),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_average_rejects_unknown_field() {
        assert!(Cli::try_parse_from(["xsurvey", "average", "ageGroup"]).is_err());
        assert!(Cli::try_parse_from(["xsurvey", "average"]).is_err());
    }

    #[test]
    fn test_parse_list_last() {
        let cli = Cli::try_parse_from(["xsurvey", "list", "--last", "3"]).unwrap();
        match cli.command {
            Command::List(cmd) => {
                assert_eq!(cmd.last, Some(3));
                assert_eq!(cmd.format, OutputFormat::Plain);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_seed() {
        let cli = Cli::try_parse_from(["xsurvey", "seed", "-n", "10"]).unwrap();
        match cli.command {
            Command::Seed(cmd) => assert_eq!(cmd.count, Some(10)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_share() {
        let cli = Cli::try_parse_from([
            "xsurvey",
            "share",
            "--url",
            "https://a.example",
            "--copy",
            "--svg",
            "qr.svg",
            "--no-qr",
        ])
        .unwrap();
        match cli.command {
            Command::Share(cmd) => {
                assert_eq!(cmd.url.as_deref(), Some("https://a.example"));
                assert!(cmd.copy);
                assert_eq!(cmd.svg, Some(PathBuf::from("qr.svg")));
                assert!(cmd.no_qr);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_validate() {
        let cli =
            Cli::try_parse_from(["xsurvey", "config", "validate", "--file", "x.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["xsurvey", "-c", "/custom/config.toml", "status"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose() {
        let cli = Cli::try_parse_from(["xsurvey", "-vv", "status"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_with_quiet() {
        let cli = Cli::try_parse_from(["xsurvey", "-q", "dashboard"]).unwrap();
        assert!(cli.quiet);
    }
}
