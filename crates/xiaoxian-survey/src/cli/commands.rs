//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::response::ScaleField;

/// Submit command arguments.
#[derive(Debug, Args)]
pub struct SubmitCommand {
    /// JSON answers document ("-" reads stdin)
    pub file: PathBuf,
}

/// Dashboard command arguments.
#[derive(Debug, Args)]
pub struct DashboardCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Average command arguments.
#[derive(Debug, Args)]
pub struct AverageCommand {
    /// Scale fields to average together (e.g. c4_immersion c5_funFactor)
    #[arg(required = true, value_parser = parse_scale_field)]
    pub fields: Vec<ScaleField>,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Show only the last N responses
    #[arg(short, long)]
    pub last: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Seed command arguments.
#[derive(Debug, Args)]
pub struct SeedCommand {
    /// Number of demonstration responses (defaults to the configured count)
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
}

/// Share command arguments.
#[derive(Debug, Args)]
pub struct ShareCommand {
    /// Survey address to share instead of the configured one
    #[arg(short, long)]
    pub url: Option<String>,

    /// Copy the address to the clipboard
    #[arg(long)]
    pub copy: bool,

    /// Save the QR code as an SVG image
    #[arg(long, value_name = "PATH")]
    pub svg: Option<PathBuf>,

    /// Don't print the QR code
    #[arg(long)]
    pub no_qr: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}

fn parse_scale_field(s: &str) -> Result<ScaleField, String> {
    s.parse().map_err(|e: crate::error::Error| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_parse_scale_field() {
        assert_eq!(
            parse_scale_field("g1_overallSatisfaction").unwrap(),
            ScaleField::G1OverallSatisfaction
        );
        let err = parse_scale_field("g2_likedPoint").unwrap_err();
        assert!(err.contains("g2_likedPoint"));
    }

    #[test]
    fn test_status_command_debug() {
        let cmd = StatusCommand { json: true };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("json"));
    }

    #[test]
    fn test_share_command_debug() {
        let cmd = ShareCommand {
            url: Some("https://a.example".to_string()),
            copy: true,
            svg: None,
            no_qr: false,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("copy"));
        assert!(debug_str.contains("https://a.example"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }

    #[test]
    fn test_output_format_debug() {
        let format = OutputFormat::Json;
        let debug_str = format!("{format:?}");
        assert_eq!(debug_str, "Json");
    }
}
