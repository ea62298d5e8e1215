//! CLI interface for graccstat
//!
//! This module defines the command-line interface using clap. Every
//! configuration knob of the core (endpoint, index names, intervals) is
//! surfaced as a flag with an environment-variable fallback, so deployments
//! can configure the tool without wrapper scripts.
//!
//! # Example
//!
//! ```bash
//! # One-shot summary of all three windows
//! graccstat report
//!
//! # Full daily histogram as JSON, at a fixed reference instant
//! graccstat report --timespan daily --json --at 2024-03-15T10:00:00Z
//!
//! # Long-lived monitor, revalidating every 3 minutes
//! graccstat watch
//! ```

use crate::config::{DEFAULT_ENDPOINT, DEFAULT_RAW_INDEX, DEFAULT_SUMMARY_INDEX, GraccConfig};
use crate::error::{GraccstatError, Result};
use crate::types::Timespan;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::time::Duration;

/// Generate and cache OSG usage reports from the GRACC accounting backend
#[derive(Parser, Debug, Clone)]
#[command(name = "graccstat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// GRACC Elasticsearch endpoint
    #[arg(long, env = "GRACC_ENDPOINT", default_value = DEFAULT_ENDPOINT, global = true)]
    pub endpoint: String,

    /// High-resolution index, used for the daily window
    #[arg(long, env = "GRACC_RAW_INDEX", default_value = DEFAULT_RAW_INDEX, global = true)]
    pub raw_index: String,

    /// Pre-aggregated index, used for the monthly and yearly windows
    #[arg(long, env = "GRACC_SUMMARY_INDEX", default_value = DEFAULT_SUMMARY_INDEX, global = true)]
    pub summary_index: String,

    /// Seconds between revalidation attempts in watch mode
    #[arg(
        long,
        env = "GRACC_REFRESH_INTERVAL_SECS",
        default_value = "180",
        global = true
    )]
    pub refresh_interval_secs: u64,

    /// Per-query timeout in seconds
    #[arg(long, env = "GRACC_TIMEOUT_SECS", default_value = "30", global = true)]
    pub timeout_secs: u64,

    /// Subcommand to execute (defaults to `report`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate the reports once and print them
    Report {
        /// Reference instant as RFC 3339 (defaults to now)
        #[arg(long)]
        at: Option<String>,

        /// Print one window's full histogram instead of the three-window summary
        #[arg(long)]
        timespan: Option<Timespan>,
    },
    /// Build once, then keep the reports fresh and re-render on a fixed interval
    Watch,
}

impl Cli {
    /// Build the backend configuration from the parsed flags
    pub fn config(&self) -> Result<GraccConfig> {
        let config = GraccConfig::default()
            .with_endpoint(self.endpoint.clone())
            .with_raw_index(self.raw_index.clone())
            .with_summary_index(self.summary_index.clone())
            .with_refresh_interval(Duration::from_secs(self.refresh_interval_secs))
            .with_request_timeout(Duration::from_secs(self.timeout_secs));
        config.validate()?;
        Ok(config)
    }
}

/// Parse a `--at` reference instant
pub fn parse_reference(s: &str) -> Result<DateTime<Utc>> {
    s.parse::<DateTime<Utc>>()
        .map_err(|e| GraccstatError::InvalidArgument(format!("invalid reference instant {s:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["graccstat"]).unwrap();
        assert!(!cli.verbose);
        assert!(!cli.json);
        assert_eq!(cli.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cli.refresh_interval_secs, 180);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_report_flags() {
        let cli = Cli::try_parse_from([
            "graccstat",
            "report",
            "--timespan",
            "yearly",
            "--at",
            "2024-03-15T10:00:00Z",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Report { at, timespan }) => {
                assert_eq!(at.as_deref(), Some("2024-03-15T10:00:00Z"));
                assert_eq!(timespan, Some(Timespan::Yearly));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_config_from_flags() {
        let cli = Cli::try_parse_from([
            "graccstat",
            "--endpoint",
            "https://es.example.org/q",
            "--timeout-secs",
            "5",
            "watch",
        ])
        .unwrap();
        let config = cli.config().unwrap();
        assert_eq!(config.endpoint, "https://es.example.org/q");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_rejects_zero_refresh_interval() {
        let cli =
            Cli::try_parse_from(["graccstat", "--refresh-interval-secs", "0", "watch"]).unwrap();
        assert!(cli.config().is_err());
    }

    #[test]
    fn test_parse_reference() {
        let parsed = parse_reference("2024-03-15T10:00:00Z").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-15T10:00:00+00:00");
        assert!(parse_reference("yesterday").is_err());
    }

    #[test]
    fn test_invalid_timespan_rejected() {
        assert!(Cli::try_parse_from(["graccstat", "report", "--timespan", "weekly"]).is_err());
    }
}
