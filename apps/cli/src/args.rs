use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Usage analytics for Cursor accounts.
#[derive(Debug, Parser)]
#[command(name = "cursor-usage", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the JSON API on localhost
    Serve {
        /// Override the configured port for this run only
        #[arg(long)]
        port: Option<u16>,
    },
    /// Fetch usage and print a summary
    Report {
        /// Session token; falls back to stored settings and CURSOR_API_TOKEN
        #[arg(long)]
        token: Option<String>,
        /// Plan to measure against (pro, pro-plus, ultra)
        #[arg(long)]
        plan: Option<String>,
        /// Print the analytics bundle and plan usage as JSON
        #[arg(long)]
        json: bool,
    },
    /// Analyze an exported events file without contacting the API
    Analyze {
        /// JSON file with an event array or API response, `-` for stdin
        path: PathBuf,
        /// Also print time buckets (hourly, daily, weekly, monthly)
        #[arg(long)]
        period: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show or update stored settings
    Config {
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        plan: Option<String>,
        /// Dashboard refresh interval in seconds
        #[arg(long)]
        refresh_interval: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["cursor-usage", "serve", "--port", "4000"]).expect("serve");
        assert!(matches!(cli.command, Command::Serve { port: Some(4000) }));

        let cli = Cli::try_parse_from(["cursor-usage", "analyze", "-", "--period", "weekly"])
            .expect("analyze");
        match cli.command {
            Command::Analyze { path, period, json } => {
                assert_eq!(path, PathBuf::from("-"));
                assert_eq!(period.as_deref(), Some("weekly"));
                assert!(!json);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_port() {
        assert!(Cli::try_parse_from(["cursor-usage", "serve", "--port", "http"]).is_err());
    }
}
