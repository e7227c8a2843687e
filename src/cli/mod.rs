//! CLI command definitions and handlers

use clap::{Parser, Subcommand};

pub mod args;
pub mod context;
pub mod dashboard;
pub mod history;
pub mod init;
pub mod keys;
pub mod scan;
pub mod settings;
pub mod status;

pub use args::{GlobalOptions, HistoryFilterArgs, OutputFormat};
pub use context::CommandContext;

use crate::client::models::{
    DEFAULT_SCAN_TIMEOUT, ExportFormat, ReportDetail, TrendPeriod,
};

/// Watchdog - client for the Watchdog web security scan engine
#[derive(Parser, Debug)]
#[command(name = "watchdog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json) [default: table]
    #[arg(
        long,
        global = true,
        env = "WATCHDOG_FORMAT",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: Option<OutputFormat>,

    /// Override config file location
    #[arg(long, global = true, env = "WATCHDOG_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Scan engine URL (overrides the config file)
    #[arg(long, global = true, env = "WATCHDOG_API_URL", hide_env = true)]
    pub api_url: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "WATCHDOG_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Watchdog configuration
    Init,

    /// Show configuration status
    Status,

    /// Display version information
    Version,

    /// Start, follow and cancel scans
    #[command(subcommand)]
    Scan(ScanCommands),

    /// Browse, delete and export past scans
    #[command(subcommand)]
    History(HistoryCommands),

    /// Manage AI provider API keys
    #[command(subcommand)]
    Keys(KeysCommands),

    /// View and change engine settings
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Show scan statistics
    Dashboard {
        /// Include trends grouped by period
        #[arg(long, value_enum)]
        trends: Option<TrendPeriod>,

        /// Use statistics computed by the engine
        #[arg(long)]
        remote: bool,
    },
}

/// Scan lifecycle subcommands
#[derive(Subcommand, Debug)]
pub enum ScanCommands {
    /// Start a scan of a URL or bare hostname
    Start {
        /// Target URL (bare hosts get https://)
        target: String,

        /// Engine-side timeout in seconds (60-1800)
        #[arg(long, short = 't', default_value_t = DEFAULT_SCAN_TIMEOUT)]
        timeout: u32,

        /// Run the comprehensive (slower) analysis
        #[arg(long)]
        deep: bool,

        /// Skip SSL/TLS analysis
        #[arg(long)]
        no_ssl: bool,

        /// Skip known-vulnerability checks
        #[arg(long)]
        no_vuln: bool,

        /// Skip technology fingerprinting
        #[arg(long)]
        no_tech: bool,

        /// Skip DNS record collection
        #[arg(long)]
        no_dns: bool,

        /// Follow progress until the scan finishes
        #[arg(long, short = 'w')]
        wait: bool,
    },

    /// Show the current state of a scan
    Status {
        /// Scan ID
        id: String,
    },

    /// Follow a scan until it finishes
    Watch {
        /// Scan ID
        id: String,
    },

    /// Cancel a pending or running scan
    Cancel {
        /// Scan ID
        id: String,
    },

    /// Show the result of a completed scan
    Result {
        /// Scan ID
        id: String,
    },
}

/// History subcommands
#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List past scans
    List {
        #[command(flatten)]
        filters: HistoryFilterArgs,

        /// Maximum results to show
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Search scans on the engine
    Search {
        /// Text to match
        query: String,
    },

    /// Delete scans by ID, or every scan matching filters
    Delete {
        /// Scan IDs (comma-separated or repeated)
        #[arg(value_delimiter = ',', required_unless_present = "matching")]
        ids: Vec<String>,

        /// Delete every scan matching the filter flags
        #[arg(long, conflicts_with = "ids")]
        matching: bool,

        #[command(flatten)]
        filters: HistoryFilterArgs,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Export a report for a completed scan
    Export {
        /// Scan ID
        id: String,

        /// Report format
        #[arg(long = "type", value_enum, default_value = "pdf")]
        export_format: ExportFormat,

        /// Include the AI analysis
        #[arg(long)]
        include_ai: bool,

        /// Include charts
        #[arg(long)]
        charts: bool,
    },

    /// Generate an AI analysis of a completed scan
    Report {
        /// Scan ID
        id: String,

        /// Level of detail
        #[arg(long, value_enum, default_value = "detailed")]
        detail: ReportDetail,
    },
}

/// API key subcommands
#[derive(Subcommand, Debug)]
pub enum KeysCommands {
    /// List providers and their keys (masked)
    List {
        /// Show keys in clear text
        #[arg(long)]
        show: bool,
    },

    /// Save a key for a provider
    Set {
        /// Provider key (openai, gemini, claude, ...)
        provider: String,

        /// Key value (prompted when omitted)
        #[arg(long)]
        key: Option<String>,

        /// Test the key before saving it
        #[arg(long)]
        test: bool,
    },

    /// Check a key without saving it
    Test {
        /// Provider key
        provider: String,

        /// Key to test (defaults to the saved key)
        #[arg(long)]
        key: Option<String>,
    },

    /// Add a custom provider
    Add {
        /// Display name; the provider key is derived from it
        name: String,

        /// Provider API endpoint
        #[arg(long)]
        endpoint: String,

        /// Short description
        #[arg(long)]
        description: Option<String>,

        /// Key value (prompted when omitted)
        #[arg(long)]
        key: Option<String>,
    },

    /// Remove a custom provider
    Remove {
        /// Provider key
        provider: String,
    },
}

/// Engine settings subcommands
#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show the engine's settings
    Show,

    /// Change settings (e.g., `default-timeout=600 theme=light`)
    Set {
        /// key=value pairs
        #[arg(required = true)]
        assignments: Vec<String>,

        /// Show what would change without saving
        #[arg(long)]
        dry_run: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan_start() {
        let cli = Cli::parse_from(["watchdog", "scan", "start", "example.com", "--deep", "-t", "900"]);
        match cli.command {
            Commands::Scan(ScanCommands::Start {
                target,
                timeout,
                deep,
                wait,
                ..
            }) => {
                assert_eq!(target, "example.com");
                assert_eq!(timeout, 900);
                assert!(deep);
                assert!(!wait);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_history_delete_ids() {
        let cli = Cli::parse_from(["watchdog", "history", "delete", "a,b", "c", "--yes"]);
        match cli.command {
            Commands::History(HistoryCommands::Delete { ids, yes, matching, .. }) => {
                assert_eq!(ids, vec!["a", "b", "c"]);
                assert!(yes);
                assert!(!matching);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_history_delete_matching() {
        let cli = Cli::parse_from(["watchdog", "history", "delete", "--matching", "--status", "failed"]);
        match cli.command {
            Commands::History(HistoryCommands::Delete { ids, matching, filters, .. }) => {
                assert!(ids.is_empty());
                assert!(matching);
                assert_eq!(filters.to_filter().status, crate::history::StatusFilter::Failed);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_delete_requires_ids_or_matching() {
        assert!(Cli::try_parse_from(["watchdog", "history", "delete"]).is_err());
    }

    #[test]
    fn test_parse_dashboard_trends() {
        let cli = Cli::parse_from(["watchdog", "dashboard", "--trends", "weekly"]);
        assert!(matches!(
            cli.command,
            Commands::Dashboard {
                trends: Some(TrendPeriod::Weekly),
                remote: false
            }
        ));
    }
}
