//! Watchdog CLI - scan session controller and history browser for the Watchdog scan engine

use clap::Parser;

mod cli;
mod client;
mod config;
mod credentials;
mod dashboard;
mod error;
mod history;
mod models;
mod output;
mod session;
mod settings;
mod store;

use cli::history::DeleteArgs;
use cli::keys::AddArgs;
use cli::scan::StartArgs;
use cli::{
    Cli, Commands, GlobalOptions, HistoryCommands, KeysCommands, ScanCommands, SettingsCommands,
};
use client::models::ExportOptions;
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Init => cli::init::run(&opts).await,
        Commands::Status => cli::status::run(&opts),
        Commands::Version => {
            println!("watchdog version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Scan(scan_cmd) => match scan_cmd {
            ScanCommands::Start {
                target,
                timeout,
                deep,
                no_ssl,
                no_vuln,
                no_tech,
                no_dns,
                wait,
            } => {
                let args = StartArgs {
                    target,
                    timeout,
                    deep,
                    no_ssl,
                    no_vuln,
                    no_tech,
                    no_dns,
                    wait,
                };
                cli::scan::start(&opts, &args).await
            }
            ScanCommands::Status { id } => cli::scan::status(&opts, &id).await,
            ScanCommands::Watch { id } => cli::scan::watch(&opts, &id).await,
            ScanCommands::Cancel { id } => cli::scan::cancel(&opts, &id).await,
            ScanCommands::Result { id } => cli::scan::result(&opts, &id).await,
        },
        Commands::History(history_cmd) => match history_cmd {
            HistoryCommands::List { filters, limit } => {
                cli::history::list(&opts, &filters, limit).await
            }
            HistoryCommands::Search { query } => cli::history::search(&opts, &query).await,
            HistoryCommands::Delete {
                ids,
                matching,
                filters,
                yes,
            } => {
                let args = DeleteArgs {
                    ids,
                    matching,
                    filters,
                    yes,
                };
                cli::history::delete(&opts, &args).await
            }
            HistoryCommands::Export {
                id,
                export_format,
                include_ai,
                charts,
            } => {
                let options = ExportOptions {
                    include_ai,
                    include_charts: charts,
                };
                cli::history::export(&opts, &id, export_format, options).await
            }
            HistoryCommands::Report { id, detail } => {
                cli::history::report(&opts, &id, detail).await
            }
        },
        Commands::Keys(keys_cmd) => match keys_cmd {
            KeysCommands::List { show } => cli::keys::list(&opts, show).await,
            KeysCommands::Set {
                provider,
                key,
                test,
            } => cli::keys::set(&opts, &provider, key, test).await,
            KeysCommands::Test { provider, key } => cli::keys::test(&opts, &provider, key).await,
            KeysCommands::Add {
                name,
                endpoint,
                description,
                key,
            } => {
                let args = AddArgs {
                    name,
                    endpoint,
                    description,
                    key,
                };
                cli::keys::add(&opts, &args).await
            }
            KeysCommands::Remove { provider } => cli::keys::remove(&opts, &provider).await,
        },
        Commands::Settings(settings_cmd) => match settings_cmd {
            SettingsCommands::Show => cli::settings::show(&opts).await,
            SettingsCommands::Set {
                assignments,
                dry_run,
            } => cli::settings::set(&opts, &assignments, dry_run).await,
        },
        Commands::Dashboard { trends, remote } => {
            cli::dashboard::run(&opts, trends, remote).await
        }
    }
}

/// Warnings by default, everything with `--debug`; `RUST_LOG` wins when set.
fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
