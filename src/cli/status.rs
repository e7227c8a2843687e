//! Status command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::context::resolve_format;
use crate::config::Config;
use crate::error::Result;

/// Run the status command to display the resolved configuration
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "Watchdog Configuration Status".bold());

    let config_path = Config::resolve_path(opts.config_ref())?;
    let config = if config_path.exists() {
        println!("Config file: {}", config_path.display().to_string().cyan());
        Config::load_from(&config_path)?
    } else {
        println!(
            "{} No config file at {} (using defaults)",
            "○".dimmed(),
            config_path.display()
        );
        println!("  → Run 'watchdog init' to create one");
        Config::default()
    };

    println!();

    match opts.api_url_ref() {
        Some(url) => println!(
            "{} Scan engine: {} {}",
            "✓".green(),
            url.cyan(),
            "(override)".dimmed()
        ),
        None => println!("{} Scan engine: {}", "✓".green(), config.api_url().cyan()),
    }

    if config.api_token.is_some() {
        println!("{} API token configured", "✓".green());
    } else {
        println!("{} No API token (not required by local engines)", "○".dimmed());
    }

    let format = resolve_format(opts.format, &config);
    println!(
        "{} Output format: {}",
        "○".dimmed(),
        format!("{:?}", format).to_lowercase()
    );
    println!(
        "{} Poll interval: {} ms",
        "○".dimmed(),
        config.preferences.poll_interval_ms
    );
    println!(
        "{} Delete concurrency: {}",
        "○".dimmed(),
        config.preferences.delete_concurrency
    );

    println!();
    Ok(())
}
