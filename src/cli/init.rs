//! Init command implementation

use colored::Colorize;
use dialoguer::{Confirm, Input, Password, Select, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::client::{DEFAULT_API_URL, HistoryApi, WatchdogClient};
use crate::config::Config;
use crate::error::Result;

const FORMATS: [&str; 3] = ["table", "pretty", "json"];

/// Run the init command
///
/// Prompts for the engine URL, an optional token and the default output
/// format, checks the engine is reachable and writes the config file.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let theme = ColorfulTheme::default();
    let mut config = Config::load_or_default_at(opts.config_ref()).unwrap_or_default();

    println!("{}", "Welcome to Watchdog!".bold().green());
    println!("Let's connect to your scan engine.\n");

    let default_url = opts
        .api_url_ref()
        .or(config.api_url.as_deref())
        .unwrap_or(DEFAULT_API_URL)
        .to_string();

    let api_url: String = Input::with_theme(&theme)
        .with_prompt("Scan engine URL")
        .default(default_url)
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            url::Url::parse(input)
                .map(|_| ())
                .map_err(|e| format!("Invalid URL: {}", e))
        })
        .interact_text()?;

    let needs_token = Confirm::with_theme(&theme)
        .with_prompt("Does the engine require an API token?")
        .default(config.api_token.is_some())
        .interact()?;

    let api_token = if needs_token {
        let token: String = Password::with_theme(&theme)
            .with_prompt("API token")
            .interact()?;
        Some(token).filter(|t| !t.is_empty())
    } else {
        None
    };

    let current_format = config.preferences.format.as_deref().unwrap_or("table");
    let default_index = FORMATS.iter().position(|f| *f == current_format).unwrap_or(0);
    let format_index = Select::with_theme(&theme)
        .with_prompt("Default output format")
        .items(&FORMATS)
        .default(default_index)
        .interact()?;

    // Reachability check before saving
    println!("\n{}", "Contacting scan engine...".cyan());
    let client = WatchdogClient::new(&api_url, api_token.clone())?;
    match client.get_all_scans().await {
        Ok(scans) => println!(
            "{} Connected to {} ({} scan(s) in history)",
            "✓".green(),
            client.base_url(),
            scans.len()
        ),
        Err(e) => {
            println!("{} Could not reach the engine: {}", "⚠".yellow(), e);
            let save_anyway = Confirm::with_theme(&theme)
                .with_prompt("Save the configuration anyway?")
                .default(true)
                .interact()?;
            if !save_anyway {
                println!("Cancelled.");
                return Ok(());
            }
        }
    }

    config.api_url = Some(api_url);
    config.api_token = api_token;
    config.preferences.format = Some(FORMATS[format_index].to_string());
    config.validate()?;

    let path = config.save_at(opts.config_ref())?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "watchdog status".cyan());
    println!("  {} - Scan a site", "watchdog scan start example.com --wait".cyan());
    println!("  {} - Browse past scans", "watchdog history list".cyan());

    Ok(())
}
