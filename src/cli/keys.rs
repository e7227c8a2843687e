//! AI provider key commands

use colored::Colorize;
use dialoguer::{Password, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::{SettingsApi, WatchdogClient};
use crate::credentials::CredentialManager;
use crate::error::{Result, ValidationError};
use crate::models::CredentialDisplay;
use crate::output::Formattable;

/// List providers and their (masked) keys
pub async fn list(opts: &GlobalOptions, show: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let manager = ctx.credentials();
    manager.load().await?;

    if show {
        for entry in manager.entries_snapshot() {
            if entry.is_configured() {
                manager.toggle_visibility(&entry.provider_key)?;
            }
        }
    }

    let rows: Vec<CredentialDisplay> = manager
        .entries_snapshot()
        .iter()
        .map(CredentialDisplay::from)
        .collect();
    rows.print(ctx.format)
}

/// Save a key for a provider, prompting when no value is given
pub async fn set(opts: &GlobalOptions, provider: &str, key: Option<String>, test_first: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let manager = ctx.credentials();
    manager.load().await?;

    let key = match key {
        Some(key) => key,
        None => prompt_key(provider)?,
    };
    manager.set_pending(provider, key)?;

    if test_first && !manager.test_pending(provider).await? {
        return Err(ValidationError::InvalidKey(provider.to_string()).into());
    }

    manager.save(provider).await?;
    report_saved(&manager, provider, ctx.format)
}

/// Check a key against the provider without saving it
pub async fn test(opts: &GlobalOptions, provider: &str, key: Option<String>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let manager = ctx.credentials();
    manager.load().await?;

    let valid = match key {
        Some(key) => manager.test(provider, &key).await?,
        None => manager.test_pending(provider).await?,
    };

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "provider": provider, "valid": valid })),
        _ if valid => println!("{} Key for {} is valid", "✓".green(), provider.bold()),
        _ => println!("{} Key for {} was rejected", "✗".red(), provider.bold()),
    }

    if !valid {
        return Err(ValidationError::InvalidKey(provider.to_string()).into());
    }
    Ok(())
}

/// Options for `keys add`
#[derive(Debug, Clone)]
pub struct AddArgs {
    pub name: String,
    pub endpoint: String,
    pub description: Option<String>,
    pub key: Option<String>,
}

/// Register a custom provider and store its key on the engine
pub async fn add(opts: &GlobalOptions, args: &AddArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let manager = ctx.credentials();
    manager.load().await?;

    let provider = manager.add_custom(&args.name, &args.endpoint, args.description.as_deref())?;

    let key = match &args.key {
        Some(key) => key.clone(),
        None => prompt_key(&provider)?,
    };
    manager.set_pending(&provider, key)?;
    manager.save(&provider).await?;

    report_saved(&manager, &provider, ctx.format)
}

/// Remove a custom provider and clear its stored key
pub async fn remove(opts: &GlobalOptions, provider: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let manager = ctx.credentials();
    manager.load().await?;

    let removed = manager.remove_custom(provider)?;
    // The engine has no delete call; an empty key drops the provider on reload
    ctx.client.save_api_key(&removed.provider_key, "").await?;

    println!("{} Removed provider {}", "✓".green(), removed.display_name.bold());
    Ok(())
}

fn prompt_key(provider: &str) -> Result<String> {
    let key = Password::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("API key for {}", provider))
        .interact()?;
    Ok(key)
}

fn report_saved(
    manager: &CredentialManager<WatchdogClient>,
    provider: &str,
    format: OutputFormat,
) -> Result<()> {
    let entry = manager
        .get(provider)
        .ok_or_else(|| ValidationError::UnknownProvider(provider.to_string()))?;

    match format {
        OutputFormat::Json => vec![CredentialDisplay::from(&entry)].print(format),
        _ => {
            println!(
                "{} Saved key for {} ({})",
                "✓".green(),
                entry.display_name.bold(),
                entry.display_value()
            );
            Ok(())
        }
    }
}
