//! Engine settings commands

use colored::Colorize;

use crate::cli::CommandContext;
use crate::cli::args::GlobalOptions;
use crate::client::models::{AppConfig, AppConfigUpdate, ReportDetail};
use crate::error::{Result, ValidationError};
use crate::models::SettingDisplay;
use crate::output::Formattable;

/// Show the engine's saved settings
pub async fn show(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let mut draft = ctx.settings();
    let config = draft.load().await?;

    SettingDisplay::rows(config).print(ctx.format)
}

/// Apply `key=value` assignments in a single update
///
/// With `dry_run` the edits are validated and the affected rows shown,
/// but nothing is sent.
pub async fn set(opts: &GlobalOptions, assignments: &[String], dry_run: bool) -> Result<()> {
    if assignments.is_empty() {
        return Err(ValidationError::MissingField("Setting").into());
    }

    // Parse everything before touching the engine
    let updates = assignments
        .iter()
        .map(|a| parse_assignment(a))
        .collect::<Result<Vec<_>>>()?;

    let ctx = CommandContext::new(opts)?;
    let mut draft = ctx.settings();
    draft.load().await?;
    for update in updates {
        draft.stage(update);
    }

    if dry_run {
        draft.pending().validate()?;
        let rows = changed_rows(draft.saved(), &draft.preview());
        draft.discard();

        if rows.is_empty() {
            eprintln!("Settings already match; nothing to change");
            return Ok(());
        }
        eprintln!("{} Dry run, settings not saved", "⚠".yellow());
        return rows.print(ctx.format);
    }

    let config = draft.commit().await?;
    let rows = SettingDisplay::rows(config);

    eprintln!("{} Settings updated", "✓".green());
    rows.print(ctx.format)
}

/// Rows of `after` whose value differs from `before`.
fn changed_rows(before: &AppConfig, after: &AppConfig) -> Vec<SettingDisplay> {
    let before = SettingDisplay::rows(before);
    SettingDisplay::rows(after)
        .into_iter()
        .zip(before)
        .filter(|(new, old)| new.value != old.value)
        .map(|(new, _)| new)
        .collect()
}

/// Parse one `key=value` pair into a partial update.
fn parse_assignment(assignment: &str) -> Result<AppConfigUpdate> {
    let (key, value) = assignment
        .split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .ok_or_else(|| invalid(assignment, "expected key=value"))?;

    let mut update = AppConfigUpdate::default();
    match key {
        "theme" => update.theme = Some(value.to_string()),
        "default-timeout" => update.default_timeout = Some(parse_number(key, value)?),
        "max-concurrent-scans" => update.max_concurrent_scans = Some(parse_number(key, value)?),
        "enable-deep-scan" => update.enable_deep_scan = Some(parse_bool(key, value)?),
        "retry-failed-scans" => update.retry_failed_scans = Some(parse_bool(key, value)?),
        "max-stored-scans" => update.max_stored_scans = Some(parse_number(key, value)?),
        "auto-delete-old-scans" => update.auto_delete_old_scans = Some(parse_bool(key, value)?),
        "export-path" => update.export_path = Some(value.to_string()),
        "default-ai-provider" => update.default_ai_provider = Some(value.to_string()),
        "ai-report-detail" => {
            let detail = <ReportDetail as clap::ValueEnum>::from_str(value, true)
                .map_err(|_| invalid(assignment, "expected basic, detailed or comprehensive"))?;
            update.ai_report_detail = Some(detail);
        }
        "auto-generate-ai-report" => {
            update.auto_generate_ai_report = Some(parse_bool(key, value)?)
        }
        _ => return Err(invalid(assignment, "unknown setting").into()),
    }
    Ok(update)
}

fn parse_number(key: &str, value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| invalid(key, "expected a whole number").into())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(key, "expected true or false").into()),
    }
}

fn invalid(input: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidSetting(format!("`{}`: {}", input, reason))
}
