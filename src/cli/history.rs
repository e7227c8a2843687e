//! Scan history commands

use colored::Colorize;
use dialoguer::Confirm;
use log::debug;
use serde::Serialize;

use crate::cli::args::{GlobalOptions, HistoryFilterArgs};
use crate::cli::{CommandContext, OutputFormat};
use crate::client::BatchOutcome;
use crate::client::models::{ExportFormat, ExportOptions, ReportDetail};
use crate::error::{Result, ValidationError};
use crate::models::{AiReportView, ScanDisplay};
use crate::output::{Formattable, json};

/// List scans from the engine's history
pub async fn list(opts: &GlobalOptions, filters: &HistoryFilterArgs, limit: Option<usize>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let engine = ctx.history();

    let summary = engine.load().await?;
    debug!("Loaded history: {:?}", summary);

    let sessions = engine.query(&filters.to_filter()).await;
    let rows: Vec<ScanDisplay> = sessions
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(ScanDisplay::from)
        .collect();

    rows.print(ctx.format)
}

/// Search scans on the engine
pub async fn search(opts: &GlobalOptions, query: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let sessions = ctx.history().search_remote(query).await?;

    let rows: Vec<ScanDisplay> = sessions.iter().map(ScanDisplay::from).collect();
    rows.print(ctx.format)
}

/// Options for `history delete`
#[derive(Debug, Clone, Default)]
pub struct DeleteArgs {
    pub ids: Vec<String>,
    /// Delete every scan matching `filters` instead of explicit IDs
    pub matching: bool,
    pub filters: HistoryFilterArgs,
    pub yes: bool,
}

#[derive(Serialize)]
struct DeleteReport<'a> {
    deleted: &'a [String],
    failed: Vec<FailedItem<'a>>,
}

#[derive(Serialize)]
struct FailedItem<'a> {
    id: &'a str,
    reason: &'a str,
}

/// Delete scans by ID or by filter
pub async fn delete(opts: &GlobalOptions, args: &DeleteArgs) -> Result<()> {
    if args.ids.is_empty() && !args.matching {
        return Err(ValidationError::MissingField("Scan ID").into());
    }

    let ctx = CommandContext::new(opts)?;
    let engine = ctx.history();
    engine.load().await?;

    let targets = if args.matching {
        if engine.select_all(&args.filters.to_filter()).await == 0 {
            eprintln!("No scans match the given filters.");
            return Ok(());
        }
        engine.selected().await
    } else {
        args.ids.clone()
    };

    if !args.yes {
        eprintln!(
            "{} Delete {} scan(s)? This cannot be undone.",
            "⚠".yellow(),
            targets.len()
        );
        for id in targets.iter().take(10) {
            eprintln!("  {}", id);
        }
        if targets.len() > 10 {
            eprintln!("  … and {} more", targets.len() - 10);
        }

        let confirm = Confirm::new()
            .with_prompt("Confirm deletion?")
            .default(false)
            .interact()?;

        if !confirm {
            eprintln!("Cancelled.");
            return Ok(());
        }
    }

    let outcome = if args.matching {
        engine.delete_selected().await
    } else {
        engine.delete(&targets).await
    };

    print_outcome(&outcome, ctx.format)?;
    outcome.into_result()?;
    Ok(())
}

fn print_outcome(outcome: &BatchOutcome, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        let report = DeleteReport {
            deleted: &outcome.succeeded,
            failed: outcome
                .failed
                .iter()
                .map(|f| FailedItem {
                    id: &f.id,
                    reason: &f.reason,
                })
                .collect(),
        };
        println!("{}", json::format_json(&report)?);
        return Ok(());
    }

    for id in &outcome.succeeded {
        println!("{} Deleted {}", "✓".green(), id);
    }
    for failure in &outcome.failed {
        println!("{} {}: {}", "✗".red(), failure.id, failure.reason);
    }
    Ok(())
}

/// Export a report for a completed scan
pub async fn export(
    opts: &GlobalOptions,
    id: &str,
    format: ExportFormat,
    options: ExportOptions,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let engine = ctx.history();
    engine.load().await?;

    let filename = engine.export(id, format, &options).await?;

    match ctx.format {
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct Exported<'a> {
                id: &'a str,
                filename: &'a str,
            }
            println!(
                "{}",
                json::format_json(&Exported {
                    id,
                    filename: &filename
                })?
            );
        }
        _ => println!("{} Report written to {}", "✓".green(), filename.bold()),
    }
    Ok(())
}

/// Generate an AI analysis of a completed scan
pub async fn report(opts: &GlobalOptions, id: &str, detail: ReportDetail) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let engine = ctx.history();
    engine.load().await?;

    let report = engine.ai_report(id, detail).await?;
    AiReportView { report }.print(ctx.format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BatchFailure, Error};

    #[tokio::test]
    async fn test_delete_requires_ids_or_matching() {
        let err = delete(&GlobalOptions::default(), &DeleteArgs::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::MissingField("Scan ID"))
        ));
    }

    #[test]
    fn test_delete_report_json_shape() {
        let outcome = BatchOutcome {
            succeeded: vec!["a".to_string()],
            failed: vec![BatchFailure {
                id: "b".to_string(),
                reason: "locked".to_string(),
            }],
        };
        let report = DeleteReport {
            deleted: &outcome.succeeded,
            failed: outcome
                .failed
                .iter()
                .map(|f| FailedItem {
                    id: &f.id,
                    reason: &f.reason,
                })
                .collect(),
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["deleted"][0], "a");
        assert_eq!(value["failed"][0]["reason"], "locked");
    }
}
