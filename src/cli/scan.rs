//! Scan lifecycle commands

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::WatchdogClient;
use crate::client::models::{ScanOptions, ScanResult, ScanSession, ScanStatus};
use crate::error::{Result, ValidationError};
use crate::models::{ScanDetail, ScanResultView};
use crate::output::Formattable;
use crate::session::SessionManager;

/// Options for `scan start`
#[derive(Debug, Clone)]
pub struct StartArgs {
    pub target: String,
    pub timeout: u32,
    pub deep: bool,
    pub no_ssl: bool,
    pub no_vuln: bool,
    pub no_tech: bool,
    pub no_dns: bool,
    pub wait: bool,
}

impl StartArgs {
    fn options(&self) -> ScanOptions {
        let mut options = ScanOptions::new().timeout(self.timeout).deep(self.deep);
        options.enable_ssl = !self.no_ssl;
        options.enable_vuln_scan = !self.no_vuln;
        options.enable_tech_stack = !self.no_tech;
        options.enable_dns_info = !self.no_dns;
        options
    }
}

/// Start a scan, optionally waiting for it to finish
pub async fn start(opts: &GlobalOptions, args: &StartArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let manager = ctx.sessions();

    let id = manager.start(&args.target, args.options()).await?;

    if args.wait {
        if ctx.format != OutputFormat::Json {
            eprintln!("{} Started scan {}", "✓".green(), id.bold());
        }
        return follow(&manager, &id, ctx.format).await;
    }

    match ctx.format {
        OutputFormat::Json => {
            if let Some(session) = manager.store().get(&id).await {
                ScanDetail::new(session).print(ctx.format)?;
            }
        }
        _ => {
            println!("{} Started scan {}", "✓".green(), id.bold());
            println!(
                "  → Run '{}' to follow progress",
                format!("watchdog scan watch {}", id).cyan()
            );
        }
    }
    Ok(())
}

/// Show the current state of a scan
pub async fn status(opts: &GlobalOptions, id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let session = ctx.sessions().track(id).await?;
    ScanDetail::new(session).print(ctx.format)
}

/// Follow a scan until it reaches a terminal status
pub async fn watch(opts: &GlobalOptions, id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let manager = ctx.sessions();
    manager.track(id).await?;
    follow(&manager, id, ctx.format).await
}

/// Cancel a pending or running scan
pub async fn cancel(opts: &GlobalOptions, id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let manager = ctx.sessions();
    manager.track(id).await?;

    let session = manager.cancel(id).await?;
    match ctx.format {
        OutputFormat::Json => ScanDetail::new(session).print(ctx.format),
        _ => {
            println!("{} Scan {} is {}", "✓".green(), id.bold(), session.status);
            Ok(())
        }
    }
}

/// Show the result of a completed scan
pub async fn result(opts: &GlobalOptions, id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let session = ctx.sessions().track(id).await?;

    let result = completed_result(session)?;
    ScanResultView {
        id: id.to_string(),
        result,
    }
    .print(ctx.format)
}

fn completed_result(session: ScanSession) -> Result<ScanResult> {
    match (session.status, session.result) {
        (ScanStatus::Completed, Some(result)) => Ok(result),
        (status, _) => Err(ValidationError::InvalidState {
            id: session.id,
            status: status.to_string(),
            action: "viewing the result",
        }
        .into()),
    }
}

/// Watch `id`, rendering progress until it is terminal, then print it.
///
/// Ctrl-C stops watching; the scan keeps running on the engine.
async fn follow(manager: &SessionManager<WatchdogClient>, id: &str, format: OutputFormat) -> Result<()> {
    let mut handle = manager.watch(id).await?;
    let bar = progress_bar(format);
    let mut shown_logs = 0;
    render(&bar, &handle.latest(), &mut shown_logs);

    let interrupted = loop {
        tokio::select! {
            next = handle.changed() => match next {
                Some(session) => {
                    render(&bar, &session, &mut shown_logs);
                    if session.is_terminal() {
                        break false;
                    }
                }
                None => break false,
            },
            _ = tokio::signal::ctrl_c() => break true,
        }
    };

    bar.finish_and_clear();
    if interrupted {
        manager.stop().await;
    } else {
        manager.unwatch(id).await;
    }

    let last = handle.latest();
    if interrupted {
        debug!("Stopped watching {} at {}", id, last.status);
        eprintln!(
            "Stopped watching. Scan {} continues on the engine ({}).",
            id, last.status
        );
        return Ok(());
    }

    ScanDetail::new(last).print(format)
}

fn progress_bar(format: OutputFormat) -> ProgressBar {
    if format == OutputFormat::Json {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(100);
    let style = ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar.enable_steady_tick(std::time::Duration::from_millis(120));
    bar
}

/// Update the bar and print log lines not shown yet above it.
fn render(bar: &ProgressBar, session: &ScanSession, shown_logs: &mut usize) {
    bar.set_position(session.progress.clamp(0.0, 100.0) as u64);
    bar.set_message(
        session
            .current_step
            .clone()
            .unwrap_or_else(|| session.status.to_string()),
    );

    for entry in session.logs.get(*shown_logs..).unwrap_or_default() {
        bar.println(format!(
            "  {} {}",
            entry.timestamp.format("%H:%M:%S").to_string().dimmed(),
            entry.message
        ));
    }
    *shown_logs = session.logs.len();
}
