//! Dashboard command

use log::debug;

use crate::cli::CommandContext;
use crate::cli::args::GlobalOptions;
use crate::client::models::TrendPeriod;
use crate::dashboard::RECENT_SCANS;
use crate::error::Result;
use crate::models::{DashboardView, ScanDisplay};
use crate::output::Formattable;

/// Show statistics, recent scans and optional trends
pub async fn run(opts: &GlobalOptions, trends: Option<TrendPeriod>, remote: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let history = ctx.history();
    history.load().await?;

    let dashboard = ctx.dashboard();
    let stats = if remote {
        debug!("Using engine-computed statistics");
        dashboard.remote_stats().await?
    } else {
        dashboard.stats().await
    };

    let recent = dashboard.recent(RECENT_SCANS).await;
    let trends = match trends {
        Some(period) => dashboard.trends(period).await,
        None => Vec::new(),
    };

    DashboardView {
        stats,
        recent: recent.iter().map(ScanDisplay::from).collect(),
        recent_started: recent.iter().map(|s| s.start_time).collect(),
        trends,
    }
    .print(ctx.format)
}
