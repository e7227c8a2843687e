//! Filter argument types for CLI commands

use clap::Args;

use crate::history::{DateFilter, HistoryFilter, SortBy, StatusFilter};

/// Filter arguments for history commands.
#[derive(Args, Debug, Default, Clone)]
pub struct HistoryFilterArgs {
    /// Match target URL or scan ID (case-insensitive)
    #[arg(long, short = 'q')]
    pub search: Option<String>,

    /// Filter by status
    #[arg(long, short = 's', value_enum, default_value = "all", hide_default_value = true)]
    pub status: StatusFilter,

    /// Filter by start time (today, week, month)
    #[arg(long, short = 'd', value_enum, default_value = "all", hide_default_value = true)]
    pub date: DateFilter,

    /// Sort order
    #[arg(long, value_enum, default_value = "newest", hide_default_value = true)]
    pub sort: SortBy,
}

impl HistoryFilterArgs {
    /// Convert to the engine's filter.
    pub fn to_filter(&self) -> HistoryFilter {
        HistoryFilter::new()
            .search(self.search.clone().unwrap_or_default())
            .status(self.status)
            .date(self.date)
            .sort_by(self.sort)
    }
}
