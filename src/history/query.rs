//! Pure filtering and sorting over a scan collection

use chrono::{DateTime, Duration, Months, TimeZone, Utc};

use crate::client::models::{ScanSession, ScanStatus};

/// Status filter for history queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl StatusFilter {
    fn matches(self, status: ScanStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => status == ScanStatus::Pending,
            StatusFilter::Running => status == ScanStatus::Running,
            StatusFilter::Completed => status == ScanStatus::Completed,
            StatusFilter::Failed => status == ScanStatus::Failed,
            StatusFilter::Cancelled => status == ScanStatus::Cancelled,
        }
    }
}

/// Start-time window for history queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DateFilter {
    #[default]
    All,
    /// Since the start of the current day in the caller's time zone
    Today,
    /// The last 7 days
    Week,
    /// The last calendar month
    Month,
}

impl DateFilter {
    /// Earliest accepted start time, or `None` for no lower bound.
    fn cutoff<Tz: TimeZone>(self, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
        let now_utc = now.with_timezone(&Utc);
        match self {
            DateFilter::All => None,
            DateFilter::Today => {
                let midnight = now.date_naive().and_hms_opt(0, 0, 0)?;
                let start = now
                    .timezone()
                    .from_local_datetime(&midnight)
                    .earliest()
                    .map(|t| t.with_timezone(&Utc))
                    .unwrap_or(now_utc - Duration::days(1));
                Some(start)
            }
            DateFilter::Week => Some(now_utc - Duration::days(7)),
            DateFilter::Month => Some(
                now_utc
                    .checked_sub_months(Months::new(1))
                    .unwrap_or(now_utc - Duration::days(30)),
            ),
        }
    }
}

/// Sort order for history queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortBy {
    #[default]
    Newest,
    Oldest,
    ScoreHigh,
    ScoreLow,
    UrlAscending,
}

/// Parameters of a history view. Holds no results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub search_term: String,
    pub status: StatusFilter,
    pub date: DateFilter,
    pub sort_by: SortBy,
}

impl HistoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match target URL or ID, case-insensitively. The term is used as typed.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn date(mut self, date: DateFilter) -> Self {
        self.date = date;
        self
    }

    pub fn sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }
}

/// Filter and sort `sessions` without touching them.
///
/// `now` fixes the reference instant (and, for [`DateFilter::Today`], the
/// time zone whose day boundary applies). Sorting is stable, and sessions
/// without a score sort as score 0.
pub fn project<'a, Tz: TimeZone>(
    sessions: &'a [ScanSession],
    filter: &HistoryFilter,
    now: &DateTime<Tz>,
) -> Vec<&'a ScanSession> {
    let needle = filter.search_term.to_lowercase();
    let cutoff = filter.date.cutoff(now);

    let mut view: Vec<&ScanSession> = sessions
        .iter()
        .filter(|s| {
            needle.is_empty()
                || s.target.to_lowercase().contains(&needle)
                || s.id.to_lowercase().contains(&needle)
        })
        .filter(|s| filter.status.matches(s.status))
        .filter(|s| cutoff.is_none_or(|c| s.start_time >= c))
        .collect();

    let score = |s: &ScanSession| s.security_score().unwrap_or(0);
    match filter.sort_by {
        SortBy::Newest => view.sort_by(|a, b| b.start_time.cmp(&a.start_time)),
        SortBy::Oldest => view.sort_by(|a, b| a.start_time.cmp(&b.start_time)),
        SortBy::ScoreHigh => view.sort_by(|a, b| score(b).cmp(&score(a))),
        SortBy::ScoreLow => view.sort_by(|a, b| score(a).cmp(&score(b))),
        SortBy::UrlAscending => view.sort_by_cached_key(|s| s.target.to_lowercase()),
    }

    view
}
