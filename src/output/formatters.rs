//! Reusable formatting utilities for CLI output
//!
//! Timestamps, durations, progress and status values shared by the display
//! models.

use chrono::{DateTime, Local, Utc};
use colored::{ColoredString, Colorize};

use crate::client::models::{ScanStatus, SecurityGrade};

/// Format a UTC timestamp in local time.
///
/// # Example output
/// `01/15/2025 14:30`
pub fn format_timestamp_local(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%m/%d/%Y %H:%M")
        .to_string()
}

/// Format a timestamp relative to `now` (e.g., "5m ago", "2h ago").
pub fn format_relative_time(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let seconds = now.signed_duration_since(*timestamp).num_seconds();
    if seconds < 0 {
        return "just now".to_string();
    }

    match seconds {
        0..=59 => format!("{}s ago", seconds),
        60..=3599 => format!("{}m ago", seconds / 60),
        3600..=86_399 => format!("{}h ago", seconds / 3600),
        _ => format!("{}d ago", seconds / 86_400),
    }
}

/// Format a duration in seconds.
///
/// Returns "--" for zero.
///
/// # Example output
/// - `2h 15m` (hours, minutes)
/// - `5m 10s` (minutes, seconds)
/// - `45s` (seconds only)
pub fn format_duration_seconds(secs: u64) -> String {
    if secs == 0 {
        return "--".to_string();
    }

    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;

    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Format progress as a whole percentage.
pub fn format_progress(progress: f64) -> String {
    format!("{:.0}%", progress.clamp(0.0, 100.0))
}

/// Status label colored for pretty output.
pub fn colorize_status(status: ScanStatus) -> ColoredString {
    let label = status.as_str();
    match status {
        ScanStatus::Pending => label.dimmed(),
        ScanStatus::Running => label.cyan(),
        ScanStatus::Completed => label.green(),
        ScanStatus::Failed => label.red(),
        ScanStatus::Cancelled => label.yellow(),
    }
}

/// Score with its grade, colored by band (e.g., "87/100 (A)").
pub fn colorize_score(score: u32) -> ColoredString {
    let text = format!("{}/100 ({})", score, SecurityGrade::from_score(score));
    match score {
        80.. => text.green(),
        60..=79 => text.yellow(),
        _ => text.red(),
    }
}
