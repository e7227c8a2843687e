//! API trait definitions split by responsibility
//!
//! The scan engine surface is organized into focused sub-traits:
//! - [`ScanApi`] - Scan lifecycle operations
//! - [`HistoryApi`] - Stored scan queries, deletes and reports
//! - [`SettingsApi`] - Provider keys and application configuration
//!
//! The [`WatchdogApi`](super::WatchdogApi) super-trait combines all three.

mod history;
mod scan;
mod settings;

pub use history::HistoryApi;
pub use scan::ScanApi;
pub use settings::SettingsApi;
