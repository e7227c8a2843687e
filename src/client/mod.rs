//! Watchdog scan engine client
//!
//! The engine is reached through the [`WatchdogApi`] trait so the core
//! components can run against [`WatchdogClient`] in production and the
//! in-crate mock in tests.

pub mod api;
#[cfg(test)]
pub mod fixtures;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod parallel;
pub mod watchdog;

pub use api::{HistoryApi, ScanApi, SettingsApi};
#[cfg(test)]
pub use mock::MockWatchdogClient;
pub use parallel::BatchOutcome;
pub use watchdog::{DEFAULT_API_URL, WatchdogClient};

/// The full scan engine surface.
///
/// Implemented automatically for any type providing every sub-trait.
pub trait WatchdogApi: ScanApi + HistoryApi + SettingsApi {}

impl<T: ScanApi + HistoryApi + SettingsApi> WatchdogApi for T {}
