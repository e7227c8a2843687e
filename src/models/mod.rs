//! Display models for CLI output
//!
//! This module provides shared display model abstractions for converting
//! engine response types into CLI-friendly display formats.

pub mod display;

pub use display::{
    AiReportView, CredentialDisplay, DashboardView, ScanDetail, ScanDisplay, ScanResultView,
    SettingDisplay,
};
