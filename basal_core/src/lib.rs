#![forbid(unsafe_code)]

//! Ovulation detection and cycle prediction from basal body temperature.
//!
//! This crate provides:
//! - Domain types (readings, flow entries, ovulation results, windows)
//! - Series normalization and the Sensiplan cover line
//! - The 3-over-6 rule engine with its two exception rules
//! - Cycle segmentation, prediction and fertility windows
//! - Statistics and a current-cycle overview
//! - CSV entry storage, configuration and logging for callers

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod series;
pub mod cover_line;
pub mod detection;
pub mod cycles;
pub mod prediction;
pub mod fertility;
pub mod phase;
pub mod stats;
pub mod overview;
pub mod chart;
pub mod store;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use cover_line::calculate_cover_line;
pub use detection::{detect_all_ovulations, detect_ovulation};
pub use cycles::cycle_starts;
pub use prediction::{analyze_history, combine_ovulations_with_predictions};
pub use fertility::{
    fertility_status, fertility_status_multi, fertility_window, future_windows,
    predict_next_ovulation, predict_next_period,
};
pub use overview::{cycle_overview, CycleOverview};
pub use store::{DayEntry, EntryStore};
