//! Core domain types for the basal temperature engine.
//!
//! This module defines the records the engine consumes and produces:
//! - Daily temperature readings and flow entries (inputs)
//! - Ovulation results, fertility windows and classifications (outputs)
//! - Display helpers shared by callers

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Input Records
// ============================================================================

/// Cervical mucus observation recorded alongside a temperature
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CervicalMucus {
    Dry,
    Sticky,
    Creamy,
    Watery,
    Eggwhite,
}

/// A single waking temperature measurement
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TemperatureReading {
    pub date: NaiveDate,
    /// Degrees Celsius, two significant decimals
    pub temperature: f64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub cervical_mucus: Option<CervicalMucus>,
}

impl TemperatureReading {
    pub fn new(date: NaiveDate, temperature: f64) -> Self {
        Self {
            date,
            temperature,
            notes: None,
            cervical_mucus: None,
        }
    }
}

/// Observed bleeding intensity
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlowIntensity {
    Spotting,
    Light,
    Medium,
    Heavy,
}

/// A day of observed menstrual bleeding
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlowEntry {
    pub date: NaiveDate,
    #[serde(alias = "flow_intensity")]
    pub intensity: FlowIntensity,
}

impl FlowEntry {
    pub fn new(date: NaiveDate, intensity: FlowIntensity) -> Self {
        Self { date, intensity }
    }
}

// ============================================================================
// Analysis Results
// ============================================================================

/// Cycle phase attached to an ovulation result
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OvulationPhase {
    Follicular,
    Ovulation,
    Luteal,
    Unknown,
}

/// Outcome of ovulation detection or prediction.
///
/// Detected results always carry `cover_line_temp`; predicted results never do.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OvulationResult {
    pub ovulation_date: Option<NaiveDate>,
    pub cover_line_temp: Option<f64>,
    pub phase: OvulationPhase,
    pub cycle_day: Option<u32>,
}

impl OvulationResult {
    /// Fewer readings than the rule engine needs
    pub fn unknown() -> Self {
        Self {
            ovulation_date: None,
            cover_line_temp: None,
            phase: OvulationPhase::Unknown,
            cycle_day: None,
        }
    }

    /// Enough readings, but no qualifying rise yet
    pub fn follicular() -> Self {
        Self {
            ovulation_date: None,
            cover_line_temp: None,
            phase: OvulationPhase::Follicular,
            cycle_day: None,
        }
    }

    /// True when the result came from a temperature shift rather than a calendar estimate
    pub fn is_detected(&self) -> bool {
        self.cover_line_temp.is_some()
    }
}

/// Fertile and peak date ranges around one ovulation.
///
/// Invariant: `start <= peak_start <= peak_end <= end`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FertilityWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub peak_start: NaiveDate,
    pub peak_end: NaiveDate,
}

/// Fertility classification of a single date
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FertilityStatus {
    Infertile,
    Fertile,
    Peak,
}

/// Phase of the menstrual cycle for a given cycle day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    Menstruation,
    Follicular,
    Ovulation,
    Luteal,
}

// ============================================================================
// Display
// ============================================================================

/// Unit used when rendering temperatures
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

/// Render a Celsius temperature in the requested unit
pub fn format_temperature(temp: f64, unit: TemperatureUnit) -> String {
    match unit {
        TemperatureUnit::Celsius => format!("{:.2}°C", temp),
        TemperatureUnit::Fahrenheit => format!("{:.1}°F", temp * 9.0 / 5.0 + 32.0),
    }
}
