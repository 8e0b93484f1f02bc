//! Ovulation detection by the 3-over-6 rule (Sensiplan).
//!
//! A rise is confirmed at index `i` when the readings starting at `i` clear
//! the cover line drawn over the six readings before it:
//!
//! 1. **Standard**: three readings above the cover line, the third at least
//!    0.20 °C above it.
//! 2. **Slow rise**: three readings above, the third less than 0.20 °C above;
//!    a fourth reading above the cover line is required.
//! 3. **One dip**: exactly one of the three falls on or below the cover line;
//!    it is bracketed out, a fourth reading above the cover line is required,
//!    and one of the three counted readings must reach +0.20 °C.
//!
//! The presumed ovulation day is the last low reading, `i - 1`.
//!
//! All comparisons run on whole hundredths of a degree.

use crate::cover_line::{calculate_cover_line, cover_line_centi, COVER_WINDOW};
use crate::series::{normalize, to_centi};
use crate::{OvulationPhase, OvulationResult, TemperatureReading};
use serde::Serialize;
use std::iter;

/// Six low readings plus three high ones
pub const MIN_READINGS: usize = 9;

/// Minimum rise above the cover line, in hundredths of a degree
pub const RISE_THRESHOLD_CENTI: i32 = 20;

/// Positions skipped after a detection before scanning resumes.
///
/// Roughly the shortest viable cycle; keeps one shift from being reported twice.
pub const CYCLE_SKIP: usize = 20;

/// Which rule confirmed a temperature shift
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiseRule {
    Standard,
    SlowRise,
    OneDip,
}

/// A confirmed temperature shift
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rise {
    /// Index of the first high reading
    pub index: usize,
    /// Cover line in hundredths of a degree
    pub cover_line: i32,
    pub rule: RiseRule,
}

/// Outcome of scanning a series for its first shift
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiseScan {
    NotEnoughData,
    NoRise,
    Rise(Rise),
}

/// Apply the three rules to the readings following a cover line.
///
/// `following` holds the three or four readings starting at the candidate
/// index; fewer than three never qualify.
pub fn evaluate_rise(cover_line: i32, following: &[i32]) -> Option<RiseRule> {
    let first3 = following.get(..3)?;
    let fourth = following.get(3).copied();
    let threshold = cover_line + RISE_THRESHOLD_CENTI;
    let above = first3.iter().filter(|&&t| t > cover_line).count();

    match above {
        3 if first3[2] >= threshold => Some(RiseRule::Standard),
        3 => fourth
            .filter(|&t| t > cover_line)
            .map(|_| RiseRule::SlowRise),
        2 => {
            let fourth = fourth.filter(|&t| t > cover_line)?;
            let reaches_threshold = first3
                .iter()
                .copied()
                .filter(|&t| t > cover_line)
                .chain(iter::once(fourth))
                .any(|t| t >= threshold);
            reaches_threshold.then_some(RiseRule::OneDip)
        }
        _ => None,
    }
}

/// First qualifying rise at or after `from`.
///
/// Candidates run from `from` to `len - 3`; `from` below six is raised to six
/// so every candidate has a full cover window.
fn next_rise(temps: &[i32], from: usize) -> Option<Rise> {
    let last = temps.len().checked_sub(3)?;
    (from.max(COVER_WINDOW)..=last).find_map(|i| {
        let cover_line = cover_line_centi(&temps[i - COVER_WINDOW..i])?;
        let following = &temps[i..(i + 4).min(temps.len())];
        evaluate_rise(cover_line, following).map(|rule| Rise {
            index: i,
            cover_line,
            rule,
        })
    })
}

/// Scan a date-ascending series of hundredths for its earliest shift
pub fn find_rise(temps: &[i32]) -> RiseScan {
    if temps.len() < MIN_READINGS {
        return RiseScan::NotEnoughData;
    }
    match next_rise(temps, COVER_WINDOW) {
        Some(rise) => RiseScan::Rise(rise),
        None => RiseScan::NoRise,
    }
}

/// Detect the first ovulation in a set of readings.
///
/// Readings are normalized first. Fewer than nine yields an `unknown`
/// result; no qualifying shift yields `follicular`.
pub fn detect_ovulation(entries: &[TemperatureReading]) -> OvulationResult {
    let series = normalize(entries);
    let centi: Vec<i32> = series.iter().map(|r| to_centi(r.temperature)).collect();

    match find_rise(&centi) {
        RiseScan::NotEnoughData => OvulationResult::unknown(),
        RiseScan::NoRise => OvulationResult::follicular(),
        RiseScan::Rise(rise) => detected_result(&series, &rise),
    }
}

/// Detect every ovulation across a long history.
///
/// After each detection the cursor jumps [`CYCLE_SKIP`] positions ahead, so
/// no two results are closer than that in the series.
pub fn detect_all_ovulations(entries: &[TemperatureReading]) -> Vec<OvulationResult> {
    let series = normalize(entries);
    if series.len() < MIN_READINGS {
        return Vec::new();
    }

    let centi: Vec<i32> = series.iter().map(|r| to_centi(r.temperature)).collect();
    let mut results = Vec::new();
    let mut cursor = COVER_WINDOW;

    while let Some(rise) = next_rise(&centi, cursor) {
        results.push(detected_result(&series, &rise));
        cursor = rise.index + CYCLE_SKIP;
    }

    tracing::debug!(
        "Detected {} ovulations across {} readings",
        results.len(),
        series.len()
    );

    results
}

fn detected_result(series: &[TemperatureReading], rise: &Rise) -> OvulationResult {
    let ovulation_index = rise.index - 1;
    let previous_six: Vec<f64> = series[rise.index - COVER_WINDOW..rise.index]
        .iter()
        .map(|r| r.temperature)
        .collect();

    tracing::debug!(
        rule = ?rise.rule,
        index = rise.index,
        cover_line = rise.cover_line,
        "Temperature shift confirmed"
    );

    OvulationResult {
        ovulation_date: Some(series[ovulation_index].date),
        cover_line_temp: calculate_cover_line(&previous_six),
        phase: OvulationPhase::Luteal,
        cycle_day: u32::try_from(rise.index).ok(),
    }
}
