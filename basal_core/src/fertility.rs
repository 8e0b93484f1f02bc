//! Calendar-based fertility windows and date classification.
//!
//! Ovulation is placed `cycle_length - luteal_phase` days after the cycle
//! start. The fertile window spans five days before ovulation to one day
//! after; peak fertility is the day before ovulation and ovulation day.

use crate::{FertilityStatus, FertilityWindow};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Clinically near-constant post-ovulatory phase
pub const DEFAULT_LUTEAL_PHASE: u32 = 14;

/// Cycle length assumed when no history is available
pub const DEFAULT_CYCLE_LENGTH: u32 = 28;

/// Number of upcoming cycles projected for calendar rendering
pub const DEFAULT_FUTURE_CYCLES: usize = 8;

fn ovulation_offset(cycle_length: u32, luteal_phase: u32) -> i64 {
    i64::from(cycle_length) - i64::from(luteal_phase)
}

/// `date` moved by `days`, or `None` past the end of the calendar
fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

impl FertilityWindow {
    /// Window for the cycle beginning on `cycle_start`
    pub fn for_cycle(cycle_start: NaiveDate, cycle_length: u32, luteal_phase: u32) -> Option<Self> {
        let ovulation_day = shift(cycle_start, ovulation_offset(cycle_length, luteal_phase))?;
        Self::around_ovulation(ovulation_day)
    }

    /// Window centred on a known or predicted ovulation date
    pub fn around_ovulation(ovulation_day: NaiveDate) -> Option<Self> {
        Some(Self {
            start: shift(ovulation_day, -5)?,
            end: shift(ovulation_day, 1)?,
            peak_start: shift(ovulation_day, -1)?,
            peak_end: ovulation_day,
        })
    }

    /// Classify one date against this window; peak takes precedence
    pub fn classify(&self, date: NaiveDate) -> Option<FertilityStatus> {
        if date >= self.peak_start && date <= self.peak_end {
            Some(FertilityStatus::Peak)
        } else if date >= self.start && date <= self.end {
            Some(FertilityStatus::Fertile)
        } else {
            None
        }
    }

    /// Every date of the fertile window, inclusive
    pub fn fertile_days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Every peak date, inclusive
    pub fn peak_days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.peak_end;
        self.peak_start.iter_days().take_while(move |d| *d <= end)
    }
}

/// Window for the cycle starting at the last period.
///
/// `None` only when the window would fall outside the representable calendar.
pub fn fertility_window(
    last_period_start: NaiveDate,
    cycle_length: u32,
    luteal_phase: u32,
) -> Option<FertilityWindow> {
    FertilityWindow::for_cycle(last_period_start, cycle_length, luteal_phase)
}

/// Classify a date against an optional window; no window means infertile
pub fn fertility_status(date: NaiveDate, window: Option<&FertilityWindow>) -> FertilityStatus {
    window
        .and_then(|w| w.classify(date))
        .unwrap_or(FertilityStatus::Infertile)
}

/// Classify a date against several windows, first match wins
pub fn fertility_status_multi(date: NaiveDate, windows: &[FertilityWindow]) -> FertilityStatus {
    windows
        .iter()
        .find_map(|w| w.classify(date))
        .unwrap_or(FertilityStatus::Infertile)
}

/// Windows for the current cycle and the following ones.
///
/// Stops early rather than run past the end of the calendar.
pub fn future_windows(
    last_period_start: NaiveDate,
    cycle_length: u32,
    luteal_phase: u32,
    cycles: usize,
) -> Vec<FertilityWindow> {
    (0..cycles)
        .map_while(|k| {
            let offset = i64::try_from(k).ok()?.checked_mul(i64::from(cycle_length))?;
            let start = shift(last_period_start, offset)?;
            FertilityWindow::for_cycle(start, cycle_length, luteal_phase)
        })
        .collect()
}

/// Expected start of the next period
pub fn predict_next_period(last_period_start: NaiveDate, cycle_length: u32) -> Option<NaiveDate> {
    shift(last_period_start, i64::from(cycle_length))
}

/// Expected next ovulation, counted back from the next period
pub fn predict_next_ovulation(
    last_period_start: NaiveDate,
    cycle_length: u32,
    luteal_phase: u32,
) -> Option<NaiveDate> {
    shift(last_period_start, ovulation_offset(cycle_length, luteal_phase))
}

/// Individual dates to highlight on a calendar
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CalendarMarks {
    pub fertile: Vec<NaiveDate>,
    pub peak: Vec<NaiveDate>,
}

/// Expand windows into per-day calendar marks
pub fn calendar_marks(windows: &[FertilityWindow]) -> CalendarMarks {
    let mut marks = CalendarMarks::default();
    for window in windows {
        marks.fertile.extend(window.fertile_days());
        marks.peak.extend(window.peak_days());
    }
    marks
}
