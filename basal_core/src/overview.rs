//! Current-cycle overview for a given day.
//!
//! Ties the engine together the way a dashboard needs it: where the user is
//! in the current cycle, whether ovulation has been confirmed yet, and what
//! the calendar expects next.

use crate::config::CycleConfig;
use crate::cycles::current_period_start;
use crate::detection::detect_ovulation;
use crate::fertility::{fertility_status, fertility_window, predict_next_ovulation, predict_next_period};
use crate::phase::cycle_phase;
use crate::series::normalize;
use crate::{
    CyclePhase, FertilityStatus, FertilityWindow, FlowEntry, OvulationResult, TemperatureReading,
};
use chrono::NaiveDate;
use serde::Serialize;

/// Snapshot of the current cycle as of `today`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CycleOverview {
    pub today: NaiveDate,
    pub last_period_start: Option<NaiveDate>,
    /// 1-based; `None` without a period start or when the start lies ahead
    pub cycle_day: Option<u32>,
    pub phase: Option<CyclePhase>,
    /// Detection over the current cycle's readings only
    pub ovulation: OvulationResult,
    pub next_period: Option<NaiveDate>,
    pub next_ovulation: Option<NaiveDate>,
    pub days_until_period: Option<i64>,
    pub days_until_ovulation: Option<i64>,
    pub fertility_window: Option<FertilityWindow>,
    pub fertility_status: FertilityStatus,
    pub last_reading: Option<TemperatureReading>,
}

/// Build the overview for `today`
pub fn cycle_overview(
    readings: &[TemperatureReading],
    flow_entries: &[FlowEntry],
    today: NaiveDate,
    cycle: &CycleConfig,
) -> CycleOverview {
    let series = normalize(readings);
    let flow_dates: Vec<NaiveDate> = flow_entries.iter().map(|f| f.date).collect();
    let last_period_start = current_period_start(&flow_dates);

    let current_cycle: Vec<TemperatureReading> = match last_period_start {
        Some(start) => series.iter().filter(|r| r.date >= start).cloned().collect(),
        None => series.clone(),
    };
    let ovulation = detect_ovulation(&current_cycle);

    let cycle_day = last_period_start
        .and_then(|start| u32::try_from((today - start).num_days() + 1).ok())
        .filter(|&d| d > 0);

    let next_period = last_period_start.and_then(|s| predict_next_period(s, cycle.default_length));
    let next_ovulation = last_period_start
        .and_then(|s| predict_next_ovulation(s, cycle.default_length, cycle.luteal_phase));
    let window = last_period_start
        .and_then(|s| fertility_window(s, cycle.default_length, cycle.luteal_phase));

    // Confirmed ovulation beats the calendar estimate for phase purposes
    let ovulation_cycle_day = match (last_period_start, ovulation.ovulation_date.or(next_ovulation)) {
        (Some(start), Some(day)) => u32::try_from((day - start).num_days() + 1).ok(),
        _ => None,
    };
    let phase = cycle_day.map(|day| cycle_phase(day, ovulation_cycle_day));

    CycleOverview {
        today,
        last_period_start,
        cycle_day,
        phase,
        next_period,
        next_ovulation,
        days_until_period: next_period.map(|d| (d - today).num_days()),
        days_until_ovulation: next_ovulation.map(|d| (d - today).num_days()),
        fertility_status: fertility_status(today, window.as_ref()),
        fertility_window: window,
        last_reading: series.last().cloned(),
        ovulation,
    }
}
