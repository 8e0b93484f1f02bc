//! Per-day series for temperature chart rendering, and per-cycle series
//! for overlaying cycles on a shared cycle-day axis.

use crate::cycles::cycle_starts_from_entries;
use crate::prediction::analyze_history;
use crate::series::normalize;
use crate::{FlowEntry, FlowIntensity, TemperatureReading};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One plotted reading
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub temperature: f64,
    pub is_period: bool,
    pub is_ovulation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_intensity: Option<FlowIntensity>,
}

/// Build the chart series, marking flow days and per-cycle ovulations.
///
/// Ovulation markers come from the combined results, so a cycle without a
/// confirmed shift still shows its predicted day when a reading exists there.
pub fn chart_series(
    readings: &[TemperatureReading],
    flow_entries: &[FlowEntry],
    default_cycle_length: u32,
) -> Vec<ChartPoint> {
    let flow_by_date: HashMap<NaiveDate, FlowIntensity> =
        flow_entries.iter().map(|f| (f.date, f.intensity)).collect();

    let ovulation_dates: HashSet<NaiveDate> =
        analyze_history(readings, flow_entries, default_cycle_length)
            .into_iter()
            .filter_map(|r| r.ovulation_date)
            .collect();

    normalize(readings)
        .into_iter()
        .map(|r| {
            let flow_intensity = flow_by_date.get(&r.date).copied();
            ChartPoint {
                date: r.date,
                temperature: r.temperature,
                is_period: flow_intensity.is_some(),
                is_ovulation: ovulation_dates.contains(&r.date),
                flow_intensity,
            }
        })
        .collect()
}

/// Cycles with fewer readings are left out of comparisons
pub const MIN_CYCLE_POINTS: usize = 3;

/// One reading placed on its cycle's day axis
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CyclePoint {
    /// 1-based
    pub cycle_day: u32,
    pub temperature: f64,
}

/// Readings of one segmented cycle
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSeries {
    /// 1-based position among all segmented cycles, kept when others are left out
    pub cycle_number: usize,
    pub start: NaiveDate,
    /// `None` for the current, open-ended cycle
    pub next_start: Option<NaiveDate>,
    pub points: Vec<CyclePoint>,
}

/// Split readings by cycle for comparison.
///
/// Each cycle covers `[start, next_start)`. Cycles with fewer than
/// [`MIN_CYCLE_POINTS`] readings are dropped.
pub fn cycle_series(readings: &[TemperatureReading], flow_entries: &[FlowEntry]) -> Vec<CycleSeries> {
    let series = normalize(readings);
    let starts = cycle_starts_from_entries(flow_entries);

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let next_start = starts.get(i + 1).copied();
            let points = series
                .iter()
                .filter(|r| r.date >= start && next_start.map_or(true, |next| r.date < next))
                .filter_map(|r| {
                    let cycle_day = u32::try_from((r.date - start).num_days() + 1).ok()?;
                    Some(CyclePoint {
                        cycle_day,
                        temperature: r.temperature,
                    })
                })
                .collect();
            CycleSeries {
                cycle_number: i + 1,
                start,
                next_start,
                points,
            }
        })
        .filter(|c| c.points.len() >= MIN_CYCLE_POINTS)
        .collect()
}
