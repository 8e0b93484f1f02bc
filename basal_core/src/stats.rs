//! Summary statistics over cycle and temperature history.

use crate::cycles::{cycle_spans, cycle_starts, CycleSpan};
use crate::TemperatureReading;
use chrono::NaiveDate;
use serde::Serialize;

/// Cycles of 60 days or more are treated as tracking gaps
pub const MAX_REPORTED_CYCLE: i64 = 60;

/// Cycle length and period length statistics
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CycleStats {
    pub cycle_starts: Vec<NaiveDate>,
    pub cycles: Vec<CycleSpan>,
    pub avg_cycle_length: Option<i64>,
    pub shortest_cycle: Option<i64>,
    pub longest_cycle: Option<i64>,
    pub avg_period_length: Option<i64>,
}

/// Temperature statistics
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TemperatureStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

fn rounded_ratio(total: i64, count: usize) -> i64 {
    (total as f64 / count as f64).round() as i64
}

/// Compute cycle statistics from flow dates
pub fn cycle_stats(flow_dates: &[NaiveDate]) -> CycleStats {
    let starts = cycle_starts(flow_dates);
    let cycles: Vec<CycleSpan> = cycle_spans(&starts)
        .into_iter()
        .filter(|c| c.length > 0 && c.length < MAX_REPORTED_CYCLE)
        .collect();

    let lengths: Vec<i64> = cycles.iter().map(|c| c.length).collect();

    let avg_cycle_length = if lengths.is_empty() {
        None
    } else {
        Some(rounded_ratio(lengths.iter().sum(), lengths.len()))
    };

    let mut flow_days = flow_dates.to_vec();
    flow_days.sort();
    flow_days.dedup();

    let avg_period_length = if lengths.is_empty() {
        None
    } else {
        Some(rounded_ratio(flow_days.len() as i64, starts.len().max(1)))
    };

    CycleStats {
        shortest_cycle: lengths.iter().copied().min(),
        longest_cycle: lengths.iter().copied().max(),
        cycle_starts: starts,
        cycles,
        avg_cycle_length,
        avg_period_length,
    }
}

/// Compute mean, minimum and maximum temperature
pub fn temperature_stats(readings: &[TemperatureReading]) -> TemperatureStats {
    let temps: Vec<f64> = readings.iter().map(|r| r.temperature).collect();
    if temps.is_empty() {
        return TemperatureStats {
            count: 0,
            mean: None,
            min: None,
            max: None,
        };
    }

    TemperatureStats {
        count: temps.len(),
        mean: Some(temps.iter().sum::<f64>() / temps.len() as f64),
        min: temps.iter().copied().reduce(f64::min),
        max: temps.iter().copied().reduce(f64::max),
    }
}

/// Consecutive days with an entry, ending today or yesterday
pub fn tracking_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut sorted = dates.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();

    let Some(&latest) = sorted.first() else {
        return 0;
    };
    if (today - latest).num_days() > 1 {
        return 0;
    }

    let mut streak = 1;
    for pair in sorted.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}
