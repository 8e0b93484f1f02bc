//! Combining detected ovulations with calendar predictions.
//!
//! Every segmented cycle gets exactly one ovulation result:
//! - the earliest temperature-confirmed ovulation inside the cycle, or
//! - a predicted date 14 days before the next cycle start, or, for the
//!   open-ended current cycle, 14 days before its expected end.

use crate::cycles::cycle_starts_from_entries;
use crate::detection::detect_all_ovulations;
use crate::fertility::DEFAULT_LUTEAL_PHASE;
use crate::{FlowEntry, OvulationPhase, OvulationResult, TemperatureReading};
use chrono::{Duration, NaiveDate};

/// Cycle lengths at or below this are treated as data gaps or noise
pub const MIN_PLAUSIBLE_CYCLE: i64 = 20;

/// Cycle lengths at or above this are treated as missing periods
pub const MAX_PLAUSIBLE_CYCLE: i64 = 45;

/// Rounded mean of plausible gaps between cycle starts.
///
/// Gaps outside the open interval (20, 45) are ignored; with no plausible
/// gap the caller's default is returned.
pub fn average_cycle_length(starts: &[NaiveDate], default_length: u32) -> u32 {
    let plausible: Vec<i64> = starts
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .filter(|&gap| gap > MIN_PLAUSIBLE_CYCLE && gap < MAX_PLAUSIBLE_CYCLE)
        .collect();

    if plausible.is_empty() {
        return default_length;
    }

    let mean = plausible.iter().sum::<i64>() as f64 / plausible.len() as f64;
    mean.round() as u32
}

/// One ovulation result per cycle, detected where possible.
///
/// With no flow entries there are no cycles to attach predictions to, and
/// the detected results are returned as they are.
pub fn combine_ovulations_with_predictions(
    detected: &[OvulationResult],
    flow_entries: &[FlowEntry],
    default_cycle_length: u32,
) -> Vec<OvulationResult> {
    let starts = cycle_starts_from_entries(flow_entries);
    if starts.is_empty() {
        return detected.to_vec();
    }

    let avg_cycle_length = average_cycle_length(&starts, default_cycle_length);

    let mut results: Vec<OvulationResult> = starts
        .iter()
        .enumerate()
        .map(|(i, &cycle_start)| {
            let next_start = starts.get(i + 1).copied();
            first_detected_in_cycle(detected, cycle_start, next_start).unwrap_or_else(|| {
                predicted_ovulation(cycle_start, next_start, avg_cycle_length)
            })
        })
        .collect();

    results.sort_by_key(|r| r.ovulation_date);
    results
}

/// Detect all shifts in `readings` and combine them with flow-based cycles
pub fn analyze_history(
    readings: &[TemperatureReading],
    flow_entries: &[FlowEntry],
    default_cycle_length: u32,
) -> Vec<OvulationResult> {
    let detected = detect_all_ovulations(readings);
    combine_ovulations_with_predictions(&detected, flow_entries, default_cycle_length)
}

fn first_detected_in_cycle(
    detected: &[OvulationResult],
    cycle_start: NaiveDate,
    next_start: Option<NaiveDate>,
) -> Option<OvulationResult> {
    detected
        .iter()
        .filter(|d| {
            d.ovulation_date.is_some_and(|date| {
                date >= cycle_start && next_start.map_or(true, |next| date < next)
            })
        })
        .min_by_key(|d| d.ovulation_date)
        .cloned()
}

fn predicted_ovulation(
    cycle_start: NaiveDate,
    next_start: Option<NaiveDate>,
    avg_cycle_length: u32,
) -> OvulationResult {
    let luteal = i64::from(DEFAULT_LUTEAL_PHASE);
    let offset = match next_start {
        Some(next) => (next - cycle_start).num_days() - luteal,
        None => i64::from(avg_cycle_length) - luteal,
    };
    let Some(predicted) = Duration::try_days(offset).and_then(|d| cycle_start.checked_add_signed(d))
    else {
        tracing::warn!("Predicted ovulation for cycle starting {} is out of range", cycle_start);
        return OvulationResult::unknown();
    };

    // Short cycles can place the estimate before the start; no cycle day then
    let cycle_day = u32::try_from(offset + 1).ok().filter(|&d| d > 0);

    tracing::debug!(
        "No detected ovulation in cycle starting {}, predicting {}",
        cycle_start,
        predicted
    );

    OvulationResult {
        ovulation_date: Some(predicted),
        cover_line_temp: None,
        phase: OvulationPhase::Ovulation,
        cycle_day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlowIntensity;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn flows(list: &[&str]) -> Vec<FlowEntry> {
        list.iter()
            .map(|s| FlowEntry::new(date(s), FlowIntensity::Medium))
            .collect()
    }

    fn detected(on: &str, cycle_day: u32) -> OvulationResult {
        OvulationResult {
            ovulation_date: Some(date(on)),
            cover_line_temp: Some(36.2),
            phase: OvulationPhase::Luteal,
            cycle_day: Some(cycle_day),
        }
    }

    #[test]
    fn test_average_ignores_implausible_gaps() {
        let starts = [
            date("2024-01-01"),
            date("2024-01-29"),
            date("2024-04-01"),
            date("2024-04-30"),
        ];
        // 28 kept, 63 dropped, 29 kept; 28.5 rounds up
        assert_eq!(average_cycle_length(&starts, 30), 29);
    }

    #[test]
    fn test_average_falls_back_to_default() {
        assert_eq!(average_cycle_length(&[date("2024-01-01")], 31), 31);
        assert_eq!(average_cycle_length(&[date("2024-01-01"), date("2024-01-11")], 31), 31);
    }

    #[test]
    fn test_predicted_from_next_cycle_start() {
        let results = combine_ovulations_with_predictions(
            &[],
            &flows(&["2024-01-01", "2024-01-02", "2024-01-31"]),
            28,
        );

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].ovulation_date, Some(date("2024-01-17")));
        assert_eq!(results[0].cycle_day, Some(17));
        assert_eq!(results[0].phase, OvulationPhase::Ovulation);
        assert_eq!(results[0].cover_line_temp, None);
        // Open-ended cycle: 2024-01-31 + 30 - 14
        assert_eq!(results[1].ovulation_date, Some(date("2024-02-16")));
    }

    #[test]
    fn test_detected_preferred_and_only_first_kept() {
        let detected_list = vec![detected("2024-01-14", 14), detected("2024-01-20", 20)];
        let results = combine_ovulations_with_predictions(
            &detected_list,
            &flows(&["2024-01-01", "2024-01-29"]),
            28,
        );

        assert_eq!(results.len(), 2);
        assert_eq!(results[0], detected_list[0]);
        assert!(results[0].is_detected());
        assert!(!results[1].is_detected());
    }

    #[test]
    fn test_detection_outside_any_cycle_is_dropped() {
        let results = combine_ovulations_with_predictions(
            &[detected("2023-12-10", 10)],
            &flows(&["2024-01-01"]),
            28,
        );

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].ovulation_date, Some(date("2024-01-15")));
        assert!(!results[0].is_detected());
    }

    #[test]
    fn test_no_flow_returns_detected_unchanged() {
        let detected_list = vec![detected("2024-01-14", 14)];
        assert_eq!(
            combine_ovulations_with_predictions(&detected_list, &[], 28),
            detected_list
        );
        assert!(combine_ovulations_with_predictions(&[], &[], 28).is_empty());
    }

    #[test]
    fn test_exactly_one_result_per_cycle() {
        let flow = flows(&["2024-01-01", "2024-01-27", "2024-02-25", "2024-03-24", "2024-04-22"]);
        let detected_list = vec![
            detected("2024-01-13", 13),
            detected("2024-02-09", 14),
            detected("2024-02-15", 20),
        ];

        let results = combine_ovulations_with_predictions(&detected_list, &flow, 28);

        assert_eq!(results.len(), 5);
        assert!(results.windows(2).all(|w| w[0].ovulation_date <= w[1].ovulation_date));
        assert_eq!(results.iter().filter(|r| r.is_detected()).count(), 2);
    }

    #[test]
    fn test_short_cycle_prediction_has_no_cycle_day() {
        let results = combine_ovulations_with_predictions(&[], &flows(&["2024-01-01", "2024-01-10"]), 28);

        assert_eq!(results[0].ovulation_date, Some(date("2023-12-27")));
        assert_eq!(results[0].cycle_day, None);
    }

    #[test]
    fn test_analyze_history_end_to_end() {
        let mut readings = Vec::new();
        let start = date("2024-01-01");
        for i in 0..28 {
            let temp = if i < 14 { 36.1 } else { 36.6 };
            readings.push(TemperatureReading::new(start + Duration::days(i), temp));
        }

        let results = analyze_history(&readings, &flows(&["2024-01-01", "2024-01-29"]), 28);

        assert_eq!(results.len(), 2);
        assert!(results[0].is_detected());
        assert_eq!(results[1].ovulation_date, Some(date("2024-02-12")));
    }

    #[test]
    fn test_prediction_past_calendar_end_is_unknown() {
        let last_start = NaiveDate::MAX - Duration::days(3);
        let results = combine_ovulations_with_predictions(
            &[],
            &[FlowEntry::new(last_start, FlowIntensity::Heavy)],
            28,
        );

        assert_eq!(results, vec![OvulationResult::unknown()]);
    }
}
