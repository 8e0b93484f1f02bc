//! Temperature series normalization.
//!
//! Raw readings may arrive in any order and, after a sloppy import, with more
//! than one value per day. The engine only ever sees a strictly date-ascending
//! series produced here.

use crate::TemperatureReading;

/// Sort readings by date and collapse duplicate dates.
///
/// Sorting is stable, so when a date appears more than once the reading
/// supplied last wins, matching the upsert behaviour of the entry store.
/// The input is never mutated.
pub fn normalize(readings: &[TemperatureReading]) -> Vec<TemperatureReading> {
    let mut sorted: Vec<&TemperatureReading> = readings.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let mut series: Vec<TemperatureReading> = Vec::with_capacity(sorted.len());
    for reading in sorted {
        match series.last_mut() {
            Some(last) if last.date == reading.date => *last = reading.clone(),
            _ => series.push(reading.clone()),
        }
    }

    if series.len() < readings.len() {
        tracing::debug!(
            "Collapsed {} duplicate readings",
            readings.len() - series.len()
        );
    }

    series
}

/// Round to two decimals, halves away from zero for positive values.
///
/// Mirrors `floor(x * 100 + 0.5) / 100`, so `36.125` becomes `36.13`.
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Temperature in whole hundredths of a degree.
///
/// Rule comparisons run on these so that a rise of exactly 0.20 °C is not
/// lost to binary floating point (`36.2 + 0.2 > 36.4` in f64).
pub fn to_centi(value: f64) -> i32 {
    (value * 100.0 + 0.5).floor() as i32
}

/// Inverse of [`to_centi`]
pub fn from_centi(centi: i32) -> f64 {
    f64::from(centi) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reading(date: &str, temp: f64) -> TemperatureReading {
        TemperatureReading::new(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(), temp)
    }

    #[test]
    fn test_normalize_sorts_ascending() {
        let raw = vec![
            reading("2024-01-03", 36.3),
            reading("2024-01-01", 36.1),
            reading("2024-01-02", 36.2),
        ];

        let series = normalize(&raw);
        let temps: Vec<f64> = series.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![36.1, 36.2, 36.3]);
    }

    #[test]
    fn test_normalize_last_duplicate_wins() {
        let raw = vec![
            reading("2024-01-02", 36.2),
            reading("2024-01-01", 36.1),
            reading("2024-01-02", 36.6),
        ];

        let series = normalize(&raw);
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].temperature, 36.6);
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_round2_half_boundary() {
        // 36.125 is exact in binary, so this pins the half-up behaviour
        assert_eq!(round2(36.125), 36.13);
        assert_eq!(round2(36.2), 36.2);
        assert_eq!(round2(36.004), 36.0);
    }

    #[test]
    fn test_centi_is_exact_for_two_decimal_input() {
        assert_eq!(to_centi(36.2), 3620);
        assert_eq!(to_centi(36.4), 3640);
        assert_eq!(to_centi(36.4) - to_centi(36.2), 20);
        assert_eq!(from_centi(3655), 36.55);
    }
}
