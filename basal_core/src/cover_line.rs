//! Cover line (Sensiplan "Hilfslinie") calculation.
//!
//! The cover line is the HIGHEST of the six low readings preceding a rise,
//! so the post-ovulatory shift has to clear the noisiest pre-rise value.

use crate::series::round2;

/// Number of trailing low readings the cover line is drawn over
pub const COVER_WINDOW: usize = 6;

/// Maximum of the last six temperatures, rounded to two decimals.
///
/// Returns `None` when fewer than six values are supplied.
pub fn calculate_cover_line(temperatures: &[f64]) -> Option<f64> {
    if temperatures.len() < COVER_WINDOW {
        return None;
    }

    let last_six = &temperatures[temperatures.len() - COVER_WINDOW..];
    let max = last_six.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(round2(max))
}

/// Cover line over hundredths, used by the rule engine
pub(crate) fn cover_line_centi(previous_six: &[i32]) -> Option<i32> {
    if previous_six.len() < COVER_WINDOW {
        return None;
    }
    previous_six[previous_six.len() - COVER_WINDOW..]
        .iter()
        .copied()
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fewer_than_six_is_none() {
        assert_eq!(calculate_cover_line(&[]), None);
        assert_eq!(calculate_cover_line(&[36.1, 36.2, 36.3, 36.4, 36.5]), None);
    }

    #[test]
    fn test_cover_line_is_max_not_mean() {
        let temps = [36.1, 36.0, 36.2, 36.1, 36.0, 36.2];
        assert_eq!(calculate_cover_line(&temps), Some(36.2));
    }

    #[test]
    fn test_only_last_six_count() {
        // 37.0 falls outside the trailing window
        let temps = [37.0, 36.1, 36.0, 36.3, 36.1, 36.0, 36.2];
        assert_eq!(calculate_cover_line(&temps), Some(36.3));
    }

    #[test]
    fn test_cover_line_rounds_to_two_decimals() {
        let temps = [36.1, 36.0, 36.125, 36.1, 36.0, 36.05];
        assert_eq!(calculate_cover_line(&temps), Some(36.13));
    }

    #[test]
    fn test_centi_variant_matches() {
        assert_eq!(cover_line_centi(&[3610, 3600, 3620, 3610, 3600, 3620]), Some(3620));
        assert_eq!(cover_line_centi(&[3610, 3600]), None);
    }
}
