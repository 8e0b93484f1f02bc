//! Cycle phase for a given cycle day.

use crate::CyclePhase;

/// Days at the start of a cycle reported as menstruation
pub const MENSTRUATION_DAYS: u32 = 5;

/// Phase of `cycle_day` (1-based) given the ovulation's cycle day, if known.
///
/// The ovulation phase covers the day before through the day after ovulation.
pub fn cycle_phase(cycle_day: u32, ovulation_day: Option<u32>) -> CyclePhase {
    if cycle_day <= MENSTRUATION_DAYS {
        return CyclePhase::Menstruation;
    }

    match ovulation_day.filter(|&d| d > 0) {
        Some(ov) if cycle_day + 1 >= ov && cycle_day <= ov + 1 => CyclePhase::Ovulation,
        Some(ov) if cycle_day > ov + 1 => CyclePhase::Luteal,
        _ => CyclePhase::Follicular,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_days_are_menstruation() {
        assert_eq!(cycle_phase(1, Some(14)), CyclePhase::Menstruation);
        assert_eq!(cycle_phase(5, None), CyclePhase::Menstruation);
    }

    #[test]
    fn test_ovulation_spans_three_days() {
        assert_eq!(cycle_phase(12, Some(14)), CyclePhase::Follicular);
        assert_eq!(cycle_phase(13, Some(14)), CyclePhase::Ovulation);
        assert_eq!(cycle_phase(15, Some(14)), CyclePhase::Ovulation);
        assert_eq!(cycle_phase(16, Some(14)), CyclePhase::Luteal);
    }

    #[test]
    fn test_unknown_ovulation_is_follicular() {
        assert_eq!(cycle_phase(20, None), CyclePhase::Follicular);
        assert_eq!(cycle_phase(20, Some(0)), CyclePhase::Follicular);
    }
}
