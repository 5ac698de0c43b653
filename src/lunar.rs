//! Moon-phase estimate (Schaefer 1985)
//!
//! Used when an astro record carries no phase of its own.
//! Accuracy: ±1 day for the phase index.
//! Reference: Sky & Telescope BASIC phase routine (Mar 1985).

use crate::astro::MoonPhase;
use chrono::{Datelike, NaiveDate};

/// Mean synodic month length in days
const SYNODIC_MONTH: f64 = 29.530_588_2;

/// Age of the Moon in days since New, evaluated at UTC noon of `date`.
pub fn moon_age(date: NaiveDate) -> f64 {
    // Calendar → "March-based" year to simplify JD math
    let (mut y, mut m) = (date.year(), date.month() as i32);
    if m < 3 {
        y -= 1;
        m += 12;
    } // Jan/Feb treated as months 13/14
    m += 1;

    // Julian-day offset from the 1900-01-00 12 UT new moon
    let day = date.day() as f64 + 0.5;
    let days = (365.25 * y as f64).floor() + (30.6 * m as f64).floor() + day - 694_039.09;

    let mut cycles = days / SYNODIC_MONTH;
    cycles -= cycles.floor(); // keep fractional part only
    cycles * SYNODIC_MONTH
}

/// Phase index 0 – 7 (0 = new, 4 = full) for `date`.
pub fn phase_index(date: NaiveDate) -> u8 {
    let fraction = moon_age(date) / SYNODIC_MONTH;
    ((fraction * 8.0) + 0.5).floor() as u8 & 7
}

/// Canonical phase name for `date`.
pub fn estimate_phase(date: NaiveDate) -> MoonPhase {
    MoonPhase::from_index(phase_index(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_known_new_and_full_moons() {
        // New moon 2024-01-11, full moon 2024-01-25
        assert_eq!(estimate_phase(date(2024, 1, 11)), MoonPhase::NewMoon);
        assert_eq!(estimate_phase(date(2024, 1, 25)), MoonPhase::FullMoon);
    }

    #[test]
    fn test_age_is_within_one_month() {
        for d in 1..=28 {
            let age = moon_age(date(2025, 2, d));
            assert!(
                (0.0..SYNODIC_MONTH).contains(&age),
                "moon age {age} out of range"
            );
        }
    }

    #[test]
    fn test_phase_advances_over_a_week() {
        // First quarter 2024-01-18
        assert_eq!(estimate_phase(date(2024, 1, 18)), MoonPhase::FirstQuarter);
    }
}
