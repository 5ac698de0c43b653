//! # Timeslice Synthesis
//!
//! Builds the slices shown to the user from the raw service window.
//!
//! ## Combining
//! A synthesized slice takes one interval (for precipitation and the symbol)
//! and the point readings at both of its ends. Instantaneous quantities are
//! linearly interpolated between those readings:
//! ```text
//! value = v_start + (v_end - v_start) * (t - t_start) / (t_end - t_start)
//! ```
//! Wind direction is interpolated the short way around the compass, so 350°
//! and 10° meet at 0° rather than 180°. Interpolation never goes before the
//! first reading.
//!
//! ## Current Conditions
//! The narrowest interval bracketing "now", searched in three one-hour steps
//! starting at now when nothing brackets "now" itself.
//!
//! ## Daytime Forecasts
//! The service publishes canonical slices at 0/6/12/18 UTC, so each daytime
//! bucket is served by the first six-hour interval between such readings that
//! contains the bucket's representative hour.

use crate::derived::wind_direction_name;
use crate::search::{
    find_point_data, find_smallest_incomplete_interval, find_smallest_interval, local_time_at,
};
use crate::{CloudCover, Location, Symbol, TimeSlice, Timestamp, WeatherData};
use chrono::{DateTime, Duration, TimeZone, Timelike};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Part of a day a forecast is made for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Daytime {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl Daytime {
    pub const fn all() -> &'static [Daytime] {
        &[
            Daytime::Morning,
            Daytime::Afternoon,
            Daytime::Evening,
            Daytime::Night,
        ]
    }

    /// `(min_hour, max_hour, point_hour)` relative to local midnight.
    pub fn hours(self) -> (i64, i64, i64) {
        match self {
            Daytime::Morning => (3, 15, 9),
            Daytime::Afternoon => (9, 21, 15),
            Daytime::Evening => (15, 27, 21),
            Daytime::Night => (21, 33, 27),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Daytime::Morning => "morning",
            Daytime::Afternoon => "afternoon",
            Daytime::Evening => "evening",
            Daytime::Night => "night",
        }
    }
}

impl fmt::Display for Daytime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn interpolate(start: Option<f64>, end: Option<f64>, ratio: Option<f64>) -> Option<f64> {
    match (start, end, ratio) {
        (Some(start), Some(end), Some(ratio)) => Some(start + (end - start) * ratio),
        (_, end, _) => end,
    }
}

/// Interpolate compass degrees across the 0°/360° seam when that is shorter.
fn interpolate_degrees(start: Option<f64>, end: Option<f64>, ratio: Option<f64>) -> Option<f64> {
    let (Some(mut start), Some(mut end), Some(ratio)) = (start, end, ratio) else {
        return end;
    };
    if (end - start).abs() > 180.0 {
        if start < end {
            start += 360.0;
        } else {
            end += 360.0;
        }
    }
    let value = start + (end - start) * ratio;
    Some(if value >= 360.0 { value - 360.0 } else { value })
}

/// Override the interval's symbol where the readings tell a clearer story.
///
/// Dry slices get the symbol of their cloud cover (current conditions only),
/// and heavy fog wins over everything that does not precipitate.
pub fn calculate_symbol(ts: &mut TimeSlice, current_conditions: bool) {
    let loc = &mut ts.location;
    if loc.precipitation_mm.unwrap_or(0.0) > 0.0 {
        return;
    }

    if current_conditions {
        match loc.clouds.cloudiness {
            Some(c) if c >= 90.0 => loc.symbol = Symbol::OVERCAST,
            Some(c) if c >= 30.0 => loc.symbol = Symbol::PARTLY_CLOUDY,
            Some(c) if c >= 12.5 => loc.symbol = Symbol::LIGHT_CLOUD,
            _ => {}
        }
    }

    if loc.fog.is_some_and(|fog| fog >= 80.0) {
        loc.symbol = Symbol::FOG;
    }
}

/// Synthesize a slice for `interval` from the point readings at its bounds.
///
/// With `between_t` the instantaneous fields are interpolated to that instant,
/// which is moved up to the first reading when it lies before it; without it,
/// or when only one bound has a reading, that reading is copied.
/// Returns `None` when neither bound has a reading.
pub fn make_combined_timeslice(
    wd: &WeatherData,
    interval: &TimeSlice,
    between_t: Option<Timestamp>,
    current_conditions: bool,
) -> Option<TimeSlice> {
    let start_pt = wd.get_timeslice(interval.start, interval.start);
    let end_pt = wd.get_timeslice(interval.end, interval.end);

    // (first reading, reading values are copied from, instant evaluated for, ratio)
    let (first, source, point, ratio) = match (start_pt, end_pt) {
        (None, None) => return None,
        (None, Some(only)) | (Some(only), None) => (only, only, only.start, None),
        (Some(first), Some(last)) => match between_t {
            None => (first, last, last.start, None),
            Some(between_t) => {
                // never before the first reading
                let point = between_t.max(first.start);
                let span = (last.start - first.start).num_seconds();
                let ratio = (span > 0)
                    .then(|| (point - first.start).num_seconds() as f64 / span as f64);
                (first, last, point, ratio)
            }
        },
    };

    let a = &first.location;
    let b = &source.location;

    let wind_dir_deg = interpolate_degrees(a.wind_dir_deg, b.wind_dir_deg, ratio);
    let wind_dir_name = match wind_dir_deg {
        Some(deg) => Some(wind_direction_name(deg).to_string()),
        None => b.wind_dir_name.clone(),
    };

    let location = Location {
        altitude: b.altitude,
        latitude: b.latitude,
        longitude: b.longitude,

        temperature: interpolate(a.temperature, b.temperature, ratio),

        wind_dir_deg,
        wind_dir_name,
        wind_speed_mps: interpolate(a.wind_speed_mps, b.wind_speed_mps, ratio),
        wind_speed_beaufort: interpolate(a.wind_speed_beaufort, b.wind_speed_beaufort, ratio),

        humidity: interpolate(a.humidity, b.humidity, ratio),
        pressure: interpolate(a.pressure, b.pressure, ratio),

        clouds: CloudCover {
            low: interpolate(a.clouds.low, b.clouds.low, ratio),
            mid: interpolate(a.clouds.mid, b.clouds.mid, ratio),
            high: interpolate(a.clouds.high, b.clouds.high, ratio),
            cloudiness: interpolate(a.clouds.cloudiness, b.clouds.cloudiness, ratio),
        },
        fog: interpolate(a.fog, b.fog, ratio),

        // accumulated over the whole interval
        precipitation_mm: interval.location.precipitation_mm,
        symbol: interval.location.symbol,
    };

    let mut combined = TimeSlice {
        start: interval.start,
        end: interval.end,
        point: Some(point),
        location,
    };
    calculate_symbol(&mut combined, current_conditions);
    Some(combined)
}

/// Best estimate of the weather at `now_t`.
pub fn make_current_conditions(wd: &WeatherData, now_t: Timestamp) -> Option<TimeSlice> {
    let interval = (0..3).find_map(|i| {
        let candidate_t = now_t + Duration::hours(i);
        let (before, after) =
            find_point_data(wd, candidate_t, Duration::seconds(1), Duration::hours(4));
        let interval = find_smallest_interval(wd, &before, &after)?;

        // an interval ending where the found one starts already covers now
        if interval.start > now_t {
            if let Some(incomplete) = find_smallest_incomplete_interval(wd, interval.start) {
                return Some(incomplete);
            }
        }
        Some(interval)
    });

    let Some(interval) = interval else {
        debug!("no interval around {now_t} for current conditions");
        return None;
    };
    debug!(
        "current conditions from interval {} - {}",
        interval.start, interval.end
    );
    make_combined_timeslice(wd, interval, Some(now_t), true)
}

/// Recompute the cached current conditions, replacing the previous ones.
pub fn update_current_conditions(wd: &mut WeatherData, now_t: Timestamp) {
    wd.current_conditions = make_current_conditions(wd, now_t);
}

fn on_six_hour_mark(t: Timestamp) -> bool {
    t.hour() % 6 == 0
}

/// Forecast for `daytime` of the local day `day_offset` days after `now`.
///
/// `daydata` holds the point readings of that day, sorted by start, as
/// returned by [`get_point_data_for_day`](crate::search::get_point_data_for_day).
/// When no suitable interval exists the cached current conditions are used if
/// their interval covers the whole daytime window.
pub fn make_forecast_data<Tz: TimeZone>(
    wd: &WeatherData,
    daydata: &[&TimeSlice],
    now: &DateTime<Tz>,
    day_offset: i64,
    daytime: Daytime,
) -> Option<TimeSlice> {
    let (min_hour, max_hour, point_hour) = daytime.hours();
    let start_t = local_time_at(now, day_offset, min_hour)?;
    let end_t = local_time_at(now, day_offset, max_hour)?;
    let point_t = local_time_at(now, day_offset, point_hour)?;

    let in_window = |t: Timestamp| start_t <= t && t <= end_t;
    let six_hours = Duration::hours(6);

    for ts1 in daydata {
        if !in_window(ts1.start) || !on_six_hour_mark(ts1.start) {
            continue;
        }
        for ts2 in daydata {
            if ts2.key() == ts1.key()
                || ts2.start <= ts1.start
                || !in_window(ts2.start)
                || !on_six_hour_mark(ts2.start)
            {
                continue;
            }

            let diff = ts2.start - ts1.start;
            // tolerate a DST shift, but only where the service sent the interval
            let spans_six_hours = diff == six_hours
                || ((diff - six_hours).abs() <= Duration::hours(1)
                    && wd.get_timeslice(ts1.start, ts2.end).is_some());
            if !spans_six_hours || point_t < ts1.start || point_t > ts2.start {
                continue;
            }

            if let Some(interval) = wd.get_timeslice(ts1.start, ts2.end) {
                debug!(
                    "{daytime} of day {day_offset} from interval {} - {}",
                    interval.start, interval.end
                );
                return make_combined_timeslice(wd, interval, Some(point_t), false);
            }
        }
    }

    let cc = wd
        .current_conditions
        .as_ref()
        .filter(|cc| cc.start <= start_t && end_t <= cc.end)?;
    let interval = wd.get_timeslice(cc.start, cc.end)?;
    debug!("{daytime} of day {day_offset} falls back to current conditions");
    make_combined_timeslice(wd, interval, Some(point_t), false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather_data::merge_timeslice;
    use chrono::{TimeZone, Utc};

    fn t(hour: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 16, 0, 0, 0).unwrap() + Duration::hours(hour)
    }

    fn reading(hour: i64, temperature: f64, wind_dir_deg: f64) -> TimeSlice {
        TimeSlice::point_data(
            t(hour),
            Location {
                temperature: Some(temperature),
                wind_dir_deg: Some(wind_dir_deg),
                humidity: Some(50.0 + hour as f64),
                ..Location::default()
            },
        )
    }

    fn interval(start: i64, end: i64, precipitation: f64, symbol: Symbol) -> TimeSlice {
        TimeSlice::new(
            t(start),
            t(end),
            Location {
                precipitation_mm: Some(precipitation),
                symbol,
                ..Location::default()
            },
        )
    }

    fn store(slices: Vec<TimeSlice>) -> WeatherData {
        let mut wd = WeatherData::new();
        for ts in slices {
            merge_timeslice(&mut wd, ts, t(0));
        }
        wd
    }

    #[test]
    fn test_interpolates_halfway() {
        let wd = store(vec![
            reading(0, 10.0, 90.0),
            reading(6, 14.0, 180.0),
            interval(0, 6, 1.5, Symbol::RAIN),
        ]);
        let iv = wd.get_timeslice(t(0), t(6)).unwrap();
        let combined = make_combined_timeslice(&wd, iv, Some(t(3)), false).unwrap();

        assert_eq!(combined.point, Some(t(3)));
        assert_eq!(combined.location.temperature, Some(12.0));
        assert_eq!(combined.location.wind_dir_deg, Some(135.0));
        assert_eq!(combined.location.wind_dir_name.as_deref(), Some("SE"));
        assert_eq!(combined.location.humidity, Some(53.0));
        assert_eq!(combined.location.precipitation_mm, Some(1.5), "copied, not interpolated");
        assert_eq!(combined.location.symbol, Symbol::RAIN);
    }

    #[test]
    fn test_wind_direction_wraps_short_way() {
        let wd = store(vec![
            reading(0, 0.0, 350.0),
            reading(6, 0.0, 10.0),
            interval(0, 6, 0.0, Symbol::SUN),
        ]);
        let iv = wd.get_timeslice(t(0), t(6)).unwrap();
        let combined = make_combined_timeslice(&wd, iv, Some(t(3)), false).unwrap();
        assert_eq!(combined.location.wind_dir_deg, Some(0.0));
        assert_eq!(combined.location.wind_dir_name.as_deref(), Some("N"));

        assert_eq!(interpolate_degrees(Some(10.0), Some(350.0), Some(0.25)), Some(5.0));
        assert_eq!(interpolate_degrees(Some(300.0), Some(30.0), Some(0.5)), Some(345.0));
    }

    #[test]
    fn test_clamps_before_first_reading() {
        let wd = store(vec![
            reading(0, 10.0, 0.0),
            reading(6, 14.0, 0.0),
            interval(0, 6, 0.0, Symbol::SUN),
        ]);
        let iv = wd.get_timeslice(t(0), t(6)).unwrap();
        let combined = make_combined_timeslice(&wd, iv, Some(t(-2)), false).unwrap();
        assert_eq!(combined.point, Some(t(0)));
        assert_eq!(combined.location.temperature, Some(10.0));
    }

    #[test]
    fn test_point_past_end_reading_is_kept() {
        let wd = store(vec![
            reading(0, 10.0, 0.0),
            reading(6, 14.0, 0.0),
            interval(0, 6, 0.0, Symbol::SUN),
        ]);
        let iv = wd.get_timeslice(t(0), t(6)).unwrap();
        let combined = make_combined_timeslice(&wd, iv, Some(t(9)), false).unwrap();
        assert_eq!(combined.point, Some(t(9)), "only clamped from below");
        assert_eq!(combined.location.temperature, Some(16.0));
    }

    #[test]
    fn test_reversed_interval_does_not_panic() {
        let wd = store(vec![reading(0, 10.0, 0.0), reading(6, 14.0, 0.0)]);
        let reversed = interval(6, 0, 0.0, Symbol::SUN);
        let combined = make_combined_timeslice(&wd, &reversed, Some(t(3)), false).unwrap();
        assert_eq!(combined.point, Some(t(6)));
        assert_eq!(combined.location.temperature, Some(10.0), "no ratio, values copied");
    }

    #[test]
    fn test_copies_end_reading_without_start() {
        let wd = store(vec![reading(6, 14.0, 0.0), interval(0, 6, 0.0, Symbol::SUN)]);
        let iv = wd.get_timeslice(t(0), t(6)).unwrap();
        let combined = make_combined_timeslice(&wd, iv, Some(t(3)), false).unwrap();
        assert_eq!(combined.point, Some(t(6)));
        assert_eq!(combined.location.temperature, Some(14.0));
    }

    #[test]
    fn test_no_readings_no_slice() {
        let wd = store(vec![interval(0, 6, 0.0, Symbol::SUN)]);
        let iv = wd.get_timeslice(t(0), t(6)).unwrap();
        assert!(make_combined_timeslice(&wd, iv, Some(t(3)), false).is_none());
    }

    #[test]
    fn test_missing_start_value_copies_end_value() {
        let mut start = reading(0, 10.0, 0.0);
        start.location.pressure = None;
        let mut end = reading(6, 14.0, 0.0);
        end.location.pressure = Some(1010.0);
        let wd = store(vec![start, end, interval(0, 6, 0.0, Symbol::SUN)]);

        let iv = wd.get_timeslice(t(0), t(6)).unwrap();
        let combined = make_combined_timeslice(&wd, iv, Some(t(3)), false).unwrap();
        assert_eq!(combined.location.pressure, Some(1010.0));
    }

    fn slice_with(precipitation: f64, cloudiness: f64, fog: f64) -> TimeSlice {
        TimeSlice::new(
            t(0),
            t(6),
            Location {
                precipitation_mm: Some(precipitation),
                clouds: CloudCover {
                    cloudiness: Some(cloudiness),
                    ..CloudCover::default()
                },
                fog: Some(fog),
                symbol: Symbol::SUN,
                ..Location::default()
            },
        )
    }

    #[test]
    fn test_symbol_fog_beats_overcast() {
        let mut ts = slice_with(0.0, 95.0, 85.0);
        calculate_symbol(&mut ts, true);
        assert_eq!(ts.location.symbol, Symbol::FOG);
        assert_eq!(ts.location.symbol.name(), "FOG");
    }

    #[test]
    fn test_symbol_cloud_tiers_only_for_current_conditions() {
        let cases = [(95.0, Symbol::OVERCAST), (30.0, Symbol::PARTLY_CLOUDY), (12.5, Symbol::LIGHT_CLOUD), (5.0, Symbol::SUN)];
        for (cloudiness, expected) in cases {
            let mut ts = slice_with(0.0, cloudiness, 0.0);
            calculate_symbol(&mut ts, true);
            assert_eq!(ts.location.symbol, expected, "cloudiness {cloudiness}");

            let mut forecast = slice_with(0.0, cloudiness, 0.0);
            calculate_symbol(&mut forecast, false);
            assert_eq!(forecast.location.symbol, Symbol::SUN);
        }
    }

    #[test]
    fn test_symbol_kept_when_precipitating() {
        let mut ts = slice_with(0.4, 95.0, 90.0);
        calculate_symbol(&mut ts, true);
        assert_eq!(ts.location.symbol, Symbol::SUN);
    }

    #[test]
    fn test_daytime_hours() {
        assert_eq!(Daytime::Morning.hours(), (3, 15, 9));
        assert_eq!(Daytime::Night.hours(), (21, 33, 27));
        assert_eq!(Daytime::Evening.to_string(), "evening");
    }
}
