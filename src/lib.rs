//! # Weather Core Library
//!
//! This library holds the weather data model and the temporal synthesis engine
//! that sits between a forecast service and whatever displays its data. It keeps
//! a rolling window of service readings and, on demand, rebuilds from it:
//! - **Current conditions**: best estimate of the weather right now
//! - **Daytime forecasts**: morning/afternoon/evening/night of a given day
//!
//! ## Data Shape
//!
//! The service delivers two kinds of readings at irregular timestamps:
//! - **Point data** (`start == end`): an instantaneous reading such as temperature
//! - **Interval data** (`start < end`): an aggregate over a span, notably
//!   precipitation and the weather symbol
//!
//! Synthesized slices combine one interval with the point readings at both of its
//! ends, interpolated to the requested instant.
//!
//! ## Data Flow
//! 1. **Ingest**: a collaborator parses service responses into [`raw`] records,
//!    converts them and feeds them to [`weather_data::merge_timeslice`] and
//!    [`astro::merge_astro`]
//! 2. **Expire**: records older than 24 hours are dropped
//! 3. **Synthesize**: [`synthesis`] searches the window and interpolates
//! 4. **Display**: [`derived::get_data`] converts and formats single fields
//!
//! No I/O happens here apart from optional config file loading; everything else
//! is plain functions over owned data, called from a single thread.
//!
//! ## Core Types
//! - [`Location`]: one reading, every field optional
//! - [`TimeSlice`]: a reading together with the time span it covers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod astro;
pub mod config;
pub mod derived;
pub mod lunar;
pub mod raw;
pub mod search;
pub mod symbol;
pub mod synthesis;
pub mod units;
pub mod weather_data;

pub use astro::{AstroRecord, AstroSet, MoonPhase};
pub use config::Config;
pub use symbol::Symbol;
pub use synthesis::Daytime;
pub use units::UnitsConfig;
pub use weather_data::WeatherData;

/// Instant in time as handed over by the service (always UTC).
pub type Timestamp = DateTime<Utc>;

/// Cloud cover percentages per layer plus the overall cloudiness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudCover {
    pub low: Option<f64>,
    pub mid: Option<f64>,
    pub high: Option<f64>,
    /// Overall cloudiness across all layers
    pub cloudiness: Option<f64>,
}

/// A single weather reading.
///
/// Every measured field is optional because the service omits whatever it
/// does not know for a given slice. Units are fixed:
/// - temperature in °C (Fahrenheit input is converted when parsed)
/// - altitude in meters, latitude/longitude in degrees
/// - wind speed in m/s, pressure in hPa, precipitation in mm
/// - humidity, clouds and fog in percent
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub altitude: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub temperature: Option<f64>,

    pub wind_dir_deg: Option<f64>,
    pub wind_dir_name: Option<String>,
    pub wind_speed_mps: Option<f64>,
    pub wind_speed_beaufort: Option<f64>,

    pub humidity: Option<f64>,
    pub pressure: Option<f64>,

    pub clouds: CloudCover,
    pub fog: Option<f64>,

    /// Accumulated precipitation, only meaningful on interval data
    pub precipitation_mm: Option<f64>,

    /// Weather condition; the name is derived from the id so both stay in sync
    pub symbol: Symbol,
}

/// A reading plus the time span it covers.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use weather_core::{Location, TimeSlice};
///
/// let t0 = Utc.with_ymd_and_hms(2024, 6, 16, 12, 0, 0).unwrap();
///
/// let reading = TimeSlice::point_data(t0, Location::default());
/// assert!(!reading.is_interval());
///
/// let rain = TimeSlice::new(t0, t0 + Duration::hours(6), Location::default());
/// assert!(rain.is_interval());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSlice {
    pub start: Timestamp,
    pub end: Timestamp,
    /// Instant a synthesized slice was evaluated for; `None` for service data
    pub point: Option<Timestamp>,
    pub location: Location,
}

impl TimeSlice {
    pub fn new(start: Timestamp, end: Timestamp, location: Location) -> Self {
        TimeSlice {
            start,
            end,
            point: None,
            location,
        }
    }

    /// Instantaneous reading at `at`.
    pub fn point_data(at: Timestamp, location: Location) -> Self {
        Self::new(at, at, location)
    }

    /// True for interval data, false for point data.
    pub fn is_interval(&self) -> bool {
        self.start != self.end
    }

    /// Key under which the slice is stored in [`WeatherData`].
    pub fn key(&self) -> (Timestamp, Timestamp) {
        (self.start, self.end)
    }
}

#[cfg(test)]
mod tests;
