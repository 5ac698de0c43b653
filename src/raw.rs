//! # Raw Service Records
//!
//! Field-extracted but still string-typed records, as produced by whatever
//! parses the service's XML or JSON, and their conversion into typed records.
//!
//! ## Conversion Rules
//! - Absent or blank fields become `None`
//! - Numbers that fail to parse are dropped with a warning; the rest of the
//!   record is kept
//! - Fahrenheit temperatures are converted to Celsius here, once
//! - Timestamps are RFC 3339; a bad slice boundary or astro day rejects the
//!   whole record with [`ParseError`]
//!
//! # Example
//! ```
//! use weather_core::raw::{RawLocation, RawTimeSlice};
//! use weather_core::TimeSlice;
//!
//! let raw = RawTimeSlice {
//!     start: "2024-06-16T12:00:00Z".into(),
//!     end: "2024-06-16T12:00:00Z".into(),
//!     location: RawLocation {
//!         temperature: Some("50".into()),
//!         temperature_unit: Some("fahrenheit".into()),
//!         ..RawLocation::default()
//!     },
//! };
//! let ts = TimeSlice::try_from(raw).unwrap();
//! assert_eq!(ts.location.temperature, Some(10.0));
//! ```

use crate::astro::{AstroRecord, MoonPhase};
use crate::derived::wind_direction_name;
use crate::units::{fahrenheit_to_celsius, TemperatureUnit};
use crate::{CloudCover, Location, Symbol, TimeSlice, Timestamp};
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw records that cannot be turned into typed ones.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Not an RFC 3339 timestamp
    #[error("invalid timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Interval whose end lies before its start
    #[error("timeslice ends before it starts ({start} > {end})")]
    Reversed { start: Timestamp, end: Timestamp },
}

/// One reading with every field as delivered by the service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawLocation {
    pub altitude: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub temperature: Option<String>,
    /// "celsius" (assumed when absent) or "fahrenheit"
    pub temperature_unit: Option<String>,
    pub wind_dir_deg: Option<String>,
    pub wind_dir_name: Option<String>,
    pub wind_speed_mps: Option<String>,
    pub wind_speed_beaufort: Option<String>,
    pub humidity: Option<String>,
    pub pressure: Option<String>,
    pub clouds_low: Option<String>,
    pub clouds_mid: Option<String>,
    pub clouds_high: Option<String>,
    pub cloudiness: Option<String>,
    pub fog: Option<String>,
    pub precipitation: Option<String>,
    pub symbol_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawTimeSlice {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub location: RawLocation,
}

/// Sun and moon events of one day as delivered by the service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAstro {
    pub day: String,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub sun_never_rises: Option<String>,
    pub sun_never_sets: Option<String>,
    pub moonrise: Option<String>,
    pub moonset: Option<String>,
    pub moon_never_rises: Option<String>,
    pub moon_never_sets: Option<String>,
    pub moon_phase: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn number(field: &str, value: &Option<String>) -> Option<f64> {
    let text = present(value)?;
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            warn!("dropping {field}: '{text}' is not a number");
            None
        }
    }
}

fn flag(value: &Option<String>) -> bool {
    matches!(present(value), Some(v) if v.eq_ignore_ascii_case("true") || v == "1")
}

/// `(never_rises, never_sets)`; when both are claimed only "never rises" is kept.
fn never_flags(body: &str, rises: &Option<String>, sets: &Option<String>) -> (bool, bool) {
    match (flag(rises), flag(sets)) {
        (true, true) => {
            warn!("{body} both never rises and never sets, keeping never rises");
            (true, false)
        }
        flags => flags,
    }
}

fn timestamp(value: &str) -> Result<Timestamp, ParseError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| ParseError::Timestamp {
            value: value.to_string(),
            source,
        })
}

fn event(field: &str, value: &Option<String>) -> Option<Timestamp> {
    let text = present(value)?;
    match timestamp(text) {
        Ok(t) => Some(t),
        Err(err) => {
            warn!("dropping {field}: {err}");
            None
        }
    }
}

fn temperature(raw: &RawLocation) -> Option<f64> {
    let value = number("temperature", &raw.temperature)?;
    let unit = match present(&raw.temperature_unit) {
        None => TemperatureUnit::Celsius,
        Some(unit) => match unit.parse::<TemperatureUnit>() {
            Ok(unit) => unit,
            Err(err) => {
                warn!("dropping temperature: {err}");
                return None;
            }
        },
    };
    Some(match unit {
        TemperatureUnit::Celsius => value,
        TemperatureUnit::Fahrenheit => fahrenheit_to_celsius(value),
    })
}

impl From<&RawLocation> for Location {
    fn from(raw: &RawLocation) -> Self {
        let wind_dir_deg = number("wind direction", &raw.wind_dir_deg);
        let wind_dir_name = present(&raw.wind_dir_name)
            .map(str::to_string)
            .or_else(|| wind_dir_deg.map(|deg| wind_direction_name(deg).to_string()));

        let symbol = match present(&raw.symbol_id).map(str::parse::<u32>) {
            Some(Ok(id)) => Symbol::from_id(id),
            Some(Err(_)) => {
                warn!("unknown symbol id {:?}", raw.symbol_id);
                Symbol::NODATA
            }
            None => Symbol::NODATA,
        };

        Location {
            altitude: number("altitude", &raw.altitude),
            latitude: number("latitude", &raw.latitude),
            longitude: number("longitude", &raw.longitude),
            temperature: temperature(raw),
            wind_dir_deg,
            wind_dir_name,
            wind_speed_mps: number("wind speed", &raw.wind_speed_mps),
            wind_speed_beaufort: number("beaufort", &raw.wind_speed_beaufort),
            humidity: number("humidity", &raw.humidity),
            pressure: number("pressure", &raw.pressure),
            clouds: CloudCover {
                low: number("low clouds", &raw.clouds_low),
                mid: number("mid clouds", &raw.clouds_mid),
                high: number("high clouds", &raw.clouds_high),
                cloudiness: number("cloudiness", &raw.cloudiness),
            },
            fog: number("fog", &raw.fog),
            precipitation_mm: number("precipitation", &raw.precipitation),
            symbol,
        }
    }
}

impl TryFrom<RawTimeSlice> for TimeSlice {
    type Error = ParseError;

    fn try_from(raw: RawTimeSlice) -> Result<Self, Self::Error> {
        let start = timestamp(&raw.start)?;
        let end = timestamp(&raw.end)?;
        if end < start {
            return Err(ParseError::Reversed { start, end });
        }
        Ok(TimeSlice::new(start, end, Location::from(&raw.location)))
    }
}

impl TryFrom<RawAstro> for AstroRecord {
    type Error = ParseError;

    fn try_from(raw: RawAstro) -> Result<Self, Self::Error> {
        let mut rec = AstroRecord::new(timestamp(&raw.day)?);

        (rec.sun_never_rises, rec.sun_never_sets) =
            never_flags("sun", &raw.sun_never_rises, &raw.sun_never_sets);
        if !rec.sun_never_rises && !rec.sun_never_sets {
            rec.sunrise = event("sunrise", &raw.sunrise);
            rec.sunset = event("sunset", &raw.sunset);
        }

        (rec.moon_never_rises, rec.moon_never_sets) =
            never_flags("moon", &raw.moon_never_rises, &raw.moon_never_sets);
        if !rec.moon_never_rises && !rec.moon_never_sets {
            rec.moonrise = event("moonrise", &raw.moonrise);
            rec.moonset = event("moonset", &raw.moonset);
        }

        rec.moon_phase = present(&raw.moon_phase).and_then(|phase| {
            phase
                .parse::<MoonPhase>()
                .map_err(|err| warn!("dropping moon phase: {err}"))
                .ok()
        });
        Ok(rec)
    }
}
