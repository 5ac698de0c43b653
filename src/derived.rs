//! # Derived Quantities and Display Values
//!
//! Physics on top of a single [`Location`]:
//! - **Dew point** via the Magnus formula
//! - **Apparent temperature** with one of four models, see
//!   [`ApparentTemperatureModel`]
//! - **Snow depth** from liquid-equivalent precipitation
//!
//! and the conversion of every field into a display string in the configured
//! unit ([`get_data`]) together with its unit label ([`get_unit`]).
//!
//! Values that cannot be computed come back as `None`, which the display layer
//! renders as "unavailable". They are never folded into a number.

use crate::units::{
    celsius_to_fahrenheit, fahrenheit_to_celsius, ApparentTemperatureModel, PrecipitationUnit,
    PressureUnit, UnitsConfig,
};
use crate::{Location, TimeSlice};

/// Displayable fields of a timeslice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Altitude,
    Latitude,
    Longitude,
    Temperature,
    Pressure,
    WindSpeed,
    WindBeaufort,
    WindDirection,
    WindDirectionDeg,
    Humidity,
    DewPoint,
    ApparentTemperature,
    CloudsLow,
    CloudsMid,
    CloudsHigh,
    Cloudiness,
    Fog,
    Precipitation,
    Symbol,
}

/// Eight-point compass name for `degrees`, each sector ±22.5° wide.
pub fn wind_direction_name(degrees: f64) -> &'static str {
    const NAMES: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let sector = ((degrees.rem_euclid(360.0) + 22.5) / 45.0).floor() as usize % 8;
    NAMES[sector]
}

/// Dew point in °C, `None` without temperature or humidity.
pub fn dew_point(loc: &Location) -> Option<f64> {
    let temp = loc.temperature?;
    let humidity = loc.humidity.filter(|h| *h > 0.0)?;

    let gamma = (humidity / 100.0).ln();
    let t_ratio = temp / (241.2 + temp);
    Some((241.2 * gamma + 4222.03716 * t_ratio) / (17.5043 - gamma - 17.5043 * t_ratio))
}

/// Wind chill in °C (NWS / Environment Canada), wind in km/h.
fn wind_chill(temp: f64, wind_kmh: f64) -> f64 {
    let v = wind_kmh.powf(0.16);
    13.12 + 0.6215 * temp - 11.37 * v + 0.3965 * temp * v
}

/// Rothfusz heat index, both in °F.
fn heat_index(fahrenheit: f64, humidity: f64) -> f64 {
    let (t, rh) = (fahrenheit, humidity);
    -42.379 + 2.049_015_23 * t + 10.143_331_27 * rh
        - 0.224_755_41 * t * rh
        - 6.837_83e-3 * t * t
        - 5.481_717e-2 * rh * rh
        + 1.228_74e-3 * t * t * rh
        + 8.5282e-4 * t * rh * rh
        - 1.99e-6 * t * t * rh * rh
}

/// Summer simmer index, both in °F.
fn summer_simmer(fahrenheit: f64, humidity: f64) -> f64 {
    1.98 * (fahrenheit - (0.55 - 0.0055 * humidity) * (fahrenheit - 58.0)) - 56.83
}

/// "Feels like" temperature in °C.
///
/// Returns `None` only without a temperature. Every model falls back to the
/// plain temperature when the inputs it needs are missing or outside the
/// range it is defined for.
pub fn apparent_temperature(
    loc: &Location,
    model: ApparentTemperatureModel,
    is_night: bool,
) -> Option<f64> {
    let temp = loc.temperature?;
    let wind_mps = loc.wind_speed_mps;
    let humidity = loc.humidity;

    let apparent = match model {
        ApparentTemperatureModel::WindchillHeatindex => {
            if temp <= 10.0 {
                match wind_mps.map(|w| w * 3.6) {
                    Some(wind_kmh) if wind_kmh >= 4.828 => wind_chill(temp, wind_kmh),
                    _ => temp,
                }
            } else if temp >= 26.7 || (is_night && temp >= 22.0) {
                match humidity {
                    Some(rh) if rh >= 40.0 => {
                        let fahrenheit = celsius_to_fahrenheit(temp);
                        let felt = if is_night {
                            summer_simmer(fahrenheit, rh)
                        } else {
                            heat_index(fahrenheit, rh)
                        };
                        fahrenheit_to_celsius(felt)
                    }
                    _ => temp,
                }
            } else {
                temp
            }
        }
        ApparentTemperatureModel::WindchillHumidex => {
            if temp <= 0.0 {
                match wind_mps.map(|w| w * 3.6) {
                    Some(wind_kmh) if wind_kmh >= 2.0 => wind_chill(temp, wind_kmh),
                    _ => temp,
                }
            } else if temp >= 20.0 {
                match dew_point(loc) {
                    Some(dp) if dp >= 0.0 => {
                        let e = 6.11 * (5417.7530 * (1.0 / 273.16 - 1.0 / (273.15 + dp))).exp();
                        temp + 0.5555 * (e - 10.0)
                    }
                    _ => temp,
                }
            } else {
                temp
            }
        }
        ApparentTemperatureModel::Steadman => match (wind_mps, humidity) {
            (Some(wind), Some(rh)) => {
                let e = rh / 100.0 * 6.105 * (17.27 * temp / (237.7 + temp)).exp();
                temp + 0.33 * e - 0.7 * wind - 4.0
            }
            _ => temp,
        },
        ApparentTemperatureModel::QuayleSteadman => match wind_mps {
            Some(wind) => {
                let fahrenheit = celsius_to_fahrenheit(temp);
                let mph = wind * 2.236_94;
                fahrenheit_to_celsius(
                    1.41 - 1.162 * mph + 0.980 * fahrenheit + 0.0124 * mph * mph
                        + 0.0185 * mph * fahrenheit,
                )
            }
            None => temp,
        },
    };
    Some(apparent)
}

/// Precipitation in mm, scaled to snow depth when the symbol brings snow.
///
/// The service reports liquid equivalent; colder snow is fluffier.
pub fn snow_adjusted_precipitation(loc: &Location) -> Option<f64> {
    let mm = loc.precipitation_mm?;
    if !loc.symbol.is_snow() {
        return Some(mm);
    }

    let ratio = match loc.temperature.unwrap_or(0.0) {
        t if t < -11.11 => 12.0,
        t if t < -4.44 => 10.0,
        t if t < -2.22 => 7.0,
        t if t < -0.56 => 5.0,
        _ => 3.0,
    };
    Some(mm * ratio)
}

fn format_value(value: f64, decimals: usize, round: bool) -> String {
    if round {
        // `+ 0.0` turns a rounded -0 into 0
        format!("{:.0}", value.round() + 0.0)
    } else {
        format!("{value:.decimals$}")
    }
}

/// Display string for one field of `ts` in the configured units.
///
/// With `round` every number is printed without decimals, rounding half away
/// from zero after unit conversion. `night` only matters for the apparent
/// temperature. `None` means the value is unavailable.
pub fn get_data(
    ts: &TimeSlice,
    units: &UnitsConfig,
    data_type: DataType,
    round: bool,
    night: bool,
) -> Option<String> {
    let loc = &ts.location;
    let fmt = |value: f64, decimals: usize| format_value(value, decimals, round);

    let text = match data_type {
        DataType::Altitude => fmt(units.altitude.from_meters(loc.altitude?), 2),
        DataType::Latitude => fmt(loc.latitude?, 6),
        DataType::Longitude => fmt(loc.longitude?, 6),
        DataType::Temperature => fmt(units.temperature.from_celsius(loc.temperature?), 1),
        DataType::Pressure => {
            let decimals = match units.pressure {
                PressureUnit::InchMercury | PressureUnit::Psi => 2,
                _ => 1,
            };
            fmt(units.pressure.from_hpa(loc.pressure?), decimals)
        }
        DataType::WindSpeed => fmt(units.windspeed.from_mps(loc.wind_speed_mps?), 1),
        DataType::WindBeaufort => format_value(loc.wind_speed_beaufort?, 0, true),
        DataType::WindDirection => match (&loc.wind_dir_name, loc.wind_dir_deg) {
            (Some(name), _) => name.clone(),
            (None, Some(deg)) => wind_direction_name(deg).to_string(),
            (None, None) => return None,
        },
        DataType::WindDirectionDeg => fmt(loc.wind_dir_deg?, 1),
        DataType::Humidity => fmt(loc.humidity?, 0),
        DataType::DewPoint => fmt(units.temperature.from_celsius(dew_point(loc)?), 1),
        DataType::ApparentTemperature => {
            let felt = apparent_temperature(loc, units.apparent_temperature, night)?;
            fmt(units.temperature.from_celsius(felt), 1)
        }
        DataType::CloudsLow => fmt(loc.clouds.low?, 0),
        DataType::CloudsMid => fmt(loc.clouds.mid?, 0),
        DataType::CloudsHigh => fmt(loc.clouds.high?, 0),
        DataType::Cloudiness => fmt(loc.clouds.cloudiness?, 0),
        DataType::Fog => fmt(loc.fog?, 0),
        DataType::Precipitation => {
            let decimals = match units.precipitation {
                PrecipitationUnit::Inches => 2,
                PrecipitationUnit::Millimeters => 1,
            };
            fmt(units.precipitation.from_mm(snow_adjusted_precipitation(loc)?), decimals)
        }
        DataType::Symbol => loc.symbol.name().to_string(),
    };
    Some(text)
}

/// Unit label shown next to a [`get_data`] value; empty for unitless fields.
pub fn get_unit(units: &UnitsConfig, data_type: DataType) -> &'static str {
    match data_type {
        DataType::Altitude => units.altitude.label(),
        DataType::Latitude | DataType::Longitude | DataType::WindDirectionDeg => "°",
        DataType::Temperature | DataType::DewPoint | DataType::ApparentTemperature => {
            units.temperature.label()
        }
        DataType::Pressure => units.pressure.label(),
        DataType::WindSpeed => units.windspeed.label(),
        DataType::Humidity
        | DataType::CloudsLow
        | DataType::CloudsMid
        | DataType::CloudsHigh
        | DataType::Cloudiness
        | DataType::Fog => "%",
        DataType::Precipitation => units.precipitation.label(),
        DataType::WindBeaufort | DataType::WindDirection | DataType::Symbol => "",
    }
}
