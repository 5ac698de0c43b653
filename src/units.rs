//! # Measurement Units
//!
//! Display unit selections and the conversion factors from the canonical units
//! stored in a [`Location`](crate::Location): °C, hPa, m/s, mm and meters.
//!
//! Every enum serializes to a short lowercase name, which is also what
//! `FromStr` accepts and `Display` prints:
//! ```
//! use weather_core::units::PressureUnit;
//!
//! let unit: PressureUnit = "inch_mercury".parse().unwrap();
//! assert_eq!(unit, PressureUnit::InchMercury);
//! assert_eq!(unit.to_string(), "inch_mercury");
//! ```

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Unit name that matches none of the known units of its kind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} unit '{value}'")]
pub struct UnitError {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a unit enum together with its name table, `Default`, `Display`
/// and `FromStr`.
macro_rules! unit_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal, default = $default:ident,
        { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const fn all() -> &'static [$name] {
                &[$($name::$variant),+]
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnitError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let lower = value.trim().to_lowercase();
                $name::all()
                    .iter()
                    .copied()
                    .find(|unit| unit.as_str() == lower)
                    .ok_or_else(|| UnitError {
                        kind: $kind,
                        value: value.to_string(),
                    })
            }
        }
    };
}

unit_enum! {
    TemperatureUnit, "temperature", default = Celsius,
    { Celsius => "celsius", Fahrenheit => "fahrenheit" }
}

unit_enum! {
    PressureUnit, "pressure", default = Hectopascal,
    {
        Hectopascal => "hectopascal",
        InchMercury => "inch_mercury",
        Psi => "psi",
        /// Millimeters of mercury
        Torr => "torr",
    }
}

unit_enum! {
    WindSpeedUnit, "wind speed", default = KilometersPerHour,
    {
        KilometersPerHour => "kmh",
        MilesPerHour => "mph",
        MetersPerSecond => "mps",
        FeetPerSecond => "fps",
        Knots => "knots",
    }
}

unit_enum! {
    PrecipitationUnit, "precipitation", default = Millimeters,
    { Millimeters => "millimeters", Inches => "inches" }
}

unit_enum! {
    AltitudeUnit, "altitude", default = Meters,
    { Meters => "meters", Feet => "feet" }
}

unit_enum! {
    /// Model used to compute the "feels like" temperature.
    ApparentTemperatureModel, "apparent temperature", default = WindchillHeatindex,
    {
        /// NWS wind chill below 10 °C, heat index / summer simmer index above 26.7 °C
        WindchillHeatindex => "windchill_heatindex",
        /// Canadian wind chill below 0 °C, humidex above 20 °C
        WindchillHumidex => "windchill_humidex",
        /// Australian BOM formula from temperature, wind and humidity
        Steadman => "steadman",
        /// Temperature and wind only
        QuayleSteadman => "quayle_steadman",
    }
}

impl TemperatureUnit {
    pub fn from_celsius(self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius_to_fahrenheit(celsius),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

impl PressureUnit {
    pub fn from_hpa(self, hpa: f64) -> f64 {
        match self {
            PressureUnit::Hectopascal => hpa,
            PressureUnit::InchMercury => hpa * 0.03,
            PressureUnit::Psi => hpa * 0.014_503_79,
            PressureUnit::Torr => hpa / 1.333_224,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PressureUnit::Hectopascal => "hPa",
            PressureUnit::InchMercury => "inHg",
            PressureUnit::Psi => "psi",
            PressureUnit::Torr => "mmHg",
        }
    }
}

impl WindSpeedUnit {
    pub fn from_mps(self, mps: f64) -> f64 {
        match self {
            WindSpeedUnit::KilometersPerHour => mps * 3.6,
            WindSpeedUnit::MilesPerHour => mps * 2.236_94,
            WindSpeedUnit::MetersPerSecond => mps,
            WindSpeedUnit::FeetPerSecond => mps * 3.280_84,
            WindSpeedUnit::Knots => mps * 1.943_84,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WindSpeedUnit::KilometersPerHour => "km/h",
            WindSpeedUnit::MilesPerHour => "mph",
            WindSpeedUnit::MetersPerSecond => "m/s",
            WindSpeedUnit::FeetPerSecond => "ft/s",
            WindSpeedUnit::Knots => "kt",
        }
    }
}

impl PrecipitationUnit {
    pub fn from_mm(self, mm: f64) -> f64 {
        match self {
            PrecipitationUnit::Millimeters => mm,
            PrecipitationUnit::Inches => mm / 25.4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PrecipitationUnit::Millimeters => "mm",
            PrecipitationUnit::Inches => "in",
        }
    }
}

impl AltitudeUnit {
    pub fn from_meters(self, meters: f64) -> f64 {
        match self {
            AltitudeUnit::Meters => meters,
            AltitudeUnit::Feet => meters / 0.3048,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AltitudeUnit::Meters => "m",
            AltitudeUnit::Feet => "ft",
        }
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Display unit selection, one independent choice per quantity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitsConfig {
    pub temperature: TemperatureUnit,
    pub pressure: PressureUnit,
    pub windspeed: WindSpeedUnit,
    pub precipitation: PrecipitationUnit,
    pub altitude: AltitudeUnit,
    pub apparent_temperature: ApparentTemperatureModel,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_names_roundtrip() {
        for unit in WindSpeedUnit::all() {
            let parsed: WindSpeedUnit = unit.as_str().parse().expect("roundtrip should succeed");
            assert_eq!(*unit, parsed);
        }
        for model in ApparentTemperatureModel::all() {
            assert_eq!(model.to_string().parse::<ApparentTemperatureModel>(), Ok(*model));
        }
    }

    #[test]
    fn test_unknown_unit_error() {
        let err = "kelvin".parse::<TemperatureUnit>().unwrap_err();
        assert_eq!(err.kind, "temperature");
        assert!(err.to_string().contains("unknown temperature unit 'kelvin'"));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Fahrenheit".parse::<TemperatureUnit>(), Ok(TemperatureUnit::Fahrenheit));
        assert_eq!(" KNOTS ".parse::<WindSpeedUnit>(), Ok(WindSpeedUnit::Knots));
    }

    #[test]
    fn test_defaults() {
        let units = UnitsConfig::default();
        assert_eq!(units.temperature, TemperatureUnit::Celsius);
        assert_eq!(units.pressure, PressureUnit::Hectopascal);
        assert_eq!(units.windspeed, WindSpeedUnit::KilometersPerHour);
        assert_eq!(units.precipitation, PrecipitationUnit::Millimeters);
        assert_eq!(units.altitude, AltitudeUnit::Meters);
        assert_eq!(
            units.apparent_temperature,
            ApparentTemperatureModel::WindchillHeatindex
        );
    }

    #[test]
    fn test_conversion_factors() {
        assert!(close(PressureUnit::InchMercury.from_hpa(1000.0), 30.0));
        assert!(close(PressureUnit::Psi.from_hpa(1000.0), 14.50379));
        assert!(close(PressureUnit::Torr.from_hpa(1333.224), 1000.0));
        assert!(close(WindSpeedUnit::KilometersPerHour.from_mps(10.0), 36.0));
        assert!(close(WindSpeedUnit::MilesPerHour.from_mps(10.0), 22.3694));
        assert!(close(WindSpeedUnit::FeetPerSecond.from_mps(1.0), 3.28084));
        assert!(close(WindSpeedUnit::Knots.from_mps(1.0), 1.94384));
        assert!(close(AltitudeUnit::Feet.from_meters(0.3048), 1.0));
        assert!(close(PrecipitationUnit::Inches.from_mm(25.4), 1.0));
        assert!(close(TemperatureUnit::Fahrenheit.from_celsius(100.0), 212.0));
        assert!(close(fahrenheit_to_celsius(-40.0), -40.0));
    }
}
