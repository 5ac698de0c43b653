//! Weather condition symbols.
//!
//! Ids follow the service's legacy symbol numbering. Ids 16-19 are the
//! polar-night variants of 1, 2, 5 and 8 and share their names. Unknown ids
//! map to `NODATA`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Weather condition code driving icon selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(u32);

impl Symbol {
    pub const NODATA: Symbol = Symbol(0);
    pub const SUN: Symbol = Symbol(1);
    pub const LIGHT_CLOUD: Symbol = Symbol(2);
    pub const PARTLY_CLOUDY: Symbol = Symbol(3);
    pub const OVERCAST: Symbol = Symbol(4);
    pub const LIGHT_RAIN: Symbol = Symbol(9);
    pub const RAIN: Symbol = Symbol(10);
    pub const SLEET: Symbol = Symbol(12);
    pub const SNOW: Symbol = Symbol(13);
    pub const FOG: Symbol = Symbol(15);

    pub const fn from_id(id: u32) -> Self {
        Symbol(id)
    }

    pub const fn id(self) -> u32 {
        self.0
    }

    pub fn name(self) -> &'static str {
        match self.0 {
            1 | 16 => "SUN",
            2 | 17 => "LIGHTCLOUD",
            3 => "PARTLYCLOUD",
            4 => "CLOUD",
            5 | 18 => "LIGHTRAINSUN",
            6 => "LIGHTRAINTHUNDERSUN",
            7 => "SLEETSUN",
            8 | 19 => "SNOWSUN",
            9 => "LIGHTRAIN",
            10 => "RAIN",
            11 => "RAINTHUNDER",
            12 => "SLEET",
            13 => "SNOW",
            14 => "SNOWTHUNDER",
            15 => "FOG",
            20 => "SLEETSUNTHUNDER",
            21 => "SNOWSUNTHUNDER",
            22 => "LIGHTRAINTHUNDER",
            23 => "SLEETTHUNDER",
            24 => "DRIZZLETHUNDERSUN",
            25 => "RAINTHUNDERSUN",
            26 => "LIGHTSLEETTHUNDERSUN",
            27 => "HEAVYSLEETTHUNDERSUN",
            28 => "LIGHTSNOWTHUNDERSUN",
            29 => "HEAVYSNOWTHUNDERSUN",
            30 => "DRIZZLETHUNDER",
            31 => "LIGHTSLEETTHUNDER",
            32 => "HEAVYSLEETTHUNDER",
            33 => "LIGHTSNOWTHUNDER",
            34 => "HEAVYSNOWTHUNDER",
            40 => "DRIZZLESUN",
            41 => "RAINSUN",
            42 => "LIGHTSLEETSUN",
            43 => "HEAVYSLEETSUN",
            44 => "LIGHTSNOWSUN",
            45 => "HEAVYSNOWSUN",
            46 => "DRIZZLE",
            47 => "LIGHTSLEET",
            48 => "HEAVYSLEET",
            49 => "LIGHTSNOW",
            50 => "HEAVYSNOW",
            _ => "NODATA",
        }
    }

    /// True when the condition brings snow, whose reported precipitation is
    /// liquid equivalent.
    pub fn is_snow(self) -> bool {
        self.name().contains("SNOW")
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
