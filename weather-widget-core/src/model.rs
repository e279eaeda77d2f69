use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Coordinates resolved from a free-text city name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Current conditions after the validated parse.
///
/// Humidity, wind speed and description already carry their fallbacks; the
/// remaining `Option`s are kept because rendering depends on their presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub place_name: Option<String>,
    pub country_code: Option<String>,
    pub temperature_c: f64,
    pub feels_like_c: Option<f64>,
    pub humidity_pct: u32,
    pub wind_speed_mps: f64,
    pub description: String,
    pub icon_id: Option<String>,
}

/// One sample of the raw forecast series, typically 3 hours apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp_utc: i64,
    pub temperature_c: Option<f64>,
    pub description: Option<String>,
    pub icon_id: Option<String>,
}

/// A forecast sample chosen to represent one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecastEntry {
    pub sample: ForecastSample,
    pub date_label: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl DisplayUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayUnit::Celsius => "celsius",
            DisplayUnit::Fahrenheit => "fahrenheit",
        }
    }

    /// Suffix appended to rendered temperatures.
    pub fn symbol(&self) -> &'static str {
        match self {
            DisplayUnit::Celsius => "°C",
            DisplayUnit::Fahrenheit => "°F",
        }
    }

    pub const fn all() -> &'static [DisplayUnit] {
        &[DisplayUnit::Celsius, DisplayUnit::Fahrenheit]
    }
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Unknown unit '{0}'. Supported units: celsius, fahrenheit.")]
pub struct UnknownUnit(pub String);

impl FromStr for DisplayUnit {
    type Err = UnknownUnit;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "celsius" | "c" => Ok(DisplayUnit::Celsius),
            "fahrenheit" | "f" => Ok(DisplayUnit::Fahrenheit),
            _ => Err(UnknownUnit(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_parses_long_and_short_names() {
        assert_eq!("Celsius".parse::<DisplayUnit>().unwrap(), DisplayUnit::Celsius);
        assert_eq!("f".parse::<DisplayUnit>().unwrap(), DisplayUnit::Fahrenheit);
        for unit in DisplayUnit::all() {
            assert_eq!(unit.as_str().parse::<DisplayUnit>().unwrap(), *unit);
        }
    }

    #[test]
    fn unknown_unit_error() {
        let err = "kelvin".parse::<DisplayUnit>().unwrap_err();
        assert!(err.to_string().contains("Unknown unit 'kelvin'"));
    }

    #[test]
    fn default_unit_is_celsius() {
        assert_eq!(DisplayUnit::default(), DisplayUnit::Celsius);
        assert_eq!(DisplayUnit::default().symbol(), "°C");
    }
}
