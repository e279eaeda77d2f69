//! Pure, total conversions from parsed weather data to display strings.

use crate::{
    display::{ForecastCard, Icon, Slot},
    model::{CurrentConditions, DailyForecastEntry, DisplayUnit},
};

pub const UNKNOWN_LOCATION: &str = "Unknown Location";
pub const NO_DESCRIPTION: &str = "No description available";
pub const FORECAST_NO_DESCRIPTION: &str = "No description";
pub const FORECAST_DEFAULT_ICON: &str = "01d";
pub const MISSING_TEMPERATURE: &str = "--";

const MPS_TO_KMH: f64 = 3.6;

/// Rounds to the nearest integer, ties toward positive infinity.
pub fn round_half_up(value: f64) -> i64 {
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}

pub fn location_label(name: Option<&str>, country: Option<&str>) -> String {
    match (name, country) {
        (Some(name), Some(country)) => format!("{name}, {country}"),
        (Some(name), None) => name.to_string(),
        (None, _) => UNKNOWN_LOCATION.to_string(),
    }
}

pub fn temperature(celsius: f64) -> String {
    round_half_up(celsius).to_string()
}

/// Rounded value with the unit suffix. The value is not converted; the suffix
/// follows the active unit only.
pub fn temperature_with_unit(value: Option<f64>, unit: DisplayUnit) -> String {
    match value {
        Some(v) => format!("{}{}", round_half_up(v), unit.symbol()),
        None => format!("{MISSING_TEMPERATURE}{}", unit.symbol()),
    }
}

pub fn humidity(percent: u32) -> String {
    format!("{percent}%")
}

pub fn wind_speed(meters_per_second: f64) -> String {
    format!("{} km/h", round_half_up(meters_per_second * MPS_TO_KMH))
}

pub fn current_icon(base_url: &str, icon_id: &str, description: &str) -> Icon {
    Icon {
        url: format!("{}/{icon_id}@2x.png", base_url.trim_end_matches('/')),
        alt: description.to_string(),
    }
}

pub fn forecast_icon(base_url: &str, icon_id: &str, description: &str) -> Icon {
    Icon {
        url: format!("{}/{icon_id}.png", base_url.trim_end_matches('/')),
        alt: description.to_string(),
    }
}

/// Everything the current-conditions region shows for one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentView {
    pub fields: Vec<(Slot, String)>,
    /// `None` removes any previous image.
    pub icon: Option<Icon>,
}

pub fn current_view(
    conditions: &CurrentConditions,
    unit: DisplayUnit,
    icon_base: &str,
) -> CurrentView {
    let fields = vec![
        (
            Slot::City,
            location_label(conditions.place_name.as_deref(), conditions.country_code.as_deref()),
        ),
        (Slot::Temperature, temperature(conditions.temperature_c)),
        (Slot::Description, conditions.description.clone()),
        (Slot::Humidity, humidity(conditions.humidity_pct)),
        (Slot::WindSpeed, wind_speed(conditions.wind_speed_mps)),
        (Slot::FeelsLike, temperature_with_unit(conditions.feels_like_c, unit)),
    ];

    let icon = conditions
        .icon_id
        .as_deref()
        .map(|id| current_icon(icon_base, id, &conditions.description));

    CurrentView { fields, icon }
}

pub fn forecast_card(
    entry: &DailyForecastEntry,
    unit: DisplayUnit,
    icon_base: &str,
) -> ForecastCard {
    let description = entry.sample.description.as_deref().unwrap_or(FORECAST_NO_DESCRIPTION);
    let icon_id = entry.sample.icon_id.as_deref().unwrap_or(FORECAST_DEFAULT_ICON);

    ForecastCard {
        date_label: entry.date_label.clone(),
        icon: forecast_icon(icon_base, icon_id, description),
        temperature: temperature_with_unit(entry.sample.temperature_c, unit),
        description: description.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ForecastSample;

    const ICONS: &str = "https://openweathermap.org/img/wn";

    fn london() -> CurrentConditions {
        CurrentConditions {
            place_name: Some("London".into()),
            country_code: Some("GB".into()),
            temperature_c: 15.0,
            feels_like_c: Some(14.0),
            humidity_pct: 70,
            wind_speed_mps: 5.0,
            description: "clear sky".into(),
            icon_id: Some("01d".into()),
        }
    }

    fn field(view: &CurrentView, slot: Slot) -> &str {
        view.fields
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, v)| v.as_str())
            .expect("slot must be rendered")
    }

    #[test]
    fn rounds_half_toward_positive_infinity() {
        assert_eq!(round_half_up(14.5), 15);
        assert_eq!(round_half_up(14.49), 14);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.51), -3);
        assert_eq!(round_half_up(-0.4), 0);
    }

    #[test]
    fn location_label_rules() {
        assert_eq!(location_label(Some("London"), Some("GB")), "London, GB");
        assert_eq!(location_label(Some("London"), None), "London");
        assert_eq!(location_label(None, Some("GB")), "Unknown Location");
        assert_eq!(location_label(None, None), "Unknown Location");
    }

    #[test]
    fn feels_like_suffix_follows_unit_without_conversion() {
        assert_eq!(temperature_with_unit(Some(14.0), DisplayUnit::Celsius), "14°C");
        assert_eq!(temperature_with_unit(Some(14.0), DisplayUnit::Fahrenheit), "14°F");
        assert_eq!(temperature_with_unit(Some(13.6), DisplayUnit::Fahrenheit), "14°F");
        assert_eq!(temperature_with_unit(None, DisplayUnit::Celsius), "--°C");
    }

    #[test]
    fn wind_speed_converts_to_kmh() {
        assert_eq!(wind_speed(5.0), "18 km/h");
        assert_eq!(wind_speed(0.0), "0 km/h");
        assert_eq!(wind_speed(2.5), "9 km/h");
    }

    #[test]
    fn current_view_renders_all_slots() {
        let view = current_view(&london(), DisplayUnit::Celsius, ICONS);

        assert_eq!(field(&view, Slot::City), "London, GB");
        assert_eq!(field(&view, Slot::Temperature), "15");
        assert_eq!(field(&view, Slot::Description), "clear sky");
        assert_eq!(field(&view, Slot::Humidity), "70%");
        assert_eq!(field(&view, Slot::WindSpeed), "18 km/h");
        assert_eq!(field(&view, Slot::FeelsLike), "14°C");

        let icon = view.icon.expect("icon id present");
        assert_eq!(icon.url, "https://openweathermap.org/img/wn/01d@2x.png");
        assert_eq!(icon.alt, "clear sky");
    }

    #[test]
    fn current_view_omits_icon_without_id() {
        let mut conditions = london();
        conditions.icon_id = None;

        let view = current_view(&conditions, DisplayUnit::Celsius, ICONS);
        assert!(view.icon.is_none());
    }

    #[test]
    fn forecast_card_defaults_missing_fields() {
        let entry = DailyForecastEntry {
            sample: ForecastSample {
                timestamp_utc: 1_705_320_000,
                temperature_c: None,
                description: None,
                icon_id: None,
            },
            date_label: "Mon, Jan 15".into(),
        };

        let card = forecast_card(&entry, DisplayUnit::Fahrenheit, ICONS);
        assert_eq!(card.temperature, "--°F");
        assert_eq!(card.description, "No description");
        assert_eq!(card.icon.url, "https://openweathermap.org/img/wn/01d.png");
        assert_eq!(card.date_label, "Mon, Jan 15");
    }
}
