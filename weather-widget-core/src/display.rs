//! The display capability the widget renders into.
//!
//! The pipeline only ever talks to [`DisplaySink`]; what the slots look like
//! on screen is up to the shell that implements it.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::DisplayUnit;

/// Named text slots of the current-conditions region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    City,
    Temperature,
    Description,
    Humidity,
    WindSpeed,
    FeelsLike,
}

impl Slot {
    pub const fn all() -> &'static [Slot] {
        &[
            Slot::City,
            Slot::Temperature,
            Slot::Description,
            Slot::Humidity,
            Slot::WindSpeed,
            Slot::FeelsLike,
        ]
    }
}

/// Image reference plus alt text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub url: String,
    pub alt: String,
}

/// One rendered day of the forecast region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastCard {
    pub date_label: String,
    pub icon: Icon,
    pub temperature: String,
    pub description: String,
}

pub const FORECAST_UNAVAILABLE: &str = "Forecast data unavailable";

/// Slot values of the cleared/error state.
pub const CLEARED_FIELDS: [(Slot, &str); 6] = [
    (Slot::City, "Weather Unavailable"),
    (Slot::Temperature, "--"),
    (Slot::Description, "Please try again later"),
    (Slot::Humidity, "--%"),
    (Slot::WindSpeed, "-- km/h"),
    (Slot::FeelsLike, "--°C"),
];

#[derive(Debug, Clone, Error)]
#[error("Failed to render {target}: {reason}")]
pub struct RenderError {
    pub target: String,
    pub reason: String,
}

impl RenderError {
    pub fn new(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            reason: reason.into(),
        }
    }
}

pub trait DisplaySink {
    fn set_field(&mut self, slot: Slot, value: &str) -> Result<(), RenderError>;

    /// `None` removes the image.
    fn set_icon(&mut self, icon: Option<&Icon>) -> Result<(), RenderError>;

    /// Replaces the whole forecast region.
    fn set_forecast_list(&mut self, cards: &[ForecastCard]) -> Result<(), RenderError>;

    fn set_forecast_unavailable(&mut self, message: &str) -> Result<(), RenderError>;

    /// Marks `active` as the selected toggle and the other one inactive.
    fn set_unit_toggle(&mut self, active: DisplayUnit) -> Result<(), RenderError>;

    /// Blocking user notification. Must not fail.
    fn notify_error(&mut self, message: &str);

    fn clear_all(&mut self) -> Result<(), RenderError> {
        for (slot, value) in CLEARED_FIELDS {
            self.set_field(slot, value)?;
        }
        self.set_icon(None)?;
        self.set_forecast_list(&[])
    }
}

/// What the forecast region currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForecastRegion {
    Cards(Vec<ForecastCard>),
    Unavailable(String),
}

impl Default for ForecastRegion {
    fn default() -> Self {
        ForecastRegion::Cards(Vec::new())
    }
}

/// Sink that keeps the rendered state in memory.
///
/// Shells paint from it; tests assert on it.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    fields: BTreeMap<Slot, String>,
    icon: Option<Icon>,
    forecast: ForecastRegion,
    active_unit: DisplayUnit,
    alerts: Vec<String>,
    writes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, slot: Slot) -> Option<&str> {
        self.fields.get(&slot).map(String::as_str)
    }

    pub fn icon(&self) -> Option<&Icon> {
        self.icon.as_ref()
    }

    pub fn forecast(&self) -> &ForecastRegion {
        &self.forecast
    }

    pub fn active_unit(&self) -> DisplayUnit {
        self.active_unit
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// Removes and returns the queued notifications.
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    /// Number of slot writes since creation; a no-op render leaves it unchanged.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl DisplaySink for MemorySink {
    fn set_field(&mut self, slot: Slot, value: &str) -> Result<(), RenderError> {
        self.writes += 1;
        self.fields.insert(slot, value.to_string());
        Ok(())
    }

    fn set_icon(&mut self, icon: Option<&Icon>) -> Result<(), RenderError> {
        self.writes += 1;
        self.icon = icon.cloned();
        Ok(())
    }

    fn set_forecast_list(&mut self, cards: &[ForecastCard]) -> Result<(), RenderError> {
        self.writes += 1;
        self.forecast = ForecastRegion::Cards(cards.to_vec());
        Ok(())
    }

    fn set_forecast_unavailable(&mut self, message: &str) -> Result<(), RenderError> {
        self.writes += 1;
        self.forecast = ForecastRegion::Unavailable(message.to_string());
        Ok(())
    }

    fn set_unit_toggle(&mut self, active: DisplayUnit) -> Result<(), RenderError> {
        self.active_unit = active;
        Ok(())
    }

    fn notify_error(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}
