//! Core library for the weather widget.
//!
//! This crate defines:
//! - The lookup pipeline (geocode, current conditions, forecast) and unit toggle
//! - Formatting of parsed weather data into display strings
//! - Noon-sampling of the forecast series
//! - The display sink capability the widget renders into
//! - Configuration & the OpenWeather client
//!
//! It is used by `weather-widget-cli`, but any shell that implements
//! [`DisplaySink`] can host the widget.

pub mod config;
pub mod display;
pub mod error;
pub mod forecast;
pub mod format;
pub mod model;
pub mod provider;
pub mod widget;

pub use config::{Config, Endpoints, WidgetSettings};
pub use display::{DisplaySink, ForecastCard, ForecastRegion, Icon, MemorySink, RenderError, Slot};
pub use error::WidgetError;
pub use forecast::LocalZone;
pub use model::{CurrentConditions, DailyForecastEntry, DisplayUnit, ForecastSample, Location};
pub use provider::{WeatherService, openweather::OpenWeatherService, service_from_config};
pub use widget::{RunOutcome, Widget};
