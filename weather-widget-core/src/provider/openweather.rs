use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use tracing::{debug, instrument, warn};

use crate::{
    WidgetError,
    config::Endpoints,
    format::NO_DESCRIPTION,
    model::{CurrentConditions, ForecastSample, Location},
};

use super::WeatherService;

pub const CITY_NOT_FOUND: &str = "City not found. Please check the spelling and try again.";
pub const INVALID_LOCATION: &str = "Invalid location data received";
const GEOCODE_FAILED: &str = "Failed to resolve city";
const WEATHER_FAILED: &str = "Failed to fetch weather data";
const FORECAST_FAILED: &str = "Failed to fetch forecast data";
const INVALID_WEATHER: &str = "Invalid weather data structure";
const INVALID_FORECAST: &str = "Invalid forecast data format";

#[derive(Debug, Clone)]
pub struct OpenWeatherService {
    api_key: String,
    endpoints: Endpoints,
    http: Client,
}

impl OpenWeatherService {
    pub fn new(api_key: String, endpoints: Endpoints) -> Self {
        Self {
            api_key,
            endpoints,
            http: Client::new(),
        }
    }

    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<(StatusCode, String), WidgetError> {
        let res = self
            .http
            .get(url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        debug!(%status, bytes = body.len(), "OpenWeather responded");

        if !status.is_success() {
            warn!(%status, body = %truncate_body(&body), "OpenWeather request failed");
        }

        Ok((status, body))
    }

    fn coordinates(location: &Location) -> Vec<(&'static str, String)> {
        vec![
            ("lat", location.latitude.to_string()),
            ("lon", location.longitude.to_string()),
            ("units", "metric".to_string()),
        ]
    }
}

#[async_trait]
impl WeatherService for OpenWeatherService {
    #[instrument(skip(self))]
    async fn geocode(&self, city: &str) -> Result<Location, WidgetError> {
        let url = format!("{}/direct", self.endpoints.geo_url.trim_end_matches('/'));
        let (status, body) =
            self.get(&url, &[("q", city.to_string()), ("limit", "1".to_string())]).await?;
        parse_geocode(status, &body)
    }

    #[instrument(skip(self), fields(lat = %location.latitude, lon = %location.longitude))]
    async fn current(&self, location: &Location) -> Result<CurrentConditions, WidgetError> {
        let url = format!("{}/weather", self.endpoints.data_url.trim_end_matches('/'));
        let (status, body) = self.get(&url, &Self::coordinates(location)).await?;
        parse_current(status, &body)
    }

    #[instrument(skip(self), fields(lat = %location.latitude, lon = %location.longitude))]
    async fn forecast(&self, location: &Location) -> Result<Vec<ForecastSample>, WidgetError> {
        let url = format!("{}/forecast", self.endpoints.data_url.trim_end_matches('/'));
        let (status, body) = self.get(&url, &Self::coordinates(location)).await?;
        parse_forecast(status, &body)
    }
}

#[derive(Debug, Deserialize)]
struct OwError {
    message: Option<String>,
}

/// Reads an optional field that may be missing, `null` or of the wrong type;
/// anything that does not deserialize as `T` becomes `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Deserialize)]
struct OwGeoCandidate {
    #[serde(default, deserialize_with = "lenient")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    #[serde(default, deserialize_with = "lenient")]
    temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    feels_like: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    humidity: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default, deserialize_with = "lenient")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    #[serde(default, deserialize_with = "lenient")]
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default, deserialize_with = "lenient")]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    main: Option<OwMain>,
    #[serde(default, deserialize_with = "lenient")]
    weather: Option<Vec<Option<OwWeather>>>,
    #[serde(default, deserialize_with = "lenient")]
    wind: Option<OwWind>,
    #[serde(default, deserialize_with = "lenient")]
    sys: Option<OwSys>,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    #[serde(default, deserialize_with = "lenient")]
    temp: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    #[serde(default, deserialize_with = "lenient")]
    dt: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    main: Option<OwForecastMain>,
    #[serde(default, deserialize_with = "lenient")]
    weather: Option<Vec<Option<OwWeather>>>,
}

/// Items stay raw so one unusable entry does not sink the whole series.
#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default, deserialize_with = "lenient")]
    list: Option<Vec<serde_json::Value>>,
}

impl TryFrom<OwCurrentResponse> for CurrentConditions {
    type Error = WidgetError;

    fn try_from(raw: OwCurrentResponse) -> Result<Self, Self::Error> {
        let malformed = || WidgetError::MalformedResponse(INVALID_WEATHER.to_string());

        let main = raw.main.ok_or_else(malformed)?;
        let temperature_c = main.temp.ok_or_else(malformed)?;
        let weather = raw
            .weather
            .and_then(|list| list.into_iter().next().flatten())
            .ok_or_else(malformed)?;

        Ok(CurrentConditions {
            place_name: non_empty(raw.name),
            country_code: non_empty(raw.sys.and_then(|sys| sys.country)),
            temperature_c,
            feels_like_c: main.feels_like,
            humidity_pct: main.humidity.unwrap_or(0),
            wind_speed_mps: raw.wind.and_then(|wind| wind.speed).unwrap_or(0.0),
            description: non_empty(weather.description)
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            icon_id: non_empty(weather.icon),
        })
    }
}

impl OwForecastEntry {
    /// `None` for entries that are not objects or carry no timestamp.
    fn sample_from(value: serde_json::Value) -> Option<ForecastSample> {
        let entry: OwForecastEntry = serde_json::from_value(value).ok()?;
        entry.into_sample()
    }

    fn into_sample(self) -> Option<ForecastSample> {
        let first = self.weather.and_then(|list| list.into_iter().next().flatten());
        let (description, icon_id) = match first {
            Some(w) => (non_empty(w.description), non_empty(w.icon)),
            None => (None, None),
        };

        Some(ForecastSample {
            timestamp_utc: self.dt?,
            temperature_c: self.main.and_then(|main| main.temp),
            description,
            icon_id,
        })
    }
}

/// First candidate of a `limit=1` geocoding answer.
pub fn parse_geocode(status: StatusCode, body: &str) -> Result<Location, WidgetError> {
    if !status.is_success() {
        return Err(upstream_error(body, GEOCODE_FAILED));
    }

    let candidates: Vec<OwGeoCandidate> = serde_json::from_str(body)
        .map_err(|_| WidgetError::NotFound(CITY_NOT_FOUND.to_string()))?;

    let first = candidates
        .into_iter()
        .next()
        .ok_or_else(|| WidgetError::NotFound(CITY_NOT_FOUND.to_string()))?;

    match (first.lat, first.lon) {
        (Some(latitude), Some(longitude)) => Ok(Location { latitude, longitude }),
        _ => Err(WidgetError::NotFound(INVALID_LOCATION.to_string())),
    }
}

pub fn parse_current(status: StatusCode, body: &str) -> Result<CurrentConditions, WidgetError> {
    if !status.is_success() {
        return Err(upstream_error(body, WEATHER_FAILED));
    }

    let raw: OwCurrentResponse = serde_json::from_str(body)
        .map_err(|e| WidgetError::MalformedResponse(format!("{INVALID_WEATHER}: {e}")))?;

    CurrentConditions::try_from(raw)
}

/// Entries without a usable timestamp are dropped.
pub fn parse_forecast(status: StatusCode, body: &str) -> Result<Vec<ForecastSample>, WidgetError> {
    if !status.is_success() {
        return Err(upstream_error(body, FORECAST_FAILED));
    }

    let raw: OwForecastResponse = serde_json::from_str(body)
        .map_err(|e| WidgetError::MalformedResponse(format!("{INVALID_FORECAST}: {e}")))?;

    let list = raw
        .list
        .ok_or_else(|| WidgetError::MalformedResponse(INVALID_FORECAST.to_string()))?;

    Ok(list.into_iter().filter_map(OwForecastEntry::sample_from).collect())
}

fn upstream_error(body: &str, fallback: &str) -> WidgetError {
    let message = serde_json::from_str::<OwError>(body)
        .ok()
        .and_then(|err| non_empty(err.message))
        .unwrap_or_else(|| fallback.to_string());
    WidgetError::Upstream(message)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
