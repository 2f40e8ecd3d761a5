use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    error::LookupError,
    model::{CurrentWeather, LocationQuery, Place, RawTemperature, WeatherSample},
    units::Units,
};

use super::WeatherLookupService;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// GET `path` and decode the JSON body. `not_found` is used for a 404
    /// whose body carries no message of its own.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        not_found: &str,
    ) -> Result<T, LookupError> {
        let res = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(status_error(status, &body, not_found));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn status_error(status: StatusCode, body: &str, not_found: &str) -> LookupError {
    let message = serde_json::from_str::<OwErrorBody>(body).ok().and_then(|b| b.message);

    match status {
        StatusCode::NOT_FOUND => {
            LookupError::NotFound(message.unwrap_or_else(|| not_found.to_string()))
        }
        StatusCode::UNAUTHORIZED => {
            LookupError::Unauthorized(message.unwrap_or_else(|| "request was rejected".to_string()))
        }
        _ => LookupError::Api {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| truncate_body(body)),
        },
    }
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    icon: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    #[serde(default)]
    temp: RawTemperature,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwForecastMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Option<Vec<OwForecastEntry>>,
}

#[derive(Debug, Deserialize)]
struct OwPlace {
    name: String,
    state: Option<String>,
    country: String,
}

#[async_trait]
impl WeatherLookupService for OpenWeatherProvider {
    async fn current_weather(
        &self,
        location: &LocationQuery,
        units: Units,
    ) -> Result<CurrentWeather, LookupError> {
        let units_param = ("units", units.as_api_param().to_string());
        let (params, not_found) = match location {
            LocationQuery::City(name) => (vec![("q", name.clone()), units_param], "City not found"),
            LocationQuery::Coordinates(c) => (
                vec![("lat", c.lat.to_string()), ("lon", c.lon.to_string()), units_param],
                "Location error",
            ),
        };

        let parsed: OwCurrentResponse =
            self.get_json("/data/2.5/weather", &params, not_found).await?;

        let (icon_code, description) = first_condition(parsed.weather);
        tracing::info!("Current weather loaded for {}", parsed.name);

        Ok(CurrentWeather {
            name: parsed.name,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            description,
            icon_code,
            observed_at: unix_to_utc(parsed.dt).unwrap_or_else(Utc::now),
        })
    }

    async fn forecast(&self, city: &str, units: Units) -> Result<Vec<WeatherSample>, LookupError> {
        let params = [("q", city.to_string()), ("units", units.as_api_param().to_string())];

        let parsed: OwForecastResponse =
            self.get_json("/data/2.5/forecast", &params, "Forecast not found").await?;

        let list = parsed
            .list
            .ok_or_else(|| LookupError::NotFound("No forecast data available".to_string()))?;

        Ok(list
            .into_iter()
            .map(|entry| {
                let (icon_code, description) = first_condition(entry.weather);
                WeatherSample {
                    timestamp_text: entry.dt_txt,
                    temperature: entry.main.temp,
                    icon_code,
                    description,
                }
            })
            .collect())
    }

    async fn geocode(&self, query: &str, limit: usize) -> Result<Vec<Place>, LookupError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let params = [("q", query.to_string()), ("limit", limit.to_string())];
        let places: Vec<OwPlace> =
            self.get_json("/geo/1.0/direct", &params, "Place not found").await?;

        Ok(places
            .into_iter()
            .map(|p| Place {
                name: p.name,
                state: p.state,
                country: p.country,
            })
            .collect())
    }
}

fn first_condition(weather: Vec<OwWeather>) -> (String, String) {
    weather
        .into_iter()
        .next()
        .map(|w| (w.icon, w.description))
        .unwrap_or_else(|| (String::new(), "Unknown".to_string()))
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
