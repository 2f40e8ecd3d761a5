use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Temperature as delivered by the weather service, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTemperature {
    Number(f64),
    Text(String),
    /// `null`, booleans, objects and anything else the service sends.
    Other(serde_json::Value),
}

impl Default for RawTemperature {
    fn default() -> Self {
        RawTemperature::Other(serde_json::Value::Null)
    }
}

impl RawTemperature {
    /// The numeric value, if it is a finite number.
    pub fn value(&self) -> Option<f64> {
        let v = match self {
            RawTemperature::Number(n) => *n,
            RawTemperature::Text(s) => s.trim().parse::<f64>().ok()?,
            RawTemperature::Other(_) => return None,
        };
        v.is_finite().then_some(v)
    }
}

impl From<f64> for RawTemperature {
    fn from(value: f64) -> Self {
        RawTemperature::Number(value)
    }
}

impl fmt::Display for RawTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawTemperature::Number(n) => write!(f, "{n}"),
            RawTemperature::Text(s) => write!(f, "{s:?}"),
            RawTemperature::Other(v) => write!(f, "{v}"),
        }
    }
}

/// One 3-hour forecast data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    /// `YYYY-MM-DD HH:MM:SS`
    pub timestamp_text: String,
    pub temperature: RawTemperature,
    pub icon_code: String,
    pub description: String,
}

impl WeatherSample {
    pub fn new(
        timestamp_text: impl Into<String>,
        temperature: impl Into<RawTemperature>,
        icon_code: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            timestamp_text: timestamp_text.into(),
            temperature: temperature.into(),
            icon_code: icon_code.into(),
            description: description.into(),
        }
    }
}

/// Aggregated conditions for one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    /// `YYYY-MM-DD`
    pub date: String,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub icon_code: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// What to look current weather up by.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates(Coordinates),
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::City(name) => f.write_str(name),
            LocationQuery::Coordinates(c) => write!(f, "({c})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Place name as reported by the service.
    pub name: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub description: String,
    pub icon_code: String,
    pub observed_at: DateTime<Utc>,
}

/// Geocoding result, also used for autocomplete suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    pub country: String,
}

impl Place {
    /// `name, state, country`, with the state left out when unknown.
    pub fn label(&self) -> String {
        match self.state.as_deref().filter(|s| !s.is_empty()) {
            Some(state) => format!("{}, {}, {}", self.name, state, self.country),
            None => format!("{}, {}", self.name, self.country),
        }
    }
}

/// Region details shown next to the current-weather place name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationInfo {
    pub state: String,
    pub country: String,
}

impl From<&Place> for LocationInfo {
    fn from(place: &Place) -> Self {
        Self {
            state: place.state.clone().unwrap_or_default(),
            country: place.country.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark_mode(dark: bool) -> Self {
        if dark { Theme::Dark } else { Theme::Light }
    }

    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_temperature_accepts_numbers_and_numeric_text() {
        assert_eq!(RawTemperature::Number(4.5).value(), Some(4.5));
        assert_eq!(RawTemperature::Text(" -3.25 ".into()).value(), Some(-3.25));
        assert_eq!(RawTemperature::Text("warm".into()).value(), None);
        assert_eq!(RawTemperature::Number(f64::NAN).value(), None);
    }

    #[test]
    fn raw_temperature_deserializes_untagged() {
        let n: RawTemperature = serde_json::from_str("12.5").unwrap();
        let s: RawTemperature = serde_json::from_str("\"n/a\"").unwrap();
        assert_eq!(n, RawTemperature::Number(12.5));
        assert_eq!(s, RawTemperature::Text("n/a".into()));
    }

    #[test]
    fn raw_temperature_keeps_unexpected_json_for_validation() {
        let null: RawTemperature = serde_json::from_str("null").unwrap();
        let object: RawTemperature = serde_json::from_str(r#"{"c": 4}"#).unwrap();
        assert_eq!(null, RawTemperature::Other(serde_json::Value::Null));
        assert_eq!(null.value(), None);
        assert_eq!(object.value(), None);
        assert_eq!(RawTemperature::Other(serde_json::json!(true)).to_string(), "true");
    }

    #[test]
    fn place_label_omits_missing_state() {
        let with_state = Place {
            name: "London".into(),
            state: Some("Ontario".into()),
            country: "CA".into(),
        };
        let without = Place {
            name: "Paris".into(),
            state: None,
            country: "FR".into(),
        };
        let empty_state = Place {
            state: Some(String::new()),
            ..without.clone()
        };

        assert_eq!(with_state.label(), "London, Ontario, CA");
        assert_eq!(without.label(), "Paris, FR");
        assert_eq!(empty_state.label(), "Paris, FR");
    }
}
