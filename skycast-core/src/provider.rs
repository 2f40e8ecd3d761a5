use crate::{
    Config,
    error::LookupError,
    model::{CurrentWeather, LocationQuery, Place, WeatherSample},
    provider::openweather::OpenWeatherProvider,
    units::Units,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Number of autocomplete suggestions requested per lookup.
pub const SUGGESTION_LIMIT: usize = 5;

/// The third-party weather service.
#[async_trait]
pub trait WeatherLookupService: Send + Sync + Debug {
    async fn current_weather(
        &self,
        location: &LocationQuery,
        units: Units,
    ) -> Result<CurrentWeather, LookupError>;

    /// 3-hour samples for the next few days, oldest first.
    async fn forecast(&self, city: &str, units: Units) -> Result<Vec<WeatherSample>, LookupError>;

    async fn geocode(&self, query: &str, limit: usize) -> Result<Vec<Place>, LookupError>;
}

/// Construct the OpenWeatherMap provider from config.
///
/// `env_key` (normally `OWM_API_KEY`) takes precedence over the stored key.
pub fn provider_from_config(
    config: &Config,
    env_key: Option<String>,
) -> anyhow::Result<Box<dyn WeatherLookupService>> {
    let api_key = config.resolve_api_key(env_key)?;
    Ok(Box::new(OpenWeatherProvider::new(api_key)))
}

/// Move places in `preferred_country` to the front, keeping relative order.
pub fn rank_suggestions(places: Vec<Place>, preferred_country: Option<&str>) -> Vec<Place> {
    let Some(country) = preferred_country else {
        return places;
    };

    let (mut preferred, rest): (Vec<_>, Vec<_>) =
        places.into_iter().partition(|p| p.country.eq_ignore_ascii_case(country));
    preferred.extend(rest);
    preferred
}

/// Autocomplete suggestions for `query`. Lookup failures yield no
/// suggestions rather than an error.
pub async fn lookup_suggestions(
    provider: &dyn WeatherLookupService,
    query: &str,
    preferred_country: Option<&str>,
) -> Vec<Place> {
    match provider.geocode(query, SUGGESTION_LIMIT).await {
        Ok(places) => rank_suggestions(places, preferred_country),
        Err(e) => {
            tracing::debug!("Suggestion lookup for {:?} failed: {}", query, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, country: &str) -> Place {
        Place {
            name: name.to_string(),
            state: None,
            country: country.to_string(),
        }
    }

    #[test]
    fn preferred_country_comes_first_in_original_order() {
        let places = vec![
            place("London", "GB"),
            place("London", "CA"),
            place("London", "US"),
            place("Londonderry", "CA"),
        ];

        let ranked = rank_suggestions(places, Some("CA"));

        let order: Vec<_> = ranked.iter().map(|p| (p.name.as_str(), p.country.as_str())).collect();
        assert_eq!(
            order,
            vec![("London", "CA"), ("Londonderry", "CA"), ("London", "GB"), ("London", "US")]
        );
    }

    #[test]
    fn no_preference_keeps_service_order() {
        let places = vec![place("Paris", "FR"), place("Paris", "US")];
        assert_eq!(rank_suggestions(places.clone(), None), places);
    }

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg, None).unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
    }

    #[test]
    fn provider_from_config_works_with_env_key() {
        let cfg = Config::default();
        assert!(provider_from_config(&cfg, Some("KEY".to_string())).is_ok());
    }
}
