//! Drives the weather lookups behind each user action and folds the results
//! into [`AppState`].

use std::sync::Arc;

use thiserror::Error;

use crate::{
    error::{AggregateError, LookupError},
    forecast::aggregate,
    history::HistoryManager,
    model::{Coordinates, LocationInfo, LocationQuery, Theme},
    provider::{WeatherLookupService, lookup_suggestions},
    state::{AppState, Event, RequestToken},
    store::KeyValueStore,
    units::Units,
};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Please enter a city name.")]
    EmptyQuery,

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

impl DashboardError {
    /// Message suitable for showing next to the search box.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyQuery => self.to_string(),
            Self::Lookup(LookupError::NotFound(msg)) => msg.clone(),
            Self::Lookup(LookupError::Network(_)) => {
                "Network error. Check your connection.".to_string()
            }
            Self::Lookup(LookupError::Unauthorized(_)) => {
                "The weather service rejected the API key.".to_string()
            }
            Self::Lookup(err) => err.to_string(),
            Self::Aggregate(_) => "The forecast data could not be read.".to_string(),
        }
    }
}

pub struct Dashboard<S> {
    provider: Arc<dyn WeatherLookupService>,
    history: HistoryManager<S>,
    preferred_country: Option<String>,
    state: AppState,
}

impl<S: KeyValueStore> Dashboard<S> {
    /// Creates the dashboard with the saved search history loaded.
    pub fn new(
        provider: Arc<dyn WeatherLookupService>,
        history: HistoryManager<S>,
        units: Units,
        theme: Theme,
    ) -> Self {
        let saved = history.load();
        Self {
            provider,
            history,
            preferred_country: None,
            state: AppState::new(units, theme, saved),
        }
    }

    pub fn with_preferred_country(mut self, country: Option<&str>) -> Self {
        self.preferred_country = country.map(str::to_string);
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn history(&self) -> &HistoryManager<S> {
        &self.history
    }

    pub fn provider(&self) -> Arc<dyn WeatherLookupService> {
        Arc::clone(&self.provider)
    }

    pub fn preferred_country(&self) -> Option<&str> {
        self.preferred_country.as_deref()
    }

    fn dispatch(&mut self, event: Event) {
        let state = std::mem::take(&mut self.state);
        self.state = state.apply(event);
    }

    fn begin_request(&mut self) -> RequestToken {
        self.dispatch(Event::RequestStarted);
        self.state.generation()
    }

    pub fn update_query(&mut self, text: impl Into<String>) {
        self.dispatch(Event::QueryChanged(text.into()));
    }

    /// Initial load: the home location if known, otherwise `default_city`.
    pub async fn start(
        &mut self,
        home: Option<Coordinates>,
        default_city: &str,
    ) -> Result<(), DashboardError> {
        if home.is_some() {
            match self.locate(home).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!("Home location lookup failed, using {}: {}", default_city, e);
                }
            }
        }
        self.search(Some(default_city)).await
    }

    /// Look up `term`, or the current query when `None`, and record it in
    /// the search history.
    pub async fn search(&mut self, term: Option<&str>) -> Result<(), DashboardError> {
        let city = term.unwrap_or(&self.state.query).trim().to_string();
        if city.is_empty() {
            let err = DashboardError::EmptyQuery;
            self.dispatch(Event::ValidationFailed(err.user_message()));
            return Err(err);
        }

        let token = self.begin_request();
        let units = self.state.units;

        let location = match self.provider.geocode(&city, 1).await {
            Ok(places) => places.first().map(LocationInfo::from).unwrap_or_default(),
            Err(e) => {
                tracing::debug!("Geocoding {:?} failed: {}", city, e);
                LocationInfo::default()
            }
        };

        let query = LocationQuery::City(city.clone());
        let weather = match self.provider.current_weather(&query, units).await {
            Ok(weather) => weather,
            Err(e) => return Err(self.fail_current(token, e)),
        };
        self.dispatch(Event::CurrentLoaded {
            token,
            weather,
            location,
        });

        let forecast = self.load_forecast(token, &city, units).await;

        let history = self.state.history.record_search(&city);
        if let Err(e) = self.history.persist(&history) {
            tracing::warn!("Could not save search history: {:#}", anyhow::Error::new(e));
        }
        self.dispatch(Event::SearchCompleted {
            token,
            city,
            history,
        });

        forecast
    }

    /// Show the weather at `coords`. `None` means no location is available.
    pub async fn locate(&mut self, coords: Option<Coordinates>) -> Result<(), DashboardError> {
        let Some(coords) = coords else {
            let err = DashboardError::from(LookupError::PermissionDenied(
                "no location available; set `home` in the config".to_string(),
            ));
            self.dispatch(Event::ValidationFailed(err.user_message()));
            return Err(err);
        };

        let token = self.begin_request();
        let units = self.state.units;

        let query = LocationQuery::Coordinates(coords);
        let weather = match self.provider.current_weather(&query, units).await {
            Ok(weather) => weather,
            Err(e) => return Err(self.fail_current(token, e)),
        };

        let city = weather.name.clone();
        self.dispatch(Event::CurrentLoaded {
            token,
            weather,
            location: LocationInfo::default(),
        });
        self.dispatch(Event::LocationResolved {
            token,
            city: city.clone(),
        });

        self.load_forecast(token, &city, units).await
    }

    /// Switch units and reload the city on screen.
    pub async fn toggle_units(&mut self) -> Result<(), DashboardError> {
        self.dispatch(Event::UnitsToggled);
        match self.state.last_city.clone() {
            Some(city) => self.search(Some(&city)).await,
            None => Ok(()),
        }
    }

    pub fn toggle_theme(&mut self) {
        self.dispatch(Event::ThemeToggled);
    }

    /// Refresh suggestions for the current query.
    pub async fn suggest(&mut self) {
        let query = self.state.query.trim().to_string();
        if query.is_empty() {
            self.dispatch(Event::SuggestionsCleared);
            return;
        }

        let places =
            lookup_suggestions(self.provider.as_ref(), &query, self.preferred_country.as_deref())
                .await;
        self.dispatch(Event::SuggestionsLoaded(places));
    }

    pub fn choose_suggestion(&mut self, index: usize) {
        self.dispatch(Event::SuggestionChosen(index));
    }

    fn fail_current(&mut self, token: RequestToken, err: LookupError) -> DashboardError {
        let err = DashboardError::from(err);
        self.dispatch(Event::CurrentFailed {
            token,
            message: err.user_message(),
        });
        err
    }

    async fn load_forecast(
        &mut self,
        token: RequestToken,
        city: &str,
        units: Units,
    ) -> Result<(), DashboardError> {
        let days = match self.provider.forecast(city, units).await {
            Ok(samples) => aggregate(&samples).map_err(DashboardError::from),
            Err(e) => Err(e.into()),
        };

        match days {
            Ok(days) => {
                self.dispatch(Event::ForecastLoaded { token, days });
                Ok(())
            }
            Err(err) => {
                self.dispatch(Event::ForecastFailed {
                    token,
                    message: err.user_message(),
                });
                Err(err)
            }
        }
    }
}
