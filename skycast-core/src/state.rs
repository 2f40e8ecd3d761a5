//! Dashboard state as a single value, updated only through [`Event`]s.
//!
//! Every network request is tagged with the [`RequestToken`] current when it
//! started. Results carrying an older token belong to a superseded request
//! and are dropped, so a slow response can never overwrite a newer one.

use crate::{
    history::HistoryList,
    model::{CurrentWeather, DaySummary, LocationInfo, Place, Theme},
    units::Units,
};

/// Generation counter identifying the most recent request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    fn next(self) -> Self {
        RequestToken(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The search input changed.
    QueryChanged(String),
    SuggestionsLoaded(Vec<Place>),
    /// A suggestion was picked by index; its label becomes the query.
    SuggestionChosen(usize),
    SuggestionsCleared,
    /// A lookup began; supersedes every earlier request.
    RequestStarted,
    CurrentLoaded {
        token: RequestToken,
        weather: CurrentWeather,
        location: LocationInfo,
    },
    CurrentFailed {
        token: RequestToken,
        message: String,
    },
    ForecastLoaded {
        token: RequestToken,
        days: Vec<DaySummary>,
    },
    ForecastFailed {
        token: RequestToken,
        message: String,
    },
    /// A city search finished; records it and clears the input.
    SearchCompleted {
        token: RequestToken,
        city: String,
        history: HistoryList,
    },
    /// A coordinate lookup resolved to a named place.
    LocationResolved {
        token: RequestToken,
        city: String,
    },
    /// Input was rejected before any request was made.
    ValidationFailed(String),
    UnitsToggled,
    ThemeToggled,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub query: String,
    pub units: Units,
    pub theme: Theme,
    pub loading: bool,
    pub error: Option<String>,
    pub current: Option<CurrentWeather>,
    pub location: LocationInfo,
    pub forecast: Vec<DaySummary>,
    pub history: HistoryList,
    pub suggestions: Vec<Place>,
    /// City whose weather is on screen, refetched when units change.
    pub last_city: Option<String>,
    generation: RequestToken,
}

impl AppState {
    pub fn new(units: Units, theme: Theme, history: HistoryList) -> Self {
        Self {
            units,
            theme,
            history,
            ..Self::default()
        }
    }

    /// Token of the most recently started request.
    pub fn generation(&self) -> RequestToken {
        self.generation
    }

    fn is_current(&self, token: RequestToken) -> bool {
        if token != self.generation {
            tracing::debug!(?token, current = ?self.generation, "Dropping stale result");
            return false;
        }
        true
    }

    /// The state after `event`.
    pub fn apply(self, event: Event) -> AppState {
        match event {
            Event::QueryChanged(query) => AppState { query, ..self },
            Event::SuggestionsLoaded(suggestions) => AppState {
                suggestions,
                ..self
            },
            Event::SuggestionChosen(index) => {
                let Some(label) = self.suggestions.get(index).map(Place::label) else {
                    return self;
                };
                AppState {
                    query: label,
                    suggestions: Vec::new(),
                    ..self
                }
            }
            Event::SuggestionsCleared => AppState {
                suggestions: Vec::new(),
                ..self
            },
            Event::RequestStarted => AppState {
                generation: self.generation.next(),
                loading: true,
                error: None,
                ..self
            },
            Event::CurrentLoaded { token, weather, location } if self.is_current(token) => {
                AppState {
                    current: Some(weather),
                    location,
                    ..self
                }
            }
            Event::CurrentFailed { token, message } if self.is_current(token) => AppState {
                current: None,
                location: LocationInfo::default(),
                error: Some(message),
                loading: false,
                ..self
            },
            Event::ForecastLoaded { token, days } if self.is_current(token) => AppState {
                forecast: days,
                loading: false,
                ..self
            },
            Event::ForecastFailed { token, message } if self.is_current(token) => AppState {
                forecast: Vec::new(),
                error: Some(message),
                loading: false,
                ..self
            },
            Event::SearchCompleted { token, city, history } if self.is_current(token) => AppState {
                history,
                last_city: Some(city),
                query: String::new(),
                suggestions: Vec::new(),
                loading: false,
                ..self
            },
            Event::LocationResolved { token, city } if self.is_current(token) => AppState {
                query: city.clone(),
                last_city: Some(city),
                ..self
            },
            Event::ValidationFailed(message) => AppState {
                error: Some(message),
                loading: false,
                ..self
            },
            Event::UnitsToggled => AppState {
                units: self.units.toggle(),
                ..self
            },
            Event::ThemeToggled => AppState {
                theme: self.theme.toggle(),
                ..self
            },
            // Results of superseded requests.
            Event::CurrentLoaded { .. }
            | Event::CurrentFailed { .. }
            | Event::ForecastLoaded { .. }
            | Event::ForecastFailed { .. }
            | Event::SearchCompleted { .. }
            | Event::LocationResolved { .. } => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn weather(name: &str) -> CurrentWeather {
        CurrentWeather {
            name: name.to_string(),
            temperature: 3.2,
            feels_like: -1.0,
            description: "light snow".to_string(),
            icon_code: "13d".to_string(),
            observed_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        }
    }

    fn day(date: &str) -> DaySummary {
        DaySummary {
            date: date.to_string(),
            min_temperature: -2.0,
            max_temperature: 4.0,
            icon_code: "04d".to_string(),
            description: "overcast clouds".to_string(),
        }
    }

    #[test]
    fn request_started_sets_loading_and_clears_error() {
        let state = AppState::default().apply(Event::ValidationFailed("boom".into()));

        let state = state.apply(Event::RequestStarted);

        assert!(state.loading);
        assert_eq!(state.error, None);
        assert_ne!(state.generation(), RequestToken::default());
    }

    #[test]
    fn full_search_flow() {
        let state = AppState::default()
            .apply(Event::QueryChanged("Toronto".into()))
            .apply(Event::RequestStarted);
        let token = state.generation();
        let history = HistoryList::default().record_search("Toronto");

        let state = state
            .apply(Event::CurrentLoaded {
                token,
                weather: weather("Toronto"),
                location: LocationInfo {
                    state: "Ontario".into(),
                    country: "CA".into(),
                },
            })
            .apply(Event::ForecastLoaded {
                token,
                days: vec![day("2024-01-01")],
            })
            .apply(Event::SearchCompleted {
                token,
                city: "Toronto".into(),
                history: history.clone(),
            });

        assert!(!state.loading);
        assert_eq!(state.query, "");
        assert_eq!(state.current.as_ref().map(|w| w.name.as_str()), Some("Toronto"));
        assert_eq!(state.location.state, "Ontario");
        assert_eq!(state.forecast.len(), 1);
        assert_eq!(state.history, history);
        assert_eq!(state.last_city.as_deref(), Some("Toronto"));
    }

    #[test]
    fn stale_results_are_discarded() {
        let state = AppState::default().apply(Event::RequestStarted);
        let stale = state.generation();
        let state = state.apply(Event::RequestStarted);
        let fresh = state.generation();

        let state = state
            .apply(Event::CurrentLoaded {
                token: fresh,
                weather: weather("Paris"),
                location: LocationInfo::default(),
            })
            .apply(Event::CurrentLoaded {
                token: stale,
                weather: weather("Toronto"),
                location: LocationInfo::default(),
            })
            .apply(Event::ForecastFailed {
                token: stale,
                message: "late failure".into(),
            });

        assert_eq!(state.current.as_ref().map(|w| w.name.as_str()), Some("Paris"));
        assert_eq!(state.error, None);
        assert!(state.loading);
    }

    #[test]
    fn current_failure_clears_weather() {
        let state = AppState::default().apply(Event::RequestStarted);
        let token = state.generation();
        let state = state
            .apply(Event::CurrentLoaded {
                token,
                weather: weather("Oslo"),
                location: LocationInfo::default(),
            })
            .apply(Event::RequestStarted);
        let token = state.generation();

        let state = state.apply(Event::CurrentFailed {
            token,
            message: "city not found".into(),
        });

        assert_eq!(state.current, None);
        assert_eq!(state.error.as_deref(), Some("city not found"));
        assert!(!state.loading);
    }

    #[test]
    fn forecast_failure_clears_forecast() {
        let state = AppState::default().apply(Event::RequestStarted);
        let token = state.generation();
        let state = state.apply(Event::ForecastLoaded {
            token,
            days: vec![day("2024-01-01")],
        });

        let state = state.apply(Event::ForecastFailed {
            token,
            message: "no data".into(),
        });

        assert!(state.forecast.is_empty());
        assert_eq!(state.error.as_deref(), Some("no data"));
    }

    #[test]
    fn resolved_location_becomes_query_and_last_city() {
        let state = AppState::default().apply(Event::RequestStarted);
        let token = state.generation();

        let state = state.apply(Event::LocationResolved {
            token,
            city: "Gotham".into(),
        });

        assert_eq!(state.query, "Gotham");
        assert_eq!(state.last_city.as_deref(), Some("Gotham"));
    }

    #[test]
    fn choosing_a_suggestion_fills_the_query() {
        let places = vec![
            Place {
                name: "London".into(),
                state: Some("Ontario".into()),
                country: "CA".into(),
            },
            Place {
                name: "London".into(),
                state: Some("England".into()),
                country: "GB".into(),
            },
        ];
        let state = AppState::default().apply(Event::SuggestionsLoaded(places));

        let state = state.apply(Event::SuggestionChosen(1));

        assert_eq!(state.query, "London, England, GB");
        assert!(state.suggestions.is_empty());
    }

    #[test]
    fn choosing_a_missing_suggestion_is_ignored() {
        let state = AppState::default().apply(Event::QueryChanged("Lon".into()));
        let next = state.clone().apply(Event::SuggestionChosen(4));
        assert_eq!(next, state);
    }

    #[test]
    fn toggles_flip_units_and_theme() {
        let state = AppState::new(Units::Metric, Theme::Light, HistoryList::default())
            .apply(Event::UnitsToggled)
            .apply(Event::ThemeToggled);

        assert_eq!(state.units, Units::Imperial);
        assert_eq!(state.theme, Theme::Dark);
    }
}
