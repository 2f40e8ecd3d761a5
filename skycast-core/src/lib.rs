//! Core library for the `skycast` weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over the weather service (OpenWeatherMap)
//! - Per-day forecast aggregation
//! - The persisted, bounded search history
//! - Dashboard state, its events, and the controller driving lookups
//!
//! It is used by `skycast-cli`, but can also be reused by other front ends.

pub mod config;
pub mod dashboard;
pub mod debounce;
pub mod error;
pub mod forecast;
pub mod history;
pub mod model;
pub mod provider;
pub mod state;
pub mod store;
pub mod units;

pub use config::Config;
pub use dashboard::{Dashboard, DashboardError};
pub use debounce::Debouncer;
pub use error::{AggregateError, LookupError, PersistenceError, StoreError};
pub use forecast::{FORECAST_DISPLAY_DAYS, aggregate, display_window};
pub use history::{HistoryList, HistoryManager};
pub use model::{
    Coordinates, CurrentWeather, DaySummary, LocationInfo, LocationQuery, Place, Theme,
    WeatherSample,
};
pub use provider::WeatherLookupService;
pub use state::{AppState, Event};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use units::Units;
