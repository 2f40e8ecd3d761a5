use std::{fmt, sync::Arc};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Confirm, InquireError, Select, Text};
use skycast_core::{
    Config, Coordinates, Dashboard, Debouncer, FileStore, HistoryManager, KeyValueStore,
    MemoryStore, Theme, Units, WeatherLookupService,
    config::API_KEY_ENV,
    provider::provider_from_config,
};
use tokio::runtime::Handle;

use crate::{render, render::Palette, suggest::CityAutocomplete};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key and display preferences.
    Configure,

    /// Show current weather and the 5-day forecast.
    Show {
        /// City name; defaults to the configured default city.
        city: Option<String>,

        /// Latitude; look up by coordinates instead of by name.
        #[arg(long, requires = "lon", allow_hyphen_values = true, conflicts_with = "city")]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// "metric" or "imperial"; overrides the config.
        #[arg(long)]
        units: Option<Units>,

        /// Use the dark color theme.
        #[arg(long)]
        dark: bool,

        /// Don't record this search in the history.
        #[arg(long)]
        no_history: bool,
    },

    /// List places matching a partial name.
    Suggest {
        query: String,
    },

    /// Show recent searches.
    History {
        /// Forget all recent searches.
        #[arg(long)]
        clear: bool,
    },

    /// Interactive dashboard.
    Dash,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config),
            Command::Show { city, lat, lon, units, dark, no_history } => {
                let coords = lat.zip(lon).map(|(lat, lon)| Coordinates { lat, lon });
                show(config, city, coords, units, dark, no_history).await
            }
            Command::Suggest { query } => suggest(config, query).await,
            Command::History { clear } => history(config, clear),
            Command::Dash => dash(config).await,
        }
    }
}

type CliDashboard = Dashboard<Box<dyn KeyValueStore>>;

fn open_history(config: &Config, persist: bool) -> Result<HistoryManager<Box<dyn KeyValueStore>>> {
    let store: Box<dyn KeyValueStore> = if persist {
        Box::new(FileStore::open_default()?)
    } else {
        Box::new(MemoryStore::new())
    };
    Ok(HistoryManager::new(store).with_limit(config.history_limit()))
}

fn build_dashboard(config: &Config, persist_history: bool) -> Result<CliDashboard> {
    let provider: Arc<dyn WeatherLookupService> =
        Arc::from(provider_from_config(config, std::env::var(API_KEY_ENV).ok())?);
    let history = open_history(config, persist_history)?;

    Ok(Dashboard::new(provider, history, config.units, Theme::from_dark_mode(config.dark_mode))
        .with_preferred_country(config.preferred_country()))
}

async fn show(
    mut config: Config,
    city: Option<String>,
    coords: Option<Coordinates>,
    units: Option<Units>,
    dark: bool,
    no_history: bool,
) -> Result<()> {
    if let Some(units) = units {
        config.units = units;
    }
    config.dark_mode |= dark;

    let mut dash = build_dashboard(&config, !no_history)?;

    let result = match coords {
        Some(coords) => dash.locate(Some(coords)).await,
        None => dash.search(Some(city.as_deref().unwrap_or(config.default_city()))).await,
    };

    let state = dash.state();
    let palette = Palette::for_stdout(state.theme);

    match result {
        Ok(()) => {
            print!("{}", render::dashboard(state, &palette));
            Ok(())
        }
        Err(e) => {
            // Show whatever loaded before the failure; the error goes to main.
            if state.current.is_some() {
                let mut partial = state.clone();
                partial.error = None;
                print!("{}", render::dashboard(&partial, &palette));
            }
            Err(anyhow!(e.user_message()))
        }
    }
}

async fn suggest(config: Config, query: String) -> Result<()> {
    let mut dash = build_dashboard(&config, false)?;
    dash.update_query(query);
    dash.suggest().await;

    let palette = Palette::for_stdout(dash.state().theme);
    print!("{}", render::suggestions(&dash.state().suggestions, &palette));
    Ok(())
}

fn history(config: Config, clear: bool) -> Result<()> {
    let manager = open_history(&config, true)?;

    if clear {
        manager.clear().context("Failed to clear search history")?;
        println!("Search history cleared.");
        return Ok(());
    }

    let palette = Palette::for_stdout(Theme::from_dark_mode(config.dark_mode));
    print!("{}", render::history(&manager.load(), &palette));
    Ok(())
}

fn configure(mut config: Config) -> Result<()> {
    let api_key = Text::new("OpenWeatherMap API key:")
        .with_default(config.api_key.as_deref().unwrap_or_default())
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.api_key = Some(api_key.trim().to_string());
    }

    let cursor = Units::all().iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(cursor)
        .prompt()?;

    let city = Text::new("Default city:").with_default(config.default_city()).prompt()?;
    config.default_city = Some(city.trim().to_string()).filter(|c| !c.is_empty());

    config.dark_mode = Confirm::new("Use dark mode?").with_default(config.dark_mode).prompt()?;

    let current_home = config.home.map(|c| format!("{},{}", c.lat, c.lon)).unwrap_or_default();
    let home = Text::new("Home location as \"lat,lon\" (blank for none):")
        .with_default(&current_home)
        .prompt()?;
    config.home = parse_coordinates(&home)?;

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn parse_coordinates(input: &str) -> Result<Option<Coordinates>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let (lat, lon) = input
        .split_once(',')
        .ok_or_else(|| anyhow!("Expected \"lat,lon\", got '{input}'"))?;
    let lat: f64 = lat.trim().parse().with_context(|| format!("Invalid latitude '{lat}'"))?;
    let lon: f64 = lon.trim().parse().with_context(|| format!("Invalid longitude '{lon}'"))?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(anyhow!("Coordinates out of range: {lat},{lon}"));
    }

    Ok(Some(Coordinates { lat, lon }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Search,
    Recent,
    UseMyLocation,
    ToggleUnits,
    ToggleTheme,
    Quit,
}

impl MenuAction {
    fn options(units: Units, theme: Theme) -> Vec<MenuOption> {
        [
            Self::Search,
            Self::Recent,
            Self::UseMyLocation,
            Self::ToggleUnits,
            Self::ToggleTheme,
            Self::Quit,
        ]
        .into_iter()
        .map(|action| MenuOption {
            action,
            units,
            theme,
        })
        .collect()
    }
}

/// Menu entry; labels depend on the current units and theme.
#[derive(Debug, Clone, Copy)]
struct MenuOption {
    action: MenuAction,
    units: Units,
    theme: Theme,
}

impl fmt::Display for MenuOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            MenuAction::Search => f.write_str("Search"),
            MenuAction::Recent => f.write_str("Recent searches"),
            MenuAction::UseMyLocation => f.write_str("Use my location"),
            MenuAction::ToggleUnits => write!(f, "Switch to °{}", self.units.toggle().symbol()),
            MenuAction::ToggleTheme => {
                f.write_str(if self.theme.is_dark() { "Light mode" } else { "Dark mode" })
            }
            MenuAction::Quit => f.write_str("Quit"),
        }
    }
}

/// Run a blocking inquire prompt off the async runtime. `None` when the
/// user cancels with Esc or Ctrl-C.
async fn prompt<T, F>(ask: F) -> Result<Option<T>>
where
    T: Send + 'static,
    F: FnOnce() -> inquire::error::InquireResult<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(ask).await? {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn dash(config: Config) -> Result<()> {
    let mut dash = build_dashboard(&config, true)?;
    let autocomplete = CityAutocomplete::new(
        dash.provider(),
        dash.preferred_country(),
        Debouncer::new(config.debounce()),
        Handle::current(),
    );

    if let Err(e) = dash.start(config.home, config.default_city()).await {
        tracing::debug!("Initial load failed: {}", e);
    }

    loop {
        let state = dash.state();
        let palette = Palette::for_stdout(state.theme);
        println!();
        print!("{}", render::dashboard(state, &palette));
        if !state.history.is_empty() {
            print!("{}", render::history(&state.history, &palette));
        }

        let options = MenuAction::options(state.units, state.theme);
        let Some(choice) = prompt(move || Select::new("What next?", options).prompt()).await?
        else {
            break;
        };

        let outcome = match choice.action {
            MenuAction::Search => {
                let completer = autocomplete.clone();
                let input = prompt(move || {
                    Text::new("City:")
                        .with_placeholder("Enter city name")
                        .with_autocomplete(completer)
                        .prompt()
                })
                .await?;
                match input {
                    Some(input) => {
                        dash.update_query(input);
                        dash.search(None).await
                    }
                    None => Ok(()),
                }
            }
            MenuAction::Recent => {
                let entries = dash.state().history.entries().to_vec();
                if entries.is_empty() {
                    continue;
                }
                match prompt(move || Select::new("Recent searches:", entries).prompt()).await? {
                    Some(city) => dash.search(Some(&city)).await,
                    None => Ok(()),
                }
            }
            MenuAction::UseMyLocation => dash.locate(config.home).await,
            MenuAction::ToggleUnits => dash.toggle_units().await,
            MenuAction::ToggleTheme => {
                dash.toggle_theme();
                Ok(())
            }
            MenuAction::Quit => break,
        };

        // Failures are already recorded in the state and shown on the next render.
        if let Err(e) = outcome {
            tracing::debug!("Dashboard action failed: {}", e);
        }
    }

    Ok(())
}
