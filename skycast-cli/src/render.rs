//! Text output for the dashboard.

use std::{fmt::Write as _, io::IsTerminal};

use chrono::NaiveDate;
use skycast_core::{
    AppState, DaySummary, FORECAST_DISPLAY_DAYS, HistoryList, Place, Theme, Units, display_window,
};

/// ANSI styles for one theme. All empty when color is off.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    heading: &'static str,
    accent: &'static str,
    muted: &'static str,
    error: &'static str,
    reset: &'static str,
}

impl Palette {
    pub fn plain() -> Self {
        Self {
            heading: "",
            accent: "",
            muted: "",
            error: "",
            reset: "",
        }
    }

    pub fn for_theme(theme: Theme, color: bool) -> Self {
        if !color {
            return Self::plain();
        }
        match theme {
            Theme::Light => Self {
                heading: "\x1b[1;34m",
                accent: "\x1b[35m",
                muted: "\x1b[90m",
                error: "\x1b[31m",
                reset: "\x1b[0m",
            },
            Theme::Dark => Self {
                heading: "\x1b[1;96m",
                accent: "\x1b[93m",
                muted: "\x1b[37m",
                error: "\x1b[91m",
                reset: "\x1b[0m",
            },
        }
    }

    /// Palette for stdout, honouring `NO_COLOR`.
    pub fn for_stdout(theme: Theme) -> Self {
        let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self::for_theme(theme, color)
    }
}

/// Temperature rounded to whole degrees, e.g. `-3°C`.
pub fn temperature(value: f64, units: Units) -> String {
    let rounded = value.round();
    // Avoid printing "-0".
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded}°{}", units.symbol())
}

/// Short weekday name for a `YYYY-MM-DD` date, or the date itself.
pub fn weekday(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%a").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// Glyph for an OpenWeatherMap icon code such as `10d`.
pub fn icon_glyph(code: &str) -> &'static str {
    match code.get(..2) {
        Some("01") => "☀",
        Some("02") => "⛅",
        Some("03") | Some("04") => "☁",
        Some("09") | Some("10") => "☂",
        Some("11") => "⚡",
        Some("13") => "❄",
        Some("50") => "≋",
        _ => "·",
    }
}

/// Current conditions followed by the forecast cards.
pub fn dashboard(state: &AppState, p: &Palette) -> String {
    let mut out = String::new();

    if state.loading {
        let _ = writeln!(out, "{}Loading...{}", p.muted, p.reset);
    }

    if let Some(weather) = &state.current {
        let mut title = weather.name.clone();
        for part in [&state.location.state, &state.location.country] {
            if !part.is_empty() {
                title.push_str(", ");
                title.push_str(part);
            }
        }

        let _ = writeln!(out, "{}{}{}", p.heading, title, p.reset);
        let _ = writeln!(out, "  {} {}", icon_glyph(&weather.icon_code), weather.description);
        let _ = writeln!(out, "  Temperature: {}", temperature(weather.temperature, state.units));
        let _ = writeln!(out, "  Feels Like:  {}", temperature(weather.feels_like, state.units));
        out.push('\n');
    }

    out.push_str(&forecast(&state.forecast, state.units, p));

    if let Some(error) = &state.error {
        let _ = writeln!(out, "{}{}{}", p.error, error, p.reset);
    }

    out
}

/// The first [`FORECAST_DISPLAY_DAYS`] day summaries, one per line.
pub fn forecast(days: &[DaySummary], units: Units, p: &Palette) -> String {
    let mut out = String::new();
    for day in display_window(days, FORECAST_DISPLAY_DAYS) {
        let _ = writeln!(
            out,
            "{}{:<4}{} {} {:<22} {}Min: {:>6}  Max: {:>6}{}",
            p.accent,
            weekday(&day.date),
            p.reset,
            icon_glyph(&day.icon_code),
            day.description,
            p.muted,
            temperature(day.min_temperature, units),
            temperature(day.max_temperature, units),
            p.reset,
        );
    }
    out
}

pub fn history(list: &HistoryList, p: &Palette) -> String {
    if list.is_empty() {
        return format!("{}No recent searches.{}\n", p.muted, p.reset);
    }

    let mut out = format!("{}Recent Searches{}\n", p.heading, p.reset);
    for (i, entry) in list.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, entry);
    }
    out
}

pub fn suggestions(places: &[Place], p: &Palette) -> String {
    if places.is_empty() {
        return format!("{}No matching places.{}\n", p.muted, p.reset);
    }

    places.iter().map(|place| format!("  {}\n", place.label())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use skycast_core::{CurrentWeather, LocationInfo};

    fn day(date: &str, min: f64, max: f64) -> DaySummary {
        DaySummary {
            date: date.to_string(),
            min_temperature: min,
            max_temperature: max,
            icon_code: "10d".to_string(),
            description: "light rain".to_string(),
        }
    }

    #[test]
    fn temperatures_round_to_whole_degrees() {
        assert_eq!(temperature(12.6, Units::Metric), "13°C");
        assert_eq!(temperature(-0.4, Units::Metric), "0°C");
        assert_eq!(temperature(-3.5, Units::Imperial), "-4°F");
    }

    #[test]
    fn weekday_names() {
        assert_eq!(weekday("2024-01-01"), "Mon");
        assert_eq!(weekday("not-a-date"), "not-a-date");
    }

    #[test]
    fn icons_map_by_condition_prefix() {
        assert_eq!(icon_glyph("01n"), "☀");
        assert_eq!(icon_glyph("13d"), "❄");
        assert_eq!(icon_glyph(""), "·");
    }

    #[test]
    fn forecast_shows_at_most_five_days() {
        let days: Vec<_> = (1..=6).map(|d| day(&format!("2024-01-0{d}"), 1.0, 2.0)).collect();

        let out = forecast(&days, Units::Metric, &Palette::plain());

        assert_eq!(out.lines().count(), 5);
        assert!(out.starts_with("Mon"));
        assert!(!out.contains("Sat"));
    }

    #[test]
    fn dashboard_includes_location_and_error() {
        let mut state = AppState::default();
        state.current = Some(CurrentWeather {
            name: "Toronto".to_string(),
            temperature: -2.2,
            feels_like: -7.8,
            description: "overcast clouds".to_string(),
            icon_code: "04d".to_string(),
            observed_at: Utc::now(),
        });
        state.location = LocationInfo {
            state: "Ontario".to_string(),
            country: "CA".to_string(),
        };
        state.forecast = vec![day("2024-01-01", -5.0, 1.0)];
        state.error = Some("Network error. Check your connection.".to_string());

        let out = dashboard(&state, &Palette::plain());

        assert!(out.contains("Toronto, Ontario, CA"));
        assert!(out.contains("Temperature: -2°C"));
        assert!(out.contains("Feels Like:  -8°C"));
        assert!(out.contains("Min:   -5°C"));
        assert!(out.ends_with("Network error. Check your connection.\n"));
    }

    #[test]
    fn history_lists_entries_in_order() {
        let list = HistoryList::default().record_search("Paris").record_search("Oslo");

        let out = history(&list, &Palette::plain());

        assert_eq!(out, "Recent Searches\n  1. Oslo\n  2. Paris\n");
        assert_eq!(history(&HistoryList::default(), &Palette::plain()), "No recent searches.\n");
    }

    #[test]
    fn dark_theme_uses_different_colors() {
        let light = Palette::for_theme(Theme::Light, true);
        let dark = Palette::for_theme(Theme::Dark, true);
        assert_ne!(light.heading, dark.heading);
        assert_eq!(Palette::for_theme(Theme::Dark, false).heading, "");
    }
}
