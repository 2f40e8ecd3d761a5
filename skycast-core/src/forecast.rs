//! Per-day aggregation of 3-hour forecast samples.

use std::collections::HashMap;

use crate::{
    error::AggregateError,
    model::{DaySummary, WeatherSample},
};

/// Number of day summaries the dashboard shows.
pub const FORECAST_DISPLAY_DAYS: usize = 5;

/// Group `samples` by calendar date, in order of first appearance.
///
/// The date is the part of `timestamp_text` before the first space. Each
/// summary takes min/max temperature over its day and the icon and
/// description of the day's first sample.
pub fn aggregate(samples: &[WeatherSample]) -> Result<Vec<DaySummary>, AggregateError> {
    let mut days: Vec<DaySummary> = Vec::new();
    let mut index_by_date: HashMap<&str, usize> = HashMap::new();

    for (index, sample) in samples.iter().enumerate() {
        let date = date_key(&sample.timestamp_text).ok_or_else(|| {
            AggregateError::MalformedSample {
                index,
                timestamp: sample.timestamp_text.clone(),
            }
        })?;

        let temp = sample.temperature.value().ok_or_else(|| {
            AggregateError::InvalidTemperature {
                index,
                timestamp: sample.timestamp_text.clone(),
                raw: sample.temperature.to_string(),
            }
        })?;

        match index_by_date.get(date) {
            Some(&i) => {
                let day = &mut days[i];
                day.min_temperature = day.min_temperature.min(temp);
                day.max_temperature = day.max_temperature.max(temp);
            }
            None => {
                index_by_date.insert(date, days.len());
                days.push(DaySummary {
                    date: date.to_string(),
                    min_temperature: temp,
                    max_temperature: temp,
                    icon_code: sample.icon_code.clone(),
                    description: sample.description.clone(),
                });
            }
        }
    }

    Ok(days)
}

/// The leading `n` summaries, for display.
pub fn display_window(days: &[DaySummary], n: usize) -> &[DaySummary] {
    &days[..days.len().min(n)]
}

fn date_key(timestamp: &str) -> Option<&str> {
    let (date, _) = timestamp.split_once(' ')?;
    (!date.is_empty()).then_some(date)
}
