//! City autocompletion for the interactive search prompt.
//!
//! inquire asks for suggestions on every keystroke. Each keystroke restarts
//! the [`Debouncer`], so the geocoding lookup only runs once typing pauses.
//! inquire only asks again when the input changes, so finished results are
//! offered on the next keystroke, and only while the input still extends
//! the query they were fetched for.

use std::sync::Arc;

use inquire::{
    CustomUserError,
    autocompletion::{Autocomplete, Replacement},
};
use parking_lot::Mutex;
use skycast_core::{Debouncer, WeatherLookupService, provider::lookup_suggestions};
use tokio::runtime::Handle;

#[derive(Debug, Default)]
struct Latest {
    /// Trimmed text currently in the prompt.
    query: String,
    /// Query `labels` were fetched for. Empty when nothing has arrived.
    fetched_for: String,
    labels: Vec<String>,
}

impl Latest {
    fn matching_labels(&self) -> Vec<String> {
        let current =
            !self.fetched_for.is_empty() && starts_with_ignore_case(&self.query, &self.fetched_for);
        if !current {
            return Vec::new();
        }
        self.labels.clone()
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.to_lowercase().starts_with(&prefix.to_lowercase())
}

#[derive(Clone)]
pub struct CityAutocomplete {
    provider: Arc<dyn WeatherLookupService>,
    preferred_country: Option<String>,
    debouncer: Arc<Mutex<Debouncer>>,
    latest: Arc<Mutex<Latest>>,
    runtime: Handle,
}

impl CityAutocomplete {
    pub fn new(
        provider: Arc<dyn WeatherLookupService>,
        preferred_country: Option<&str>,
        debouncer: Debouncer,
        runtime: Handle,
    ) -> Self {
        Self {
            provider,
            preferred_country: preferred_country.map(str::to_string),
            debouncer: Arc::new(Mutex::new(debouncer)),
            latest: Arc::default(),
            runtime,
        }
    }

    fn schedule(&self, input: &str) {
        let query = input.trim().to_string();
        let mut debouncer = self.debouncer.lock();

        {
            let mut latest = self.latest.lock();
            if latest.query == query {
                return;
            }
            latest.query = query.clone();
            if query.is_empty() {
                latest.fetched_for.clear();
                latest.labels.clear();
                debouncer.cancel();
                return;
            }
        }

        let provider = Arc::clone(&self.provider);
        let preferred = self.preferred_country.clone();
        let latest = Arc::clone(&self.latest);

        let _guard = self.runtime.enter();
        debouncer.call(async move {
            let places = lookup_suggestions(provider.as_ref(), &query, preferred.as_deref()).await;
            let mut latest = latest.lock();
            // The prompt may have moved on to unrelated text meanwhile.
            if starts_with_ignore_case(&latest.query, &query) {
                latest.labels = places.iter().map(|p| p.label()).collect();
                latest.fetched_for = query;
            }
        });
    }
}

impl Autocomplete for CityAutocomplete {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        self.schedule(input);
        Ok(self.latest.lock().matching_labels())
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        Ok(highlighted_suggestion)
    }
}
