//! The weather screen's search-and-fetch flow.
//!
//! [`ScreenState`] is a plain state container with one transition per event;
//! [`ScreenController`] runs it on a tokio task, executes the [`Effect`]s it
//! declares and publishes every new state to [`ScreenHandle`] subscribers.

use std::time::Duration;

use crate::config::{DEFAULT_CITY, DEFAULT_DEBOUNCE_MS, DEFAULT_FORECAST_DAYS, DEFAULT_MIN_QUERY_LEN};

pub mod controller;
pub mod debounce;
pub mod state;

pub use controller::{ScreenController, ScreenHandle};
pub use debounce::Debouncer;
pub use state::{Action, Effect, ScreenState};

/// Knobs the screen needs at runtime; usually built with
/// [`Config::screen_settings`](crate::Config::screen_settings).
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenSettings {
    /// City fetched on startup when nothing is remembered.
    pub default_city: String,
    pub forecast_days: u8,
    pub debounce: Duration,
    pub min_query_len: usize,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            default_city: DEFAULT_CITY.to_string(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            min_query_len: DEFAULT_MIN_QUERY_LEN,
        }
    }
}
