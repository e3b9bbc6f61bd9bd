//! Core library for the `forecast` weather screen.
//!
//! This crate defines:
//! - Configuration handling
//! - The WeatherAPI.com client behind the [`WeatherApi`] trait
//! - Persistence of the remembered city
//! - The screen controller: debounced city search, forecast fetching, state publishing
//!
//! It is used by `forecast-cli`, but a GUI front end can drive [`ScreenHandle`] the same way.

pub mod config;
pub mod icon;
pub mod model;
pub mod provider;
pub mod screen;
pub mod store;

pub use config::{Config, ScreenConfig};
pub use icon::WeatherIcon;
pub use model::{CityCandidate, ForecastDay, WeatherSnapshot};
pub use provider::{WeatherApi, provider_from_config};
pub use screen::{ScreenController, ScreenHandle, ScreenSettings, ScreenState};
pub use store::{FileStore, KeyValueStore, LAST_CITY_KEY, MemoryStore, StoreError};
