use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A city returned by a location search, not yet confirmed by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityCandidate {
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl CityCandidate {
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            region: None,
            lat: None,
            lon: None,
        }
    }

    /// "Name, Country", as shown in the search result list.
    pub fn label(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }
}

/// Full current + multi-day payload for one city.
///
/// Field names follow the WeatherAPI.com `forecast.json` response so the body
/// deserializes straight into it. A snapshot is never patched: every successful
/// fetch replaces the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: Location,
    pub current: Current,
    pub forecast: Forecast,
}

impl WeatherSnapshot {
    /// Sunrise of the first forecast day, if the forecast has any days.
    pub fn sunrise(&self) -> Option<&str> {
        self.forecast
            .forecastday
            .first()
            .map(|d| d.astro.sunrise.as_str())
    }

    pub fn days(&self) -> &[ForecastDay] {
        &self.forecast.forecastday
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Current {
    pub temp_c: f64,
    pub humidity: u8,
    pub wind_kph: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub day: Day,
    pub astro: Astro,
}

impl ForecastDay {
    /// English weekday name of the forecast date, e.g. "Monday".
    pub fn weekday_name(&self) -> String {
        self.date.format("%A").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub avgtemp_c: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Astro {
    pub sunrise: String,
}
