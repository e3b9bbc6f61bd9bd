use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::instrument;

use crate::model::{CityCandidate, WeatherSnapshot};

use super::WeatherApi;

/// Client for WeatherAPI.com's `search.json` and `forecast.json` endpoints.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn with_options(api_key: String, base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_locations(&self, query: &str) -> Result<Vec<CityCandidate>> {
        self.get_json("search", &[("q", query)]).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_forecast(&self, city: &str, days: u8) -> Result<WeatherSnapshot> {
        let days = days.to_string();
        self.get_json("forecast", &[("q", city), ("days", days.as_str())])
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/{endpoint}.json", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .with_context(|| format!("Failed to send request to WeatherAPI.com ({endpoint})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read WeatherAPI {endpoint} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "WeatherAPI {endpoint} request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse WeatherAPI {endpoint} JSON"))
    }
}

#[async_trait]
impl WeatherApi for WeatherApiProvider {
    async fn search_locations(&self, query: &str) -> Result<Vec<CityCandidate>> {
        self.fetch_locations(query).await
    }

    async fn get_forecast(&self, city: &str, days: u8) -> Result<WeatherSnapshot> {
        self.fetch_forecast(city, days).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_are_kept_whole() {
        assert_eq!(truncate_body("not found"), "not found");
    }

    #[test]
    fn long_bodies_are_cut_on_char_boundary() {
        let body = "é".repeat(300);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let p = WeatherApiProvider::with_options(
            "KEY".into(),
            "http://localhost:1234/v1/",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(p.base_url, "http://localhost:1234/v1");
    }
}
