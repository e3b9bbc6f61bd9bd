use crate::{CityCandidate, Config, WeatherSnapshot, provider::weatherapi::WeatherApiProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod weatherapi;

/// Remote weather source. Both calls are read-only and fail by returning `Err`;
/// deciding on a fallback is up to the caller.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    /// Cities whose name matches `query`.
    async fn search_locations(&self, query: &str) -> anyhow::Result<Vec<CityCandidate>>;

    /// Current conditions plus a `days`-long daily forecast for `city`.
    async fn get_forecast(&self, city: &str, days: u8) -> anyhow::Result<WeatherSnapshot>;
}

/// Construct the WeatherAPI.com client from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherApi>> {
    let api_key = config.api_key()?;
    let provider =
        WeatherApiProvider::with_options(api_key.to_owned(), &config.base_url, config.timeout())?;

    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No WeatherAPI key configured"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        assert!(provider_from_config(&cfg).is_ok());
    }
}
