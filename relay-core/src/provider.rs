use crate::{WeatherReading, config::WeatherConfig, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use serde_json::Value;
use std::{fmt::Debug, sync::Arc};
use thiserror::Error;

pub mod openweather;

/// Why an upstream payload could not be turned into a [`WeatherReading`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidReading {
    #[error("payload is not a weather object: {0}")]
    Malformed(String),
    #[error("missing `main` section")]
    MissingMain,
    #[error("missing or non-numeric `main.temp`")]
    MissingTemperature,
    #[error("missing or non-numeric `main.humidity`")]
    MissingHumidity,
    #[error("missing or empty `weather[0].description`")]
    MissingCondition,
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// The provider does not know the requested city.
    #[error("city '{city}' not found by weather provider: {detail}")]
    NotFound { city: String, detail: Value },

    /// Transport failure or any non-404 error status.
    #[error("weather provider request failed: {detail}")]
    Upstream { status: Option<u16>, detail: Value },

    /// The provider answered successfully but the content is unusable.
    #[error("weather provider returned unusable data: {reason}")]
    InvalidPayload { reason: InvalidReading, received: Value },
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch and validate the current conditions for `city`.
    async fn current(&self, city: &str) -> Result<WeatherReading, FetchError>;
}

/// Construct the weather provider described by the configuration.
pub fn provider_from_config(config: &WeatherConfig) -> Arc<dyn WeatherProvider> {
    Arc::new(OpenWeatherProvider::from_config(config))
}
