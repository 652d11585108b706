//! The request pipeline: read current weather, write it as a table row.
//!
//! Each call is independent. A failed read never reaches the row store and a
//! failed write is not retried.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::{
    Config, RowPayload,
    provider::{FetchError, InvalidReading, WeatherProvider, provider_from_config},
    storage::{RowStore, StoreError, store_from_config},
};

/// Liveness text served on `GET /`.
pub const HEALTH_MESSAGE: &str =
    "Servidor de Clima para Baserow está rodando. Use GET /clima para buscar e armazenar dados.";

pub fn health_check() -> &'static str {
    HEALTH_MESSAGE
}

/// Successful outcome of [`Relay::fetch_and_store`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stored {
    pub message: String,
    pub data_stored: Value,
}

impl Stored {
    pub const STATUS: u16 = 201;
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Falha ao buscar dados meteorológicos para {city}.")]
    CityNotFound { city: String, detail: Value },

    #[error("Falha ao buscar dados meteorológicos para {city}.")]
    WeatherUnavailable { city: String, detail: Value },

    #[error("Dados meteorológicos inválidos ou incompletos recebidos da API externa.")]
    InvalidWeatherData { reason: InvalidReading, data_received: Value },

    #[error("Falha ao armazenar dados meteorológicos no Baserow.")]
    StoreFailed { detail: Value, payload_sent: RowPayload },
}

impl RelayError {
    fn from_fetch(err: FetchError, city: &str) -> Self {
        match err {
            FetchError::NotFound { detail, .. } => Self::CityNotFound { city: city.to_string(), detail },
            FetchError::Upstream { detail, .. } => Self::WeatherUnavailable { city: city.to_string(), detail },
            FetchError::InvalidPayload { reason, received } => {
                Self::InvalidWeatherData { reason, data_received: received }
            }
        }
    }

    fn from_store(err: StoreError, payload_sent: RowPayload) -> Self {
        Self::StoreFailed { detail: err.detail, payload_sent }
    }

    /// HTTP status reported to the caller.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::CityNotFound { .. } => 404,
            Self::WeatherUnavailable { .. } => 502,
            Self::InvalidWeatherData { .. } => 400,
            Self::StoreFailed { .. } => 500,
        }
    }

    /// JSON body reported to the caller.
    pub fn to_body(&self) -> Value {
        let error = self.to_string();
        match self {
            Self::CityNotFound { detail, .. } | Self::WeatherUnavailable { detail, .. } => {
                json!({ "error": error, "details": detail })
            }
            Self::InvalidWeatherData { data_received, .. } => {
                json!({ "error": error, "data_received": data_received })
            }
            Self::StoreFailed { detail, payload_sent } => {
                json!({ "error": error, "details": detail, "payload_sent": payload_sent })
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Relay {
    city: String,
    weather: Arc<dyn WeatherProvider>,
    store: Arc<dyn RowStore>,
}

impl Relay {
    pub fn new(city: String, weather: Arc<dyn WeatherProvider>, store: Arc<dyn RowStore>) -> Self {
        Self { city, weather, store }
    }

    /// Wire the OpenWeatherMap provider and Baserow store from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.weather.city.clone(),
            provider_from_config(&config.weather),
            store_from_config(&config.baserow),
        )
    }

    pub async fn fetch_and_store(&self) -> Result<Stored, RelayError> {
        tracing::info!(city = %self.city, "fetching current weather");

        let reading = match self.weather.current(&self.city).await {
            Ok(reading) => reading,
            Err(err) => {
                match &err {
                    FetchError::InvalidPayload { reason, received } => {
                        tracing::error!(%reason, payload = %received, "invalid weather payload")
                    }
                    other => tracing::error!(error = %other, "weather fetch failed"),
                }
                return Err(RelayError::from_fetch(err, &self.city));
            }
        };

        tracing::info!(
            city = %reading.city,
            temperature_c = %reading.temperature_c,
            humidity_pct = %reading.humidity_pct,
            condition = %reading.condition,
            "extracted weather reading"
        );

        let payload = RowPayload::from(reading);
        tracing::debug!(?payload, "Baserow payload");

        match self.store.insert_row(&payload).await {
            Ok(data_stored) => {
                tracing::info!(row = %data_stored, "row stored in Baserow");
                Ok(Stored {
                    message: format!(
                        "Dados meteorológicos de {} capturados e armazenados com sucesso no Baserow.",
                        payload.city
                    ),
                    data_stored,
                })
            }
            Err(err) => {
                tracing::error!(error = %err, status = ?err.status, "Baserow insert failed");
                Err(RelayError::from_store(err, payload))
            }
        }
    }
}
