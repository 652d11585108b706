//! Core library for the weather relay.
//!
//! This crate defines:
//! - Configuration loaded from the environment
//! - The weather provider (OpenWeatherMap) and row store (Baserow) clients
//! - Validation of the upstream payload and error-detail extraction
//! - The [`Relay`] pipeline tying them together
//!
//! It is used by `relay-server`, but the relay can also be driven directly.

pub mod config;
pub mod detail;
pub mod model;
pub mod provider;
pub mod relay;
pub mod storage;

pub use config::{BaserowConfig, Config, ConfigError, WeatherConfig};
pub use model::{RowPayload, WeatherReading};
pub use provider::{FetchError, InvalidReading, WeatherProvider};
pub use relay::{Relay, RelayError, Stored, health_check};
pub use storage::{RowStore, StoreError};
