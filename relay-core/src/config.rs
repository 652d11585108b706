use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_LANGUAGE: &str = "pt_br";

/// Environment variables that must be set (and non-empty) before the relay starts.
pub const REQUIRED_VARS: [&str; 5] = [
    "OPENWEATHER_API_KEY",
    "TARGET_CITY",
    "BASEROW_API_URL",
    "BASEROW_API_TOKEN",
    "BASEROW_TABLE_ID",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Invalid PORT value '{0}': expected a number between 0 and 65535")]
    InvalidPort(String),
}

/// Credentials and endpoints of the weather provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherConfig {
    pub api_key: String,
    pub city: String,
    pub api_url: String,
    pub language: String,
}

/// Credentials and target table of the row-storage provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaserowConfig {
    pub api_url: String,
    pub api_token: String,
    pub table_id: String,
}

/// Process-wide configuration, read once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub weather: WeatherConfig,
    pub baserow: BaserowConfig,
    pub port: u16,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unset and empty values are both treated as missing. All missing
    /// required variables are reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let missing: Vec<&'static str> =
            REQUIRED_VARS.iter().copied().filter(|name| get(*name).is_none()).collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let required = |name: &str| get(name).unwrap_or_default();

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            weather: WeatherConfig {
                api_key: required("OPENWEATHER_API_KEY"),
                city: required("TARGET_CITY"),
                api_url: get("OPENWEATHER_API_URL")
                    .unwrap_or_else(|| DEFAULT_OPENWEATHER_URL.to_string()),
                language: get("OPENWEATHER_LANG").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            },
            baserow: BaserowConfig {
                api_url: required("BASEROW_API_URL"),
                api_token: required("BASEROW_API_TOKEN"),
                table_id: required("BASEROW_TABLE_ID"),
            },
            port,
        })
    }
}
