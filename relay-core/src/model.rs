use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Current conditions for one city, as extracted from the weather provider.
///
/// Numbers are kept exactly as the provider sent them so the stored row
/// carries identical values.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub city: String,
    pub temperature_c: Number,
    pub humidity_pct: Number,
    pub condition: String,
}

/// Row written to the Baserow table. Field names are the table's user-facing column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowPayload {
    #[serde(rename = "Cidade")]
    pub city: String,
    #[serde(rename = "Temperatura")]
    pub temperature: Number,
    #[serde(rename = "Umidade")]
    pub humidity: Number,
    #[serde(rename = "Condicao")]
    pub condition: String,
}

impl From<WeatherReading> for RowPayload {
    fn from(reading: WeatherReading) -> Self {
        Self {
            city: reading.city,
            temperature: reading.temperature_c,
            humidity: reading.humidity_pct,
            condition: reading.condition,
        }
    }
}
