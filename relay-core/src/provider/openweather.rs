use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Number, Value};

use crate::{
    WeatherReading,
    config::{DEFAULT_LANGUAGE, DEFAULT_OPENWEATHER_URL, WeatherConfig},
    detail::{OPENWEATHER_SOURCES, body_to_value, detail_or},
    provider::{FetchError, InvalidReading},
};

use super::WeatherProvider;

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    api_url: String,
    language: String,
    http: Client,
}

impl std::fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("api_url", &self.api_url)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            api_url: DEFAULT_OPENWEATHER_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            http: Client::new(),
        }
    }

    pub fn from_config(config: &WeatherConfig) -> Self {
        Self::new(config.api_key.clone())
            .with_endpoint(config.api_url.clone())
            .with_language(config.language.clone())
    }

    pub fn with_endpoint(mut self, api_url: String) -> Self {
        self.api_url = api_url;
        self
    }

    pub fn with_language(mut self, language: String) -> Self {
        self.language = language;
        self
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[tracing::instrument(skip(self), level = "info")]
    async fn current(&self, city: &str) -> Result<WeatherReading, FetchError> {
        let res = self
            .http
            .get(&self.api_url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", self.language.as_str()),
            ])
            .send()
            .await
            .map_err(|err| FetchError::Upstream {
                status: None,
                detail: Value::String(err.to_string()),
            })?;

        let status = res.status();
        let body = match res.text().await {
            Ok(body) => Ok(body),
            Err(err) if status.is_success() => {
                return Err(FetchError::Upstream {
                    status: Some(status.as_u16()),
                    detail: Value::String(err.to_string()),
                });
            }
            Err(err) => {
                tracing::warn!(%status, error = %err, "failed to read OpenWeather error body");
                Err(err.to_string())
            }
        };

        if !status.is_success() {
            let (parsed, fallback) = match body {
                Ok(body) => (body_to_value(&body), None),
                Err(read_error) => (None, Some(read_error)),
            };
            return Err(classify_failure(status, city, parsed.as_ref(), fallback));
        }

        let parsed = body.ok().and_then(|body| body_to_value(&body));
        let received = parsed.unwrap_or(Value::Null);
        tracing::debug!(payload = %received, "received OpenWeather payload");

        parse_current(&received, city).map_err(|reason| FetchError::InvalidPayload { reason, received })
    }
}

/// Map a non-success status to a fetch error. Classification depends only on
/// the status; the body just supplies the detail.
fn classify_failure(status: StatusCode, city: &str, body: Option<&Value>, fallback: Option<String>) -> FetchError {
    let fallback = fallback.unwrap_or_else(|| format!("request failed with status code {}", status.as_u16()));
    let detail = detail_or(body, OPENWEATHER_SOURCES, fallback);

    if status == StatusCode::NOT_FOUND {
        FetchError::NotFound { city: city.to_string(), detail }
    } else {
        FetchError::Upstream { status: Some(status.as_u16()), detail }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    #[serde(default)]
    temp: Option<Value>,
    #[serde(default)]
    humidity: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    description: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    main: Option<OwMain>,
    #[serde(default)]
    weather: Option<Vec<OwWeather>>,
}

/// Validate a current-weather payload and extract the four stored fields.
///
/// Zero is a valid temperature or humidity; only absent, `null` or
/// non-numeric values are rejected. Strings are passed through unchanged;
/// only an absent or `null` `name` falls back to `requested_city`.
pub fn parse_current(payload: &Value, requested_city: &str) -> Result<WeatherReading, InvalidReading> {
    let parsed: OwCurrentResponse = serde_json::from_value(payload.clone())
        .map_err(|err| InvalidReading::Malformed(err.to_string()))?;

    let main = parsed.main.ok_or(InvalidReading::MissingMain)?;
    let temperature_c = as_number(main.temp).ok_or(InvalidReading::MissingTemperature)?;
    let humidity_pct = as_number(main.humidity).ok_or(InvalidReading::MissingHumidity)?;

    let condition = parsed
        .weather
        .and_then(|list| list.into_iter().next())
        .and_then(|w| match w.description {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        })
        .ok_or(InvalidReading::MissingCondition)?;

    let city = match parsed.name {
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => requested_city.to_string(),
    };

    Ok(WeatherReading { city, temperature_c, humidity_pct, condition })
}

fn as_number(value: Option<Value>) -> Option<Number> {
    match value? {
        Value::Number(n) => Some(n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_payload() -> Value {
        json!({
            "coord": {"lon": -46.6361, "lat": -23.5475},
            "weather": [{"id": 800, "main": "Clear", "description": "céu limpo", "icon": "01d"}],
            "main": {"temp": 24.3, "feels_like": 24.5, "humidity": 65, "pressure": 1015},
            "name": "São Paulo",
            "cod": 200
        })
    }

    fn provider(server: &MockServer) -> OpenWeatherProvider {
        OpenWeatherProvider::new("OW_KEY".to_string()).with_endpoint(format!("{}/data/2.5/weather", server.uri()))
    }

    #[test]
    fn parses_valid_payload() {
        let reading = parse_current(&sample_payload(), "Sao Paulo").unwrap();

        assert_eq!(reading.city, "São Paulo");
        assert_eq!(reading.temperature_c, Number::from_f64(24.3).unwrap());
        assert_eq!(reading.humidity_pct, Number::from(65));
        assert_eq!(reading.condition, "céu limpo");
    }

    #[test]
    fn zero_values_are_valid() {
        let payload = json!({
            "weather": [{"description": "neve"}],
            "main": {"temp": 0, "humidity": 0},
            "name": "Ushuaia"
        });

        let reading = parse_current(&payload, "Ushuaia").unwrap();
        assert_eq!(reading.temperature_c, Number::from(0));
        assert_eq!(reading.humidity_pct, Number::from(0));
    }

    #[test]
    fn missing_fields_are_reported() {
        let mut payload = sample_payload();
        payload["main"].as_object_mut().unwrap().remove("humidity");
        assert_eq!(parse_current(&payload, "x"), Err(InvalidReading::MissingHumidity));

        let mut payload = sample_payload();
        payload["main"]["temp"] = Value::Null;
        assert_eq!(parse_current(&payload, "x"), Err(InvalidReading::MissingTemperature));

        let mut payload = sample_payload();
        payload["main"]["temp"] = json!("hot");
        assert_eq!(parse_current(&payload, "x"), Err(InvalidReading::MissingTemperature));

        let mut payload = sample_payload();
        payload.as_object_mut().unwrap().remove("main");
        assert_eq!(parse_current(&payload, "x"), Err(InvalidReading::MissingMain));

        let mut payload = sample_payload();
        payload["weather"] = json!([]);
        assert_eq!(parse_current(&payload, "x"), Err(InvalidReading::MissingCondition));

        let mut payload = sample_payload();
        payload["weather"][0]["description"] = json!("");
        assert_eq!(parse_current(&payload, "x"), Err(InvalidReading::MissingCondition));
    }

    #[test]
    fn non_object_payload_is_malformed() {
        assert!(matches!(parse_current(&Value::Null, "x"), Err(InvalidReading::Malformed(_))));
        assert!(matches!(parse_current(&json!("oops"), "x"), Err(InvalidReading::Malformed(_))));
    }

    #[test]
    fn missing_name_falls_back_to_requested_city() {
        let mut payload = sample_payload();
        payload.as_object_mut().unwrap().remove("name");

        let reading = parse_current(&payload, "Sao Paulo").unwrap();
        assert_eq!(reading.city, "Sao Paulo");
    }

    #[test]
    fn whitespace_condition_is_kept_as_received() {
        let payload = json!({
            "weather": [{"description": " "}],
            "main": {"temp": 1, "humidity": 2},
            "name": "X"
        });

        let reading = parse_current(&payload, "Req").unwrap();
        assert_eq!(reading.condition, " ");
        assert_eq!(reading.city, "X");
    }

    #[test]
    fn blank_name_is_kept_as_received() {
        for name in ["", "  "] {
            let mut payload = sample_payload();
            payload["name"] = json!(name);

            let reading = parse_current(&payload, "Req").unwrap();
            assert_eq!(reading.city, name);
        }

        let mut payload = sample_payload();
        payload["name"] = Value::Null;
        assert_eq!(parse_current(&payload, "Req").unwrap().city, "Req");
    }

    #[test]
    fn unreadable_not_found_body_is_still_not_found() {
        let err = classify_failure(StatusCode::NOT_FOUND, "Atlantis", None, Some("body read aborted".to_string()));
        match err {
            FetchError::NotFound { city, detail } => {
                assert_eq!(city, "Atlantis");
                assert_eq!(detail, json!("body read aborted"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }

        let err = classify_failure(StatusCode::BAD_GATEWAY, "Atlantis", None, None);
        assert!(matches!(
            err,
            FetchError::Upstream { status: Some(502), ref detail } if detail == &json!("request failed with status code 502")
        ));
    }

    #[test]
    fn debug_hides_api_key() {
        let provider = OpenWeatherProvider::new("SECRET".to_string());
        assert!(!format!("{provider:?}").contains("SECRET"));
    }

    #[tokio::test]
    async fn sends_metric_and_language_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "Sao Paulo"))
            .and(query_param("appid", "OW_KEY"))
            .and(query_param("units", "metric"))
            .and(query_param("lang", "pt_br"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_payload()))
            .expect(1)
            .mount(&server)
            .await;

        let reading = provider(&server).current("Sao Paulo").await.unwrap();
        assert_eq!(reading.city, "São Paulo");
    }

    #[tokio::test]
    async fn not_found_is_classified() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"cod": "404", "message": "city not found"})),
            )
            .mount(&server)
            .await;

        let err = provider(&server).current("Atlantis").await.unwrap_err();
        match err {
            FetchError::NotFound { city, detail } => {
                assert_eq!(city, "Atlantis");
                assert_eq!(detail, json!("city not found"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_statuses_are_upstream_failures() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"cod": 401, "message": "Invalid API key."})))
            .mount(&server)
            .await;

        let err = provider(&server).current("Sao Paulo").await.unwrap_err();
        match err {
            FetchError::Upstream { status, detail } => {
                assert_eq!(status, Some(401));
                assert_eq!(detail, json!("Invalid API key."));
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_without_message_uses_status_text() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = provider(&server).current("Sao Paulo").await.unwrap_err();
        match err {
            FetchError::Upstream { status, detail } => {
                assert_eq!(status, Some(503));
                assert_eq!(detail, json!("request failed with status code 503"));
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connection_failure_is_upstream_without_status() {
        let provider = OpenWeatherProvider::new("OW_KEY".to_string())
            .with_endpoint("http://127.0.0.1:1/data/2.5/weather".to_string());

        let err = provider.current("Sao Paulo").await.unwrap_err();
        assert!(matches!(err, FetchError::Upstream { status: None, .. }));
    }

    #[tokio::test]
    async fn invalid_payload_echoes_received_body() {
        let server = MockServer::start().await;
        let payload = json!({"main": {"temp": 20.0}, "weather": [{"description": "nublado"}], "name": "Lima"});

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
            .mount(&server)
            .await;

        let err = provider(&server).current("Lima").await.unwrap_err();
        match err {
            FetchError::InvalidPayload { reason, received } => {
                assert_eq!(reason, InvalidReading::MissingHumidity);
                assert_eq!(received, payload);
            }
            other => panic!("expected InvalidPayload, got {other:?}"),
        }
    }
}
