use async_trait::async_trait;
use reqwest::{Client, header};
use serde_json::Value;

use crate::{
    RowPayload,
    config::BaserowConfig,
    detail::{BASEROW_SOURCES, body_to_value, detail_or},
    storage::{RowStore, StoreError},
};

#[derive(Clone)]
pub struct BaserowStore {
    api_url: String,
    api_token: String,
    table_id: String,
    http: Client,
}

impl std::fmt::Debug for BaserowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaserowStore")
            .field("api_url", &self.api_url)
            .field("table_id", &self.table_id)
            .finish_non_exhaustive()
    }
}

impl BaserowStore {
    pub fn new(api_url: String, api_token: String, table_id: String) -> Self {
        Self { api_url, api_token, table_id, http: Client::new() }
    }

    pub fn from_config(config: &BaserowConfig) -> Self {
        Self::new(config.api_url.clone(), config.api_token.clone(), config.table_id.clone())
    }

    /// Row-create endpoint for the configured table, using user-facing field names.
    pub fn rows_url(&self) -> String {
        format!(
            "{}/api/database/rows/table/{}/?user_field_names=true",
            self.api_url.trim_end_matches('/'),
            self.table_id
        )
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.api_token)
    }
}

#[async_trait]
impl RowStore for BaserowStore {
    async fn insert_row(&self, row: &RowPayload) -> Result<Value, StoreError> {
        let url = self.rows_url();
        tracing::info!(%url, "sending row to Baserow");

        let res = self
            .http
            .post(&url)
            .header(header::AUTHORIZATION, self.auth_header())
            .json(row)
            .send()
            .await
            .map_err(|err| StoreError { status: None, detail: Value::String(err.to_string()) })?;

        let status = res.status();
        let body = res.text().await.map_err(|err| StoreError {
            status: Some(status.as_u16()),
            detail: Value::String(err.to_string()),
        })?;
        let parsed = body_to_value(&body);

        if !status.is_success() {
            return Err(StoreError {
                status: Some(status.as_u16()),
                detail: detail_or(
                    parsed.as_ref(),
                    BASEROW_SOURCES,
                    format!("request failed with status code {}", status.as_u16()),
                ),
            });
        }

        Ok(parsed.unwrap_or(Value::Null))
    }
}
