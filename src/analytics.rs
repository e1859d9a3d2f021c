//! # PAD Analytics API
//!
//! Read-only HTTP client for the analytics data source.
//!
//! ## Endpoints
//! - `GET /api/v2/projects`: all projects
//! - `GET /api/v2/projects/{project}/cards`: cards for one project, by name or id
//! - `GET /api/v2/cards/{id}`: one card
//!
//! ## Notes
//! - Responses arrive either as a bare JSON array/object or wrapped in a
//!   `data` envelope. Both shapes are accepted.
//! - Rows come back untyped (`Record`) since the column layout is not
//!   contractually stable. Normalization happens in the lookup service.
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{error::AnalyticsError, models::Record};

#[async_trait]
pub trait AnalyticsSource: Send + Sync + 'static {
    async fn list_projects(&self) -> Result<Vec<Record>, AnalyticsError>;

    /// Cards for one project. `project` may be a project name or a
    /// stringified project id, matching what the upstream route accepts.
    async fn project_cards(&self, project: &str) -> Result<Vec<Record>, AnalyticsError>;

    /// One card by id, `None` when the API reports it missing.
    async fn card(&self, card_id: i64) -> Result<Option<Record>, AnalyticsError>;
}

pub struct HttpAnalytics {
    client: Client,
    base_url: String,
}

impl HttpAnalytics {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, path: &str) -> Result<Value, AnalyticsError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.get(&url).send().await?.error_for_status()?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl AnalyticsSource for HttpAnalytics {
    async fn list_projects(&self) -> Result<Vec<Record>, AnalyticsError> {
        into_records(self.fetch("/api/v2/projects").await?)
    }

    async fn project_cards(&self, project: &str) -> Result<Vec<Record>, AnalyticsError> {
        into_records(self.fetch(&format!("/api/v2/projects/{project}/cards")).await?)
    }

    async fn card(&self, card_id: i64) -> Result<Option<Record>, AnalyticsError> {
        let url = format!("{}/api/v2/cards/{card_id}", self.base_url);
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = response.error_for_status()?.json().await?;
        Ok(into_records(body)?.into_iter().next())
    }
}

fn into_records(body: Value) -> Result<Vec<Record>, AnalyticsError> {
    match unwrap_envelope(body) {
        Value::Array(rows) => Ok(rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect()),
        Value::Object(map) => Ok(vec![map]),
        Value::Null => Ok(Vec::new()),
        _ => Err(AnalyticsError::UnexpectedPayload),
    }
}

fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
