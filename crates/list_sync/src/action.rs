//! Backend list actions and the named store they are resolved from.

use std::{collections::HashMap, sync::Arc};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::ApiError,
    protocol::{ListPayload, ListResponse},
};
use tracing::debug;
use url::Url;

use crate::error::PaginationError;

#[async_trait]
pub trait ListAction: Send + Sync {
    async fn dispatch(&self, payload: &ListPayload) -> Result<ListResponse>;
}

/// Named list actions available to controllers.
#[derive(Default, Clone)]
pub struct ActionStore {
    actions: HashMap<String, Arc<dyn ListAction>>,
}

impl ActionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, action: Arc<dyn ListAction>) {
        self.actions.insert(name.into(), action);
    }

    pub fn with_action(mut self, name: impl Into<String>, action: Arc<dyn ListAction>) -> Self {
        self.register(name, action);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn ListAction>, PaginationError> {
        self.actions
            .get(name)
            .cloned()
            .ok_or_else(|| PaginationError::ActionNotFound {
                name: name.to_string(),
            })
    }
}

/// Calls `GET {base_url}/{path}` with the payload as query parameters and
/// expects a `{ "data": [...], "total": n }` body.
pub struct HttpListAction {
    http: Client,
    endpoint: Url,
}

impl HttpListAction {
    pub fn new(base_url: &str, path: &str) -> Result<Self> {
        Self::with_client(Client::new(), base_url, path)
    }

    pub fn with_client(http: Client, base_url: &str, path: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .with_context(|| format!("invalid list backend url '{base_url}'"))?;
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        let endpoint = base
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("invalid list endpoint path '{path}'"))?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ListAction for HttpListAction {
    async fn dispatch(&self, payload: &ListPayload) -> Result<ListResponse> {
        debug!(endpoint = %self.endpoint, params = payload.len(), "http: requesting list page");
        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&payload.to_pairs())
            .send()
            .await
            .with_context(|| format!("list request to {} failed", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ApiError>(&body) {
                Ok(api_error) => {
                    anyhow::Error::new(api_error).context(format!("list backend returned {status}"))
                }
                Err(_) => anyhow!("list backend returned {status}: {body}"),
            });
        }

        response
            .json::<ListResponse>()
            .await
            .context("failed to decode list response")
    }
}

#[cfg(test)]
#[path = "tests/action_tests.rs"]
mod tests;
