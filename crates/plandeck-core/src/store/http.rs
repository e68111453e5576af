//! REST record store client.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Url};
use serde::{de::DeserializeOwned, Deserialize};

use super::RecordStore;
use crate::{
    error::{PlannerError, Result},
    models::{Record, TaskPatch},
};

/// Body of both list endpoints.
#[derive(Debug, Deserialize)]
struct ItemsPage {
    items: Vec<Record>,
    #[serde(default)]
    total: usize,
}

/// Record store speaking JSON over HTTP.
///
/// | Operation       | Request                                   |
/// |-----------------|-------------------------------------------|
/// | `list`          | `GET /tasks?limit=N`                      |
/// | `fetch_subtree` | `GET /tasks?planId=ID&recursive=true`     |
/// | `create`        | `POST /tasks`                             |
/// | `patch`         | `PATCH /tasks/{id}`                       |
/// | `delete`        | `DELETE /tasks/{id}`                      |
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    client: Client,
    base_url: Url,
}

impl HttpRecordStore {
    /// Creates a client for the server at `base_url`. Requests that take
    /// longer than `timeout` fail as `NetworkUnavailable`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            PlannerError::invalid_input("server_url").with_reason(format!("'{base_url}': {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PlannerError::invalid_input("server_url")
                .with_reason(format!("'{base_url}' cannot be used as a base URL")));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("plandeck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlannerError::Configuration {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PlannerError::Configuration {
                message: format!("'{}' cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends the request and returns the body of a 2xx response.
    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>> {
        let response = request.send().await.map_err(network_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(network_error)?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body).trim().to_string();
            return Err(PlannerError::ServerRejected {
                status: status.as_u16(),
                body: if text.is_empty() {
                    "Unknown error".to_string()
                } else {
                    text
                },
            });
        }

        Ok(body.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.send(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn network_error(e: reqwest::Error) -> PlannerError {
    PlannerError::NetworkUnavailable {
        message: e.to_string(),
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn list(&self, limit: usize) -> Result<Vec<Record>> {
        let mut url = self.url(&["tasks"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        debug!("GET {url}");

        let page: ItemsPage = self.send_json(self.client.get(url)).await?;
        debug!("Received {} of {} records", page.items.len(), page.total);
        Ok(page.items)
    }

    async fn create(&self, record: &Record) -> Result<Record> {
        let url = self.url(&["tasks"])?;
        debug!("POST {url} ({})", record.id());
        self.send_json(self.client.post(url).json(record)).await
    }

    async fn patch(&self, id: &str, patch: &TaskPatch) -> Result<Record> {
        let url = self.url(&["tasks", id])?;
        debug!("PATCH {url}");
        self.send_json(self.client.patch(url).json(patch)).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let url = self.url(&["tasks", id])?;
        debug!("DELETE {url}");
        self.send(self.client.delete(url)).await.map(|_| ())
    }

    async fn fetch_subtree(&self, root_id: &str) -> Result<Vec<Record>> {
        let mut url = self.url(&["tasks"])?;
        url.query_pairs_mut()
            .append_pair("planId", root_id)
            .append_pair("recursive", "true");
        debug!("GET {url}");

        let page: ItemsPage = self.send_json(self.client.get(url)).await?;
        debug!("Received {} of {} records", page.items.len(), page.total);
        Ok(page.items)
    }
}
