use std::time::Duration;

use platform_api::ErrorBody;
use reqwest::{Client, Response, Url};
use tracing::debug;

use crate::{
    model::{Employee, EmployeeId},
    remote::{RemoteSync, SyncError, SyncResult},
};

pub const DEFAULT_API_URL: &str = "http://localhost:3000/employees";

const FETCH_FAILED: &str = "Failed to fetch employees";
const CREATE_FAILED: &str = "Failed to add employee";
const UPDATE_FAILED: &str = "Failed to update employee";
const TOGGLE_FAILED: &str = "Failed to toggle status";
const DELETE_FAILED: &str = "Failed to delete employee";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    /// No timeout unless configured; a hung call stays pending.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    /// Reads `ROSTER_API_URL` and `ROSTER_HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("ROSTER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let timeout = std::env::var("ROSTER_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        Self { base_url, timeout }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// [`RemoteSync`] over a json-server style REST collection.
#[derive(Clone, Debug)]
pub struct HttpRemote {
    client: Client,
    collection: Url,
}

impl HttpRemote {
    pub fn new(config: &ClientConfig) -> SyncResult<Self> {
        let collection = Url::parse(&config.base_url).map_err(SyncError::transport)?;
        if collection.cannot_be_a_base() {
            return Err(SyncError::Transport(format!(
                "{} cannot address employee records",
                config.base_url
            )));
        }
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(SyncError::transport)?;
        Ok(Self { client, collection })
    }

    pub fn collection_url(&self) -> &Url {
        &self.collection
    }

    async fn put_record(
        &self,
        id: &EmployeeId,
        record: &Employee,
        fallback: &str,
    ) -> SyncResult<Employee> {
        let response = self
            .client
            .put(self.record_url(id))
            .json(record)
            .send()
            .await
            .map_err(SyncError::transport)?;
        if !response.status().is_success() {
            return Err(rejection(response, fallback).await);
        }
        response.json().await.map_err(SyncError::transport)
    }

    fn record_url(&self, id: &EmployeeId) -> Url {
        let mut url = self.collection.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id.as_str());
        }
        url
    }
}

async fn rejection(response: Response, fallback: &str) -> SyncError {
    let status = response.status().as_u16();
    let body = response.bytes().await.unwrap_or_default();
    let message = ErrorBody::parse(&body)
        .map(|envelope| envelope.message)
        .unwrap_or_else(|| fallback.to_string());
    SyncError::server(status, message)
}

impl RemoteSync for HttpRemote {
    async fn list_all(&self) -> SyncResult<Vec<Employee>> {
        let response = self
            .client
            .get(self.collection.clone())
            .send()
            .await
            .map_err(SyncError::transport)?;
        if !response.status().is_success() {
            return Err(rejection(response, FETCH_FAILED).await);
        }
        let employees: Vec<Employee> = response.json().await.map_err(SyncError::transport)?;
        debug!(count = employees.len(), "fetched employees");
        Ok(employees)
    }

    async fn create(&self, record: &Employee) -> SyncResult<Employee> {
        let response = self
            .client
            .post(self.collection.clone())
            .json(record)
            .send()
            .await
            .map_err(SyncError::transport)?;
        if !response.status().is_success() {
            return Err(rejection(response, CREATE_FAILED).await);
        }
        response.json().await.map_err(SyncError::transport)
    }

    async fn replace(&self, id: &EmployeeId, record: &Employee) -> SyncResult<Employee> {
        self.put_record(id, record, UPDATE_FAILED).await
    }

    async fn toggle(&self, id: &EmployeeId, record: &Employee) -> SyncResult<Employee> {
        self.put_record(id, record, TOGGLE_FAILED).await
    }

    async fn delete(&self, id: &EmployeeId) -> SyncResult<()> {
        let response = self
            .client
            .delete(self.record_url(id))
            .send()
            .await
            .map_err(SyncError::transport)?;
        if !response.status().is_success() {
            return Err(rejection(response, DELETE_FAILED).await);
        }
        Ok(())
    }
}
