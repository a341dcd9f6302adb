//! In-memory employee collection behind the REST routes.

use std::path::Path;

use anyhow::{Context, Result};
use platform_api::{ApiError, ApiResult};
use products_hr::{Employee, EmployeeDraft, EmployeeId};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

/// Request body of `POST` and `PUT`: a record whose id may be missing.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingEmployee {
    #[serde(default)]
    pub id: Option<EmployeeId>,
    #[serde(flatten)]
    pub draft: EmployeeDraft,
}

impl IncomingEmployee {
    fn client_id(&self) -> Option<EmployeeId> {
        self.id.clone().filter(|id| !id.as_str().trim().is_empty())
    }
}

#[derive(Debug, Default)]
pub struct EmployeeResource {
    records: RwLock<Vec<Employee>>,
}

impl EmployeeResource {
    pub fn new(seed: Vec<Employee>) -> Self {
        Self {
            records: RwLock::new(seed),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn list(&self) -> Vec<Employee> {
        self.records.read().await.clone()
    }

    pub async fn get(&self, id: &EmployeeId) -> ApiResult<Employee> {
        self.records
            .read()
            .await
            .iter()
            .find(|record| record.id == *id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    /// Keeps the client id when present, otherwise assigns one.
    pub async fn insert(&self, incoming: IncomingEmployee) -> ApiResult<Employee> {
        let id = incoming.client_id().unwrap_or_else(EmployeeId::generate);
        let mut records = self.records.write().await;
        if records.iter().any(|record| record.id == id) {
            return Err(ApiError::Conflict(format!("employee {id} already exists")));
        }
        let record = Employee::from_draft(id, incoming.draft);
        records.push(record.clone());
        debug!(id = %record.id, total = records.len(), "employee inserted");
        Ok(record)
    }

    /// Full replace; the path id wins over any id in the body.
    pub async fn replace(&self, id: &EmployeeId, incoming: IncomingEmployee) -> ApiResult<Employee> {
        let mut records = self.records.write().await;
        let slot = records
            .iter_mut()
            .find(|record| record.id == *id)
            .ok_or(ApiError::NotFound)?;
        *slot = Employee::from_draft(id.clone(), incoming.draft);
        debug!(%id, "employee replaced");
        Ok(slot.clone())
    }

    pub async fn remove(&self, id: &EmployeeId) -> ApiResult<Employee> {
        let mut records = self.records.write().await;
        let position = records
            .iter()
            .position(|record| record.id == *id)
            .ok_or(ApiError::NotFound)?;
        let removed = records.remove(position);
        debug!(%id, total = records.len(), "employee removed");
        Ok(removed)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeedFile {
    Collection(Vec<Employee>),
    Database { employees: Vec<Employee> },
}

/// Reads a seed file: either a bare JSON array or `{ "employees": [...] }`.
pub fn load_seed(path: &Path) -> Result<Vec<Employee>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file {}", path.display()))?;
    let seed: SeedFile = serde_json::from_str(&raw)
        .with_context(|| format!("seed file {} is not an employee list", path.display()))?;
    Ok(match seed {
        SeedFile::Collection(employees) | SeedFile::Database { employees } => employees,
    })
}
