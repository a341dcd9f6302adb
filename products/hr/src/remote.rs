use std::{fmt::Display, sync::Arc};

use thiserror::Error;

use crate::model::{Employee, EmployeeId};

/// Failure of a remote call; the display form is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("{0}")]
    Transport(String),
    #[error("{message}")]
    Server { status: u16, message: String },
}

impl SyncError {
    pub fn transport(err: impl Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            SyncError::Transport(message) | SyncError::Server { message, .. } => message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Transport(_) => None,
            SyncError::Server { status, .. } => Some(*status),
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;

/// CRUD surface over the employee resource.
///
/// Successful responses carry the authoritative record (or list) the store
/// adopts verbatim.
#[allow(async_fn_in_trait)]
pub trait RemoteSync {
    async fn list_all(&self) -> SyncResult<Vec<Employee>>;

    async fn create(&self, record: &Employee) -> SyncResult<Employee>;

    async fn replace(&self, id: &EmployeeId, record: &Employee) -> SyncResult<Employee>;

    /// Status flip sent as a full replace; implementations may report its
    /// failures under their own message.
    async fn toggle(&self, id: &EmployeeId, record: &Employee) -> SyncResult<Employee> {
        self.replace(id, record).await
    }

    async fn delete(&self, id: &EmployeeId) -> SyncResult<()>;
}

impl<T: RemoteSync> RemoteSync for Arc<T> {
    async fn list_all(&self) -> SyncResult<Vec<Employee>> {
        T::list_all(self).await
    }

    async fn create(&self, record: &Employee) -> SyncResult<Employee> {
        T::create(self, record).await
    }

    async fn replace(&self, id: &EmployeeId, record: &Employee) -> SyncResult<Employee> {
        T::replace(self, id, record).await
    }

    async fn toggle(&self, id: &EmployeeId, record: &Employee) -> SyncResult<Employee> {
        T::toggle(self, id, record).await
    }

    async fn delete(&self, id: &EmployeeId) -> SyncResult<()> {
        T::delete(self, id).await
    }
}
