//! HR vertical slice: the employee roster.
//!
//! The [`store::EmployeeStore`] is the unit of truth; it talks to the employee
//! resource through a [`remote::RemoteSync`] implementation such as
//! [`http::HttpRemote`] and derives the visible roster with [`filter`].

pub mod export;
pub mod filter;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod remote;
pub mod store;
pub mod summary;
pub mod us_state;
pub mod validation;

pub use filter::{FilterState, GenderFilter, StatusFilter};
pub use http::{ClientConfig, HttpRemote};
pub use lifecycle::{LoadingPolicy, OperationKind, Outcome, RequestStatus};
pub use model::{Employee, EmployeeDraft, EmployeeId, Gender};
pub use remote::{RemoteSync, SyncError, SyncResult};
pub use store::{EmployeeStore, StoreError, StoreFailure, StoreResult};
pub use summary::RosterSummary;
pub use us_state::UsState;
