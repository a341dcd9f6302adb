//! The entity synchronization store.
//!
//! [`EmployeeStore`] owns the canonical roster, the filter state, the request
//! lifecycle and the shared error. Every mutation becomes visible only after
//! its round trip resolves, and results are reconciled in resolution order:
//! whichever response arrives last wins, regardless of when it was sent.
//!
//! The store is single-threaded. Operations take `&self`, so several of them
//! can be in flight at once on one task; state is borrowed only between
//! awaits.

use std::{cell::RefCell, fmt, sync::Arc};

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::{
    filter::{FilterState, FilteredView, GenderFilter, StatusFilter},
    lifecycle::{LifecycleTracker, LoadingPolicy, OperationKind, Outcome, RequestStatus},
    model::{Employee, EmployeeDraft, EmployeeId},
    remote::{RemoteSync, SyncError},
    summary::RosterSummary,
};

pub type IdGenerator = Box<dyn Fn() -> EmployeeId>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("employee {0} is not in the roster")]
    UnknownEmployee(EmployeeId),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The last rejected operation; a newer failure replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFailure {
    pub kind: OperationKind,
    pub message: String,
}

struct StoreState {
    employees: Arc<Vec<Employee>>,
    filters: FilterState,
    lifecycle: LifecycleTracker,
    error: Option<StoreFailure>,
    view: FilteredView,
}

pub struct EmployeeStore<R> {
    remote: R,
    ids: IdGenerator,
    state: RefCell<StoreState>,
}

pub struct StoreBuilder<R> {
    remote: R,
    ids: IdGenerator,
    policy: LoadingPolicy,
    employees: Vec<Employee>,
}

impl<R: RemoteSync> StoreBuilder<R> {
    pub fn loading_policy(mut self, policy: LoadingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn id_generator(mut self, ids: impl Fn() -> EmployeeId + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Seeds the roster without a round trip.
    pub fn employees(mut self, employees: Vec<Employee>) -> Self {
        self.employees = employees;
        self
    }

    pub fn build(self) -> EmployeeStore<R> {
        EmployeeStore {
            remote: self.remote,
            ids: self.ids,
            state: RefCell::new(StoreState {
                employees: Arc::new(self.employees),
                filters: FilterState::default(),
                lifecycle: LifecycleTracker::new(self.policy),
                error: None,
                view: FilteredView::new(),
            }),
        }
    }
}

impl<R: RemoteSync> EmployeeStore<R> {
    pub fn new(remote: R) -> Self {
        Self::builder(remote).build()
    }

    pub fn builder(remote: R) -> StoreBuilder<R> {
        StoreBuilder {
            remote,
            ids: Box::new(EmployeeId::generate),
            policy: LoadingPolicy::default(),
            employees: Vec::new(),
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Replaces the whole roster with the server's list.
    #[instrument(name = "roster.refresh", skip_all)]
    pub async fn refresh(&self) -> StoreResult<usize> {
        {
            let mut state = self.state.borrow_mut();
            state.lifecycle.dispatch(OperationKind::Refresh);
            state.error = None;
        }
        debug!("refresh dispatched");
        match self.remote.list_all().await {
            Ok(employees) => {
                let count = employees.len();
                let mut state = self.state.borrow_mut();
                state.employees = Arc::new(employees);
                state.error = None;
                state
                    .lifecycle
                    .fulfil(OperationKind::Refresh, Outcome::Refreshed { count });
                debug!(count, "roster replaced");
                Ok(count)
            }
            Err(err) => Err(self.reject(OperationKind::Refresh, err.into())),
        }
    }

    /// Sends a new record under a freshly generated id; appends the server's copy.
    #[instrument(name = "roster.create", skip_all)]
    pub async fn create(&self, draft: EmployeeDraft) -> StoreResult<Employee> {
        let record = Employee::from_draft((self.ids)(), draft);
        self.dispatch(OperationKind::Create);
        debug!(id = %record.id, "create dispatched");
        match self.remote.create(&record).await {
            Ok(saved) => {
                self.reconcile(OperationKind::Create, |employees| {
                    match employees.iter().position(|e| e.id == saved.id) {
                        Some(index) => {
                            warn!(id = %saved.id, "created id already present, replacing entry");
                            employees[index] = saved.clone();
                        }
                        None => employees.push(saved.clone()),
                    }
                    Outcome::Created(saved.clone())
                });
                Ok(saved)
            }
            Err(err) => Err(self.reject(OperationKind::Create, err.into())),
        }
    }

    /// Full replace of the record `id` with `draft`.
    #[instrument(name = "roster.update", skip_all, fields(id = %id))]
    pub async fn update(&self, id: &EmployeeId, draft: EmployeeDraft) -> StoreResult<Employee> {
        let record = Employee::from_draft(id.clone(), draft);
        self.dispatch(OperationKind::Update);
        match self.remote.replace(id, &record).await {
            Ok(saved) => {
                self.reconcile(OperationKind::Update, |employees| {
                    replace_entry(employees, &saved);
                    Outcome::Updated(saved.clone())
                });
                Ok(saved)
            }
            Err(err) => Err(self.reject(OperationKind::Update, err.into())),
        }
    }

    /// Flips `isActive` on the local record and resends the whole record.
    #[instrument(name = "roster.toggle", skip_all, fields(id = %id))]
    pub async fn toggle_active(&self, id: &EmployeeId) -> StoreResult<Employee> {
        self.dispatch(OperationKind::Toggle);
        let Some(current) = self.find(id) else {
            return Err(self.reject(
                OperationKind::Toggle,
                StoreError::UnknownEmployee(id.clone()),
            ));
        };
        let record = current.toggled();
        match self.remote.toggle(id, &record).await {
            Ok(saved) => {
                self.reconcile(OperationKind::Toggle, |employees| {
                    replace_entry(employees, &saved);
                    Outcome::Toggled(saved.clone())
                });
                Ok(saved)
            }
            Err(err) => Err(self.reject(OperationKind::Toggle, err.into())),
        }
    }

    #[instrument(name = "roster.remove", skip_all, fields(id = %id))]
    pub async fn remove(&self, id: &EmployeeId) -> StoreResult<()> {
        self.dispatch(OperationKind::Delete);
        match self.remote.delete(id).await {
            Ok(()) => {
                self.reconcile(OperationKind::Delete, |employees| {
                    employees.retain(|employee| employee.id != *id);
                    Outcome::Deleted(id.clone())
                });
                Ok(())
            }
            Err(err) => Err(self.reject(OperationKind::Delete, err.into())),
        }
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        self.state.borrow_mut().filters.search_query = query.into();
    }

    pub fn set_gender_filter(&self, filter: GenderFilter) {
        self.state.borrow_mut().filters.gender_filter = filter;
    }

    pub fn set_status_filter(&self, filter: StatusFilter) {
        self.state.borrow_mut().filters.status_filter = filter;
    }

    pub fn clear_filters(&self) {
        self.state.borrow_mut().filters = FilterState::default();
    }

    pub fn clear_error(&self) {
        self.state.borrow_mut().error = None;
    }

    /// Snapshot of the canonical collection.
    pub fn employees(&self) -> Arc<Vec<Employee>> {
        Arc::clone(&self.state.borrow().employees)
    }

    /// The filtered view; the same `Arc` comes back until the roster or the
    /// filters change.
    pub fn filtered(&self) -> Arc<[Employee]> {
        let mut state = self.state.borrow_mut();
        let StoreState {
            employees,
            filters,
            view,
            ..
        } = &mut *state;
        view.get(employees, filters)
    }

    pub fn view_recomputations(&self) -> u64 {
        self.state.borrow().view.recomputations()
    }

    pub fn filters(&self) -> FilterState {
        self.state.borrow().filters.clone()
    }

    pub fn find(&self, id: &EmployeeId) -> Option<Employee> {
        self.state
            .borrow()
            .employees
            .iter()
            .find(|employee| employee.id == *id)
            .cloned()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().lifecycle.loading()
    }

    pub fn error(&self) -> Option<StoreFailure> {
        self.state.borrow().error.clone()
    }

    pub fn status(&self, kind: OperationKind) -> RequestStatus {
        self.state.borrow().lifecycle.status(kind).clone()
    }

    pub fn in_flight(&self, kind: OperationKind) -> usize {
        self.state.borrow().lifecycle.in_flight(kind)
    }

    pub fn summary(&self) -> RosterSummary {
        RosterSummary::from_employees(&self.state.borrow().employees)
    }

    fn dispatch(&self, kind: OperationKind) {
        self.state.borrow_mut().lifecycle.dispatch(kind);
    }

    /// Applies a resolved response as one step, publishing a new collection `Arc`.
    fn reconcile(&self, kind: OperationKind, apply: impl FnOnce(&mut Vec<Employee>) -> Outcome) {
        let mut state = self.state.borrow_mut();
        let mut next = Vec::clone(&state.employees);
        let outcome = apply(&mut next);
        state.employees = Arc::new(next);
        state.lifecycle.fulfil(kind, outcome);
        debug!(operation = kind.as_str(), size = state.employees.len(), "reconciled");
    }

    fn reject(&self, kind: OperationKind, err: StoreError) -> StoreError {
        let message = err.to_string();
        warn!(operation = kind.as_str(), error = %message, "roster operation rejected");
        let mut state = self.state.borrow_mut();
        state.lifecycle.reject(kind, message.clone());
        state.error = Some(StoreFailure { kind, message });
        err
    }
}

/// Swaps in `saved` where the ids match; a missing id is left alone.
fn replace_entry(employees: &mut [Employee], saved: &Employee) {
    match employees.iter_mut().find(|employee| employee.id == saved.id) {
        Some(slot) => *slot = saved.clone(),
        None => debug!(id = %saved.id, "resolved record no longer in roster; ignored"),
    }
}

impl<R> fmt::Debug for EmployeeStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("EmployeeStore")
            .field("employees", &state.employees.len())
            .field("filters", &state.filters)
            .field("error", &state.error)
            .finish_non_exhaustive()
    }
}
