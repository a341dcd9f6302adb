//! Per-operation request lifecycle.
//!
//! Every operation kind owns one [`RequestStatus`]. A dispatch moves it to
//! `Pending`, the resolution to `Fulfilled` or `Rejected`; nothing moves it back
//! to `Idle`. Which kinds light up the store-wide loading flag is decided by a
//! [`LoadingPolicy`].

use crate::model::{Employee, EmployeeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Refresh,
    Create,
    Update,
    Delete,
    Toggle,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Refresh,
        OperationKind::Create,
        OperationKind::Update,
        OperationKind::Delete,
        OperationKind::Toggle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Refresh => "refresh",
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
            OperationKind::Toggle => "toggle",
        }
    }

    fn index(self) -> usize {
        match self {
            OperationKind::Refresh => 0,
            OperationKind::Create => 1,
            OperationKind::Update => 2,
            OperationKind::Delete => 3,
            OperationKind::Toggle => 4,
        }
    }
}

/// What a fulfilled request produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Refreshed { count: usize },
    Created(Employee),
    Updated(Employee),
    Deleted(EmployeeId),
    Toggled(Employee),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Fulfilled(Outcome),
    Rejected(String),
}

impl RequestStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestStatus::Pending)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, RequestStatus::Fulfilled(_) | RequestStatus::Rejected(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestStatus::Rejected(message) => Some(message),
            _ => None,
        }
    }
}

/// Which operation kinds drive the shared loading indicator.
///
/// `RefreshOnly` matches the historical behaviour: mutations never show up as
/// loading, only the collection fetch does.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadingPolicy {
    #[default]
    RefreshOnly,
    AllOperations,
    Kinds(Vec<OperationKind>),
}

impl LoadingPolicy {
    pub fn drives_loading(&self, kind: OperationKind) -> bool {
        match self {
            LoadingPolicy::RefreshOnly => kind == OperationKind::Refresh,
            LoadingPolicy::AllOperations => true,
            LoadingPolicy::Kinds(kinds) => kinds.contains(&kind),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Slot {
    status: RequestStatus,
    in_flight: usize,
}

#[derive(Clone, Debug, Default)]
pub struct LifecycleTracker {
    slots: [Slot; 5],
    policy: LoadingPolicy,
}

impl LifecycleTracker {
    pub fn new(policy: LoadingPolicy) -> Self {
        Self {
            slots: Default::default(),
            policy,
        }
    }

    pub fn dispatch(&mut self, kind: OperationKind) {
        let slot = self.slot_mut(kind);
        slot.status = RequestStatus::Pending;
        slot.in_flight += 1;
    }

    pub fn fulfil(&mut self, kind: OperationKind, outcome: Outcome) {
        self.settle(kind, RequestStatus::Fulfilled(outcome));
    }

    pub fn reject(&mut self, kind: OperationKind, message: impl Into<String>) {
        self.settle(kind, RequestStatus::Rejected(message.into()));
    }

    pub fn status(&self, kind: OperationKind) -> &RequestStatus {
        &self.slots[kind.index()].status
    }

    /// Dispatches of `kind` that have not resolved yet.
    pub fn in_flight(&self, kind: OperationKind) -> usize {
        self.slots[kind.index()].in_flight
    }

    /// True when the latest transition of any policy kind is `Pending`.
    pub fn loading(&self) -> bool {
        OperationKind::ALL
            .into_iter()
            .any(|kind| self.policy.drives_loading(kind) && self.status(kind).is_pending())
    }

    pub fn policy(&self) -> &LoadingPolicy {
        &self.policy
    }

    fn settle(&mut self, kind: OperationKind, status: RequestStatus) {
        let slot = self.slot_mut(kind);
        slot.status = status;
        slot.in_flight = slot.in_flight.saturating_sub(1);
    }

    fn slot_mut(&mut self, kind: OperationKind) -> &mut Slot {
        &mut self.slots[kind.index()]
    }
}
