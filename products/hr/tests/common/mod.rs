#![allow(dead_code)]

use std::{cell::RefCell, collections::HashMap, sync::Arc};

use chrono::NaiveDate;
use products_hr::{
    Employee, EmployeeDraft, EmployeeId, Gender, RemoteSync, SyncError, SyncResult, UsState,
};
use tokio::sync::{mpsc, oneshot};

pub fn draft(name: &str, gender: Gender, active: bool) -> EmployeeDraft {
    EmployeeDraft {
        full_name: name.into(),
        gender,
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        state: UsState::Texas,
        is_active: active,
        profile_image: String::new(),
    }
}

pub fn employee(id: &str, name: &str, gender: Gender, active: bool) -> Employee {
    Employee::from_draft(EmployeeId::from(id), draft(name, gender, active))
}

/// Six employees spanning every gender/status combination.
pub fn roster() -> Vec<Employee> {
    vec![
        employee("EMP1", "Alice Martin", Gender::Female, true),
        employee("EMP2", "Bob Martinez", Gender::Male, true),
        employee("EMP3", "Casey Jordan", Gender::Other, true),
        employee("EMP4", "Dana Scully", Gender::Female, false),
        employee("EMP5", "Evan Marsh", Gender::Male, false),
        employee("EMP6", "Frankie Moss", Gender::Other, false),
    ]
}

/// In-memory resource that answers immediately, like the real server.
#[derive(Default)]
pub struct StubRemote {
    records: RefCell<Vec<Employee>>,
    reassigned_id: RefCell<Option<EmployeeId>>,
    failures: RefCell<HashMap<&'static str, String>>,
    calls: RefCell<Vec<String>>,
}

impl StubRemote {
    pub fn with_records(records: Vec<Employee>) -> Arc<Self> {
        Arc::new(Self {
            records: RefCell::new(records),
            ..Self::default()
        })
    }

    pub fn empty() -> Arc<Self> {
        Self::with_records(Vec::new())
    }

    /// Makes every following `op` call fail with `message`.
    pub fn fail(&self, op: &'static str, message: &str) {
        self.failures.borrow_mut().insert(op, message.to_string());
    }

    pub fn heal(&self, op: &'static str) {
        self.failures.borrow_mut().remove(op);
    }

    /// The next creates are echoed back under `id` instead of the client id.
    pub fn reassign_ids_to(&self, id: &str) {
        *self.reassigned_id.borrow_mut() = Some(EmployeeId::from(id));
    }

    pub fn set_records(&self, records: Vec<Employee>) {
        *self.records.borrow_mut() = records;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn enter(&self, op: &'static str, detail: &str) -> SyncResult<()> {
        self.calls.borrow_mut().push(format!("{op} {detail}").trim_end().to_string());
        match self.failures.borrow().get(op) {
            Some(message) => Err(SyncError::server(500, message.clone())),
            None => Ok(()),
        }
    }
}

impl RemoteSync for StubRemote {
    async fn list_all(&self) -> SyncResult<Vec<Employee>> {
        self.enter("list", "")?;
        Ok(self.records.borrow().clone())
    }

    async fn create(&self, record: &Employee) -> SyncResult<Employee> {
        self.enter("create", record.id.as_str())?;
        let mut saved = record.clone();
        if let Some(id) = self.reassigned_id.borrow().clone() {
            saved.id = id;
        }
        self.records.borrow_mut().push(saved.clone());
        Ok(saved)
    }

    async fn replace(&self, id: &EmployeeId, record: &Employee) -> SyncResult<Employee> {
        self.enter("replace", id.as_str())?;
        let mut records = self.records.borrow_mut();
        match records.iter_mut().find(|existing| existing.id == *id) {
            Some(slot) => *slot = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(record.clone())
    }

    async fn delete(&self, id: &EmployeeId) -> SyncResult<()> {
        self.enter("delete", id.as_str())?;
        self.records.borrow_mut().retain(|existing| existing.id != *id);
        Ok(())
    }
}

/// A call parked until the test decides how and when it resolves.
pub struct PendingCall {
    pub op: &'static str,
    pub record: Option<Employee>,
    reply: oneshot::Sender<SyncResult<Vec<Employee>>>,
}

impl PendingCall {
    /// Resolves with the record that was sent (no-op payload for list/delete).
    pub fn echo(self) {
        let payload = self.record.clone().into_iter().collect();
        let _ = self.reply.send(Ok(payload));
    }

    pub fn respond(self, employees: Vec<Employee>) {
        let _ = self.reply.send(Ok(employees));
    }

    pub fn fail(self, message: &str) {
        let _ = self.reply.send(Err(SyncError::server(500, message)));
    }
}

pub struct GatedRemote {
    calls: mpsc::UnboundedSender<PendingCall>,
}

pub fn gated() -> (GatedRemote, mpsc::UnboundedReceiver<PendingCall>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (GatedRemote { calls: tx }, rx)
}

impl GatedRemote {
    async fn park(&self, op: &'static str, record: Option<Employee>) -> SyncResult<Vec<Employee>> {
        let (reply, resolved) = oneshot::channel();
        self.calls
            .send(PendingCall { op, record, reply })
            .map_err(|_| SyncError::transport("gate closed"))?;
        resolved
            .await
            .map_err(|_| SyncError::transport("call dropped"))?
    }

    async fn park_one(&self, op: &'static str, record: &Employee) -> SyncResult<Employee> {
        self.park(op, Some(record.clone()))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SyncError::transport("empty response"))
    }
}

impl RemoteSync for GatedRemote {
    async fn list_all(&self) -> SyncResult<Vec<Employee>> {
        self.park("list", None).await
    }

    async fn create(&self, record: &Employee) -> SyncResult<Employee> {
        self.park_one("create", record).await
    }

    async fn replace(&self, _id: &EmployeeId, record: &Employee) -> SyncResult<Employee> {
        self.park_one("replace", record).await
    }

    async fn delete(&self, _id: &EmployeeId) -> SyncResult<()> {
        self.park("delete", None).await.map(|_| ())
    }
}

/// Yields until `done` holds, so a resolution is reconciled before the next.
pub async fn settle(done: impl Fn() -> bool) {
    while !done() {
        tokio::task::yield_now().await;
    }
}
