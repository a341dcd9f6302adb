//! Platform authentication helpers.
//!
//! Sign-in is checked against a small fixed credential set. A successful login
//! persists the user profile into a [`KeyValueStorage`] so a later start can
//! [`SessionManager::restore`] it without asking again.

mod storage;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use storage::{JsonFileStorage, KeyValueStorage, MemoryStorage, StorageError};

pub const AUTHENTICATED_KEY: &str = "isAuthenticated";
pub const USER_KEY: &str = "user";

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Error)]
pub enum AuthnError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("stored session is corrupt: {0}")]
    CorruptSession(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Profile handed to the rest of the app once signed in.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Clone, Debug)]
pub struct Credential {
    pub email: &'static str,
    pub password: &'static str,
    pub name: &'static str,
    pub role: &'static str,
}

impl Credential {
    fn profile(&self) -> UserProfile {
        UserProfile {
            email: self.email.to_string(),
            name: self.name.to_string(),
            role: self.role.to_string(),
        }
    }
}

pub const DEFAULT_CREDENTIALS: &[Credential] = &[
    Credential {
        email: "admin@example.com",
        password: "admin123",
        name: "Admin User",
        role: "Administrator",
    },
    Credential {
        email: "user@example.com",
        password: "user123",
        name: "Regular User",
        role: "User",
    },
];

#[derive(Clone, Debug)]
pub struct AuthnService {
    credentials: Vec<Credential>,
}

impl Default for AuthnService {
    fn default() -> Self {
        Self {
            credentials: DEFAULT_CREDENTIALS.to_vec(),
        }
    }
}

impl AuthnService {
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credentials.push(credential);
        self
    }

    pub fn authenticate(&self, email: &str, password: &str) -> Result<UserProfile, AuthnError> {
        self.credentials
            .iter()
            .find(|cred| cred.email == email && cred.password == password)
            .map(Credential::profile)
            .ok_or(AuthnError::InvalidCredentials)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub is_authenticated: bool,
    pub user: Option<UserProfile>,
    pub error: Option<String>,
}

pub struct SessionManager<S> {
    service: AuthnService,
    storage: S,
    state: SessionState,
}

impl<S: KeyValueStorage> SessionManager<S> {
    pub fn new(service: AuthnService, storage: S) -> Self {
        Self {
            service,
            storage,
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.state.user.as_ref()
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<UserProfile, AuthnError> {
        self.state.error = None;
        let profile = match self.service.authenticate(email, password) {
            Ok(profile) => profile,
            Err(err) => {
                warn!(%email, "login rejected");
                self.state.error = Some(INVALID_CREDENTIALS.to_string());
                return Err(err);
            }
        };
        self.storage.set(AUTHENTICATED_KEY, "true")?;
        self.storage.set(USER_KEY, &serde_json::to_string(&profile)?)?;
        info!(email = %profile.email, role = %profile.role, "signed in");
        self.state = SessionState {
            is_authenticated: true,
            user: Some(profile.clone()),
            error: None,
        };
        Ok(profile)
    }

    pub fn logout(&mut self) -> Result<(), AuthnError> {
        self.storage.remove(AUTHENTICATED_KEY)?;
        self.storage.remove(USER_KEY)?;
        self.state = SessionState::default();
        debug!("signed out");
        Ok(())
    }

    /// Rebuilds the session from storage; `None` when nobody is signed in.
    pub fn restore(&mut self) -> Result<Option<UserProfile>, AuthnError> {
        let authenticated = self.storage.get(AUTHENTICATED_KEY)?;
        let user = self.storage.get(USER_KEY)?;
        let (Some(flag), Some(raw)) = (authenticated, user) else {
            return Ok(None);
        };
        if flag != "true" {
            return Ok(None);
        }
        let profile: UserProfile = serde_json::from_str(&raw)?;
        self.state.is_authenticated = true;
        self.state.user = Some(profile.clone());
        debug!(email = %profile.email, "session restored");
        Ok(Some(profile))
    }
}
