//! Headless commands that run an [`EmployeeStore`] against a remote resource.

use std::{
    fs::File,
    io::{self, Write},
    path::Path,
};

use anyhow::{Context, Result};
use chrono::Local;
use platform_authn::{AuthnService, JsonFileStorage, SessionManager, UserProfile};
use products_hr::{
    ClientConfig, EmployeeStore, GenderFilter, HttpRemote, RosterSummary, StatusFilter, export,
};
use tracing::info;

pub async fn connect(client: &ClientConfig) -> Result<EmployeeStore<HttpRemote>> {
    let remote = HttpRemote::new(client)
        .with_context(|| format!("invalid employee API url {}", client.base_url))?;
    let store = EmployeeStore::new(remote);
    store
        .refresh()
        .await
        .with_context(|| format!("failed to load employees from {}", client.base_url))?;
    Ok(store)
}

#[derive(Clone, Debug, Default)]
pub struct ExportFilters {
    pub search: Option<String>,
    pub gender: GenderFilter,
    pub status: StatusFilter,
}

impl ExportFilters {
    pub fn apply_to(&self, store: &EmployeeStore<HttpRemote>) {
        if let Some(search) = &self.search {
            store.set_search_query(search.clone());
        }
        store.set_gender_filter(self.gender);
        store.set_status_filter(self.status);
    }
}

/// Writes the filtered view as CSV to `output`, or stdout when `None`. A
/// directory receives a dated `employees_YYYY-MM-DD.csv`.
pub async fn run_export(
    client: &ClientConfig,
    filters: &ExportFilters,
    output: Option<&Path>,
) -> Result<usize> {
    let store = connect(client).await?;
    filters.apply_to(&store);
    let visible = store.filtered();
    match output {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(export::export_file_name(Local::now().date_naive()))
            } else {
                path.to_path_buf()
            };
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            export::write_csv(file, &visible)?;
            info!(rows = visible.len(), path = %path.display(), "roster exported");
        }
        None => {
            let stdout = io::stdout();
            export::write_csv(stdout.lock(), &visible)?;
        }
    }
    Ok(visible.len())
}

pub async fn run_summary(client: &ClientConfig) -> Result<RosterSummary> {
    let store = connect(client).await?;
    Ok(store.summary())
}

pub fn print_summary(summary: &RosterSummary, mut out: impl Write) -> io::Result<()> {
    writeln!(out, "Total employees: {}", summary.total)?;
    writeln!(
        out,
        "Active: {} ({}%)",
        summary.active,
        summary.active_percent()
    )?;
    writeln!(
        out,
        "Inactive: {} ({}%)",
        summary.inactive,
        summary.inactive_percent()
    )?;
    writeln!(out, "Male: {}", summary.male)?;
    writeln!(out, "Female: {}", summary.female)
}

pub const DEFAULT_SESSION_FILE: &str = ".roster-session.json";

pub fn session(path: Option<&Path>) -> SessionManager<JsonFileStorage> {
    let storage = JsonFileStorage::new(path.unwrap_or(Path::new(DEFAULT_SESSION_FILE)));
    SessionManager::new(AuthnService::default(), storage)
}

pub fn run_login(path: Option<&Path>, email: &str, password: &str) -> Result<UserProfile> {
    let mut session = session(path);
    session.login(email, password).context("login failed")
}

pub fn run_logout(path: Option<&Path>) -> Result<()> {
    session(path).logout().context("logout failed")
}

pub fn run_whoami(path: Option<&Path>) -> Result<Option<UserProfile>> {
    session(path)
        .restore()
        .context("failed to restore session")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lines() {
        let summary = RosterSummary {
            total: 4,
            active: 3,
            inactive: 1,
            male: 2,
            female: 1,
        };
        let mut out = Vec::new();
        print_summary(&summary, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Total employees: 4\nActive: 3 (75%)\nInactive: 1 (25%)\nMale: 2\nFemale: 1\n"
        );
    }

    #[test]
    fn login_then_whoami_then_logout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let profile = run_login(Some(path.as_path()), "admin@example.com", "admin123").unwrap();
        assert_eq!(profile.role, "Administrator");
        assert_eq!(run_whoami(Some(path.as_path())).unwrap(), Some(profile));

        run_logout(Some(path.as_path())).unwrap();
        assert_eq!(run_whoami(Some(path.as_path())).unwrap(), None);
    }

    #[test]
    fn bad_login_leaves_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let err = run_login(Some(path.as_path()), "admin@example.com", "wrong").unwrap_err();
        assert!(format!("{err:#}").contains("Invalid email or password"));
        assert_eq!(run_whoami(Some(path.as_path())).unwrap(), None);
    }
}
