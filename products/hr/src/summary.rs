use serde::Serialize;

use crate::model::{Employee, Gender};

/// Headline counts over the whole roster, ignoring the active filters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub male: usize,
    pub female: usize,
}

impl RosterSummary {
    pub fn from_employees(employees: &[Employee]) -> Self {
        employees
            .iter()
            .fold(RosterSummary::default(), |mut summary, employee| {
                summary.total += 1;
                if employee.is_active {
                    summary.active += 1;
                } else {
                    summary.inactive += 1;
                }
                match employee.gender {
                    Gender::Male => summary.male += 1,
                    Gender::Female => summary.female += 1,
                    Gender::Other => {}
                }
                summary
            })
    }

    pub fn active_percent(&self) -> u32 {
        percent(self.active, self.total)
    }

    pub fn inactive_percent(&self) -> u32 {
        percent(self.inactive, self.total)
    }
}

fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}
