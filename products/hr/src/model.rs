use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::us_state::UsState;

/// Tag prepended to every client-generated employee id.
pub const EMPLOYEE_ID_PREFIX: &str = "EMP-";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// `EMP-` followed by a v4 uuid in upper-case simple form.
    pub fn generate() -> Self {
        let raw = Uuid::new_v4().simple().to_string().to_uppercase();
        Self(format!("{EMPLOYEE_ID_PREFIX}{raw}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EmployeeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EmployeeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value}")]
pub struct ParseValueError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseValueError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|gender| gender.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ParseValueError::new("gender", value))
    }
}

/// Canonical employee record as exchanged with the remote resource.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub full_name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub state: UsState,
    pub is_active: bool,
    #[serde(default)]
    pub profile_image: String,
}

/// Employee fields without an id: the payload of create and update.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDraft {
    pub full_name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub state: UsState,
    pub is_active: bool,
    #[serde(default)]
    pub profile_image: String,
}

impl Employee {
    pub fn from_draft(id: EmployeeId, draft: EmployeeDraft) -> Self {
        let EmployeeDraft {
            full_name,
            gender,
            date_of_birth,
            state,
            is_active,
            profile_image,
        } = draft;
        Self {
            id,
            full_name,
            gender,
            date_of_birth,
            state,
            is_active,
            profile_image,
        }
    }

    pub fn to_draft(&self) -> EmployeeDraft {
        EmployeeDraft {
            full_name: self.full_name.clone(),
            gender: self.gender,
            date_of_birth: self.date_of_birth,
            state: self.state,
            is_active: self.is_active,
            profile_image: self.profile_image.clone(),
        }
    }

    /// Full replacement record with the active flag flipped.
    pub fn toggled(&self) -> Self {
        Self {
            is_active: !self.is_active,
            ..self.clone()
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_active { "Active" } else { "Inactive" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Employee {
        Employee {
            id: EmployeeId::from("EMP1234"),
            full_name: "Jane Doe".into(),
            gender: Gender::Female,
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            state: UsState::Texas,
            is_active: true,
            profile_image: String::new(),
        }
    }

    #[test]
    fn wire_format_uses_camel_case_and_state_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "EMP1234",
                "fullName": "Jane Doe",
                "gender": "Female",
                "dateOfBirth": "1990-01-01",
                "state": "Texas",
                "isActive": true,
                "profileImage": ""
            })
        );
    }

    #[test]
    fn missing_profile_image_defaults_to_empty() {
        let employee: Employee = serde_json::from_value(json!({
            "id": "EMP1",
            "fullName": "Ann Lee",
            "gender": "Other",
            "dateOfBirth": "1985-06-30",
            "state": "New York",
            "isActive": false
        }))
        .unwrap();
        assert_eq!(employee.profile_image, "");
        assert_eq!(employee.state, UsState::NewYork);
    }

    #[test]
    fn generated_ids_are_prefixed_and_distinct() {
        let a = EmployeeId::generate();
        let b = EmployeeId::generate();
        assert!(a.as_str().starts_with(EMPLOYEE_ID_PREFIX));
        assert_eq!(a.as_str().len(), EMPLOYEE_ID_PREFIX.len() + 32);
        assert_ne!(a, b);
    }

    #[test]
    fn toggled_flips_only_the_active_flag() {
        let original = sample();
        let flipped = original.toggled();
        assert!(!flipped.is_active);
        assert_eq!(flipped.toggled(), original);
    }

    #[test]
    fn draft_round_trip_keeps_fields() {
        let original = sample();
        let rebuilt = Employee::from_draft(original.id.clone(), original.to_draft());
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn gender_parses_case_insensitively() {
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
        assert!("robot".parse::<Gender>().is_err());
    }
}
