//! Field rules applied by employee forms before a draft is submitted.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::model::{EmployeeDraft, Gender};

pub const MIN_NAME_CHARS: usize = 2;
pub const MIN_AGE_YEARS: i32 = 18;
pub const MAX_AGE_YEARS: i32 = 100;
pub const MAX_PROFILE_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Full name is required")]
    NameRequired,
    #[error("Name must be at least 2 characters")]
    NameTooShort,
    #[error("Employee must be at least 18 years old")]
    TooYoung,
    #[error("Please enter a valid date of birth")]
    ImplausibleAge,
    #[error("Image size must be less than 5MB")]
    ImageTooLarge,
    #[error("Profile image is not a valid embedded image")]
    MalformedImage,
}

/// Collects every rule the draft breaks, as of `today`.
pub fn validate_draft(draft: &EmployeeDraft, today: NaiveDate) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let name = draft.full_name.trim();
    if name.is_empty() {
        errors.push(ValidationError::NameRequired);
    } else if name.chars().count() < MIN_NAME_CHARS {
        errors.push(ValidationError::NameTooShort);
    }

    // year difference only, birthdays within the year are not considered
    let age = today.year() - draft.date_of_birth.year();
    if age < MIN_AGE_YEARS {
        errors.push(ValidationError::TooYoung);
    } else if age > MAX_AGE_YEARS {
        errors.push(ValidationError::ImplausibleAge);
    }

    if let Some(size) = embedded_image_size(&draft.profile_image) {
        match size {
            Some(bytes) if bytes > MAX_PROFILE_IMAGE_BYTES => {
                errors.push(ValidationError::ImageTooLarge)
            }
            Some(_) => {}
            None => errors.push(ValidationError::MalformedImage),
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Decoded size of a `data:` URL; outer `None` when the image is not embedded.
fn embedded_image_size(uri: &str) -> Option<Option<usize>> {
    let rest = uri.strip_prefix("data:")?;
    let decoded = rest
        .split_once(',')
        .filter(|(header, _)| header.ends_with(";base64"))
        .and_then(|(_, payload)| STANDARD.decode(payload.trim()).ok())
        .map(|bytes| bytes.len());
    Some(decoded)
}

/// Placeholder avatar used when a form is submitted without a picture.
pub fn default_profile_image(gender: Gender) -> String {
    let index = if gender == Gender::Male { 12 } else { 5 };
    format!("https://i.pravatar.cc/150?img={index}")
}

impl EmployeeDraft {
    pub fn with_default_image(mut self) -> Self {
        if self.profile_image.trim().is_empty() {
            self.profile_image = default_profile_image(self.gender);
        }
        self
    }
}
