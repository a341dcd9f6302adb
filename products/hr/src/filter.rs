//! Filter State and the pure derivation of the visible roster.
//!
//! [`apply`] is the predicate pipeline; [`FilteredView`] memoizes it so that a
//! consumer asking twice with the same collection snapshot and the same
//! filters receives the very same `Arc`.

use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::model::{Employee, Gender, ParseValueError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum GenderFilter {
    #[default]
    All,
    Only(Gender),
}

impl GenderFilter {
    pub fn matches(self, gender: Gender) -> bool {
        match self {
            GenderFilter::All => true,
            GenderFilter::Only(wanted) => wanted == gender,
        }
    }
}

impl From<Gender> for GenderFilter {
    fn from(value: Gender) -> Self {
        GenderFilter::Only(value)
    }
}

impl fmt::Display for GenderFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenderFilter::All => f.write_str("all"),
            GenderFilter::Only(gender) => gender.fmt(f),
        }
    }
}

impl FromStr for GenderFilter {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(GenderFilter::All);
        }
        value
            .parse::<Gender>()
            .map(GenderFilter::Only)
            .map_err(|_| ParseValueError::new("gender filter", value))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn matches(self, is_active: bool) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => is_active,
            StatusFilter::Inactive => !is_active,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Inactive => "inactive",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "inactive" => Ok(StatusFilter::Inactive),
            _ => Err(ParseValueError::new("status filter", value)),
        }
    }
}

/// The three independent predicates narrowing the roster.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub search_query: String,
    pub gender_filter: GenderFilter,
    pub status_filter: StatusFilter,
}

impl FilterState {
    pub fn is_default(&self) -> bool {
        *self == FilterState::default()
    }

    pub fn matches(&self, employee: &Employee) -> bool {
        Matcher::new(self).matches(employee)
    }
}

struct Matcher<'a> {
    needle: String,
    filters: &'a FilterState,
}

impl<'a> Matcher<'a> {
    fn new(filters: &'a FilterState) -> Self {
        Self {
            needle: filters.search_query.to_lowercase(),
            filters,
        }
    }

    fn matches(&self, employee: &Employee) -> bool {
        employee.full_name.to_lowercase().contains(&self.needle)
            && self.filters.gender_filter.matches(employee.gender)
            && self.filters.status_filter.matches(employee.is_active)
    }
}

/// Stable filter of `employees`; source order is preserved.
pub fn apply(employees: &[Employee], filters: &FilterState) -> Vec<Employee> {
    let matcher = Matcher::new(filters);
    employees
        .iter()
        .filter(|employee| matcher.matches(employee))
        .cloned()
        .collect()
}

#[derive(Debug)]
struct CacheEntry {
    source: Arc<Vec<Employee>>,
    filters: FilterState,
    view: Arc<[Employee]>,
}

/// Memoized [`apply`], keyed on collection identity plus filter values.
#[derive(Debug, Default)]
pub struct FilteredView {
    cached: Option<CacheEntry>,
    recomputations: u64,
}

impl FilteredView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, source: &Arc<Vec<Employee>>, filters: &FilterState) -> Arc<[Employee]> {
        if let Some(entry) = &self.cached {
            if Arc::ptr_eq(&entry.source, source) && entry.filters == *filters {
                return Arc::clone(&entry.view);
            }
        }
        let view: Arc<[Employee]> = apply(source, filters).into();
        self.recomputations += 1;
        self.cached = Some(CacheEntry {
            source: Arc::clone(source),
            filters: filters.clone(),
            view: Arc::clone(&view),
        });
        view
    }

    /// Number of times the derivation actually ran.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}
