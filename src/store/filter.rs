//! Filter state for the map and the admin table
//!
//! A filter is a pure projection: the same state over the same records
//! always selects the same records, in store order.

use crate::exchange::{Category, ExchangeRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Active filters; all predicates must hold for a record to be selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Categories to include; a record is kept only if its category is here
    pub categories: BTreeSet<Category>,
    /// Exact activity match, when set and non-empty
    #[serde(default)]
    pub activity: Option<String>,
    /// Exact school match, when set and non-empty
    #[serde(default)]
    pub school: Option<String>,
    /// Case-insensitive substring over destination, activity, course, school
    #[serde(default)]
    pub search: String,
}

impl Default for FilterState {
    /// The four named programs, no selectors, no search
    fn default() -> Self {
        Self {
            categories: Category::programs().into_iter().collect(),
            activity: None,
            school: None,
            search: String::new(),
        }
    }
}

impl FilterState {
    /// Filter that selects every record
    pub fn all() -> Self {
        Self {
            categories: Category::programs()
                .into_iter()
                .chain(std::iter::once(Category::Unknown))
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    pub fn with_activity(mut self, activity: impl Into<String>) -> Self {
        self.activity = Some(activity.into());
        self
    }

    pub fn with_school(mut self, school: impl Into<String>) -> Self {
        self.school = Some(school.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Check one record against every active predicate
    pub fn matches(&self, record: &ExchangeRecord) -> bool {
        if !self.categories.contains(&record.category) {
            return false;
        }

        if let Some(activity) = non_empty(&self.activity) {
            if record.activity != activity {
                return false;
            }
        }

        if let Some(school) = non_empty(&self.school) {
            if record.school != school {
                return false;
            }
        }

        let needle = self.search.trim().to_lowercase();
        needle.is_empty() || record.matches_text(&needle)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
