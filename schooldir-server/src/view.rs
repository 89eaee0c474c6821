//! Client-side directory view: search text and state filter over the last
//! fetched list.
//!
//! Pure in-memory transformations, recomputed on every change. Nothing here
//! talks to the server.

use std::collections::BTreeSet;

use crate::models::School;

/// Current search/filter selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilter {
    /// Case-insensitive substring of name or city; empty matches all
    pub search: String,
    /// Exact state match; empty matches all
    pub state: String,
}

impl ViewFilter {
    pub fn new(search: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            state: state.into(),
        }
    }

    /// Whether a single school passes both the search and the state filter.
    pub fn matches(&self, school: &School) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = needle.is_empty()
            || contains_folded(&school.name, &needle)
            || school
                .city
                .as_deref()
                .is_some_and(|city| contains_folded(city, &needle));

        let matches_state =
            self.state.is_empty() || school.state.as_deref() == Some(self.state.as_str());

        matches_search && matches_state
    }

    /// Schools passing the filter, in their original order.
    pub fn apply<'a>(&self, schools: &'a [School]) -> Vec<&'a School> {
        schools.iter().filter(|s| self.matches(s)).collect()
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Sorted, de-duplicated states present in the list (drives the filter menu).
pub fn distinct_states(schools: &[School]) -> Vec<String> {
    schools
        .iter()
        .filter_map(|s| s.state.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
