use rayon::prelude::*;
use std::time::Instant;
use tracing::trace;

use crate::domain::TableError;
use crate::record::Record;

/// Criteria built from the current control values. Lives for one
/// filter-and-render pass only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    // Stored lowercased, never trimmed.
    search: String,
    pub category: Option<String>,
    pub kind: Option<String>,
    pub status: Option<String>,
}

impl FilterState {
    /// Build a state from raw control values, where an empty select value
    /// means "unset".
    pub fn from_controls(search: &str, category: &str, kind: &str, status: &str) -> Self {
        Self {
            search: search.to_lowercase(),
            category: unset_if_empty(category),
            kind: unset_if_empty(kind),
            status: unset_if_empty(status),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.search.is_empty()
            && self.category.is_none()
            && self.kind.is_none()
            && self.status.is_none()
    }

    pub fn matches(&self, record: &Record) -> bool {
        let matches_search = record.name.to_lowercase().contains(&self.search)
            || record.email.to_lowercase().contains(&self.search);

        matches_search
            && exact(&self.category, &record.category)
            && exact(&self.kind, &record.kind)
            && exact(&self.status, &record.status)
    }
}

fn unset_if_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn exact(selected: &Option<String>, value: &str) -> bool {
    selected.as_deref().is_none_or(|s| s == value)
}

/// Dataset indices of all records matching `state`, in dataset order.
pub fn apply(records: &[Record], state: &FilterState) -> Vec<usize> {
    if state.is_unfiltered() {
        return (0..records.len()).collect();
    }
    let start_time = Instant::now();
    let matches: Vec<usize> = records
        .par_iter()
        .enumerate()
        .filter(|(_, r)| state.matches(r))
        .map(|(idx, _)| idx)
        .collect();
    trace!(
        "Filter {:?} matched {} of {} records in {}us",
        state,
        matches.len(),
        records.len(),
        start_time.elapsed().as_micros()
    );
    matches
}

/// Check a select value against its closed option set. Empty is accepted
/// and means "unset".
pub fn validate_option(
    control: &'static str,
    value: &str,
    options: &[&str],
) -> Result<String, TableError> {
    if value.is_empty() || options.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(TableError::InvalidOption {
            control,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{builtin_records, CATEGORIES, STATUSES, TYPES};
    use rstest::{fixture, rstest};

    #[fixture]
    fn records() -> Vec<Record> {
        builtin_records().unwrap()
    }

    fn ids(records: &[Record], state: &FilterState) -> Vec<i64> {
        apply(records, state).iter().map(|&i| records[i].id).collect()
    }

    #[rstest]
    fn unfiltered_returns_everything_in_order(records: Vec<Record>) {
        let state = FilterState::from_controls("", "", "", "");
        assert!(state.is_unfiltered());
        assert_eq!(ids(&records, &state), (1..=10).collect::<Vec<_>>());
    }

    #[rstest]
    fn search_ignores_case(records: Vec<Record>) {
        let upper = FilterState::from_controls("ALICE", "", "", "");
        let lower = FilterState::from_controls("alice", "", "", "");
        assert_eq!(ids(&records, &upper), vec![1]);
        assert_eq!(ids(&records, &upper), ids(&records, &lower));
    }

    #[rstest]
    fn search_matches_email(records: Vec<Record>) {
        let state = FilterState::from_controls("example.com", "", "", "");
        assert_eq!(apply(&records, &state).len(), 10);
        let state = FilterState::from_controls("thompson@", "", "", "");
        assert_eq!(ids(&records, &state), vec![10]);
    }

    #[rstest]
    fn search_is_not_trimmed(records: Vec<Record>) {
        let state = FilterState::from_controls(" alice", "", "", "");
        assert!(apply(&records, &state).is_empty());
    }

    #[rstest]
    fn combines_dropdowns_with_and(records: Vec<Record>) {
        let state = FilterState::from_controls("", "Premium", "", "Active");
        assert_eq!(ids(&records, &state), vec![2, 5, 8]);
        let state = FilterState::from_controls("", "Premium", "Business", "Active");
        assert_eq!(ids(&records, &state), vec![5]);
    }

    #[rstest]
    fn dropdowns_are_case_sensitive(records: Vec<Record>) {
        let state = FilterState::from_controls("", "premium", "", "");
        assert!(apply(&records, &state).is_empty());
    }

    #[rstest]
    fn no_match_is_empty(records: Vec<Record>) {
        let state = FilterState::from_controls("zzz-no-match", "", "", "");
        assert!(apply(&records, &state).is_empty());
    }

    #[rstest]
    fn unconstrained_values_never_match_a_selection() {
        let odd = Record::new(42, "Zed", "zed@example.com", "Gold", "Business", "Active", "2024-01-01")
            .unwrap();
        let records = vec![odd];
        for category in CATEGORIES {
            let state = FilterState::from_controls("", category, "", "");
            assert!(apply(&records, &state).is_empty());
        }
        let state = FilterState::from_controls("", "", "", "");
        assert_eq!(apply(&records, &state), vec![0]);
    }

    #[rstest]
    fn count_equals_predicate_cardinality(records: Vec<Record>) {
        let with_unset = |opts: &[&'static str]| {
            std::iter::once("").chain(opts.iter().copied()).collect::<Vec<_>>()
        };
        for search in ["", "a", "SON", "example.com", "zzz"] {
            for category in with_unset(&CATEGORIES[..]) {
                for kind in with_unset(&TYPES[..]) {
                    for status in with_unset(&STATUSES[..]) {
                        let state = FilterState::from_controls(search, category, kind, status);
                        let expected = records.iter().filter(|r| state.matches(r)).count();
                        let got = apply(&records, &state);
                        assert_eq!(got.len(), expected);
                        assert!(got.windows(2).all(|w| w[0] < w[1]));
                    }
                }
            }
        }
    }

    #[rstest]
    #[case("Premium", true)]
    #[case("", true)]
    #[case("Gold", false)]
    fn validates_options(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(validate_option("category", value, &CATEGORIES).is_ok(), ok);
    }
}
