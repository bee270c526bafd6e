use std::collections::BTreeSet;

use crate::domain::ScheduledEvent;

/// Search text plus department selection. Dates never take part in filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub search_term: String,
    pub departments: BTreeSet<String>,
}

impl EventFilter {
    pub fn new(search_term: impl Into<String>, departments: impl IntoIterator<Item = String>) -> Self {
        Self {
            search_term: search_term.into(),
            departments: departments.into_iter().collect(),
        }
    }

    pub fn apply(&self, events: &[ScheduledEvent]) -> Vec<ScheduledEvent> {
        filter_events(events, &self.search_term, &self.departments)
    }

    pub fn matches(&self, event: &ScheduledEvent) -> bool {
        let needle = normalized_term(&self.search_term);
        matches_search(event, needle.as_deref()) && matches_department(event, &self.departments)
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Adds the department to the selection, or removes it if already selected.
    pub fn toggle_department(&mut self, department: &str) -> bool {
        if self.departments.remove(department) {
            false
        } else {
            self.departments.insert(department.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.search_term.clear();
        self.departments.clear();
    }

    pub fn is_empty(&self) -> bool {
        normalized_term(&self.search_term).is_none() && self.departments.is_empty()
    }
}

pub fn filter_events(
    events: &[ScheduledEvent],
    search_term: &str,
    departments: &BTreeSet<String>,
) -> Vec<ScheduledEvent> {
    let needle = normalized_term(search_term);
    events
        .iter()
        .filter(|event| matches_search(event, needle.as_deref()))
        .filter(|event| matches_department(event, departments))
        .cloned()
        .collect()
}

/// Distinct departments in first-seen order.
pub fn departments_of(events: &[ScheduledEvent]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut departments = Vec::new();
    for event in events {
        if seen.insert(event.department.as_str()) {
            departments.push(event.department.clone());
        }
    }
    departments
}

fn normalized_term(term: &str) -> Option<String> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

fn matches_search(event: &ScheduledEvent, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => {
            event.title.to_lowercase().contains(needle)
                || event.department.to_lowercase().contains(needle)
        }
    }
}

fn matches_department(event: &ScheduledEvent, departments: &BTreeSet<String>) -> bool {
    departments.is_empty() || departments.contains(&event.department)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::NaiveDate;

    use super::{EventFilter, departments_of, filter_events};
    use crate::domain::ScheduledEvent;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_rounds() -> Vec<ScheduledEvent> {
        vec![
            ScheduledEvent::new("1", "Hand Hygiene Audit", day(2024, 1, 8), day(2024, 1, 8), "Cardiology"),
            ScheduledEvent::new("2", "Medication storage", day(2024, 1, 9), day(2024, 1, 11), "Pharmacy"),
            ScheduledEvent::new("3", "Fire exits", day(2023, 6, 1), day(2023, 6, 2), "Facilities"),
            ScheduledEvent::new("4", "Crash cart check", day(2024, 1, 10), day(2024, 1, 12), "Cardiology"),
        ]
    }

    fn ids(events: &[ScheduledEvent]) -> Vec<&str> {
        events.iter().map(|event| event.id.as_str()).collect()
    }

    #[test]
    fn empty_criteria_keep_everything_including_old_rounds() {
        let rounds = sample_rounds();
        let filtered = filter_events(&rounds, "", &BTreeSet::new());
        assert_eq!(ids(&filtered), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_department() {
        let rounds = sample_rounds();
        assert_eq!(ids(&filter_events(&rounds, "HYGIENE", &BTreeSet::new())), vec!["1"]);
        assert_eq!(ids(&filter_events(&rounds, "cardio", &BTreeSet::new())), vec!["1", "4"]);
        assert_eq!(ids(&filter_events(&rounds, "  pharm ", &BTreeSet::new())), vec!["2"]);
    }

    #[test]
    fn department_selection_and_search_combine() {
        let rounds = sample_rounds();
        let filter = EventFilter::new("check", ["Cardiology".to_string()]);
        assert_eq!(ids(&filter.apply(&rounds)), vec!["4"]);

        let filter = EventFilter::new("", ["Pharmacy".to_string(), "Facilities".to_string()]);
        assert_eq!(ids(&filter.apply(&rounds)), vec!["2", "3"]);
    }

    #[test]
    fn applying_the_same_filter_twice_is_a_no_op() {
        let rounds = sample_rounds();
        let filter = EventFilter::new("c", ["Cardiology".to_string(), "Facilities".to_string()]);
        let once = filter.apply(&rounds);
        let twice = filter.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn toggling_departments_and_clearing() {
        let mut filter = EventFilter::default();
        assert!(filter.is_empty());
        assert!(filter.toggle_department("ICU"));
        assert!(!filter.is_empty());
        assert!(!filter.toggle_department("ICU"));
        filter.set_search("   ");
        assert!(filter.is_empty());
        filter.set_search("round");
        filter.clear();
        assert!(filter.is_empty());
    }

    #[test]
    fn matches_agrees_with_apply() {
        let rounds = sample_rounds();
        let filter = EventFilter::new("storage", Vec::new());
        let matched = rounds.iter().filter(|event| filter.matches(event)).count();
        assert_eq!(matched, filter.apply(&rounds).len());
    }

    #[test]
    fn departments_listed_in_first_seen_order() {
        let rounds = sample_rounds();
        assert_eq!(departments_of(&rounds), vec!["Cardiology", "Pharmacy", "Facilities"]);
    }
}
