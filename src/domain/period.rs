// Reporting periods and the registry of those available for an entity
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reporting window label, e.g. a fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period(String);

impl Period {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Period {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Available periods in server order (most recent first) plus the selection.
///
/// Once populated, the selection is always an element of the set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodRegistry {
    available: Vec<Period>,
    selected: Option<Period>,
}

impl PeriodRegistry {
    /// Replace the set and select its first element.
    pub fn populate(&mut self, periods: Vec<Period>) {
        self.selected = periods.first().cloned();
        self.available = periods;
    }

    /// Adopt the list returned alongside `period`'s data and select `period`.
    /// A list that does not contain `period` is ignored so the selection
    /// always labels the data on screen.
    pub fn refresh(&mut self, periods: Vec<Period>, period: &Period) -> bool {
        if periods.contains(period) {
            self.available = periods;
        }
        self.select(period)
    }

    /// Select a registered period. Returns false for unknown periods.
    pub fn select(&mut self, period: &Period) -> bool {
        if !self.contains(period) {
            return false;
        }
        self.selected = Some(period.clone());
        true
    }

    pub fn contains(&self, period: &Period) -> bool {
        self.available.contains(period)
    }

    pub fn available(&self) -> &[Period] {
        &self.available
    }

    pub fn selected(&self) -> Option<&Period> {
        self.selected.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn periods(labels: &[&str]) -> Vec<Period> {
        labels.iter().map(|l| Period::from(*l)).collect()
    }

    #[test]
    fn test_populate_selects_first_in_server_order() {
        let mut registry = PeriodRegistry::default();
        registry.populate(periods(&["2022", "2024", "2023"]));
        assert_eq!(registry.selected(), Some(&Period::from("2022")));
        assert_eq!(registry.available(), periods(&["2022", "2024", "2023"]).as_slice());
    }

    #[test]
    fn test_populate_empty_clears_selection() {
        let mut registry = PeriodRegistry::default();
        registry.populate(periods(&["2024"]));
        registry.populate(Vec::new());
        assert!(registry.is_empty());
        assert_eq!(registry.selected(), None);
    }

    #[test]
    fn test_select_rejects_unknown() {
        let mut registry = PeriodRegistry::default();
        registry.populate(periods(&["2024", "2023"]));
        assert!(!registry.select(&Period::from("1999")));
        assert!(registry.select(&Period::from("2023")));
        assert_eq!(registry.selected(), Some(&Period::from("2023")));
    }

    #[test]
    fn test_refresh_adopts_list_containing_period() {
        let mut registry = PeriodRegistry::default();
        registry.populate(periods(&["2024", "2023"]));
        assert!(registry.refresh(periods(&["2025", "2024", "2023"]), &Period::from("2023")));
        assert_eq!(registry.available(), periods(&["2025", "2024", "2023"]).as_slice());
        assert_eq!(registry.selected(), Some(&Period::from("2023")));
    }

    #[test]
    fn test_refresh_ignores_list_missing_period() {
        let mut registry = PeriodRegistry::default();
        registry.populate(periods(&["2024", "2023", "2022"]));
        assert!(registry.refresh(periods(&["2025", "2024"]), &Period::from("2023")));
        assert_eq!(registry.available(), periods(&["2024", "2023", "2022"]).as_slice());
        assert_eq!(registry.selected(), Some(&Period::from("2023")));
    }
}
