//! Date comparison between transactions and statement records

use chrono::NaiveDate;

/// Exact-day match against a record's actual and execution dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindowMatcher {
    actual: Option<NaiveDate>,
    execution: Option<NaiveDate>,
    ignore_execution_date: bool,
}

impl DateWindowMatcher {
    pub fn new(
        actual: Option<NaiveDate>,
        execution: Option<NaiveDate>,
        ignore_execution_date: bool,
    ) -> Self {
        Self {
            actual,
            execution,
            ignore_execution_date,
        }
    }

    /// A missing record date never matches
    pub fn matches(&self, date: NaiveDate) -> bool {
        self.actual == Some(date) || (!self.ignore_execution_date && self.execution == Some(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_actual_or_execution() {
        let matcher = DateWindowMatcher::new(Some(day(1)), Some(day(3)), false);
        assert!(matcher.matches(day(1)));
        assert!(matcher.matches(day(3)));
        assert!(!matcher.matches(day(2)));
    }

    #[test]
    fn test_ignore_execution_date() {
        let matcher = DateWindowMatcher::new(Some(day(1)), Some(day(3)), true);
        assert!(matcher.matches(day(1)));
        assert!(!matcher.matches(day(3)));
    }

    #[test]
    fn test_missing_dates() {
        let matcher = DateWindowMatcher::new(None, None, false);
        assert!(!matcher.matches(day(1)));

        let execution_only = DateWindowMatcher::new(None, Some(day(3)), false);
        assert!(execution_only.matches(day(3)));
    }
}
