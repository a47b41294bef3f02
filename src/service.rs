// 🧭 Numerology Service - compute + persist for every front end
//
// A storage failure is reported next to the result, never instead of it.

use crate::calculator::{CalculationError, CalculationResult, Calculator};
use crate::history::{self, HistoryFilter, HistoryRecord, HistoryStore, StorageError};
use chrono::{DateTime, Utc};
use tracing::warn;

/// What a front end shows after a submit.
#[derive(Debug, Clone)]
pub struct Submission {
    pub result: CalculationResult,
    /// Earlier record with the same name, if the history had one
    pub previous: Option<HistoryRecord>,
    /// The record that was written; `None` when persisting failed
    pub saved: Option<HistoryRecord>,
    pub storage_warning: Option<String>,
}

pub struct NumerologyService<S: HistoryStore> {
    calculator: Calculator,
    store: S,
}

impl<S: HistoryStore> NumerologyService<S> {
    pub fn new(store: S) -> Self {
        Self::with_calculator(Calculator::new(), store)
    }

    pub fn with_calculator(calculator: Calculator, store: S) -> Self {
        NumerologyService { calculator, store }
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn submit(&mut self, name: &str) -> Result<Submission, CalculationError> {
        self.submit_at(name, Utc::now())
    }

    /// Joins separate first/last name fields the way the web form does.
    pub fn submit_parts(&mut self, first: &str, last: &str) -> Result<Submission, CalculationError> {
        self.submit(&join_name(first, last))
    }

    pub fn submit_at(
        &mut self,
        name: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Submission, CalculationError> {
        let result = self.calculator.compute(name)?;
        let mut storage_warning = None;

        let previous = match self.store.list() {
            Ok(records) => history::find_by_name(&records, name).cloned(),
            Err(e) => {
                warn!(error = %e, "could not read history");
                storage_warning = Some(e.to_string());
                None
            }
        };

        let saved = match self.store.append(name, result.value, timestamp) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "calculation not saved to history");
                storage_warning.get_or_insert_with(|| e.to_string());
                None
            }
        };

        Ok(Submission {
            result,
            previous,
            saved,
            storage_warning,
        })
    }

    /// Newest first, filtered
    pub fn history(&self, filter: &HistoryFilter) -> Result<Vec<HistoryRecord>, StorageError> {
        let records = self.store.list()?;
        Ok(history::newest_first(filter.apply(records)))
    }
}

/// `"{first} {last}"` with outer whitespace trimmed
pub fn join_name(first: &str, last: &str) -> String {
    format!("{} {}", first, last).trim().to_string()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{JsonFileStore, MemoryStore};
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    /// Store that cannot be written to
    struct BrokenStore;

    impl HistoryStore for BrokenStore {
        fn append(&mut self, _: &str, _: u32, _: DateTime<Utc>) -> Result<HistoryRecord, StorageError> {
            Err(StorageError::Write {
                path: "history.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }

        fn list(&self) -> Result<Vec<HistoryRecord>, StorageError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_submit_saves_record() {
        let mut service = NumerologyService::new(MemoryStore::new());
        let submission = service.submit_at("John", at(0)).unwrap();

        assert_eq!(submission.result.value, 2);
        assert!(submission.previous.is_none());
        assert!(submission.storage_warning.is_none());

        let saved = submission.saved.unwrap();
        assert_eq!(saved.name, "John");
        assert_eq!(saved.result, 2);
        assert_eq!(saved.timestamp, at(0));
    }

    #[test]
    fn test_invalid_input_is_not_saved() {
        let mut service = NumerologyService::new(MemoryStore::new());
        assert_eq!(service.submit("   ").unwrap_err(), CalculationError::EmptyInput);
        assert!(service.submit("J0HN").is_err());
        assert!(service.store().list().unwrap().is_empty());
    }

    #[test]
    fn test_storage_failure_keeps_result() {
        let mut service = NumerologyService::new(BrokenStore);
        let submission = service.submit("John").unwrap();

        assert_eq!(submission.result.value, 2);
        assert!(submission.saved.is_none());
        assert!(submission.storage_warning.unwrap().contains("read-only"));
    }

    #[test]
    fn test_corrupt_file_warns_but_computes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "garbage").unwrap();

        let mut service = NumerologyService::new(JsonFileStore::new(&path));
        let submission = service.submit("RRRB").unwrap();

        assert_eq!(submission.result.value, 11);
        assert!(submission.storage_warning.unwrap().contains("corrupt"));
        assert!(service.history(&HistoryFilter::new()).is_err());
    }

    #[test]
    fn test_repeat_name_reports_previous() {
        let mut service = NumerologyService::new(MemoryStore::new());
        service.submit_at("John Doe", at(0)).unwrap();
        let again = service.submit_at("JOHN DOE", at(1)).unwrap();

        let previous = again.previous.unwrap();
        assert_eq!(previous.name, "John Doe");
        assert_eq!(previous.timestamp, at(0));
        // Still recorded: every successful calculation is appended
        assert_eq!(service.store().list().unwrap().len(), 2);
    }

    #[test]
    fn test_history_newest_first_and_filtered() {
        let mut service = NumerologyService::new(MemoryStore::new());
        service.submit_at("John", at(0)).unwrap(); // 2
        service.submit_at("RRRB", at(1)).unwrap(); // 11
        service.submit_at("Ann", at(2)).unwrap(); // 1+5+5 = 11

        let all = service.history(&HistoryFilter::new()).unwrap();
        let names: Vec<&str> = all.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Ann", "RRRB", "John"]);

        let masters = service.history(&HistoryFilter::only(11)).unwrap();
        assert_eq!(masters.len(), 2);
        assert!(masters.iter().all(|r| r.result == 11));
    }

    #[test]
    fn test_previous_found_in_existing_history() {
        let existing = HistoryRecord {
            name: "Ann".to_string(),
            result: 11,
            timestamp: at(-60),
        };
        let mut service = NumerologyService::with_calculator(
            Calculator::new(),
            MemoryStore::with_records(vec![existing.clone()]),
        );

        let submission = service.submit_at("ann", at(0)).unwrap();
        assert_eq!(submission.previous, Some(existing));
        assert_eq!(submission.result.value, 11);
    }

    #[test]
    fn test_submit_parts() {
        let mut service = NumerologyService::new(MemoryStore::new());
        let submission = service.submit_parts("Mary", "Jane").unwrap();
        assert_eq!(submission.result.name, "Mary Jane");

        let first_only = service.submit_parts("Mary", "").unwrap();
        assert_eq!(first_only.result.name, "Mary");

        assert_eq!(
            service.submit_parts("", " ").unwrap_err(),
            CalculationError::EmptyInput
        );
    }
}
