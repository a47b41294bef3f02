// Numerology Calculator - Core Library
// Shared by the terminal app, the line prompt and the web server

pub mod letters;
pub mod calculator;
pub mod history;
pub mod service;
pub mod config;
pub mod logging;
pub mod prompt;

#[cfg(feature = "server")]
pub mod web;

// Re-export commonly used types
pub use letters::{Letter, LetterMap, TableError};
pub use calculator::{
    compute, is_master_number, meaning, normalize, reduce,
    CalculationError, CalculationResult, Calculator, LetterValue, MASTER_NUMBERS,
};
pub use history::{
    distinct_results, find_by_name, newest_first,
    HistoryFilter, HistoryRecord, HistoryStore, JsonFileStore, MemoryStore, StorageError,
    DEFAULT_HISTORY_FILE,
};
pub use service::{join_name, NumerologyService, Submission};
pub use config::Settings;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
