//! sheetcheck - sheet reference checker for spreadsheet workbooks
//!
//! A manifest sheet lists sheet names, one per row below a header. This
//! library resolves every name against the workbook and annotates its row:
//! references to visible sheets are cleared, references to missing or
//! hidden sheets get a warning message and a highlighted background.
//!
//! # Features
//!
//! - Store-agnostic core behind the [`store::SheetStore`] trait
//! - In-memory store for tests and embedding
//! - `.xlsx` store (calamine read, rust_xlsxwriter write-back)
//! - Expected conditions returned as [`RunOutcome`] values, never panics
//!
//! # Example
//!
//! ```no_run
//! use sheetcheck::config::CheckerConfig;
//! use sheetcheck::core::ExistenceChecker;
//! use sheetcheck::excel::XlsxSheetStore;
//!
//! let mut store = XlsxSheetStore::new("book.xlsx");
//! let checker = ExistenceChecker::new(CheckerConfig::default());
//! let outcome = checker.run(&mut store)?;
//!
//! if let Some(report) = outcome.report() {
//!     println!("Existing: {:?}", report.existing_sheet_name_list);
//!     store.save()?;
//! }
//! # Ok::<(), sheetcheck::error::CheckerError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::CheckerConfig;
pub use error::{CheckerError, CheckerResult};
pub use types::{CheckReport, FailureKind, Resolution, ResultRow, RunOutcome};
