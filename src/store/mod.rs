//! Sheet store abstraction
//!
//! The checker only talks to a workbook through [`SheetStore`]. Handles are
//! returned by the store and passed back explicitly on every call.
//!
//! - [`MemorySheetStore`]: in-memory workbook, also the working buffer of the xlsx store
//! - [`crate::excel::XlsxSheetStore`]: `.xlsx` files on disk

mod memory;

pub use memory::{MemorySheet, MemorySheetStore, MemoryWorkbook, SheetId, StoredCell, WriteOp};

use crate::error::CheckerResult;
use crate::types::CellValue;

/// Blocking, immediately consistent access to one active workbook.
///
/// All rows and columns are 1-based.
pub trait SheetStore {
    type Workbook;
    type Sheet: Clone + std::fmt::Debug;

    /// The active workbook, or `None` when none can be acquired
    fn active_workbook(&mut self) -> CheckerResult<Option<Self::Workbook>>;

    /// Exact, case-sensitive lookup
    fn sheet_by_name(
        &self,
        workbook: &Self::Workbook,
        name: &str,
    ) -> CheckerResult<Option<Self::Sheet>>;

    fn is_hidden(&self, sheet: &Self::Sheet) -> CheckerResult<bool>;

    /// Last row holding a value in any column, 0 for an empty sheet
    fn last_row(&self, sheet: &Self::Sheet) -> CheckerResult<u32>;

    /// Read a single-column block of `row_count` rows
    fn read_range(
        &self,
        sheet: &Self::Sheet,
        start_row: u32,
        start_column: u32,
        row_count: u32,
    ) -> CheckerResult<Vec<Vec<CellValue>>>;

    /// Write a text value; an empty string clears the cell
    fn write_cell(
        &mut self,
        sheet: &Self::Sheet,
        row: u32,
        column: u32,
        value: &str,
    ) -> CheckerResult<()>;

    /// Set (or clear, with `None`) the background of `width` cells starting at `column`
    fn set_background(
        &mut self,
        sheet: &Self::Sheet,
        row: u32,
        column: u32,
        width: u32,
        color: Option<&str>,
    ) -> CheckerResult<()>;
}
