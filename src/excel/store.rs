//! `.xlsx`-backed sheet store
//!
//! The file is loaded on the first `active_workbook` call, edited in memory
//! and written back with [`XlsxSheetStore::save`].

use super::{ExcelExporter, ExcelImporter};
use crate::error::{CheckerError, CheckerResult};
use crate::store::{MemorySheetStore, MemoryWorkbook, SheetId, SheetStore};
use crate::types::CellValue;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct XlsxSheetStore {
    path: PathBuf,
    inner: MemorySheetStore,
    loaded: bool,
}

impl XlsxSheetStore {
    /// Bind to a file without reading it yet
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            inner: MemorySheetStore::unavailable(),
            loaded: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn workbook(&self) -> Option<&MemoryWorkbook> {
        self.inner.workbook()
    }

    /// Number of cell and background writes applied since loading
    pub fn pending_writes(&self) -> usize {
        self.inner.write_log().len()
    }

    /// Write the edited workbook back to the file it was loaded from
    pub fn save(&self) -> CheckerResult<()> {
        self.save_as(&self.path)
    }

    /// Write the edited workbook to `output`
    pub fn save_as(&self, output: &Path) -> CheckerResult<()> {
        let workbook = self.inner.workbook().ok_or_else(|| {
            CheckerError::WorkbookSave(format!("{} was never loaded", self.path.display()))
        })?;
        ExcelExporter::new(workbook).export(output)?;
        info!(path = %output.display(), writes = self.pending_writes(), "saved workbook");
        Ok(())
    }
}

impl SheetStore for XlsxSheetStore {
    type Workbook = ();
    type Sheet = SheetId;

    fn active_workbook(&mut self) -> CheckerResult<Option<()>> {
        if !self.loaded {
            let workbook = ExcelImporter::new(&self.path).import()?;
            info!(
                path = %self.path.display(),
                sheets = workbook.sheets().len(),
                "loaded workbook"
            );
            self.inner = MemorySheetStore::new(workbook);
            self.loaded = true;
        }
        self.inner.active_workbook()
    }

    fn sheet_by_name(&self, workbook: &(), name: &str) -> CheckerResult<Option<SheetId>> {
        self.inner.sheet_by_name(workbook, name)
    }

    fn is_hidden(&self, sheet: &SheetId) -> CheckerResult<bool> {
        self.inner.is_hidden(sheet)
    }

    fn last_row(&self, sheet: &SheetId) -> CheckerResult<u32> {
        self.inner.last_row(sheet)
    }

    fn read_range(
        &self,
        sheet: &SheetId,
        start_row: u32,
        start_column: u32,
        row_count: u32,
    ) -> CheckerResult<Vec<Vec<CellValue>>> {
        self.inner.read_range(sheet, start_row, start_column, row_count)
    }

    fn write_cell(
        &mut self,
        sheet: &SheetId,
        row: u32,
        column: u32,
        value: &str,
    ) -> CheckerResult<()> {
        self.inner.write_cell(sheet, row, column, value)
    }

    fn set_background(
        &mut self,
        sheet: &SheetId,
        row: u32,
        column: u32,
        width: u32,
        color: Option<&str>,
    ) -> CheckerResult<()> {
        self.inner.set_background(sheet, row, column, width, color)
    }
}
