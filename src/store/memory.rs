//! In-memory workbook and its [`SheetStore`] implementation

use super::SheetStore;
use crate::error::{CheckerError, CheckerResult};
use crate::types::CellValue;
use std::collections::BTreeMap;

/// Cell position as (row, column), both 1-based
type Position = (u32, u32);

/// Typed cell value kept by the in-memory workbook
#[derive(Debug, Clone, PartialEq)]
pub enum StoredCell {
    Text(String),
    Number(f64),
    Boolean(bool),
    /// Excel serial date (days since 1899-12-30, time as the fraction)
    DateTime(f64),
    /// Elapsed time in days
    Duration(f64),
}

impl StoredCell {
    /// Render the value the way it is shown in a cell
    pub fn display(&self) -> String {
        match self {
            StoredCell::Text(s) => s.clone(),
            StoredCell::Number(n) | StoredCell::DateTime(n) | StoredCell::Duration(n) => {
                format_number(*n)
            }
            StoredCell::Boolean(true) => "TRUE".to_string(),
            StoredCell::Boolean(false) => "FALSE".to_string(),
        }
    }
}

/// Integers print without a trailing `.0`
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// One sheet: values, formulas, backgrounds, visibility
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySheet {
    pub name: String,
    pub hidden: bool,
    values: BTreeMap<Position, StoredCell>,
    formulas: BTreeMap<Position, String>,
    backgrounds: BTreeMap<Position, String>,
}

impl MemorySheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn hidden(name: impl Into<String>) -> Self {
        Self {
            hidden: true,
            ..Self::new(name)
        }
    }

    /// Builder: fill one column with text, starting at `start_row`
    pub fn with_column(mut self, column: u32, start_row: u32, values: &[&str]) -> Self {
        for (offset, value) in values.iter().enumerate() {
            self.set_text(start_row + offset as u32, column, value);
        }
        self
    }

    /// Store a value; storing an empty text clears the cell
    pub fn set_value(&mut self, row: u32, column: u32, value: StoredCell) {
        self.formulas.remove(&(row, column));
        match value {
            StoredCell::Text(ref s) if s.is_empty() => {
                self.values.remove(&(row, column));
            }
            value => {
                self.values.insert((row, column), value);
            }
        }
    }

    pub fn set_text(&mut self, row: u32, column: u32, value: &str) {
        self.set_value(row, column, StoredCell::Text(value.to_string()));
    }

    /// Attach a formula; `cached` is the last computed value, if known
    pub fn set_formula(
        &mut self,
        row: u32,
        column: u32,
        formula: impl Into<String>,
        cached: Option<StoredCell>,
    ) {
        match cached {
            Some(value) => self.set_value(row, column, value),
            None => {
                self.values.remove(&(row, column));
            }
        }
        self.formulas.insert((row, column), formula.into());
    }

    pub fn value(&self, row: u32, column: u32) -> Option<&StoredCell> {
        self.values.get(&(row, column))
    }

    /// Displayed text of a cell; empty and missing cells are `None`
    pub fn text(&self, row: u32, column: u32) -> CellValue {
        self.value(row, column)
            .map(StoredCell::display)
            .filter(|s| !s.is_empty())
    }

    pub fn formula(&self, row: u32, column: u32) -> Option<&str> {
        self.formulas.get(&(row, column)).map(String::as_str)
    }

    pub fn background(&self, row: u32, column: u32) -> Option<&str> {
        self.backgrounds.get(&(row, column)).map(String::as_str)
    }

    pub fn set_background(&mut self, row: u32, column: u32, color: Option<&str>) {
        match color {
            Some(c) => {
                self.backgrounds.insert((row, column), c.to_string());
            }
            None => {
                self.backgrounds.remove(&(row, column));
            }
        }
    }

    /// Last row holding a value or formula, 0 when the sheet is empty
    pub fn last_row(&self) -> u32 {
        let value_max = self.values.keys().map(|(row, _)| *row).max();
        let formula_max = self.formulas.keys().map(|(row, _)| *row).max();
        value_max.max(formula_max).unwrap_or(0)
    }

    /// Every position that carries a value, formula or background, in row order
    pub fn used_positions(&self) -> Vec<(u32, u32)> {
        let mut positions: Vec<Position> = self
            .values
            .keys()
            .chain(self.formulas.keys())
            .chain(self.backgrounds.keys())
            .copied()
            .collect();
        positions.sort_unstable();
        positions.dedup();
        positions
    }
}

/// Ordered collection of sheets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryWorkbook {
    sheets: Vec<MemorySheet>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MemoryWorkbook::add_sheet`]
    pub fn with_sheet(mut self, sheet: MemorySheet) -> Self {
        self.add_sheet(sheet);
        self
    }

    /// Add a sheet; a sheet with the same name is replaced in place
    pub fn add_sheet(&mut self, sheet: MemorySheet) {
        match self.position(&sheet.name) {
            Some(idx) => self.sheets[idx] = sheet,
            None => self.sheets.push(sheet),
        }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|s| s.name == name)
    }

    pub fn sheet(&self, name: &str) -> Option<&MemorySheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut MemorySheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    pub fn sheets(&self) -> &[MemorySheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Handle to a sheet of a [`MemoryWorkbook`] (its position)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetId(pub usize);

/// A single mutation issued through the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Cell {
        sheet: String,
        row: u32,
        column: u32,
        value: String,
    },
    Background {
        sheet: String,
        row: u32,
        column: u32,
        width: u32,
        color: Option<String>,
    },
}

/// [`SheetStore`] over an owned [`MemoryWorkbook`].
///
/// Every write is appended to a log so callers can see what a run touched.
#[derive(Debug, Clone, Default)]
pub struct MemorySheetStore {
    workbook: Option<MemoryWorkbook>,
    write_log: Vec<WriteOp>,
}

impl MemorySheetStore {
    pub fn new(workbook: MemoryWorkbook) -> Self {
        Self {
            workbook: Some(workbook),
            write_log: Vec::new(),
        }
    }

    /// A store with no active workbook
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn workbook(&self) -> Option<&MemoryWorkbook> {
        self.workbook.as_ref()
    }

    pub fn into_workbook(self) -> Option<MemoryWorkbook> {
        self.workbook
    }

    pub fn write_log(&self) -> &[WriteOp] {
        &self.write_log
    }

    pub fn clear_write_log(&mut self) {
        self.write_log.clear();
    }

    fn resolve(&self, sheet: &SheetId) -> CheckerResult<&MemorySheet> {
        self.workbook
            .as_ref()
            .and_then(|wb| wb.sheets.get(sheet.0))
            .ok_or_else(|| CheckerError::SheetNotFound(format!("sheet #{}", sheet.0)))
    }

    fn resolve_mut(&mut self, sheet: &SheetId) -> CheckerResult<&mut MemorySheet> {
        self.workbook
            .as_mut()
            .and_then(|wb| wb.sheets.get_mut(sheet.0))
            .ok_or_else(|| CheckerError::SheetNotFound(format!("sheet #{}", sheet.0)))
    }
}

fn check_origin(row: u32, column: u32) -> CheckerResult<()> {
    if row == 0 || column == 0 {
        return Err(CheckerError::InvalidRange(format!(
            "rows and columns start at 1 (got row {}, column {})",
            row, column
        )));
    }
    Ok(())
}

impl SheetStore for MemorySheetStore {
    // A memory store holds at most one workbook, so the handle carries nothing
    type Workbook = ();
    type Sheet = SheetId;

    fn active_workbook(&mut self) -> CheckerResult<Option<()>> {
        Ok(self.workbook.as_ref().map(|_| ()))
    }

    fn sheet_by_name(&self, _workbook: &(), name: &str) -> CheckerResult<Option<SheetId>> {
        Ok(self
            .workbook
            .as_ref()
            .and_then(|wb| wb.position(name))
            .map(SheetId))
    }

    fn is_hidden(&self, sheet: &SheetId) -> CheckerResult<bool> {
        Ok(self.resolve(sheet)?.hidden)
    }

    fn last_row(&self, sheet: &SheetId) -> CheckerResult<u32> {
        Ok(self.resolve(sheet)?.last_row())
    }

    fn read_range(
        &self,
        sheet: &SheetId,
        start_row: u32,
        start_column: u32,
        row_count: u32,
    ) -> CheckerResult<Vec<Vec<CellValue>>> {
        check_origin(start_row, start_column)?;
        let sheet = self.resolve(sheet)?;
        Ok((start_row..start_row + row_count)
            .map(|row| vec![sheet.text(row, start_column)])
            .collect())
    }

    fn write_cell(
        &mut self,
        sheet: &SheetId,
        row: u32,
        column: u32,
        value: &str,
    ) -> CheckerResult<()> {
        check_origin(row, column)?;
        let target = self.resolve_mut(sheet)?;
        target.set_text(row, column, value);
        let name = target.name.clone();
        self.write_log.push(WriteOp::Cell {
            sheet: name,
            row,
            column,
            value: value.to_string(),
        });
        Ok(())
    }

    fn set_background(
        &mut self,
        sheet: &SheetId,
        row: u32,
        column: u32,
        width: u32,
        color: Option<&str>,
    ) -> CheckerResult<()> {
        check_origin(row, column)?;
        let target = self.resolve_mut(sheet)?;
        for col in column..column + width {
            target.set_background(row, col, color);
        }
        let name = target.name.clone();
        self.write_log.push(WriteOp::Background {
            sheet: name,
            row,
            column,
            width,
            color: color.map(str::to_string),
        });
        Ok(())
    }
}
