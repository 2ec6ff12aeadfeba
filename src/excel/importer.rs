//! Excel importer implementation - Excel (.xlsx) → in-memory workbook

use crate::error::{CheckerError, CheckerResult};
use crate::store::{MemorySheet, MemoryWorkbook, StoredCell};
use calamine::{open_workbook, Data, Range, Reader, SheetVisible, Xlsx};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::path::Path;
use tracing::{debug, warn};

/// Excel importer for loading .xlsx files into a [`MemoryWorkbook`]
pub struct ExcelImporter {
    path: std::path::PathBuf,
}

impl ExcelImporter {
    /// Create a new Excel importer
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Import every sheet with its values, formulas and visibility
    pub fn import(&self) -> CheckerResult<MemoryWorkbook> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path).map_err(|e| {
            CheckerError::WorkbookOpen(format!("{}: {}", self.path.display(), e))
        })?;

        // Collect metadata up front; reading ranges borrows the workbook mutably
        let sheets: Vec<(String, bool)> = workbook
            .sheets_metadata()
            .iter()
            .map(|sheet| {
                let hidden = matches!(sheet.visible, SheetVisible::Hidden | SheetVisible::VeryHidden);
                (sheet.name.clone(), hidden)
            })
            .collect();

        let mut model = MemoryWorkbook::new();
        for (name, hidden) in sheets {
            let mut sheet = if hidden {
                MemorySheet::hidden(name.clone())
            } else {
                MemorySheet::new(name.clone())
            };

            match workbook.worksheet_range(&name) {
                Ok(range) => self.load_values(&range, &mut sheet),
                Err(e) => warn!(sheet = %name, "could not read values: {}", e),
            }

            if let Ok(formulas) = workbook.worksheet_formula(&name) {
                self.load_formulas(&formulas, &mut sheet);
            }

            debug!(sheet = %name, hidden, last_row = sheet.last_row(), "imported sheet");
            model.add_sheet(sheet);
        }

        Ok(model)
    }

    /// Copy non-empty values; calamine positions are 0-based and relative to the range start
    fn load_values(&self, range: &Range<Data>, sheet: &mut MemorySheet) {
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        for (row, col, cell) in range.used_cells() {
            if let Some(value) = Self::convert_cell(cell) {
                sheet.set_value(
                    start_row + row as u32 + 1,
                    start_col + col as u32 + 1,
                    value,
                );
            }
        }
    }

    /// Attach formulas, keeping the cached value already loaded
    fn load_formulas(&self, formulas: &Range<String>, sheet: &mut MemorySheet) {
        let (start_row, start_col) = formulas.start().unwrap_or((0, 0));
        for (row, col, formula) in formulas.used_cells() {
            let row = start_row + row as u32 + 1;
            let col = start_col + col as u32 + 1;
            // calamine strips the leading =
            let formula = if formula.starts_with('=') {
                formula.clone()
            } else {
                format!("={}", formula)
            };
            let cached = sheet.value(row, col).cloned();
            sheet.set_formula(row, col, formula, cached);
        }
    }

    /// Convert a calamine cell; `None` for empty cells
    fn convert_cell(cell: &Data) -> Option<StoredCell> {
        match cell {
            Data::Empty => None,
            Data::String(s) if s.is_empty() => None,
            Data::String(s) => Some(StoredCell::Text(s.clone())),
            Data::Float(f) => Some(StoredCell::Number(*f)),
            Data::Int(i) => Some(StoredCell::Number(*i as f64)),
            Data::Bool(b) => Some(StoredCell::Boolean(*b)),
            Data::DateTime(dt) if dt.is_duration() => Some(StoredCell::Duration(dt.as_f64())),
            Data::DateTime(dt) => Some(StoredCell::DateTime(dt.as_f64())),
            Data::DateTimeIso(s) => Some(
                iso_datetime_serial(s)
                    .map(StoredCell::DateTime)
                    .unwrap_or_else(|| StoredCell::Text(s.clone())),
            ),
            Data::DurationIso(s) => Some(
                iso_duration_days(s)
                    .map(StoredCell::Duration)
                    .unwrap_or_else(|| StoredCell::Text(s.clone())),
            ),
            // Error values keep their displayed text
            other => Some(StoredCell::Text(other.to_string())),
        }
    }
}

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Serial number of an ISO 8601 date, date-time or time.
/// Dates before 1900-03-01 are off by one against Excel's leap-year bug.
fn iso_datetime_serial(value: &str) -> Option<f64> {
    if let Ok(time) = NaiveTime::parse_from_str(value, "%H:%M:%S%.f") {
        let seconds = f64::from(time.num_seconds_from_midnight())
            + f64::from(time.nanosecond()) / 1e9;
        return Some(seconds / SECONDS_PER_DAY);
    }

    let datetime = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = datetime.signed_duration_since(epoch).num_milliseconds();
    Some(millis as f64 / 1000.0 / SECONDS_PER_DAY)
}

/// Days in an ISO 8601 duration such as `PT36H10M` or `P1DT2H`
fn iso_duration_days(value: &str) -> Option<f64> {
    let rest = value.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, time),
        None => (rest, ""),
    };

    let date_units: &[(char, f64)] = &[('W', 7.0 * SECONDS_PER_DAY), ('D', SECONDS_PER_DAY)];
    let time_units: &[(char, f64)] = &[('H', 3600.0), ('M', 60.0), ('S', 1.0)];

    let mut seconds = 0.0;
    for (part, units) in [(date_part, date_units), (time_part, time_units)] {
        let mut number = String::new();
        for c in part.chars() {
            if c.is_ascii_digit() || c == '.' {
                number.push(c);
                continue;
            }
            let (_, scale) = units.iter().find(|(unit, _)| *unit == c)?;
            seconds += number.parse::<f64>().ok()? * scale;
            number.clear();
        }
        if !number.is_empty() {
            return None;
        }
    }
    Some(seconds / SECONDS_PER_DAY)
}
