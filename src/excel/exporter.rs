//! Excel exporter implementation - in-memory workbook → Excel (.xlsx)

use crate::config::parse_hex_color;
use crate::error::{CheckerError, CheckerResult};
use crate::store::{MemorySheet, MemoryWorkbook, StoredCell};
use rust_xlsxwriter::{Color, Format, Formula, Workbook, Worksheet};
use std::collections::HashMap;
use std::path::Path;

/// Excel exporter writing a [`MemoryWorkbook`] back to disk
pub struct ExcelExporter<'a> {
    model: &'a MemoryWorkbook,
}

impl<'a> ExcelExporter<'a> {
    /// Create a new Excel exporter
    pub fn new(model: &'a MemoryWorkbook) -> Self {
        Self { model }
    }

    /// Export the workbook to an Excel .xlsx file
    pub fn export(&self, output_path: &Path) -> CheckerResult<()> {
        let mut workbook = Workbook::new();
        let mut formats = FormatCache::default();

        // A hidden sheet can't be the active one
        let first_visible = self.model.sheets().iter().position(|s| !s.hidden);

        for (idx, sheet) in self.model.sheets().iter().enumerate() {
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(&sheet.name)
                .map_err(|e| CheckerError::WorkbookSave(format!("Failed to set worksheet name: {}", e)))?;

            if sheet.hidden {
                worksheet.set_hidden(true);
            } else if Some(idx) == first_visible {
                worksheet.set_active(true);
            }

            self.export_sheet(worksheet, sheet, &mut formats)?;
        }

        workbook
            .save(output_path)
            .map_err(|e| CheckerError::WorkbookSave(format!("Failed to save Excel file: {}", e)))?;

        Ok(())
    }

    /// Write every used cell of one sheet
    fn export_sheet(
        &self,
        worksheet: &mut Worksheet,
        sheet: &MemorySheet,
        formats: &mut FormatCache,
    ) -> CheckerResult<()> {
        for (row, col) in sheet.used_positions() {
            // Worksheet API is 0-indexed
            let excel_row = row - 1;
            let excel_col = u16::try_from(col - 1)
                .map_err(|_| CheckerError::InvalidRange(format!("column {} out of range", col)))?;

            let value = sheet.value(row, col);
            let format = formats.get(sheet.background(row, col), value.and_then(number_format))?;

            let result = match (sheet.formula(row, col), value, format) {
                (Some(formula), cached, Some(format)) => worksheet.write_formula_with_format(
                    excel_row,
                    excel_col,
                    Self::formula_with_result(formula, cached),
                    format,
                ),
                (Some(formula), cached, None) => worksheet.write_formula(
                    excel_row,
                    excel_col,
                    Self::formula_with_result(formula, cached),
                ),
                (None, Some(value), Some(format)) => match value {
                    StoredCell::Text(s) => {
                        worksheet.write_string_with_format(excel_row, excel_col, s, format)
                    }
                    StoredCell::Number(n) | StoredCell::DateTime(n) | StoredCell::Duration(n) => {
                        worksheet.write_number_with_format(excel_row, excel_col, *n, format)
                    }
                    StoredCell::Boolean(b) => {
                        worksheet.write_boolean_with_format(excel_row, excel_col, *b, format)
                    }
                },
                (None, Some(value), None) => match value {
                    StoredCell::Text(s) => worksheet.write_string(excel_row, excel_col, s),
                    StoredCell::Number(n) | StoredCell::DateTime(n) | StoredCell::Duration(n) => {
                        worksheet.write_number(excel_row, excel_col, *n)
                    }
                    StoredCell::Boolean(b) => worksheet.write_boolean(excel_row, excel_col, *b),
                },
                (None, None, Some(format)) => worksheet.write_blank(excel_row, excel_col, format),
                (None, None, None) => continue,
            };

            result.map_err(|e| {
                CheckerError::WorkbookSave(format!(
                    "Failed to write {}!R{}C{}: {}",
                    sheet.name, row, col, e
                ))
            })?;
        }

        Ok(())
    }

    fn formula_with_result(formula: &str, cached: Option<&StoredCell>) -> Formula {
        let formula = Formula::new(formula);
        match cached {
            Some(value) => formula.set_result(value.display()),
            None => formula,
        }
    }
}

/// Number format that keeps a typed value recognizable on re-import
fn number_format(value: &StoredCell) -> Option<&'static str> {
    match value {
        StoredCell::DateTime(serial) if *serial < 1.0 => Some("hh:mm:ss"),
        StoredCell::DateTime(serial) if serial.fract() == 0.0 => Some("yyyy-mm-dd"),
        StoredCell::DateTime(_) => Some("yyyy-mm-dd hh:mm:ss"),
        StoredCell::Duration(_) => Some("[h]:mm:ss"),
        _ => None,
    }
}

/// One [`Format`] per distinct (background, number format) pair
#[derive(Default)]
struct FormatCache {
    formats: HashMap<(Option<String>, Option<&'static str>), Format>,
}

impl FormatCache {
    fn get(
        &mut self,
        background: Option<&str>,
        num_format: Option<&'static str>,
    ) -> CheckerResult<Option<&Format>> {
        if background.is_none() && num_format.is_none() {
            return Ok(None);
        }

        let key = (background.map(str::to_string), num_format);
        if !self.formats.contains_key(&key) {
            let mut format = Format::new();
            if let Some(color) = background {
                format = format.set_background_color(Color::RGB(parse_hex_color(color)?));
            }
            if let Some(num_format) = num_format {
                format = format.set_num_format(num_format);
            }
            self.formats.insert(key.clone(), format);
        }
        Ok(self.formats.get(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_export_rejects_bad_color() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("bad.xlsx");

        let mut sheet = MemorySheet::new("S");
        sheet.set_background(1, 1, Some("pink"));
        let model = MemoryWorkbook::new().with_sheet(sheet);

        let result = ExcelExporter::new(&model).export(&output_path);
        assert!(matches!(result, Err(CheckerError::Config(_))));
    }

    #[test]
    fn test_format_cache_reuses_formats() {
        let mut cache = FormatCache::default();
        assert!(cache.get(None, None).unwrap().is_none());
        cache.get(Some("#FFB2B2"), None).unwrap();
        cache.get(Some("#FFB2B2"), None).unwrap();
        cache.get(Some("#00FF00"), None).unwrap();
        cache.get(Some("#FFB2B2"), Some("yyyy-mm-dd")).unwrap();
        cache.get(None, Some("yyyy-mm-dd")).unwrap();
        assert_eq!(cache.formats.len(), 4);
    }

    #[test]
    fn test_number_format_for_typed_values() {
        assert_eq!(number_format(&StoredCell::DateTime(45293.0)), Some("yyyy-mm-dd"));
        assert_eq!(
            number_format(&StoredCell::DateTime(45293.5)),
            Some("yyyy-mm-dd hh:mm:ss")
        );
        assert_eq!(number_format(&StoredCell::DateTime(0.25)), Some("hh:mm:ss"));
        assert_eq!(number_format(&StoredCell::Duration(1.5)), Some("[h]:mm:ss"));
        assert_eq!(number_format(&StoredCell::Number(3.0)), None);
    }
}
