//! Excel store tests: import, check, write back, re-import

use pretty_assertions::assert_eq;
use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Formula, Workbook};
use sheetcheck::core::run_check;
use sheetcheck::excel::{ExcelExporter, ExcelImporter, XlsxSheetStore};
use sheetcheck::store::{MemorySheet, MemoryWorkbook, SheetStore, StoredCell};
use sheetcheck::{CheckerConfig, FailureKind};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MANIFEST: &str = "チェック";

/// Workbook with a manifest listing Sheet1..Sheet4; Sheet2 is absent, Sheet4 is hidden
fn write_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("book.xlsx");
    let mut workbook = Workbook::new();

    let manifest = workbook.add_worksheet();
    manifest.set_name(MANIFEST).unwrap();
    manifest.write_string(0, 0, "シート名").unwrap();
    manifest.write_string(1, 0, "Sheet1").unwrap();
    manifest.write_string(2, 0, "Sheet2").unwrap();
    manifest.write_string(3, 0, "Sheet3").unwrap();
    manifest.write_string(4, 0, "Sheet4").unwrap();
    manifest.write_number(1, 1, 42).unwrap();
    manifest
        .write_formula(5, 1, Formula::new("=SUM(B2:B2)"))
        .unwrap();

    workbook.add_worksheet().set_name("Sheet1").unwrap();
    workbook.add_worksheet().set_name("Sheet3").unwrap();
    let hidden = workbook.add_worksheet();
    hidden.set_name("Sheet4").unwrap();
    hidden.set_hidden(true);

    workbook.save(&path).unwrap();
    path
}

// ═══════════════════════════════════════════════════════════════════════════
// IMPORTER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_import_reads_visibility_and_values() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_fixture(temp_dir.path());

    let workbook = ExcelImporter::new(&path).import().unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec![MANIFEST, "Sheet1", "Sheet3", "Sheet4"]
    );
    assert!(!workbook.sheet("Sheet1").unwrap().hidden);
    assert!(workbook.sheet("Sheet4").unwrap().hidden);

    let manifest = workbook.sheet(MANIFEST).unwrap();
    assert_eq!(manifest.text(2, 1), Some("Sheet1".to_string()));
    assert_eq!(manifest.text(2, 2), Some("42".to_string()));
    assert!(manifest.formula(6, 2).unwrap().contains("SUM(B2:B2)"));
}

#[test]
fn test_import_formula_row_counts_as_last_row() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_fixture(temp_dir.path());

    let workbook = ExcelImporter::new(&path).import().unwrap();
    assert_eq!(workbook.sheet(MANIFEST).unwrap().last_row(), 6);
}

/// Manifest listing Sheet1 and Sheet2 (absent) with dated columns beside it
fn write_dated_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("dated.xlsx");
    let mut workbook = Workbook::new();
    let date = Format::new().set_num_format("yyyy-mm-dd");
    let elapsed = Format::new().set_num_format("[h]:mm:ss");

    let manifest = workbook.add_worksheet();
    manifest.set_name(MANIFEST).unwrap();
    manifest.write_string(0, 0, "シート名").unwrap();
    manifest.write_string(1, 0, "Sheet1").unwrap();
    manifest.write_string(2, 0, "Sheet2").unwrap();
    // 2024-01-02 outside the result columns
    manifest.write_number_with_format(1, 4, 45293.0, &date).unwrap();
    // Inside the highlight range of the Sheet2 row
    manifest.write_number_with_format(2, 1, 45293.0, &date).unwrap();
    manifest.write_number_with_format(2, 5, 1.5, &elapsed).unwrap();

    workbook.add_worksheet().set_name("Sheet1").unwrap();
    workbook.save(&path).unwrap();
    path
}

#[test]
fn test_import_keeps_dates_typed() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_dated_fixture(temp_dir.path());

    let workbook = ExcelImporter::new(&path).import().unwrap();
    let manifest = workbook.sheet(MANIFEST).unwrap();
    assert_eq!(manifest.value(2, 5), Some(&StoredCell::DateTime(45293.0)));
    assert_eq!(manifest.value(3, 6), Some(&StoredCell::Duration(1.5)));
}

// ═══════════════════════════════════════════════════════════════════════════
// STORE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_store_is_unavailable_for_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = XlsxSheetStore::new(temp_dir.path().join("nope.xlsx"));

    let config = CheckerConfig::default();
    let outcome = run_check(&mut store, &config).unwrap();
    assert_eq!(
        outcome.failure_kind(),
        Some(FailureKind::SheetStoreUnavailable)
    );
    assert!(store.save().is_err(), "nothing loaded, nothing to save");
}

#[test]
fn test_check_and_write_back() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_fixture(temp_dir.path());
    let output = temp_dir.path().join("checked.xlsx");

    let mut store = XlsxSheetStore::new(&path);
    let outcome = run_check(&mut store, &CheckerConfig::default()).unwrap();
    let report = outcome.report().unwrap();

    // The formula row at 6 is a blank candidate
    assert_eq!(report.sheet_name_list.len(), 5);
    assert_eq!(report.existing_sheet_name_list, vec!["Sheet1", "Sheet3"]);
    assert_eq!(store.pending_writes(), 10);

    store.save_as(&output).unwrap();

    let reloaded = ExcelImporter::new(&output).import().unwrap();
    let manifest = reloaded.sheet(MANIFEST).unwrap();
    assert_eq!(manifest.text(2, 3), None);
    assert_eq!(manifest.text(3, 3), Some("シートなし".to_string()));
    assert_eq!(manifest.text(4, 3), None);
    assert_eq!(manifest.text(5, 3), Some("シートなし".to_string()));
    assert_eq!(manifest.text(6, 3), Some("シートなし".to_string()));

    // Untouched content survives the round trip
    assert_eq!(manifest.text(2, 2), Some("42".to_string()));
    assert!(manifest.formula(6, 2).is_some());
    assert!(reloaded.sheet("Sheet4").unwrap().hidden);
}

#[test]
fn test_rerun_on_saved_workbook_is_stable() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_fixture(temp_dir.path());

    let mut first = XlsxSheetStore::new(&path);
    let first_outcome = run_check(&mut first, &CheckerConfig::default()).unwrap();
    first.save().unwrap();

    let mut second = XlsxSheetStore::new(&path);
    let second_outcome = run_check(&mut second, &CheckerConfig::default()).unwrap();

    assert_eq!(first_outcome, second_outcome);
    let a = first.workbook().unwrap().sheet(MANIFEST).unwrap();
    let b = second.workbook().unwrap().sheet(MANIFEST).unwrap();
    for row in 1..=6 {
        for col in 1..=3 {
            assert_eq!(a.text(row, col), b.text(row, col), "R{}C{}", row, col);
        }
    }
}

#[test]
fn test_store_lookup_after_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_fixture(temp_dir.path());

    let mut store = XlsxSheetStore::new(&path);
    let workbook = store.active_workbook().unwrap().unwrap();
    let hidden = store.sheet_by_name(&workbook, "Sheet4").unwrap().unwrap();
    assert!(store.is_hidden(&hidden).unwrap());
    assert!(store.sheet_by_name(&workbook, "sheet4").unwrap().is_none());
    assert_eq!(store.path(), path.as_path());
}

// ═══════════════════════════════════════════════════════════════════════════
// EXPORTER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_export_preserves_typed_values() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("typed.xlsx");

    let mut sheet = MemorySheet::new("Data");
    sheet.set_value(1, 1, StoredCell::Number(2.5));
    sheet.set_value(1, 2, StoredCell::Boolean(true));
    sheet.set_text(1, 3, "text");
    sheet.set_background(2, 1, Some("#FFB2B2"));
    let model = MemoryWorkbook::new()
        .with_sheet(sheet)
        .with_sheet(MemorySheet::hidden("Hidden"));

    ExcelExporter::new(&model).export(&output).unwrap();

    let reloaded = ExcelImporter::new(&output).import().unwrap();
    let data = reloaded.sheet("Data").unwrap();
    assert_eq!(data.value(1, 1), Some(&StoredCell::Number(2.5)));
    assert_eq!(data.value(1, 2), Some(&StoredCell::Boolean(true)));
    assert_eq!(data.text(1, 3), Some("text".to_string()));
    // A highlight on an empty cell carries no value
    assert_eq!(data.last_row(), 1);
    assert!(reloaded.sheet("Hidden").unwrap().hidden);
}

#[test]
fn test_write_back_keeps_untouched_dates() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_dated_fixture(temp_dir.path());

    let mut store = XlsxSheetStore::new(&path);
    let outcome = run_check(&mut store, &CheckerConfig::default()).unwrap();
    assert_eq!(outcome.report().unwrap().failure_count(), 1);
    store.save().unwrap();

    let mut reread: Xlsx<_> = open_workbook(&path).unwrap();
    let range = reread.worksheet_range(MANIFEST).unwrap();
    for (row, col) in [(1, 4), (2, 1)] {
        match range.get_value((row, col)) {
            Some(Data::DateTime(dt)) => {
                assert!(!dt.is_duration());
                assert_eq!(dt.as_f64(), 45293.0);
            }
            other => panic!("expected a date at ({}, {}), got {:?}", row, col, other),
        }
    }
    match range.get_value((2, 5)) {
        Some(Data::DateTime(dt)) => {
            assert!(dt.is_duration());
            assert_eq!(dt.as_f64(), 1.5);
        }
        other => panic!("expected a duration, got {:?}", other),
    }

    // The date inside the highlighted row keeps its value
    let reloaded = ExcelImporter::new(&path).import().unwrap();
    let manifest = reloaded.sheet(MANIFEST).unwrap();
    assert_eq!(manifest.value(3, 2), Some(&StoredCell::DateTime(45293.0)));
    assert_eq!(manifest.text(3, 3), Some("シートなし".to_string()));
}
