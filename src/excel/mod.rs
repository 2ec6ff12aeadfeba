//! Excel (.xlsx) backing for the sheet store
//!
//! - Import: Excel (.xlsx) → in-memory workbook (values, formulas, visibility)
//! - Export: in-memory workbook → Excel (.xlsx) with highlight fills
//! - [`XlsxSheetStore`]: a [`crate::store::SheetStore`] over a file on disk

mod exporter;
mod importer;
mod store;

pub use exporter::ExcelExporter;
pub use importer::ExcelImporter;
pub use store::XlsxSheetStore;
