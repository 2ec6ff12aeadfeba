//! Sheet existence checker
//!
//! Reads the candidate column of the manifest sheet, resolves every name
//! against the workbook and writes one result row per candidate.

use crate::config::CheckerConfig;
use crate::error::CheckerResult;
use crate::store::SheetStore;
use crate::types::{
    candidate_name, CandidateRow, CheckReport, FailureKind, Resolution, ResultRow, RunOutcome,
};
use tracing::{debug, error, info, warn};

/// Handles and data gathered before any row is written
struct Prepared<W, S> {
    workbook: W,
    manifest: S,
    candidates: Vec<CandidateRow>,
}

/// Drives one check run against a [`SheetStore`]
pub struct ExistenceChecker {
    config: CheckerConfig,
}

impl ExistenceChecker {
    pub fn new(config: CheckerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Run the check.
    ///
    /// Expected conditions (no workbook, no manifest sheet, no candidates)
    /// come back as [`RunOutcome::Failed`] with nothing written. A store
    /// fault while writing result rows aborts the run with `Err`, and so
    /// does an invalid configuration, before the store is touched.
    pub fn run<S: SheetStore>(&self, store: &mut S) -> CheckerResult<RunOutcome> {
        self.config.validate()?;

        let prepared = match self.prepare(store) {
            Ok(prepared) => prepared,
            Err(outcome) => {
                if let RunOutcome::Failed { kind, error_message } = &outcome {
                    warn!(?kind, "{}", error_message);
                }
                return Ok(outcome);
            }
        };

        let Prepared {
            workbook,
            manifest,
            candidates,
        } = prepared;

        let mut existing = Vec::new();
        let mut resolutions = Vec::with_capacity(candidates.len());

        for (i, row) in candidates.iter().enumerate() {
            let resolution = self.resolve(store, &workbook, row)?;
            let result = self.result_row(i, resolution);

            match resolution {
                Resolution::FoundVisible => {
                    if let Some(name) = candidate_name(row) {
                        existing.push(name.to_string());
                    }
                }
                other => {
                    info!(
                        row = result.row_index,
                        resolution = other.label(),
                        "missing sheet: {}",
                        candidate_name(row).unwrap_or_default()
                    );
                }
            }

            self.write_result(store, &manifest, &result)?;
            resolutions.push(resolution);
        }

        Ok(RunOutcome::Completed(CheckReport {
            sheet_name_list: candidates,
            existing_sheet_name_list: existing,
            resolutions,
        }))
    }

    /// Steps up to the candidate read; any failure becomes an outcome value
    fn prepare<S: SheetStore>(
        &self,
        store: &mut S,
    ) -> Result<Prepared<S::Workbook, S::Sheet>, RunOutcome> {
        let messages = &self.config.messages;

        let workbook = match store.active_workbook() {
            Ok(Some(workbook)) => workbook,
            Ok(None) => {
                return Err(RunOutcome::failed(
                    FailureKind::SheetStoreUnavailable,
                    &messages.sheet_store_unavailable,
                ))
            }
            Err(e) => {
                warn!("could not acquire workbook: {}", e);
                return Err(RunOutcome::failed(
                    FailureKind::SheetStoreUnavailable,
                    &messages.sheet_store_unavailable,
                ));
            }
        };

        let manifest = match store.sheet_by_name(&workbook, &self.config.sheet_name) {
            Ok(Some(sheet)) => sheet,
            Ok(None) => {
                return Err(RunOutcome::failed(
                    FailureKind::ManifestSheetNotFound,
                    &messages.manifest_not_found,
                ))
            }
            Err(e) => {
                warn!("manifest lookup failed: {}", e);
                return Err(RunOutcome::failed(
                    FailureKind::SheetStoreUnavailable,
                    &messages.sheet_store_unavailable,
                ));
            }
        };

        let last_row = store.last_row(&manifest).map_err(|e| {
            warn!("could not read last row: {}", e);
            RunOutcome::failed(
                FailureKind::SheetStoreUnavailable,
                &messages.sheet_store_unavailable,
            )
        })?;

        let row_count = i64::from(last_row) - i64::from(self.config.header_rows());
        debug!(last_row, row_count, "manifest size");
        if row_count <= 0 {
            return Err(RunOutcome::failed(
                FailureKind::EmptyCandidateList,
                &messages.empty_candidate_list,
            ));
        }

        let candidates = store
            .read_range(
                &manifest,
                self.config.first_data_row,
                self.config.check_column,
                row_count as u32,
            )
            .map_err(|e| {
                warn!("candidate read failed: {}", e);
                RunOutcome::failed(
                    FailureKind::CandidateListUnreadable,
                    &messages.candidate_list_unreadable,
                )
            })?;
        debug!(?candidates, "candidate list");

        if candidates.is_empty() {
            return Err(RunOutcome::failed(
                FailureKind::CandidateListUnreadable,
                &messages.candidate_list_unreadable,
            ));
        }

        Ok(Prepared {
            workbook,
            manifest,
            candidates,
        })
    }

    /// Classify one candidate row. Whitespace-only names count as empty;
    /// anything else is looked up verbatim.
    pub fn resolve<S: SheetStore>(
        &self,
        store: &S,
        workbook: &S::Workbook,
        row: &CandidateRow,
    ) -> CheckerResult<Resolution> {
        let name = match candidate_name(row) {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Ok(Resolution::Empty),
        };

        let resolution = match store.sheet_by_name(workbook, name)? {
            None => Resolution::NotFound,
            Some(sheet) => {
                if store.is_hidden(&sheet)? {
                    Resolution::FoundHidden
                } else {
                    Resolution::FoundVisible
                }
            }
        };
        Ok(resolution)
    }

    /// Result row for the candidate at 0-based position `index`
    pub fn result_row(&self, index: usize, resolution: Resolution) -> ResultRow {
        let row_index = self.config.first_data_row + index as u32;
        if resolution.is_success() {
            ResultRow::cleared(row_index)
        } else {
            ResultRow::warning(
                row_index,
                &self.config.warning_message,
                &self.config.warning_color,
            )
        }
    }

    fn write_result<S: SheetStore>(
        &self,
        store: &mut S,
        manifest: &S::Sheet,
        result: &ResultRow,
    ) -> CheckerResult<()> {
        store.write_cell(
            manifest,
            result.row_index,
            self.config.result_column,
            &result.message,
        )?;
        store.set_background(
            manifest,
            result.row_index,
            1,
            self.config.highlight_width,
            result.color.as_deref(),
        )
    }
}

/// Run the check with `config` against `store`
pub fn run_check<S: SheetStore>(store: &mut S, config: &CheckerConfig) -> CheckerResult<RunOutcome> {
    ExistenceChecker::new(config.clone()).run(store)
}

/// Trigger entry point: never propagates a fault.
///
/// A fault while writing result rows is logged and yields `None`.
pub fn exec<S: SheetStore>(store: &mut S, config: &CheckerConfig) -> Option<RunOutcome> {
    match run_check(store, config) {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            error!("check aborted: {}", e);
            None
        }
    }
}
