use serde::{Serialize, Serializer};

//==============================================================================
// Candidates
//==============================================================================

/// One cell as seen through the store: `None` for empty or missing cells
pub type CellValue = Option<String>;

/// One row of the candidate column (a 1-element row of the range read)
pub type CandidateRow = Vec<CellValue>;

/// Name of the candidate held by a row, if any
pub fn candidate_name(row: &CandidateRow) -> Option<&str> {
    row.first().and_then(|cell| cell.as_deref())
}

//==============================================================================
// Resolution
//==============================================================================

/// How a candidate name resolved against the workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    FoundVisible,
    FoundHidden,
    NotFound,
    Empty,
}

impl Resolution {
    pub fn is_success(self) -> bool {
        matches!(self, Resolution::FoundVisible)
    }

    pub fn label(self) -> &'static str {
        match self {
            Resolution::FoundVisible => "ok",
            Resolution::FoundHidden => "hidden",
            Resolution::NotFound => "not found",
            Resolution::Empty => "empty",
        }
    }
}

/// What gets written back for one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub message: String,
    /// `None` clears the highlight
    pub color: Option<String>,
    /// 1-based sheet row
    pub row_index: u32,
}

impl ResultRow {
    pub fn cleared(row_index: u32) -> Self {
        Self {
            message: String::new(),
            color: None,
            row_index,
        }
    }

    pub fn warning(row_index: u32, message: &str, color: &str) -> Self {
        Self {
            message: message.to_string(),
            color: Some(color.to_string()),
            row_index,
        }
    }
}

//==============================================================================
// Run outcome
//==============================================================================

/// Expected conditions that end a run before any row is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    SheetStoreUnavailable,
    ManifestSheetNotFound,
    EmptyCandidateList,
    CandidateListUnreadable,
}

/// Everything a successful run saw and resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    /// Blank cells serialize as `""`
    #[serde(serialize_with = "blank_as_empty")]
    pub sheet_name_list: Vec<CandidateRow>,
    pub existing_sheet_name_list: Vec<String>,
    /// Per-row resolution, parallel to `sheet_name_list`
    #[serde(skip)]
    pub resolutions: Vec<Resolution>,
}

impl CheckReport {
    pub fn failure_count(&self) -> usize {
        self.resolutions.iter().filter(|r| !r.is_success()).count()
    }
}

fn blank_as_empty<S: Serializer>(rows: &[CandidateRow], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.as_deref().unwrap_or("")).collect::<Vec<_>>()),
    )
}

/// Value handed back to the caller of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RunOutcome {
    #[serde(rename_all = "camelCase")]
    Failed {
        #[serde(skip)]
        kind: FailureKind,
        error_message: String,
    },
    Completed(CheckReport),
}

impl RunOutcome {
    pub fn failed(kind: FailureKind, error_message: impl Into<String>) -> Self {
        RunOutcome::Failed {
            kind,
            error_message: error_message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            RunOutcome::Failed { kind, .. } => Some(*kind),
            RunOutcome::Completed(_) => None,
        }
    }

    pub fn report(&self) -> Option<&CheckReport> {
        match self {
            RunOutcome::Completed(report) => Some(report),
            RunOutcome::Failed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_outcome_serializes_message_only() {
        let outcome = RunOutcome::failed(FailureKind::SheetStoreUnavailable, "unavailable");
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json, r#"{"errorMessage":"unavailable"}"#);
    }

    #[test]
    fn test_completed_outcome_serializes_lists() {
        let outcome = RunOutcome::Completed(CheckReport {
            sheet_name_list: vec![vec![Some("Sheet1".to_string())], vec![None]],
            existing_sheet_name_list: vec!["Sheet1".to_string()],
            resolutions: vec![Resolution::FoundVisible, Resolution::Empty],
        });
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(
            json,
            r#"{"sheetNameList":[["Sheet1"],[""]],"existingSheetNameList":["Sheet1"]}"#
        );
    }

    #[test]
    fn test_candidate_name() {
        assert_eq!(candidate_name(&vec![Some("A".to_string())]), Some("A"));
        assert_eq!(candidate_name(&vec![None]), None);
        assert_eq!(candidate_name(&vec![]), None);
    }

    #[test]
    fn test_only_found_visible_succeeds() {
        assert!(Resolution::FoundVisible.is_success());
        assert!(!Resolution::FoundHidden.is_success());
        assert!(!Resolution::NotFound.is_success());
        assert!(!Resolution::Empty.is_success());
    }
}
