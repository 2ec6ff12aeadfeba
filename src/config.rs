//! Checker configuration
//!
//! The defaults are compiled in. A YAML file can override any subset of
//! fields; the result is validated once and never mutated during a run.

use crate::error::{CheckerError, CheckerResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Texts carried by the four error outcomes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorMessages {
    pub manifest_not_found: String,
    pub empty_candidate_list: String,
    pub candidate_list_unreadable: String,
    pub sheet_store_unavailable: String,
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self {
            manifest_not_found: "チェック対象のシートが見つからない為処理終了".to_string(),
            empty_candidate_list: "シート名が1つも入力されてない為処理終了".to_string(),
            candidate_list_unreadable: "シート名の取得に失敗した為処理終了".to_string(),
            sheet_store_unavailable: "スプレッドシートを取得できない為処理終了".to_string(),
        }
    }
}

/// Layout of the manifest sheet and the annotations written into it.
///
/// Rows and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Name of the manifest sheet
    pub sheet_name: String,
    /// Column holding candidate sheet names
    pub check_column: u32,
    /// First row below the header
    pub first_data_row: u32,
    /// Column receiving the warning message
    pub result_column: u32,
    /// Number of columns (starting at column 1) that get highlighted
    pub highlight_width: u32,
    /// Highlight color as `#RRGGBB`
    pub warning_color: String,
    /// Message written next to a broken reference
    pub warning_message: String,
    pub messages: ErrorMessages,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            sheet_name: "チェック".to_string(),
            check_column: 1,
            first_data_row: 2,
            result_column: 3,
            highlight_width: 3,
            warning_color: "#FFB2B2".to_string(),
            warning_message: "シートなし".to_string(),
            messages: ErrorMessages::default(),
        }
    }
}

impl CheckerConfig {
    /// Load a YAML override file on top of the defaults
    pub fn from_yaml_file(path: &Path) -> CheckerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> CheckerResult<Self> {
        // An empty document deserializes to unit, not to a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: CheckerConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Resolve the effective configuration: file (if any), then sheet name override
    pub fn resolve(path: Option<&Path>, sheet_name: Option<String>) -> CheckerResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_yaml_file(p)?,
            None => Self::default(),
        };
        if let Some(name) = sheet_name {
            config.sheet_name = name;
        }
        config.validate()?;
        Ok(config)
    }

    /// Number of header rows above the candidate list
    pub fn header_rows(&self) -> u32 {
        self.first_data_row.saturating_sub(1)
    }

    pub fn validate(&self) -> CheckerResult<()> {
        if self.sheet_name.is_empty() {
            return Err(CheckerError::Config("sheet_name must not be empty".to_string()));
        }

        for (field, value) in [
            ("check_column", self.check_column),
            ("first_data_row", self.first_data_row),
            ("result_column", self.result_column),
            ("highlight_width", self.highlight_width),
        ] {
            if value < 1 {
                return Err(CheckerError::Config(format!(
                    "{} must be 1 or greater (got {})",
                    field, value
                )));
            }
        }

        parse_hex_color(&self.warning_color)?;
        Ok(())
    }

    /// Highlight color as a 0xRRGGBB value
    pub fn warning_rgb(&self) -> CheckerResult<u32> {
        parse_hex_color(&self.warning_color)
    }
}

/// Parse `#RRGGBB` into a 0xRRGGBB value
pub fn parse_hex_color(color: &str) -> CheckerResult<u32> {
    let pattern = Regex::new(r"^#([0-9A-Fa-f]{6})$")
        .map_err(|e| CheckerError::Config(format!("Regex error: {}", e)))?;

    let hex = pattern
        .captures(color)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| {
            CheckerError::Config(format!("color must look like #RRGGBB (got '{}')", color))
        })?;

    u32::from_str_radix(hex.as_str(), 16)
        .map_err(|e| CheckerError::Config(format!("invalid color '{}': {}", color, e)))
}
