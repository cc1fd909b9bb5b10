//! Shared table/workbook specification models.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::conf::{N_WIDTH_CELL_MAX, N_WIDTH_CELL_PADDING};

////////////////////////////////////////////////////////////////////////////////
// #region TableRecordSpecification

/// One cell as delivered by the extraction step.
///
/// Maps to JSON `null | string | number`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumCellValue {
    /// Missing/blank value.
    #[default]
    None,
    /// Numeric value.
    Number(f64),
    /// Text value.
    String(String),
}

impl EnumCellValue {
    /// Text shown for this cell; `None` when the cell is blank.
    ///
    /// Numbers use the plain `f64` display (no locale grouping, no currency).
    pub fn to_display_text(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::Number(n) => Some(n.to_string()),
            Self::String(s) => Some(s.clone()),
        }
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl<T: Into<EnumCellValue>> From<Option<T>> for EnumCellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

/// One table extracted from the source document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecTableRecord {
    /// Requested sheet label; not unique, not length-checked, may hold illegal chars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    /// Row-major cell grid; rows may be ragged.
    #[serde(default)]
    pub rows: Vec<Vec<EnumCellValue>>,
    /// Free-text context about the table. Not used for materialization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Whole payload returned by the extraction step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecExtractionResult {
    /// Extracted tables in document order.
    #[serde(default)]
    pub tables: Vec<SpecTableRecord>,
    /// Optional document title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_title: Option<String>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MaterializeSpecification

/// Workbook-ready sheet produced from one [`SpecTableRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpecMaterializedSheet<'a> {
    /// Final sheet name: 1..=31 chars, no illegal chars, unique within the run.
    pub sheet_name: String,
    /// Borrowed view of the source rows.
    pub grid: &'a [Vec<EnumCellValue>],
    /// Estimated width per column index seen in `grid`, in character units.
    pub widths_col: Vec<usize>,
}

impl SpecMaterializedSheet<'_> {
    /// Number of rows in the grid.
    pub fn height(&self) -> usize {
        self.grid.len()
    }

    /// Number of column slots (longest row).
    pub fn width(&self) -> usize {
        self.widths_col.len()
    }
}

/// Column width estimation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Width padding added to every measured cell.
    pub width_cell_padding: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            width_cell_padding: N_WIDTH_CELL_PADDING,
            width_cell_max: N_WIDTH_CELL_MAX,
        }
    }
}

/// How already-assigned sheet names are compared for uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumSheetNameCompare {
    /// Exact string comparison (default).
    #[default]
    CaseSensitive,
    /// Compare lowercased names, as Excel itself does.
    CaseInsensitive,
}

/// Options for one materialization run.
///
/// The defaults produce names that honour only the illegal-character,
/// length and exact-uniqueness rules. Excel is stricter: it treats names
/// that differ only by case as duplicates and refuses names that start or
/// end with `'`, so [`crate::writer::XlsxWriter`] can reject a default
/// materialization. Set `rule_name_compare` to
/// [`EnumSheetNameCompare::CaseInsensitive`] and `if_trim_apostrophes` to
/// `true` for names the writer always accepts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecMaterializeOptions {
    /// Column width policy.
    pub policy_autofit: SpecAutofitCellsPolicy,
    /// Sheet name uniqueness rule.
    pub rule_name_compare: EnumSheetNameCompare,
    /// Strip leading/trailing `'` from labels before the empty-name fallback.
    pub if_trim_apostrophes: bool,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Vertical alignment: `top`, `vcenter` or `bottom`.
    pub valign: Option<String>,
    /// Bottom border style: 1 thin, 2 medium, 5 thick, 6 double.
    pub bottom: Option<i64>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            bottom: other.bottom.or(self.bottom),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportAndErrors

/// What was written for one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetSummary {
    /// Sheet name in workbook.
    pub sheet_name: String,
    /// Rows written.
    pub n_rows: usize,
    /// Column slots written.
    pub n_cols: usize,
}

/// Per-writer report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Sheets in workbook order.
    pub sheets: Vec<SpecSheetSummary>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        let c_msg = msg.as_ref().to_string();
        log::warn!("{c_msg}");
        self.warnings.push(c_msg);
    }
}

/// Workbook writer failures.
#[derive(Debug)]
pub enum XlsxWriteError {
    /// Write attempted after [`crate::writer::XlsxWriter::close`].
    Closed,
    /// Row or column index does not fit the XLSX cell address types.
    IndexOverflow(String),
    /// Error reported by `rust_xlsxwriter`.
    Xlsx(rust_xlsxwriter::XlsxError),
    /// Output file could not be prepared.
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

impl fmt::Display for XlsxWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "Cannot write after close()."),
            Self::IndexOverflow(msg) => write!(f, "{msg}"),
            Self::Xlsx(err) => write!(f, "xlsx write error: {err}"),
            Self::Io { path, source } => {
                write!(f, "Failed to prepare {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for XlsxWriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Xlsx(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Closed | Self::IndexOverflow(_) => None,
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for XlsxWriteError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Xlsx(err)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
