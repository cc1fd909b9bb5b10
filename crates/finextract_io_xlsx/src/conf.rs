//! XLSX constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length (in characters).
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [char; 7] = ['\\', '/', '?', '*', '[', ']', ':'];

/// Padding added to the longest cell when estimating a column width.
pub const N_WIDTH_CELL_PADDING: usize = 2;
/// Upper bound for an estimated column width.
pub const N_WIDTH_CELL_MAX: usize = 60;

/// Suffix replacing the source document extension in the workbook file name.
pub const C_SUFFIX_WORKBOOK_FILE: &str = "_Tables.xlsx";
/// Workbook file name used when the source document name is unknown.
pub const C_NAME_WORKBOOK_DEFAULT: &str = "Extracted_Report.xlsx";

/// Canonical format preset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFmtKey {
    /// Generic body cell format.
    Text,
    /// Header (first row) cell format.
    Header,
}

impl EnumFmtKey {
    /// Key used in [`derive_default_xlsx_formats`].
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Header => "header",
        }
    }
}

/// Build default named format presets used by [`crate::writer::XlsxWriter`].
pub fn derive_default_xlsx_formats() -> BTreeMap<String, SpecCellFormat> {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some("Calibri".to_string()),
        font_size: Some(11),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(EnumFmtKey::Text.as_str().to_string(), cfg_base_fmt_spec.clone());
    dict_fmt.insert(
        EnumFmtKey::Header.as_str().to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            bottom: Some(1),
            ..Default::default()
        }),
    );

    dict_fmt
}
