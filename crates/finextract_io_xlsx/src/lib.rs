//! `finextract_io_xlsx` v1:
//! Table-record model, workbook materializer and XLSX writer kernel.
//!
//! Module layout:
//! - `conf`   : Excel limits and default presets
//! - `spec`   : records/sheets/options/errors
//! - `util`   : pure materialization helpers (sheet names, column widths)
//! - `writer` : `rust_xlsxwriter`-backed workbook writer
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_NAME_WORKBOOK_DEFAULT, C_SUFFIX_WORKBOOK_FILE, N_LEN_EXCEL_SHEET_NAME_MAX,
    N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
pub use spec::{
    EnumCellValue, EnumSheetNameCompare, SpecAutofitCellsPolicy, SpecCellFormat,
    SpecExtractionResult, SpecMaterializeOptions, SpecMaterializedSheet, SpecSheetSummary,
    SpecTableRecord, SpecXlsxReport, XlsxWriteError,
};
pub use util::{
    SheetNameRegistry, derive_default_sheet_name, derive_sheet_name_with_suffix,
    derive_workbook_file_name, estimate_cell_display_len, estimate_column_widths,
    materialize_workbook, sanitize_sheet_name, sanitize_sheet_name_with,
};
pub use writer::{SpecXlsxSheetWriteOptions, XlsxWriter};
