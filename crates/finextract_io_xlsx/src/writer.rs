//! XLSX writer kernel that turns materialized sheets into workbook output.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::conf::{N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::spec::{
    EnumCellValue, SpecCellFormat, SpecMaterializedSheet, SpecSheetSummary, SpecXlsxReport,
    XlsxWriteError,
};

/// Per-sheet call options.
#[derive(Default, Debug, Clone)]
pub struct SpecXlsxSheetWriteOptions {
    /// Format for the first row; falls back to `fmt_body` when `None`.
    pub fmt_header: Option<SpecCellFormat>,
    /// Format for every other row; cells are written unformatted when `None`.
    pub fmt_body: Option<SpecCellFormat>,
    /// Freeze the first row.
    pub if_freeze_header: bool,
}

/// Stateful workbook writer.
pub struct XlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    report: SpecXlsxReport,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer bound to output path.
    ///
    /// The workbook is buffered in memory until [`Self::close`] is called.
    pub fn new(path_file_out: PathBuf) -> Self {
        Self {
            path_file_out,
            workbook: Workbook::new(),
            report: SpecXlsxReport::default(),
            if_closed: false,
        }
    }

    /// Output file path.
    pub fn file_out(&self) -> &Path {
        &self.path_file_out
    }

    /// Snapshot of what has been written so far.
    pub fn report(&self) -> SpecXlsxReport {
        self.report.clone()
    }

    /// Flush workbook to disk, creating the parent directory when needed. Idempotent.
    pub fn close(&mut self) -> Result<(), XlsxWriteError> {
        if self.if_closed {
            return Ok(());
        }
        if let Some(path_dir) = self.path_file_out.parent()
            && !path_dir.as_os_str().is_empty()
            && !path_dir.exists()
        {
            std::fs::create_dir_all(path_dir).map_err(|source| XlsxWriteError::Io {
                path: path_dir.to_path_buf(),
                source,
            })?;
        }
        self.workbook.save(&self.path_file_out)?;
        self.if_closed = true;
        log::info!(
            "Saved {} sheet(s) to {}",
            self.report.sheets.len(),
            self.path_file_out.display()
        );
        Ok(())
    }

    /// Serialize the workbook into memory without touching the output path.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>, XlsxWriteError> {
        Ok(self.workbook.save_to_buffer()?)
    }

    /// Write every sheet in order.
    pub fn write_workbook(
        &mut self,
        sheets: &[SpecMaterializedSheet<'_>],
        options: &SpecXlsxSheetWriteOptions,
    ) -> Result<(), XlsxWriteError> {
        for sheet in sheets {
            self.write_sheet(sheet, options)?;
        }
        Ok(())
    }

    /// Write one materialized sheet.
    ///
    /// Rows/columns past the Excel limits are dropped and reported as warnings.
    /// Names that start or end with `'` fail here; names that differ from an
    /// earlier sheet only by case fail on save. Materialize with
    /// [`crate::spec::EnumSheetNameCompare::CaseInsensitive`] and
    /// `if_trim_apostrophes` to avoid both.
    pub fn write_sheet(
        &mut self,
        sheet: &SpecMaterializedSheet<'_>,
        options: &SpecXlsxSheetWriteOptions,
    ) -> Result<(), XlsxWriteError> {
        if self.if_closed {
            return Err(XlsxWriteError::Closed);
        }

        let n_rows_total = sheet.height();
        let n_cols_total = sheet.width();
        let n_rows_write = usize::min(n_rows_total, N_NROWS_EXCEL_MAX);
        let n_cols_write = usize::min(n_cols_total, N_NCOLS_EXCEL_MAX);
        if n_rows_write < n_rows_total {
            self.report.warn(format!(
                "Sheet {:?}: {} row(s) beyond the Excel limit were dropped.",
                sheet.sheet_name,
                n_rows_total - n_rows_write
            ));
        }
        if n_cols_write < n_cols_total {
            self.report.warn(format!(
                "Sheet {:?}: {} column(s) beyond the Excel limit were dropped.",
                sheet.sheet_name,
                n_cols_total - n_cols_write
            ));
        }

        let fmt_body = options.fmt_body.as_ref().map(derive_rust_xlsx_format);
        let fmt_header = options
            .fmt_header
            .as_ref()
            .map(derive_rust_xlsx_format)
            .or_else(|| fmt_body.clone());

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&sheet.sheet_name)?;

        for (n_idx_row, row) in sheet.grid.iter().take(n_rows_write).enumerate() {
            let fmt_row = if n_idx_row == 0 {
                fmt_header.as_ref()
            } else {
                fmt_body.as_ref()
            };
            for (n_idx_col, value) in row.iter().take(n_cols_write).enumerate() {
                write_cell_with_format(worksheet, n_idx_row, n_idx_col, value, fmt_row)?;
            }
        }

        for (n_idx_col, n_width) in sheet.widths_col.iter().take(n_cols_write).enumerate() {
            worksheet.set_column_width(cast_col_num(n_idx_col)?, *n_width as f64)?;
        }

        if options.if_freeze_header && n_rows_write > 1 {
            worksheet.set_freeze_panes(1, 0)?;
        }

        log::debug!(
            "Wrote sheet {:?} ({n_rows_write} rows x {n_cols_write} cols)",
            sheet.sheet_name
        );
        self.report.sheets.push(SpecSheetSummary {
            sheet_name: sheet.sheet_name.clone(),
            n_rows: n_rows_write,
            n_cols: n_cols_write,
        });
        Ok(())
    }
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: Option<&Format>,
) -> Result<(), XlsxWriteError> {
    let n_row = cast_row_num(row_idx)?;
    let n_col = cast_col_num(col_idx)?;
    match (value, format) {
        (EnumCellValue::None, Some(fmt)) => {
            worksheet.write_blank(n_row, n_col, fmt)?;
        }
        (EnumCellValue::None, None) => {}
        (EnumCellValue::String(val), Some(fmt)) => {
            worksheet.write_string_with_format(n_row, n_col, val, fmt)?;
        }
        (EnumCellValue::String(val), None) => {
            worksheet.write_string(n_row, n_col, val)?;
        }
        (EnumCellValue::Number(val), Some(fmt)) => {
            worksheet.write_number_with_format(n_row, n_col, *val, fmt)?;
        }
        (EnumCellValue::Number(val), None) => {
            worksheet.write_number(n_row, n_col, *val)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }

    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_valign(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = spec.bottom {
        format = format.set_border_bottom(derive_format_border(val));
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        _ => FormatBorder::None,
    }
}

fn derive_format_valign(valign: &str) -> Option<FormatAlign> {
    match valign.trim().to_ascii_lowercase().as_str() {
        "top" => Some(FormatAlign::Top),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        "bottom" => Some(FormatAlign::Bottom),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, XlsxWriteError> {
    u32::try_from(value)
        .map_err(|_| XlsxWriteError::IndexOverflow(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> Result<u16, XlsxWriteError> {
    u16::try_from(value)
        .map_err(|_| XlsxWriteError::IndexOverflow(format!("column index overflow: {value}")))
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;
    use crate::conf::{EnumFmtKey, derive_default_xlsx_formats};
    use crate::spec::{EnumSheetNameCompare, SpecMaterializeOptions, SpecTableRecord};
    use crate::util::materialize_workbook;

    struct TestDir {
        path: PathBuf,
    }

    impl TestDir {
        fn new() -> Self {
            let n = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos();
            let path = std::env::temp_dir().join(format!("finextract_xlsx_test_{n}"));
            std::fs::create_dir_all(&path).expect("create test dir");
            Self { path }
        }

        fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Drop for TestDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }

    fn sample_records() -> Vec<SpecTableRecord> {
        vec![
            SpecTableRecord {
                sheet_name: Some("Income Statement".to_string()),
                rows: vec![
                    vec!["Line item".into(), "FY2024".into(), "FY2023".into()],
                    vec!["Revenue".into(), 1520.0.into(), 1411.5.into()],
                    vec!["Footnote".into(), EnumCellValue::None],
                ],
                description: None,
            },
            SpecTableRecord {
                sheet_name: Some("Income Statement".to_string()),
                rows: vec![vec!["Segment".into()]],
                description: None,
            },
        ]
    }

    #[test]
    fn test_write_workbook_reports_each_sheet() {
        let records = sample_records();
        let l_sheets = materialize_workbook(&records, &SpecMaterializeOptions::default());

        let mut writer = XlsxWriter::new(PathBuf::from("unused.xlsx"));
        writer
            .write_workbook(&l_sheets, &SpecXlsxSheetWriteOptions::default())
            .expect("write workbook");

        let report = writer.report();
        assert!(report.warnings.is_empty());
        assert_eq!(
            report.sheets,
            vec![
                SpecSheetSummary {
                    sheet_name: "Income Statement".to_string(),
                    n_rows: 3,
                    n_cols: 3,
                },
                SpecSheetSummary {
                    sheet_name: "Income Statement(1)".to_string(),
                    n_rows: 1,
                    n_cols: 1,
                },
            ]
        );

        let v_bytes = writer.save_to_buffer().expect("save to buffer");
        assert!(v_bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_close_saves_file_and_blocks_further_writes() {
        let tmp = TestDir::new();
        let path_out = tmp.path().join("nested/report_Tables.xlsx");
        let records = sample_records();
        let l_sheets = materialize_workbook(&records, &SpecMaterializeOptions::default());

        let dict_fmt = derive_default_xlsx_formats();
        let options = SpecXlsxSheetWriteOptions {
            fmt_header: dict_fmt.get(EnumFmtKey::Header.as_str()).cloned(),
            fmt_body: dict_fmt.get(EnumFmtKey::Text.as_str()).cloned(),
            if_freeze_header: true,
        };

        let mut writer = XlsxWriter::new(path_out.clone());
        writer
            .write_workbook(&l_sheets, &options)
            .expect("write workbook");
        writer.close().expect("close");
        writer.close().expect("close is idempotent");
        assert!(path_out.exists());
        assert_eq!(writer.file_out(), path_out.as_path());

        let err = writer
            .write_sheet(&l_sheets[0], &options)
            .expect_err("write after close");
        assert!(matches!(err, XlsxWriteError::Closed));
    }

    #[test]
    fn test_invalid_sheet_name_surfaces_xlsx_error() {
        let rows = vec![vec![EnumCellValue::from("x")]];
        let sheet = SpecMaterializedSheet {
            sheet_name: "'quoted'".to_string(),
            grid: &rows,
            widths_col: vec![3],
        };

        let mut writer = XlsxWriter::new(PathBuf::from("unused.xlsx"));
        let err = writer
            .write_sheet(&sheet, &SpecXlsxSheetWriteOptions::default())
            .expect_err("apostrophe-wrapped name is rejected");
        assert!(matches!(err, XlsxWriteError::Xlsx(_)));
    }

    #[test]
    fn test_case_only_duplicates_fail_on_save_unless_folded() {
        let records: Vec<SpecTableRecord> = ["Segments", "SEGMENTS"]
            .into_iter()
            .map(|name| SpecTableRecord {
                sheet_name: Some(name.to_string()),
                rows: vec![vec!["x".into()]],
                description: None,
            })
            .collect();

        let l_sheets = materialize_workbook(&records, &SpecMaterializeOptions::default());
        let mut writer = XlsxWriter::new(PathBuf::from("unused.xlsx"));
        writer
            .write_workbook(&l_sheets, &SpecXlsxSheetWriteOptions::default())
            .expect("names are set");
        assert!(matches!(
            writer.save_to_buffer(),
            Err(XlsxWriteError::Xlsx(_))
        ));

        let options = SpecMaterializeOptions {
            rule_name_compare: EnumSheetNameCompare::CaseInsensitive,
            ..Default::default()
        };
        let l_sheets = materialize_workbook(&records, &options);
        let mut writer = XlsxWriter::new(PathBuf::from("unused.xlsx"));
        writer
            .write_workbook(&l_sheets, &SpecXlsxSheetWriteOptions::default())
            .expect("write workbook");
        assert!(writer.save_to_buffer().expect("save").starts_with(b"PK"));
    }

    #[test]
    fn test_trimmed_apostrophe_label_is_accepted() {
        let records = vec![SpecTableRecord {
            sheet_name: Some("'Segment' data'".to_string()),
            rows: vec![vec!["x".into()]],
            description: None,
        }];
        let options = SpecMaterializeOptions {
            if_trim_apostrophes: true,
            ..Default::default()
        };
        let l_sheets = materialize_workbook(&records, &options);
        assert_eq!(l_sheets[0].sheet_name, "Segment' data");

        let mut writer = XlsxWriter::new(PathBuf::from("unused.xlsx"));
        writer
            .write_workbook(&l_sheets, &SpecXlsxSheetWriteOptions::default())
            .expect("write workbook");
        assert!(writer.save_to_buffer().expect("save").starts_with(b"PK"));
    }

    #[test]
    fn test_format_mappings() {
        assert!(matches!(derive_format_border(1), FormatBorder::Thin));
        assert!(matches!(derive_format_border(2), FormatBorder::Medium));
        assert!(matches!(derive_format_border(5), FormatBorder::Thick));
        assert!(matches!(derive_format_border(6), FormatBorder::Double));
        assert!(matches!(derive_format_border(0), FormatBorder::None));

        assert!(matches!(derive_format_valign("top"), Some(FormatAlign::Top)));
        assert!(matches!(
            derive_format_valign(" VCenter "),
            Some(FormatAlign::VerticalCenter)
        ));
        assert!(matches!(derive_format_valign("bottom"), Some(FormatAlign::Bottom)));
        assert!(derive_format_valign("left").is_none());
    }

    #[test]
    fn test_medium_bottom_top_aligned_header_writes() {
        let records = sample_records();
        let l_sheets = materialize_workbook(&records, &SpecMaterializeOptions::default());
        let options = SpecXlsxSheetWriteOptions {
            fmt_header: Some(SpecCellFormat {
                bold: Some(true),
                valign: Some("top".to_string()),
                bottom: Some(2),
                ..Default::default()
            }),
            fmt_body: None,
            if_freeze_header: false,
        };

        let mut writer = XlsxWriter::new(PathBuf::from("unused.xlsx"));
        writer
            .write_sheet(&l_sheets[0], &options)
            .expect("write sheet");
        assert!(writer.save_to_buffer().expect("save").starts_with(b"PK"));
    }
}
