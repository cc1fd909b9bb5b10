//! Stateless helper utilities that turn table records into workbook-ready sheets.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::Path;

use crate::conf::{
    C_NAME_WORKBOOK_DEFAULT, C_SUFFIX_WORKBOOK_FILE, N_LEN_EXCEL_SHEET_NAME_MAX,
    TUP_EXCEL_ILLEGAL,
};
use crate::spec::{
    EnumCellValue, EnumSheetNameCompare, SpecAutofitCellsPolicy, SpecMaterializeOptions,
    SpecMaterializedSheet, SpecTableRecord,
};

////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Positional fallback name (`Table 1`, `Table 2`, ...) for the `idx`-th table.
pub fn derive_default_sheet_name(idx: usize) -> String {
    format!("Table {}", idx + 1)
}

/// Strip illegal chars, trim, and cap to a valid Excel sheet name.
///
/// Empty/absent labels, and labels left empty after stripping, fall back to
/// [`derive_default_sheet_name`]. Never fails.
pub fn sanitize_sheet_name(label: Option<&str>, idx: usize) -> String {
    sanitize_sheet_name_with(label, idx, false)
}

/// [`sanitize_sheet_name`], optionally also stripping leading/trailing `'`.
///
/// With `if_trim_apostrophes` the apostrophes are trimmed together with
/// whitespace before the empty-name fallback, and again from the end after
/// truncation, so the result never starts or ends with `'`.
pub fn sanitize_sheet_name_with(
    label: Option<&str>,
    idx: usize,
    if_trim_apostrophes: bool,
) -> String {
    let c_label = match label {
        Some(val) if !val.is_empty() => val.to_string(),
        _ => derive_default_sheet_name(idx),
    };

    let c_name_stripped: String = c_label
        .chars()
        .filter(|chr| !TUP_EXCEL_ILLEGAL.contains(chr))
        .collect();
    let c_name = if if_trim_apostrophes {
        c_name_stripped.trim_matches(|chr: char| chr == '\'' || chr.is_whitespace())
    } else {
        c_name_stripped.trim()
    };
    if c_name.is_empty() {
        return derive_default_sheet_name(idx);
    }

    let c_name_capped: String = c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect();
    if if_trim_apostrophes {
        return c_name_capped.trim_end_matches('\'').to_string();
    }
    c_name_capped
}

/// Create suffixed sheet name (`base(1)`, `base(2)`, ...), respecting length cap.
///
/// The base is shortened only when `base + suffix` would exceed the cap.
pub fn derive_sheet_name_with_suffix(base_name: &str, n_suffix: usize) -> String {
    let c_suffix = format!("({n_suffix})");
    let n_len_suffix = c_suffix.chars().count();
    let n_len_base = base_name.chars().count();

    if n_len_base + n_len_suffix <= N_LEN_EXCEL_SHEET_NAME_MAX {
        return format!("{base_name}{c_suffix}");
    }

    let c_base: String = base_name
        .chars()
        .take(N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(n_len_suffix))
        .collect();
    format!("{c_base}{c_suffix}")
}

/// Names already assigned within one materialization run.
#[derive(Debug, Clone, Default)]
pub struct SheetNameRegistry {
    rule_name_compare: EnumSheetNameCompare,
    if_trim_apostrophes: bool,
    set_sheet_names_existing: BTreeSet<String>,
}

impl SheetNameRegistry {
    /// Create an empty registry with the given comparison rule.
    pub fn new(rule_name_compare: EnumSheetNameCompare) -> Self {
        Self {
            rule_name_compare,
            if_trim_apostrophes: false,
            set_sheet_names_existing: BTreeSet::new(),
        }
    }

    /// Create an empty registry following the naming rules in `options`.
    pub fn from_options(options: &SpecMaterializeOptions) -> Self {
        Self {
            if_trim_apostrophes: options.if_trim_apostrophes,
            ..Self::new(options.rule_name_compare)
        }
    }

    /// Number of names assigned so far.
    pub fn len(&self) -> usize {
        self.set_sheet_names_existing.len()
    }

    /// Whether no name has been assigned yet.
    pub fn is_empty(&self) -> bool {
        self.set_sheet_names_existing.is_empty()
    }

    /// Whether `name` collides with an assigned name.
    pub fn contains(&self, name: &str) -> bool {
        self.set_sheet_names_existing
            .contains(&self.derive_lookup_key(name))
    }

    /// Sanitize `label` and make it unique against every name assigned so far.
    ///
    /// The accepted name is recorded before returning.
    pub fn resolve(&mut self, label: Option<&str>, idx: usize) -> String {
        let c_name_base = sanitize_sheet_name_with(label, idx, self.if_trim_apostrophes);
        if !self.contains(&c_name_base) {
            self.insert(&c_name_base);
            return c_name_base;
        }

        let mut n_suffix = 1usize;
        loop {
            let candidate = derive_sheet_name_with_suffix(&c_name_base, n_suffix);
            if !self.contains(&candidate) {
                log::debug!("Sheet name {c_name_base:?} already taken; using {candidate:?}");
                self.insert(&candidate);
                return candidate;
            }
            n_suffix += 1;
        }
    }

    fn insert(&mut self, name: &str) {
        let key = self.derive_lookup_key(name);
        self.set_sheet_names_existing.insert(key);
    }

    fn derive_lookup_key(&self, name: &str) -> String {
        match self.rule_name_compare {
            EnumSheetNameCompare::CaseSensitive => name.to_string(),
            EnumSheetNameCompare::CaseInsensitive => name.to_lowercase(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnWidths

/// Displayed length of one cell in characters; blank cells measure `0`.
pub fn estimate_cell_display_len(value: &EnumCellValue) -> usize {
    value
        .to_display_text()
        .map_or(0, |txt| txt.chars().count())
}

/// Estimate one width per column slot present in any row of `grid`.
///
/// Each width is the running max of `len + padding`, capped at
/// `width_cell_max`. Columns only reached by later (longer) rows start their
/// own running max at that row.
pub fn estimate_column_widths(
    grid: &[Vec<EnumCellValue>],
    policy: &SpecAutofitCellsPolicy,
) -> Vec<usize> {
    let mut l_widths_col: Vec<usize> = Vec::new();

    for row in grid {
        for (n_idx_col, value) in row.iter().enumerate() {
            let n_width_cell = estimate_cell_display_len(value) + policy.width_cell_padding;
            match l_widths_col.get_mut(n_idx_col) {
                Some(n_width) => {
                    *n_width = usize::min(policy.width_cell_max, usize::max(*n_width, n_width_cell));
                }
                None => l_widths_col.push(usize::min(policy.width_cell_max, n_width_cell)),
            }
        }
    }

    l_widths_col
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Materialize

/// Resolve names and column widths for every record, preserving input order.
///
/// No record is dropped, merged or reordered; empty input yields no sheets.
pub fn materialize_workbook<'a>(
    records: &'a [SpecTableRecord],
    options: &SpecMaterializeOptions,
) -> Vec<SpecMaterializedSheet<'a>> {
    let mut registry = SheetNameRegistry::from_options(options);

    records
        .iter()
        .enumerate()
        .map(|(idx, record)| SpecMaterializedSheet {
            sheet_name: registry.resolve(record.sheet_name.as_deref(), idx),
            grid: &record.rows,
            widths_col: estimate_column_widths(&record.rows, &options.policy_autofit),
        })
        .collect()
}

/// Workbook file name derived from the source document name.
///
/// `report.pdf` becomes `report_Tables.xlsx`; unknown names use
/// [`C_NAME_WORKBOOK_DEFAULT`].
pub fn derive_workbook_file_name(source_file_name: Option<&str>) -> String {
    let c_stem = source_file_name
        .map(str::trim)
        .filter(|val| !val.is_empty())
        .and_then(|val| Path::new(val).file_stem())
        .and_then(OsStr::to_str)
        .filter(|val| !val.is_empty());

    match c_stem {
        Some(stem) => format!("{stem}{C_SUFFIX_WORKBOOK_FILE}"),
        None => C_NAME_WORKBOOK_DEFAULT.to_string(),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
