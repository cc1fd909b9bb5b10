//! Command-line arguments and resolved run configuration.

use std::path::PathBuf;

use clap::Parser;
use finextract_ai::providers::SpecGeminiConfig;
use finextract_ai::{AiError, SpecExtractorConfig};
use finextract_io_xlsx::conf::{EnumFmtKey, derive_default_xlsx_formats};
use finextract_io_xlsx::{
    EnumSheetNameCompare, SpecMaterializeOptions, SpecXlsxSheetWriteOptions,
    derive_workbook_file_name,
};

/// Extract the tables of a PDF financial report into an Excel workbook.
#[derive(Debug, Clone, Parser)]
#[command(name = "finextract", version, about)]
pub struct Args {
    /// PDF report to convert (max 20MB).
    pub input: PathBuf,

    /// Output workbook path [default: `<input stem>_Tables.xlsx` next to the input].
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Replay tables from a saved extraction JSON instead of calling the AI service.
    #[arg(long, value_name = "PATH")]
    pub tables_json: Option<PathBuf>,

    /// Also save the raw extraction result as JSON.
    #[arg(long, value_name = "PATH")]
    pub save_json: Option<PathBuf>,

    /// Gemini model name (overrides `FINEXTRACT_MODEL`).
    #[arg(long)]
    pub model: Option<String>,

    /// Keep sheet names that differ only by case (Excel may refuse the workbook).
    #[arg(long)]
    pub case_sensitive_names: bool,

    /// Bold and freeze the first row of every sheet.
    #[arg(long)]
    pub bold_header: bool,
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct SpecAppConfig {
    /// Input PDF.
    pub path_input: PathBuf,
    /// Workbook destination.
    pub path_output: PathBuf,
    /// Optional raw-extraction dump.
    pub path_save_json: Option<PathBuf>,
    /// Extraction backend.
    pub extractor: SpecExtractorConfig,
    /// Materializer options.
    pub materialize: SpecMaterializeOptions,
    /// Writer options.
    pub write: SpecXlsxSheetWriteOptions,
}

impl SpecAppConfig {
    /// Resolve arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Config`] when the Gemini backend is needed but no
    /// API key is configured.
    pub fn from_args(args: &Args) -> Result<Self, AiError> {
        let extractor = match &args.tables_json {
            Some(path) => SpecExtractorConfig::JsonFile { path: path.clone() },
            None => SpecExtractorConfig::Gemini(SpecGeminiConfig::from_env(args.model.clone())?),
        };
        Ok(Self::from_parts(args, extractor))
    }

    /// Assemble a configuration around an already-resolved extractor.
    pub fn from_parts(args: &Args, extractor: SpecExtractorConfig) -> Self {
        let path_output = args.output.clone().unwrap_or_else(|| {
            let c_file_name =
                derive_workbook_file_name(args.input.file_name().and_then(|name| name.to_str()));
            args.input.with_file_name(c_file_name)
        });

        let materialize = SpecMaterializeOptions {
            rule_name_compare: if args.case_sensitive_names {
                EnumSheetNameCompare::CaseSensitive
            } else {
                EnumSheetNameCompare::CaseInsensitive
            },
            if_trim_apostrophes: true,
            ..Default::default()
        };

        let write = if args.bold_header {
            let dict_fmt = derive_default_xlsx_formats();
            SpecXlsxSheetWriteOptions {
                fmt_header: dict_fmt.get(EnumFmtKey::Header.as_str()).cloned(),
                fmt_body: dict_fmt.get(EnumFmtKey::Text.as_str()).cloned(),
                if_freeze_header: true,
            }
        } else {
            SpecXlsxSheetWriteOptions::default()
        };

        Self {
            path_input: args.input.clone(),
            path_output,
            path_save_json: args.save_json.clone(),
            extractor,
            materialize,
            write,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("finextract").chain(argv.iter().copied()))
            .expect("parse args")
    }

    #[test]
    fn test_default_output_sits_next_to_input() {
        let args = parse(&["reports/acme-10K.pdf", "--tables-json", "saved.json"]);
        let cfg = SpecAppConfig::from_args(&args).expect("config");

        assert_eq!(cfg.path_output, Path::new("reports/acme-10K_Tables.xlsx"));
        assert_eq!(
            cfg.extractor,
            SpecExtractorConfig::JsonFile {
                path: PathBuf::from("saved.json")
            }
        );
        assert_eq!(
            cfg.materialize.rule_name_compare,
            EnumSheetNameCompare::CaseInsensitive
        );
        assert!(cfg.write.fmt_header.is_none());
        assert!(cfg.materialize.if_trim_apostrophes);
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = parse(&[
            "q3.pdf",
            "-o",
            "out/book.xlsx",
            "--tables-json",
            "t.json",
            "--case-sensitive-names",
            "--bold-header",
            "--save-json",
            "raw.json",
        ]);
        let cfg = SpecAppConfig::from_args(&args).expect("config");

        assert_eq!(cfg.path_output, Path::new("out/book.xlsx"));
        assert_eq!(cfg.path_save_json.as_deref(), Some(Path::new("raw.json")));
        assert_eq!(
            cfg.materialize.rule_name_compare,
            EnumSheetNameCompare::CaseSensitive
        );
        assert_eq!(
            cfg.write.fmt_header.as_ref().and_then(|fmt| fmt.bold),
            Some(true)
        );
        assert!(cfg.write.if_freeze_header);
    }
}
