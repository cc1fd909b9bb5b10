//! One conversion run: read the PDF, extract tables, write the workbook.

use std::path::{Path, PathBuf};

use finextract_ai::{SpecPdfDocument, create_extractor_from_config};
use finextract_io_xlsx::{
    SpecExtractionResult, SpecXlsxReport, XlsxWriter, materialize_workbook,
};
use indicatif::{MultiProgress, ProgressBar};

use crate::config::SpecAppConfig;
use crate::error::{CliError, derive_user_message};
use crate::logging::step_spinner;
use crate::status::{EnumAppStatus, EnumProcessingStep, SpecPipelineState};

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct SpecRunOutcome {
    /// Written workbook.
    pub path_output: PathBuf,
    /// Title reported by the extractor, if any.
    pub report_title: Option<String>,
    /// Sheets written and writer warnings.
    pub report: SpecXlsxReport,
}

/// Drives [`SpecPipelineState`] through the three processing steps.
pub struct Pipeline {
    state: SpecPipelineState,
    multi: MultiProgress,
    bar_active: Option<ProgressBar>,
}

impl Pipeline {
    /// New idle pipeline drawing its spinners on `multi`.
    pub fn new(multi: MultiProgress) -> Self {
        Self {
            state: SpecPipelineState::new(),
            multi,
            bar_active: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> &SpecPipelineState {
        &self.state
    }

    /// Run every step. On failure the state moves to `Error` with the
    /// user-facing message and the error is returned.
    pub async fn run(&mut self, cfg: &SpecAppConfig) -> Result<SpecRunOutcome, CliError> {
        if self.state.status() != EnumAppStatus::Idle {
            self.state.reset();
        }
        match self.run_steps(cfg).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                let c_msg = derive_user_message(&err);
                if let Some(bar) = self.bar_active.take() {
                    bar.abandon_with_message(c_msg.clone());
                }
                self.state.fail(c_msg);
                Err(err)
            }
        }
    }

    async fn run_steps(&mut self, cfg: &SpecAppConfig) -> Result<SpecRunOutcome, CliError> {
        self.state.start()?;

        self.begin(EnumProcessingStep::Upload)?;
        let document = SpecPdfDocument::from_path(&cfg.path_input).await?;
        log::info!(
            "Loaded {} ({} bytes)",
            cfg.path_input.display(),
            document.len()
        );
        self.finish(EnumProcessingStep::Upload)?;

        self.begin(EnumProcessingStep::Analysis)?;
        let extractor = create_extractor_from_config(&cfg.extractor)?;
        let result = extractor.extract_tables(&document).await?;
        if result.tables.is_empty() {
            return Err(CliError::NoTables);
        }
        log::info!(
            "{} extracted {} table(s)",
            extractor.name(),
            result.tables.len()
        );
        if let Some(path) = &cfg.path_save_json {
            save_extraction(path, &result).await?;
        }
        self.finish(EnumProcessingStep::Analysis)?;

        self.begin(EnumProcessingStep::Formatting)?;
        let l_sheets = materialize_workbook(&result.tables, &cfg.materialize);
        let mut writer = XlsxWriter::new(cfg.path_output.clone());
        writer.write_workbook(&l_sheets, &cfg.write)?;
        writer.close()?;
        self.finish(EnumProcessingStep::Formatting)?;

        self.state.complete()?;
        Ok(SpecRunOutcome {
            path_output: writer.file_out().to_path_buf(),
            report_title: result.report_title,
            report: writer.report(),
        })
    }

    fn begin(&mut self, step: EnumProcessingStep) -> Result<(), CliError> {
        self.state.begin_step(step)?;
        self.bar_active = Some(step_spinner(&self.multi, step.label()));
        Ok(())
    }

    fn finish(&mut self, step: EnumProcessingStep) -> Result<(), CliError> {
        self.state.finish_step(step)?;
        if let Some(bar) = self.bar_active.take() {
            bar.finish_with_message(format!("{step} done"));
        }
        Ok(())
    }
}

async fn save_extraction(path: &Path, result: &SpecExtractionResult) -> Result<(), CliError> {
    let txt = serde_json::to_string_pretty(result)?;
    tokio::fs::write(path, txt)
        .await
        .map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!("Saved extraction to {}", path.display());
    Ok(())
}
