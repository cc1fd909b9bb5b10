//! Linear processing state machine: idle, processing (upload, analysis,
//! formatting), then complete or error.

use std::fmt;

use thiserror::Error;

/// Overall run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumAppStatus {
    /// Nothing started.
    #[default]
    Idle,
    /// Steps are running.
    Processing,
    /// Workbook written.
    Complete,
    /// Run stopped with a user-facing message.
    Error,
}

/// Per-step progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumStepState {
    /// Not started.
    #[default]
    Waiting,
    /// Running.
    Active,
    /// Finished.
    Done,
}

/// Processing steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EnumProcessingStep {
    /// Read and validate the input document.
    Upload,
    /// Extract tables from the document.
    Analysis,
    /// Materialize sheets and write the workbook.
    Formatting,
}

impl EnumProcessingStep {
    /// Every step, in order.
    pub const ALL: [Self; 3] = [Self::Upload, Self::Analysis, Self::Formatting];

    const fn index(self) -> usize {
        match self {
            Self::Upload => 0,
            Self::Analysis => 1,
            Self::Formatting => 2,
        }
    }

    /// Progress label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Upload => "Reading document",
            Self::Analysis => "Extracting tables",
            Self::Formatting => "Building workbook",
        }
    }
}

impl fmt::Display for EnumProcessingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rejected state transition.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Cannot {action} while {detail}")]
pub struct StatusError {
    /// Attempted transition.
    pub action: String,
    /// Current state description.
    pub detail: String,
}

/// State of one processing run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecPipelineState {
    status: EnumAppStatus,
    steps: [EnumStepState; 3],
    error_message: Option<String>,
}

impl SpecPipelineState {
    /// Fresh idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overall status.
    pub const fn status(&self) -> EnumAppStatus {
        self.status
    }

    /// State of one step.
    pub const fn step(&self, step: EnumProcessingStep) -> EnumStepState {
        self.steps[step.index()]
    }

    /// Message recorded by [`Self::fail`].
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// `Idle -> Processing`.
    pub fn start(&mut self) -> Result<(), StatusError> {
        if self.status != EnumAppStatus::Idle {
            return Err(self.derive_error("start", format!("status is {:?}", self.status)));
        }
        self.status = EnumAppStatus::Processing;
        self.error_message = None;
        Ok(())
    }

    /// `Waiting -> Active`; every earlier step must be done.
    pub fn begin_step(&mut self, step: EnumProcessingStep) -> Result<(), StatusError> {
        self.ensure_processing("begin a step")?;
        if let Some(prev) = EnumProcessingStep::ALL[..step.index()]
            .iter()
            .find(|prev| self.step(**prev) != EnumStepState::Done)
        {
            return Err(self.derive_error(
                &format!("begin {step:?}"),
                format!("{prev:?} is {:?}", self.step(*prev)),
            ));
        }
        if self.step(step) != EnumStepState::Waiting {
            return Err(self.derive_error(
                &format!("begin {step:?}"),
                format!("it is {:?}", self.step(step)),
            ));
        }
        self.steps[step.index()] = EnumStepState::Active;
        Ok(())
    }

    /// `Active -> Done`.
    pub fn finish_step(&mut self, step: EnumProcessingStep) -> Result<(), StatusError> {
        self.ensure_processing("finish a step")?;
        if self.step(step) != EnumStepState::Active {
            return Err(self.derive_error(
                &format!("finish {step:?}"),
                format!("it is {:?}", self.step(step)),
            ));
        }
        self.steps[step.index()] = EnumStepState::Done;
        Ok(())
    }

    /// `Processing -> Complete`; all steps must be done.
    pub fn complete(&mut self) -> Result<(), StatusError> {
        self.ensure_processing("complete")?;
        if let Some(step) = EnumProcessingStep::ALL
            .iter()
            .find(|step| self.step(**step) != EnumStepState::Done)
        {
            return Err(self.derive_error(
                "complete",
                format!("{step:?} is {:?}", self.step(*step)),
            ));
        }
        self.status = EnumAppStatus::Complete;
        Ok(())
    }

    /// Move to `Error` with a user-facing message.
    ///
    /// Running steps and the analysis step go back to `Waiting`; finished
    /// steps before them stay done.
    pub fn fail(&mut self, message: impl Into<String>) {
        for state in &mut self.steps {
            if *state == EnumStepState::Active {
                *state = EnumStepState::Waiting;
            }
        }
        self.steps[EnumProcessingStep::Analysis.index()] = EnumStepState::Waiting;
        self.status = EnumAppStatus::Error;
        self.error_message = Some(message.into());
    }

    /// Back to a fresh idle state (retry).
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn ensure_processing(&self, action: &str) -> Result<(), StatusError> {
        if self.status == EnumAppStatus::Processing {
            return Ok(());
        }
        Err(self.derive_error(action, format!("status is {:?}", self.status)))
    }

    fn derive_error(&self, action: &str, detail: String) -> StatusError {
        StatusError {
            action: action.to_string(),
            detail,
        }
    }
}
