//! `finextract`: turn the tables of a PDF financial report into an Excel
//! workbook, one sheet per table.

mod config;
mod error;
mod logging;
mod pipeline;
mod status;

use std::process::ExitCode;

use clap::Parser;

use crate::config::{Args, SpecAppConfig};
use crate::error::{CliError, derive_user_message};
use crate::pipeline::Pipeline;

#[tokio::main]
async fn main() -> ExitCode {
    let multi = logging::init_logger();
    let args = Args::parse();

    let cfg = match SpecAppConfig::from_args(&args) {
        Ok(cfg) => cfg,
        Err(err) => {
            let err = CliError::from(err);
            return report_failure(&err, &derive_user_message(&err));
        }
    };
    log::debug!(
        "Converting {} into {}",
        cfg.path_input.display(),
        cfg.path_output.display()
    );

    let mut pipeline = Pipeline::new(multi);
    match pipeline.run(&cfg).await {
        Ok(outcome) => {
            if let Some(title) = &outcome.report_title {
                println!("{title}");
            }
            println!(
                "Wrote {} sheet(s) to {}",
                outcome.report.sheets.len(),
                outcome.path_output.display()
            );
            for sheet in &outcome.report.sheets {
                println!("  {:<31}  {} row(s)", sheet.sheet_name, sheet.n_rows);
            }
            for warning in &outcome.report.warnings {
                println!("  warning: {warning}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            let c_msg = pipeline
                .state()
                .error_message()
                .map_or_else(|| derive_user_message(&err), ToString::to_string);
            report_failure(&err, &c_msg)
        }
    }
}

fn report_failure(err: &CliError, message: &str) -> ExitCode {
    log::error!("{err}");
    eprintln!("Error: {message}");
    eprintln!("Run the command again to retry.");
    ExitCode::FAILURE
}
