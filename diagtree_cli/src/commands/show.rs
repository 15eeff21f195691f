//! Show command: one diagnostics cycle over the workspace tree.

use std::path::Path;

use super::{open_session, report_outcome};
use crate::cli::DiagnosticsArgs;
use crate::errors::CliError;
use crate::ui::{self, OutputFormat};

/// Runs a single cycle and prints the annotated tree.
pub fn show(
    workspace_path: &Path,
    args: &DiagnosticsArgs,
    output_format: OutputFormat,
) -> Result<(), CliError> {
    ui::header("Workspace diagnostics");
    let mut session = open_session(workspace_path, args)?;

    session.decorator.setup();
    let outcome = session.decorator.refresh();
    report_outcome(&session.decorator, &outcome, output_format);
    Ok(())
}
