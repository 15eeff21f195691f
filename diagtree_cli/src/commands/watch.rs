//! Watch command: re-run diagnostics whenever the diagnostic files change.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use diagtree_core::{CycleOutcome, DiagnosticsUpdater};

use super::{LspFeed, Session, open_session, report_outcome};
use crate::cli::DiagnosticsArgs;
use crate::errors::CliError;
use crate::ui::{self, OutputFormat};

/// Watches the diagnostic files until Ctrl-C.
pub fn watch(
    workspace_path: &Path,
    args: &DiagnosticsArgs,
    output_format: OutputFormat,
    poll_ms: u64,
) -> Result<(), CliError> {
    ui::header("Watching workspace diagnostics");
    let session = open_session(workspace_path, args)?;

    let mut watched: Vec<PathBuf> = Vec::new();
    watched.extend(args.service.clone());
    watched.extend(args.lsp.clone());
    if watched.is_empty() {
        ui::error("Nothing to watch; pass --service or --lsp");
        return Err(CliError::InputError);
    }

    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        ui::error_with_details("Failed to create async runtime", &e.to_string());
        CliError::RuntimeError
    })?;

    rt.block_on(run(
        session,
        FileWatch::new(watched),
        output_format,
        Duration::from_millis(poll_ms.max(1)),
    ))
}

async fn run(
    session: Session,
    mut files: FileWatch,
    output_format: OutputFormat,
    poll: Duration,
) -> Result<(), CliError> {
    let Session { mut decorator, lsp } = session;
    decorator.setup();

    let updater = DiagnosticsUpdater::new(decorator).on_cycle(move |decorator, outcome| {
        if !matches!(outcome, CycleOutcome::Skipped) {
            report_outcome(decorator, outcome, output_format);
        }
    });
    updater.update();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut ticker = tokio::time::interval(poll);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    ui::error_with_details("Failed to listen for Ctrl-C", &e.to_string());
                }
                break;
            }
            _ = ticker.tick() => {
                let changed = files.changed();
                if changed.is_empty() {
                    continue;
                }
                for path in &changed {
                    ui::info(&format!("{} changed", path.display()));
                }
                if let Some(feed) = &lsp {
                    reload_if_changed(feed, &changed);
                }
                updater.update();
            }
        }
    }

    updater.cancel();
    updater.clear();
    ui::success("Stopped watching");
    Ok(())
}

fn reload_if_changed(feed: &LspFeed, changed: &[PathBuf]) {
    if changed.contains(&feed.path) {
        // Keep the previous diagnostics on a failed reload; the error is already printed.
        let _ = feed.reload();
    }
}

/// Modification times of a fixed set of files.
struct FileWatch {
    modified: HashMap<PathBuf, Option<SystemTime>>,
}

impl FileWatch {
    fn new(paths: Vec<PathBuf>) -> Self {
        let modified = paths
            .into_iter()
            .map(|path| {
                let time = modified_time(&path);
                (path, time)
            })
            .collect();
        Self { modified }
    }

    /// Paths whose modification time differs from the last check, including
    /// files that appeared or disappeared.
    fn changed(&mut self) -> Vec<PathBuf> {
        let mut changed = Vec::new();
        for (path, last) in self.modified.iter_mut() {
            let current = modified_time(path);
            if current != *last {
                *last = current;
                changed.push(path.clone());
            }
        }
        changed.sort();
        changed
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
