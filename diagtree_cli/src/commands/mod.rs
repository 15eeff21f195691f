mod show;
mod watch;

pub use show::show;
pub use watch::watch;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use diagtree_core::{
    CycleOutcome, DiagnosticIcons, DiagnosticsConfig, DiagnosticsDecorator, FileTree,
    JsonFileService, ServiceDiagnostics, SourceSet, load_config,
};
use diagtree_lsp::LspDiagnosticStore;

use crate::cli::DiagnosticsArgs;
use crate::errors::CliError;
use crate::render::{TerminalSink, annotation_reports};
use crate::ui::{self, OutputFormat};

/// Workspace configuration file, looked up in the workspace root.
pub const CONFIG_FILE: &str = "diagtree.json";

/// A decorator wired to the workspace tree and the requested sources.
pub struct Session {
    pub decorator: DiagnosticsDecorator<FileTree, TerminalSink>,
    pub lsp: Option<LspFeed>,
}

/// An LSP diagnostics file and the store it feeds.
pub struct LspFeed {
    pub path: PathBuf,
    pub store: Arc<LspDiagnosticStore>,
}

impl LspFeed {
    /// Replaces the store's contents with the file's. A missing file empties the
    /// store; a file that cannot be read or parsed leaves it untouched.
    pub fn reload(&self) -> Result<(), CliError> {
        if !self.path.is_file() {
            ui::debug(&format!("{} does not exist yet", self.path.display()));
            self.store.clear();
            return Ok(());
        }

        let text = fs::read_to_string(&self.path).map_err(|e| {
            ui::error_with_details(
                &format!("Failed to read '{}'", self.path.display()),
                &e.to_string(),
            );
            CliError::FileError
        })?;
        let loaded = self.store.replace_json(&text).map_err(|e| {
            ui::error_with_details(
                &format!("Failed to load LSP diagnostics from '{}'", self.path.display()),
                &e.to_string(),
            );
            CliError::InputError
        })?;
        ui::debug(&format!("Loaded diagnostics for {} documents", loaded));
        Ok(())
    }
}

/// Loads configuration, scans the workspace and wires up the sources.
pub fn open_session(workspace_path: &Path, args: &DiagnosticsArgs) -> Result<Session, CliError> {
    let root = fs::canonicalize(workspace_path).map_err(|e| {
        ui::error_with_details(
            &format!("Cannot open workspace '{}'", workspace_path.display()),
            &e.to_string(),
        );
        CliError::FileError
    })?;

    let config = resolve_config(&root, args)?;

    let mut tree = FileTree::scan(&root).map_err(|e| {
        ui::error_with_details("Failed to scan workspace", &e.to_string());
        CliError::FileError
    })?;
    for path in &args.open {
        let absolute = root.join(path);
        if !tree.reveal(&absolute.to_string_lossy()) {
            ui::warning(&format!("'{}' is not in the workspace", path.display()));
        }
    }

    let mut sources = SourceSet::new();
    if let Some(service) = &args.service {
        sources.push(Arc::new(ServiceDiagnostics::new(JsonFileService::new(
            service.clone(),
        ))));
    }
    let lsp = match &args.lsp {
        Some(path) => {
            let feed = LspFeed {
                path: path.clone(),
                store: Arc::new(LspDiagnosticStore::new()),
            };
            feed.reload()?;
            sources.push(feed.store.clone());
            Some(feed)
        }
        None => None,
    };
    if sources.is_empty() {
        ui::warning("No diagnostic source given; use --service or --lsp");
    }

    Ok(Session {
        decorator: DiagnosticsDecorator::new(config, sources, tree, TerminalSink::default()),
        lsp,
    })
}

/// Reads `diagtree.json` when present and applies command line overrides.
///
/// Without a config file the feature is enabled, since running the CLI is
/// asking for it.
pub fn resolve_config(root: &Path, args: &DiagnosticsArgs) -> Result<DiagnosticsConfig, CliError> {
    let config_path = root.join(CONFIG_FILE);
    let mut config = if config_path.is_file() {
        load_config(&config_path).map_err(|e| {
            ui::error_with_details(
                &format!("Invalid configuration in '{}'", config_path.display()),
                &e.to_string(),
            );
            CliError::ConfigError
        })?
    } else {
        DiagnosticsConfig {
            enable: true,
            ..Default::default()
        }
    };

    if args.show_on_dirs {
        config.show_on_dirs = true;
    }
    if args.hide_on_open_dirs {
        config.show_on_open_dirs = false;
    }
    if let Some(min) = args.min_severity {
        config.severity.min = min;
    }
    if let Some(max) = args.max_severity {
        config.severity.max = max;
    }
    if let Some(delay) = args.debounce {
        config.debounce_delay = delay;
    }
    if args.ascii {
        config.icons = DiagnosticIcons::ascii();
    }

    config.validate().map_err(|e| {
        ui::error_with_details("Invalid diagnostics settings", &e.to_string());
        CliError::InputError
    })?;
    Ok(config)
}

/// Prints the result of one cycle.
pub fn report_outcome(
    decorator: &DiagnosticsDecorator<FileTree, TerminalSink>,
    outcome: &CycleOutcome,
    format: OutputFormat,
) {
    match outcome {
        CycleOutcome::Disabled => {
            ui::warning(&format!("Diagnostics are disabled in {}", CONFIG_FILE));
        }
        CycleOutcome::Skipped => ui::debug("Tree not loaded, nothing to show"),
        CycleOutcome::Completed {
            source,
            annotations,
        } => {
            ui::success(&format!(
                "{} annotated lines from {}",
                annotations.len(),
                source.as_deref().unwrap_or("no source")
            ));
            match format {
                OutputFormat::Pretty => ui::raw_output(&decorator.sink().render(decorator.tree())),
                OutputFormat::Json => {
                    ui::json_output(&annotation_reports(decorator.tree(), annotations))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagtree_core::{Severity, SeverityRange, TreeView};
    use tempfile::TempDir;

    fn workspace(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (path, content) in files {
            let file_path = dir.path().join(path);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(file_path, content).unwrap();
        }
        dir
    }

    #[test]
    fn test_missing_config_file_enables_diagnostics() {
        let dir = workspace(&[]);

        let config = resolve_config(dir.path(), &DiagnosticsArgs::default()).unwrap();

        assert!(config.enable);
        assert!(!config.show_on_dirs);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = workspace(&[(
            CONFIG_FILE,
            r#"{ "enable": true, "show_on_dirs": false, "severity": { "min": "info" } }"#,
        )]);
        let args = DiagnosticsArgs {
            show_on_dirs: true,
            hide_on_open_dirs: true,
            max_severity: Some(Severity::Warning),
            debounce: Some(0),
            ..Default::default()
        };

        let config = resolve_config(dir.path(), &args).unwrap();

        assert!(config.show_on_dirs);
        assert!(!config.show_on_open_dirs);
        assert_eq!(
            config.severity,
            SeverityRange::new(Severity::Information, Severity::Warning)
        );
        assert_eq!(config.debounce_delay, 0);
    }

    #[test]
    fn test_disabled_config_file_is_respected() {
        let dir = workspace(&[(CONFIG_FILE, r#"{ "enable": false }"#)]);

        let config = resolve_config(dir.path(), &DiagnosticsArgs::default()).unwrap();

        assert!(!config.enable);
    }

    #[test]
    fn test_inverted_range_from_flags_is_rejected() {
        let dir = workspace(&[]);
        let args = DiagnosticsArgs {
            min_severity: Some(Severity::Error),
            max_severity: Some(Severity::Hint),
            ..Default::default()
        };

        assert_eq!(
            resolve_config(dir.path(), &args).unwrap_err(),
            CliError::InputError
        );
    }

    #[test]
    fn test_broken_config_file_is_an_error() {
        let dir = workspace(&[(CONFIG_FILE, "{ not json")]);

        assert_eq!(
            resolve_config(dir.path(), &DiagnosticsArgs::default()).unwrap_err(),
            CliError::ConfigError
        );
    }

    #[test]
    fn test_session_reads_lsp_file_and_marks_tree() {
        let dir = workspace(&[("src/main.rs", "fn main() {}"), ("README.md", "")]);
        let root = fs::canonicalize(dir.path()).unwrap();
        let uri = format!("file://{}", root.join("src/main.rs").to_string_lossy());
        let diagnostics = TempDir::new().unwrap();
        let lsp_path = diagnostics.path().join("lsp.json");
        fs::write(
            &lsp_path,
            serde_json::json!([{
                "uri": uri,
                "diagnostics": [{
                    "range": { "start": { "line": 0, "character": 0 },
                               "end": { "line": 0, "character": 2 } },
                    "severity": 1,
                    "message": "boom"
                }]
            }])
            .to_string(),
        )
        .unwrap();
        let args = DiagnosticsArgs {
            lsp: Some(lsp_path),
            show_on_dirs: true,
            ..Default::default()
        };

        let mut session = open_session(dir.path(), &args).unwrap();
        assert!(session.decorator.tree().is_valid());
        session.decorator.refresh();

        assert_eq!(session.decorator.sink().marker(0), Some(Severity::Error));
        assert_eq!(session.decorator.sink().marker(1), None);
        assert_eq!(session.lsp.unwrap().store.document_count(), 1);
    }

    #[test]
    fn test_lsp_reload_of_missing_file_empties_store() {
        let dir = TempDir::new().unwrap();
        let feed = LspFeed {
            path: dir.path().join("later.json"),
            store: Arc::new(LspDiagnosticStore::new()),
        };

        feed.reload().unwrap();

        assert_eq!(feed.store.document_count(), 0);
    }

    #[test]
    fn test_lsp_reload_of_malformed_file_keeps_diagnostics() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lsp.json");
        fs::write(
            &path,
            serde_json::json!([{
                "uri": "file:///p/a.rs",
                "diagnostics": [{
                    "range": { "start": { "line": 0, "character": 0 },
                               "end": { "line": 0, "character": 1 } },
                    "severity": 2,
                    "message": "unused"
                }]
            }])
            .to_string(),
        )
        .unwrap();
        let feed = LspFeed {
            path: path.clone(),
            store: Arc::new(LspDiagnosticStore::new()),
        };
        feed.reload().unwrap();
        assert_eq!(feed.store.document_count(), 1);

        fs::write(&path, "[{ half").unwrap();

        assert_eq!(feed.reload().unwrap_err(), CliError::InputError);
        assert_eq!(feed.store.document_count(), 1);
    }
}
