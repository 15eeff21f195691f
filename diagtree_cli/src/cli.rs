use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use diagtree_core::Severity;

use super::ui::OutputFormat;

/// Defines the top-level interface for the diagtree CLI with clap.
#[derive(Parser, Debug)]
#[command(name = "diagtree")]
#[command(version, about = "Diagtree: see which parts of a file tree have diagnostics.")]
pub struct DiagTreeCli {
    /// Path to the workspace directory (defaults to the current directory).
    #[arg(short, long, global = true, env = "DIAGTREE_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Enable verbose output?
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value_t = OutputFormat::default())]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: DiagTreeCommand,
}

/// Defines the available subcommands of the diagtree CLI.
#[derive(Subcommand, Debug, PartialEq)]
pub enum DiagTreeCommand {
    /// Run one diagnostics cycle and print the annotated tree.
    Show(DiagnosticsArgs),
    /// Re-run diagnostics whenever the diagnostic files change, until Ctrl-C.
    Watch {
        #[command(flatten)]
        diagnostics: DiagnosticsArgs,
        /// How often to check the diagnostic files for changes, in milliseconds.
        #[arg(long, default_value_t = 250)]
        poll_ms: u64,
    },
}

/// Where diagnostics come from and how they are shown.
#[derive(Args, Debug, Clone, PartialEq, Default)]
pub struct DiagnosticsArgs {
    /// JSON diagnostic list of a companion service. Preferred over --lsp while the file exists.
    #[arg(long, value_name = "FILE")]
    pub service: Option<PathBuf>,

    /// JSON array of LSP publishDiagnostics params.
    #[arg(long, value_name = "FILE")]
    pub lsp: Option<PathBuf>,

    /// Open a directory, or reveal a file, before rendering (can be repeated).
    #[arg(long = "open", value_name = "PATH")]
    pub open: Vec<PathBuf>,

    /// Roll severities up onto directories.
    #[arg(long)]
    pub show_on_dirs: bool,

    /// Do not roll severities up onto open directories.
    #[arg(long)]
    pub hide_on_open_dirs: bool,

    /// Least severe level to show (error, warning, info, hint).
    #[arg(long, value_name = "SEVERITY")]
    pub min_severity: Option<Severity>,

    /// Most severe level to show (error, warning, info, hint).
    #[arg(long, value_name = "SEVERITY")]
    pub max_severity: Option<Severity>,

    /// Debounce delay in milliseconds for watch mode.
    #[arg(long, value_name = "MS", allow_negative_numbers = true)]
    pub debounce: Option<i64>,

    /// Use ASCII markers instead of icon font glyphs.
    #[arg(long)]
    pub ascii: bool,
}
