//! Native diagnostic source for diagtree.
//!
//! Stores what language servers publish through
//! `textDocument/publishDiagnostics` and exposes it as a
//! [`diagtree_core::DiagnosticSource`].

mod store;
pub mod uri;

pub use store::LspDiagnosticStore;
