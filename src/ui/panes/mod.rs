//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`editor`]: Snippet source with syntax highlighting and the edit cursor
//! - [`output`]: Captured output, trailing value or error of the last run
//! - [`status`]: Status bar with keybindings and run state
//!
//! Each pane module exports a primary `render_*_pane()` (or
//! `render_status_bar()`) function. Panes are stateless apart from the
//! scroll offsets the app passes in.

pub mod editor;
pub mod output;
pub mod status;

// Re-export render functions for convenience
pub use editor::render_editor_pane;
pub use output::render_output_pane;
pub use status::{render_status_bar, StatusRenderData};
