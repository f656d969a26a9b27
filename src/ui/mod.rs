//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into four layers:
//!
//! - **[`app`]** — application state, keyboard event loop, pane focus
//! - **[`editor`]** — the text buffer being edited
//! - **[`panes`]** — stateless render functions for each visible pane (editor,
//!   output, status bar)
//! - **[`theme`]** — centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with a
//! [`SnippetSession`] and call [`App::run`] to start the event loop.
//!
//! [`SnippetSession`]: crate::session::SnippetSession
//! [`App::run`]: app::App::run

pub mod app;
pub mod editor;
pub mod panes;
pub mod theme;

pub use app::App;
