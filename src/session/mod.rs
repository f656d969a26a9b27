//! The snippet session: editable source, one run at a time, and what to show
//!
//! A [`SnippetSession`] owns the source text being edited, remembers the
//! snippet it started from, and keeps the outcome of the most recent run.
//!
//! # Run lifecycle
//!
//! `Idle → Running → {Succeeded | Failed} → Idle`
//!
//! For the duration of [`SnippetSession::run`] the `console.log` slot of the
//! host [`Console`] is redirected into a private buffer. The redirection is
//! held by a guard, so the host's logging is back in place when `run`
//! returns, whatever the snippet did.
//!
//! # What is displayed
//!
//! After a run exactly one of these is shown (see [`Display`]):
//! 1. the error message, if the run failed
//! 2. the captured log lines, joined with `\n`
//! 3. the trailing expression value
//! 4. [`FALLBACK_MESSAGE`]

use std::rc::Rc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::console::{CaptureBuffer, Console};
use crate::interpreter::{run_source, ExecutionLimits};

/// Shown after a successful run that neither logged nor produced a value
pub const FALLBACK_MESSAGE: &str = "executed successfully (no output)";

/// The only failure the shell ever sees: the message text of whatever went wrong
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExecutionFailure {
    pub message: String,
}

/// Outcome of the most recent run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStatus {
    /// Nothing has run since creation or the last reset
    #[default]
    Idle,
    Succeeded,
    Failed,
}

impl RunStatus {
    pub fn label(self) -> &'static str {
        match self {
            RunStatus::Idle => "idle",
            RunStatus::Succeeded => "ok",
            RunStatus::Failed => "error",
        }
    }
}

/// What the output pane shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Display {
    /// Not run yet
    Empty,
    /// Captured `console.log` lines, joined with newlines
    Output(String),
    /// The trailing expression value, when nothing was logged
    Result(String),
    /// Success without output or value
    NoOutput,
    Error(String),
}

impl Display {
    /// Text for the output pane
    pub fn text(&self) -> &str {
        match self {
            Display::Empty => "",
            Display::Output(text) | Display::Result(text) | Display::Error(text) => text,
            Display::NoOutput => FALLBACK_MESSAGE,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Display::Error(_))
    }
}

/// Run settings chosen by the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunnerConfig {
    pub limits: ExecutionLimits,
    pub title: Option<String>,
}

/// Editable snippet plus the outcome of its last run
#[derive(Debug)]
pub struct SnippetSession {
    initial: String,
    source: String,
    title: Option<String>,
    console: Console,
    limits: ExecutionLimits,

    captured_output: Vec<String>,
    /// Lines logged before a failure; kept, never displayed
    partial_output: Vec<String>,
    last_result: Option<String>,
    last_error: Option<ExecutionFailure>,

    status: RunStatus,
    run_count: u64,
    last_duration: Option<Duration>,
}

impl SnippetSession {
    /// Start a session on `initial`, logging through `console`
    pub fn new(initial: impl Into<String>, console: Console) -> Self {
        let initial = initial.into();
        SnippetSession {
            source: initial.clone(),
            initial,
            title: None,
            console,
            limits: ExecutionLimits::default(),
            captured_output: Vec::new(),
            partial_output: Vec::new(),
            last_result: None,
            last_error: None,
            status: RunStatus::Idle,
            run_count: 0,
            last_duration: None,
        }
    }

    pub fn with_config(initial: impl Into<String>, console: Console, config: RunnerConfig) -> Self {
        let mut session = Self::new(initial, console);
        session.title = config.title;
        session.limits = config.limits;
        session
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_limits(mut self, limits: ExecutionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Replace the source text. Nothing runs and the previous outcome stays.
    pub fn set_source(&mut self, text: impl Into<String>) {
        self.source = text.into();
    }

    /// The snippet the session was created with
    pub fn initial_source(&self) -> &str {
        &self.initial
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Execute the current source.
    ///
    /// On success returns what to display; on failure the error is also kept
    /// as the session's last error.
    pub fn run(&mut self) -> Result<Display, ExecutionFailure> {
        let span = tracing::info_span!(
            "run",
            title = self.title.as_deref().unwrap_or("snippet"),
            source_len = self.source.len(),
        );
        let _enter = span.enter();

        self.clear_outcome();
        self.run_count += 1;

        let buffer = CaptureBuffer::new();
        let started = Instant::now();
        let result = {
            let _guard = self.console.intercept_log(Rc::new(buffer.clone()));
            run_source(&self.source, self.console.clone(), self.limits)
        };
        let elapsed = started.elapsed();
        self.last_duration = Some(elapsed);

        match result {
            Ok(outcome) => {
                self.captured_output = buffer.take();
                self.last_result = outcome.result;
                self.status = RunStatus::Succeeded;
                tracing::debug!(
                    lines = self.captured_output.len(),
                    steps = outcome.steps,
                    elapsed_us = elapsed.as_micros() as u64,
                    "run complete"
                );
                Ok(self.display())
            }
            Err(err) => {
                self.partial_output = buffer.take();
                let failure = ExecutionFailure {
                    message: err.message(),
                };
                tracing::warn!(
                    error = %err,
                    partial_lines = self.partial_output.len(),
                    "run failed"
                );
                self.last_error = Some(failure.clone());
                self.status = RunStatus::Failed;
                Err(failure)
            }
        }
    }

    /// Back to the initial snippet with no output
    pub fn reset(&mut self) {
        self.source = self.initial.clone();
        self.clear_outcome();
        self.status = RunStatus::Idle;
        tracing::debug!("session reset");
    }

    fn clear_outcome(&mut self) {
        self.captured_output.clear();
        self.partial_output.clear();
        self.last_result = None;
        self.last_error = None;
    }

    /// What the output pane should show now
    pub fn display(&self) -> Display {
        if let Some(error) = &self.last_error {
            return Display::Error(error.message.clone());
        }
        if self.status == RunStatus::Idle {
            return Display::Empty;
        }
        if !self.captured_output.is_empty() {
            return Display::Output(self.captured_output.join("\n"));
        }
        match &self.last_result {
            Some(value) => Display::Result(value.clone()),
            None => Display::NoOutput,
        }
    }

    pub fn captured_output(&self) -> &[String] {
        &self.captured_output
    }

    pub fn partial_output(&self) -> &[String] {
        &self.partial_output
    }

    pub fn last_result(&self) -> Option<&str> {
        self.last_result.as_deref()
    }

    pub fn last_error(&self) -> Option<&ExecutionFailure> {
        self.last_error.as_ref()
    }

    pub fn last_status(&self) -> RunStatus {
        self.status
    }

    pub fn run_count(&self) -> u64 {
        self.run_count
    }

    pub fn last_duration(&self) -> Option<Duration> {
        self.last_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(source: &str) -> SnippetSession {
        SnippetSession::new(source, Console::new(CaptureBuffer::new()))
    }

    #[test]
    fn test_display_before_first_run_is_empty() {
        let session = session("1 + 1");
        assert_eq!(session.display(), Display::Empty);
        assert_eq!(session.display().text(), "");
        assert_eq!(session.last_status(), RunStatus::Idle);
    }

    #[test]
    fn test_set_source_keeps_previous_outcome() {
        let mut session = session("console.log('a')");
        session.run().unwrap();
        session.set_source("throw 1");

        assert_eq!(session.source(), "throw 1");
        assert_eq!(session.display(), Display::Output("a".to_string()));
        assert_eq!(session.run_count(), 1);
    }

    #[test]
    fn test_failure_clears_output_and_keeps_partial() {
        let mut session = session("console.log('before'); null.x");
        let err = session.run().unwrap_err();

        assert_eq!(err.message, "Cannot read properties of null (reading 'x')");
        assert!(session.captured_output().is_empty());
        assert_eq!(session.partial_output(), ["before"]);
        assert!(session.display().is_error());
        assert_eq!(session.last_status(), RunStatus::Failed);
    }

    #[test]
    fn test_success_after_failure_clears_error() {
        let mut session = session("throw new Error('x')");
        assert!(session.run().is_err());

        session.set_source("'fine'");
        assert_eq!(session.run(), Ok(Display::Result("fine".to_string())));
        assert!(session.last_error().is_none());
        assert!(session.last_duration().is_some());
    }

    #[test]
    fn test_config_applies_title_and_limits() {
        let config = RunnerConfig {
            limits: ExecutionLimits {
                max_call_depth: 10,
                max_steps: Some(50),
            },
            title: Some("loops".to_string()),
        };
        let mut session =
            SnippetSession::with_config("while (true) {}", Console::new(CaptureBuffer::new()), config);

        assert_eq!(session.title(), Some("loops"));
        let err = session.run().unwrap_err();
        assert_eq!(err.message, "execution step limit exceeded");
    }
}
