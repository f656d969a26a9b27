//! Command-line interface

use std::fs;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::interpreter::constants::DEFAULT_MAX_CALL_DEPTH;
use crate::interpreter::ExecutionLimits;
use crate::session::RunnerConfig;

/// Snippet loaded when neither a file nor `-e` is given
pub const WELCOME_SNIPPET: &str = r#"// Welcome to jsplay!
// Edit this snippet, then press Ctrl-R (or F5) to run it.

function greet(name) {
    return `Hello, ${name}!`;
}

const langs = ['JavaScript', 'Rust'];
langs.forEach(lang => console.log(greet(lang)));

console.log({ answer: 6 * 7, squares: [1, 2, 3].map(n => n * n) });
"#;

#[derive(Parser, Debug)]
#[command(name = "jsplay")]
#[command(about = "Run JavaScript snippets and see what they log")]
#[command(version)]
pub struct Cli {
    /// Snippet file to open
    #[arg(conflicts_with = "eval")]
    pub file: Option<PathBuf>,

    /// Snippet source given inline
    #[arg(short = 'e', long = "eval", value_name = "CODE")]
    pub eval: Option<String>,

    /// Title shown in the editor and status bar
    #[arg(long)]
    pub title: Option<String>,

    /// Run once and print the result instead of opening the editor
    #[arg(long)]
    pub batch: bool,

    /// Maximum nesting of script function calls
    #[arg(long, env = "JSPLAY_MAX_CALL_DEPTH", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    pub max_call_depth: usize,

    /// Abort a run after this many evaluation steps
    #[arg(long, env = "JSPLAY_MAX_STEPS")]
    pub max_steps: Option<u64>,

    /// Append logs to this file while the editor is open
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read '{path}': {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Cli {
    /// The initial snippet: `-e`, then the file, then the welcome snippet
    pub fn load_source(&self) -> Result<String, CliError> {
        if let Some(code) = &self.eval {
            return Ok(code.clone());
        }
        match &self.file {
            Some(path) => fs::read_to_string(path).map_err(|source| CliError::ReadSource {
                path: path.clone(),
                source,
            }),
            None => Ok(WELCOME_SNIPPET.to_string()),
        }
    }

    /// Title from `--title`, falling back to the file name
    pub fn display_title(&self) -> Option<String> {
        self.title.clone().or_else(|| {
            self.file
                .as_ref()
                .and_then(|path| path.file_name())
                .map(|name| name.to_string_lossy().into_owned())
        })
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            limits: ExecutionLimits {
                max_call_depth: self.max_call_depth,
                max_steps: self.max_steps,
            },
            title: self.display_title(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["jsplay"]).unwrap();
        assert!(!cli.batch);
        assert_eq!(cli.load_source().unwrap(), WELCOME_SNIPPET);
        assert_eq!(cli.runner_config().title, None);
    }

    #[test]
    fn test_eval_and_limits() {
        let cli = Cli::try_parse_from([
            "jsplay",
            "-e",
            "1+1",
            "--batch",
            "--max-call-depth",
            "50",
            "--max-steps",
            "1000",
            "--title",
            "sum",
        ])
        .unwrap();

        assert_eq!(cli.load_source().unwrap(), "1+1");
        let config = cli.runner_config();
        assert_eq!(config.limits.max_call_depth, 50);
        assert_eq!(config.limits.max_steps, Some(1000));
        assert_eq!(config.title.as_deref(), Some("sum"));
    }

    #[test]
    fn test_title_falls_back_to_file_name() {
        let cli = Cli::try_parse_from(["jsplay", "snippets/demo.js"]).unwrap();
        assert_eq!(cli.display_title().as_deref(), Some("demo.js"));
        assert!(matches!(cli.load_source(), Err(CliError::ReadSource { .. })));
    }

    #[test]
    fn test_file_conflicts_with_eval() {
        assert!(Cli::try_parse_from(["jsplay", "a.js", "-e", "1"]).is_err());
    }
}
