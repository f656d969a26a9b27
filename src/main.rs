// jsplay: JavaScript snippet playground for the terminal

use std::error::Error;
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::thread;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use jsplay::cli::Cli;
use jsplay::console::{Console, StreamSink, TracingSink};
use jsplay::logging::{self, LogTarget};
use jsplay::session::SnippetSession;
use jsplay::ui::App;

/// Deeply recursive snippets walk the AST recursively
const INTERPRETER_STACK_SIZE: usize = 256 * 1024 * 1024;

fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();

    let worker = thread::Builder::new()
        .name("jsplay".to_string())
        .stack_size(INTERPRETER_STACK_SIZE)
        .spawn(move || run(cli).map_err(|err| err.to_string()))?;

    match worker.join() {
        Ok(Ok(code)) => Ok(code),
        Ok(Err(message)) => Err(message.into()),
        Err(_) => Err("interpreter thread panicked".into()),
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let source = cli.load_source()?;
    let config = cli.runner_config();

    if cli.batch || !io::stdout().is_terminal() {
        logging::init(LogTarget::Stderr)?;
        let console = Console::new(StreamSink::new(io::stdout()));
        let mut session = SnippetSession::with_config(source, console, config);

        return match session.run() {
            Ok(display) => {
                println!("{}", display.text());
                Ok(ExitCode::SUCCESS)
            }
            Err(failure) => {
                eprintln!("Error: {}", failure);
                Ok(ExitCode::FAILURE)
            }
        };
    }

    match &cli.log_file {
        Some(path) => logging::init(LogTarget::File(path))?,
        None => logging::init(LogTarget::Discard)?,
    }
    let session = SnippetSession::with_config(source, Console::new(TracingSink), config);

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(ExitCode::SUCCESS)
}
