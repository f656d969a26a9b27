// Integration tests for console routing and argument formatting

use std::cell::RefCell;
use std::rc::Rc;

use jsplay::console::{CaptureBuffer, Console, ConsoleSink, LogLevel, StreamSink};
use jsplay::interpreter::{run_source, ExecutionLimits};
use jsplay::session::SnippetSession;
use pretty_assertions::assert_eq;

/// Host sink that remembers the level of every line
#[derive(Default)]
struct LevelRecorder {
    lines: RefCell<Vec<(LogLevel, String)>>,
}

impl ConsoleSink for LevelRecorder {
    fn write_line(&self, level: LogLevel, line: &str) {
        self.lines.borrow_mut().push((level, line.to_string()));
    }
}

#[test]
fn test_console_methods_keep_their_level() {
    let host = Rc::new(LevelRecorder::default());
    let console = Console::from_shared(host.clone());

    let source = "console.info('i'); console.warn('w'); console.error('e'); console.debug('d')";
    run_source(source, console, ExecutionLimits::default()).unwrap();

    assert_eq!(
        *host.lines.borrow(),
        vec![
            (LogLevel::Info, "i".to_string()),
            (LogLevel::Warn, "w".to_string()),
            (LogLevel::Error, "e".to_string()),
            (LogLevel::Debug, "d".to_string()),
        ]
    );
}

#[test]
fn test_only_log_is_captured_by_a_session() {
    let host = Rc::new(LevelRecorder::default());
    let console = Console::from_shared(host.clone());
    let mut session = SnippetSession::new("console.warn('careful'); console.log('kept')", console);

    session.run().unwrap();

    assert_eq!(session.captured_output(), ["kept"]);
    assert_eq!(*host.lines.borrow(), vec![(LogLevel::Warn, "careful".to_string())]);
}

#[test]
fn test_argument_formatting() {
    let host = CaptureBuffer::new();
    let source = r#"
        console.log('s', 1.5, true, null, undefined);
        console.log({});
        console.log([]);
        console.log(new Error('oops'));
        console.log();
    "#;
    run_source(source, Console::new(host.clone()), ExecutionLimits::default()).unwrap();

    assert_eq!(
        host.lines(),
        vec![
            "s 1.5 true null undefined",
            "{}",
            "[]",
            "Error: oops",
            "",
        ]
    );
}

#[test]
fn test_stream_sink_writes_lines() {
    let sink = Rc::new(StreamSink::new(Vec::new()));
    let console = Console::from_shared(sink.clone());

    run_source("console.log('a'); console.log('b', 2)", console, ExecutionLimits::default()).unwrap();

    let sink = Rc::try_unwrap(sink).ok().expect("sink still shared");
    assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "a\nb 2\n");
}
