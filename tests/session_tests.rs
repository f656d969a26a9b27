// Integration tests for the snippet session

use std::thread;

use jsplay::console::{CaptureBuffer, Console};
use jsplay::interpreter::ExecutionLimits;
use jsplay::session::{Display, RunStatus, SnippetSession, FALLBACK_MESSAGE};
use pretty_assertions::assert_eq;

/// Session whose real console records into the returned buffer
fn session_with_host(source: &str) -> (SnippetSession, CaptureBuffer, Console) {
    let host = CaptureBuffer::new();
    let console = Console::new(host.clone());
    let session = SnippetSession::new(source, console.clone());
    (session, host, console)
}

fn run_text(source: &str) -> String {
    let (mut session, _, _) = session_with_host(source);
    match session.run() {
        Ok(display) => display.text().to_string(),
        Err(failure) => format!("error: {}", failure),
    }
}

#[test]
fn test_single_log() {
    assert_eq!(run_text("console.log(2+2)"), "4");
}

#[test]
fn test_trailing_expression_value() {
    assert_eq!(run_text("let a=5; a+1"), "6");
}

#[test]
fn test_declaration_only_uses_fallback() {
    assert_eq!(run_text("let a=5;"), FALLBACK_MESSAGE);
    assert_eq!(FALLBACK_MESSAGE, "executed successfully (no output)");
}

#[test]
fn test_thrown_error_message() {
    let (mut session, _, _) = session_with_host("throw new Error('boom')");
    let failure = session.run().unwrap_err();

    assert_eq!(failure.message, "boom");
    assert_eq!(session.display(), Display::Error("boom".to_string()));
    assert!(session.captured_output().is_empty());
}

#[test]
fn test_three_logs_join_in_order() {
    assert_eq!(
        run_text("console.log(1); console.log(2); console.log(3)"),
        "1\n2\n3"
    );
}

#[test]
fn test_logs_take_precedence_over_trailing_value() {
    let (mut session, _, _) = session_with_host("console.log('x'); 42");
    assert_eq!(session.run(), Ok(Display::Output("x".to_string())));
    assert_eq!(session.last_result(), Some("42"));
}

#[test]
fn test_log_count_matches_calls_across_control_flow() {
    let source = r#"
        function visit(n) {
            if (n === 0) return;
            console.log('n=' + n);
            visit(n - 1);
        }
        for (let i = 0; i < 3; i++) {
            try {
                if (i === 1) throw 'skip';
                console.log('loop ' + i);
            } catch (e) {
                console.log('caught ' + e);
            }
        }
        visit(2);
    "#;
    let (mut session, _, _) = session_with_host(source);
    session.run().unwrap();

    assert_eq!(
        session.captured_output(),
        ["loop 0", "caught skip", "loop 2", "n=2", "n=1"]
    );
}

#[test]
fn test_objects_are_pretty_printed() {
    assert_eq!(
        run_text("console.log('obj', {a: 1, b: [true, null]})"),
        "obj {\n  \"a\": 1,\n  \"b\": [\n    true,\n    null\n  ]\n}"
    );
}

#[test]
fn test_reset_after_failure_restores_initial_snippet() {
    let initial = "throw new Error('boom')";
    let (mut session, _, _) = session_with_host(initial);
    session.run().unwrap_err();

    session.set_source("console.log('edited')");
    session.reset();

    assert_eq!(session.source(), initial);
    assert!(session.captured_output().is_empty());
    assert!(session.last_error().is_none());
    assert!(session.last_result().is_none());
    assert_eq!(session.display(), Display::Empty);
    assert_eq!(session.last_status(), RunStatus::Idle);
}

#[test]
fn test_console_restored_after_success_and_failure() {
    for source in ["console.log('inside')", "console.log('inside'); undefinedName"] {
        let (mut session, host, console) = session_with_host(source);
        let _ = session.run();

        assert!(!console.is_intercepted());
        assert!(host.is_empty(), "captured lines leaked to the host");

        console.log("after");
        assert_eq!(host.lines(), ["after"]);
    }
}

#[test]
fn test_other_console_methods_reach_host() {
    let (mut session, host, _) = session_with_host("console.error('bad'); console.log('good')");
    assert_eq!(session.run(), Ok(Display::Output("good".to_string())));
    assert_eq!(host.lines(), ["bad"]);
}

#[test]
fn test_partial_output_is_kept_but_not_displayed() {
    let (mut session, _, _) = session_with_host("console.log(1); console.log(2); null.length");
    let failure = session.run().unwrap_err();

    assert_eq!(failure.message, "Cannot read properties of null (reading 'length')");
    assert_eq!(session.partial_output(), ["1", "2"]);
    assert_eq!(session.display().text(), failure.message);
}

#[test]
fn test_run_is_idempotent() {
    let source = "const xs = [3, 1, 2]; console.log(xs.slice().sort().join(','))";
    let (mut session, _, _) = session_with_host(source);

    let first = session.run();
    let second = session.run();
    assert_eq!(first, second);
    assert_eq!(first, Ok(Display::Output("1,2,3".to_string())));
    assert_eq!(session.run_count(), 2);
}

#[test]
fn test_editing_does_not_run() {
    let (mut session, host, _) = session_with_host("");
    session.set_source("console.log('never')");

    assert_eq!(session.run_count(), 0);
    assert!(host.is_empty());
    assert_eq!(session.display(), Display::Empty);
}

#[test]
fn test_syntax_error_is_reported() {
    let (mut session, _, _) = session_with_host("let = 3");
    let failure = session.run().unwrap_err();
    assert!(!failure.message.is_empty());
    assert_eq!(session.last_status(), RunStatus::Failed);
}

#[test]
fn test_thrown_primitive_message() {
    assert_eq!(run_text("throw 42"), "error: 42");
}

#[test]
fn test_step_limit_halts_infinite_loop() {
    let (session, _, _) = session_with_host("let n = 0; while (true) { n++; }");
    let mut session = session.with_limits(ExecutionLimits {
        max_steps: Some(10_000),
        ..ExecutionLimits::default()
    });

    let failure = session.run().unwrap_err();
    assert_eq!(failure.message, "execution step limit exceeded");
}

#[test]
fn test_runaway_recursion_is_a_range_error() {
    let (session, _, _) = session_with_host("function f() { return f(); } f()");
    let mut session = session.with_limits(ExecutionLimits {
        max_call_depth: 20,
        max_steps: None,
    });

    let failure = session.run().unwrap_err();
    assert_eq!(failure.message, "Maximum call stack size exceeded");
}

#[test]
fn test_recursion_error_can_be_caught() {
    let source = r#"
        function f() { return f(); }
        try { f(); } catch (e) { console.log(e.name); }
    "#;
    let (session, _, _) = session_with_host(source);
    let mut session = session.with_limits(ExecutionLimits {
        max_call_depth: 20,
        max_steps: None,
    });

    assert_eq!(session.run(), Ok(Display::Output("RangeError".to_string())));
}

#[test]
fn test_empty_error_messages_fall_back_to_the_error_name() {
    assert_eq!(run_text("throw new Error()"), "error: Error");
    assert_eq!(run_text("throw new TypeError()"), "error: TypeError");
    assert_eq!(run_text("throw new RangeError('')"), "error: RangeError");
}

#[test]
fn test_thrown_empty_string_has_a_message() {
    assert_eq!(run_text("throw ''"), "error: Uncaught ''");
}

#[test]
fn test_thrown_plain_object_uses_its_message() {
    assert_eq!(run_text("throw { message: 'custom failure' }"), "error: custom failure");
    assert_eq!(run_text("throw { code: 7 }"), "error: [object Object]");
    assert_eq!(
        run_text("throw { toString() { return 'described' } }"),
        "error: described"
    );
}

#[test]
fn test_deep_nesting_fails_cleanly_on_a_default_stack() {
    let messages = thread::spawn(|| {
        let sources = [
            format!("{}1{}", "(".repeat(200), ")".repeat(200)),
            format!("{}{}", "[".repeat(200_000), "]".repeat(200_000)),
            format!("{}1", "- ".repeat(100_000)),
            format!("{}{}", "{".repeat(50_000), "}".repeat(50_000)),
            format!("{}x{}", "`${".repeat(500), "}`".repeat(500)),
        ];
        sources
            .iter()
            .map(|source| {
                let (mut session, _, _) = session_with_host(source);
                session.run().map_err(|failure| failure.message)
            })
            .collect::<Vec<_>>()
    })
    .join()
    .expect("nested input overflowed the stack");

    for message in messages {
        let message = message.unwrap_err();
        assert!(message.contains("Maximum nesting depth exceeded"), "{}", message);
    }
}

#[test]
fn test_moderate_nesting_still_runs() {
    let source = format!("console.log({}1{})", "(".repeat(20), ")".repeat(20));
    assert_eq!(run_text(&source), "1");

    let source = format!("console.log(JSON.stringify({}{}))", "[".repeat(20), "]".repeat(20));
    assert_eq!(run_text(&source), format!("{}{}", "[".repeat(20), "]".repeat(20)));
}

#[test]
fn test_evaluator_depth_is_a_catchable_range_error() {
    let source = r#"
        function dive(n) { return dive(n + 1); }
        try { dive(0); } catch (e) { console.log(e.name + ': ' + e.message); }
    "#;
    let result = thread::Builder::new()
        .stack_size(256 * 1024 * 1024)
        .spawn(move || {
            let (session, _, _) = session_with_host(source);
            let mut session = session.with_limits(ExecutionLimits {
                max_call_depth: 1_000_000,
                max_steps: None,
            });
            session.run()
        })
        .expect("spawn interpreter thread")
        .join()
        .expect("interpreter thread panicked");

    assert_eq!(
        result,
        Ok(Display::Output(
            "RangeError: Maximum call stack size exceeded".to_string()
        ))
    );
}
