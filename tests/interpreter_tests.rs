// Integration tests for the snippet interpreter

use std::thread;

use jsplay::console::{CaptureBuffer, Console};
use jsplay::interpreter::{run_source, ExecutionLimits, RunError};
use pretty_assertions::assert_eq;

/// Lines written to the console by `source`
fn logs(source: &str) -> Vec<String> {
    let host = CaptureBuffer::new();
    let result = run_source(source, Console::new(host.clone()), ExecutionLimits::default());
    if let Err(err) = result {
        panic!("snippet failed: {}", err);
    }
    host.lines()
}

/// Single logged line
fn log1(source: &str) -> String {
    let mut lines = logs(source);
    assert_eq!(lines.len(), 1, "expected one line, got {:?}", lines);
    lines.remove(0)
}

/// Message of the error `source` fails with
fn error(source: &str) -> String {
    match run_source(source, Console::new(CaptureBuffer::new()), ExecutionLimits::default()) {
        Ok(outcome) => panic!("snippet succeeded with {:?}", outcome),
        Err(err) => err.message(),
    }
}

fn trailing(source: &str) -> Option<String> {
    run_source(source, Console::new(CaptureBuffer::new()), ExecutionLimits::default())
        .unwrap()
        .result
}

#[test]
fn test_arithmetic_and_number_formatting() {
    assert_eq!(log1("console.log(0.1 + 0.2)"), "0.30000000000000004");
    assert_eq!(log1("console.log(7 / 2, 7 % 3, 2 ** 10)"), "3.5 1 1024");
    assert_eq!(log1("console.log(1 / 0, -1 / 0, 0 / 0)"), "Infinity -Infinity NaN");
    assert_eq!(log1("console.log('3' * '4', '3' + 4, 3 + 4 + '5')"), "12 34 75");
}

#[test]
fn test_typeof_and_equality() {
    assert_eq!(
        log1("console.log(typeof 1, typeof 'a', typeof null, typeof undefined, typeof {}, typeof (() => 1))"),
        "number string object undefined object function"
    );
    assert_eq!(log1("console.log(typeof notDeclared)"), "undefined");
    assert_eq!(
        log1("console.log(1 == '1', 1 === '1', null == undefined, null === undefined, NaN === NaN)"),
        "true false true false false"
    );
}

#[test]
fn test_closures_keep_their_state() {
    let source = r#"
        function counter() {
            let count = 0;
            return () => ++count;
        }
        const a = counter();
        const b = counter();
        a(); a();
        console.log(a(), b());
    "#;
    assert_eq!(log1(source), "3 1");
}

#[test]
fn test_for_let_binds_per_iteration() {
    let source = r#"
        const fns = [];
        for (let i = 0; i < 3; i++) fns.push(() => i);
        console.log(fns.map(f => f()).join(','));
    "#;
    assert_eq!(log1(source), "0,1,2");
}

#[test]
fn test_function_declarations_are_hoisted() {
    assert_eq!(log1("console.log(square(9)); function square(x) { return x * x; }"), "81");
}

#[test]
fn test_binding_errors() {
    assert_eq!(error("console.log(x); let x = 1;"), "Cannot access 'x' before initialization");
    assert_eq!(error("const c = 1; c = 2;"), "Assignment to constant variable.");
    assert_eq!(error("missing + 1"), "missing is not defined");
}

#[test]
fn test_calling_non_functions() {
    assert_eq!(error("const o = {}; o.run()"), "o.run is not a function");
    assert_eq!(error("undefined.x"), "Cannot read properties of undefined (reading 'x')");
}

#[test]
fn test_builtins_can_be_shadowed() {
    assert_eq!(log1("let Math = 1; console.log(Math + 1)"), "2");
}

#[test]
fn test_control_flow() {
    let source = r#"
        const out = [];
        for (const n of [1, 2, 3, 4, 5, 6]) {
            if (n === 2) continue;
            if (n === 5) break;
            out.push(n);
        }
        let i = 0;
        do { i++; } while (i < 10);
        switch (i) {
            case 1: out.push('one');
            case 10: out.push('ten');
            case 11: out.push('fall');
                break;
            default: out.push('none');
        }
        console.log(out.join(' '));
    "#;
    assert_eq!(log1(source), "1 3 4 ten fall");
}

#[test]
fn test_try_catch_finally_order() {
    let source = r#"
        function f() {
            try {
                console.log('try');
                throw new TypeError('bad');
            } catch (e) {
                console.log('catch ' + e.name + ' ' + e.message);
                return 'from catch';
            } finally {
                console.log('finally');
            }
        }
        console.log(f());
    "#;
    assert_eq!(logs(source), ["try", "catch TypeError bad", "finally", "from catch"]);
}

#[test]
fn test_error_objects() {
    assert_eq!(
        log1("const e = new RangeError('out'); console.log(String(e), e instanceof RangeError, e instanceof Error)"),
        "RangeError: out true true"
    );
    assert_eq!(error("throw new TypeError('typed')"), "typed");
}

#[test]
fn test_string_methods() {
    assert_eq!(
        log1("console.log('Hello'.toUpperCase(), 'a,b,c'.split(',').length, '7'.padStart(3, '0'), ' x '.trim())"),
        "HELLO 3 007 x"
    );
    assert_eq!(
        log1("console.log('banana'.indexOf('n'), 'banana'.replaceAll('a', 'o'), 'abc'.at(-1))"),
        "2 bonono c"
    );
}

#[test]
fn test_array_methods() {
    let source = r#"
        const xs = [5, 1, 4, 2, 3];
        const sorted = xs.slice().sort((a, b) => a - b);
        const total = xs.reduce((acc, x) => acc + x, 0);
        const evens = xs.filter(x => x % 2 === 0).map(x => x * 10);
        console.log(sorted.join(','), total, evens.join(','), xs.includes(4), xs.indexOf(9));
    "#;
    assert_eq!(log1(source), "1,2,3,4,5 15 40,20 true -1");

    let source = r#"
        const ys = [1, 2, 3, 4];
        const removed = ys.splice(1, 2, 'a');
        console.log(ys.join('|'), removed.join('|'), [[1], [2, [3]]].flat().length);
    "#;
    assert_eq!(log1(source), "1|a|4 2|3 3");
}

#[test]
fn test_spread_and_optional_chaining() {
    let source = r#"
        const nums = [3, 9, 2];
        const merged = { ...{ a: 1 }, b: 2 };
        const user = { profile: null };
        console.log(Math.max(...nums), [...nums, 1].length, merged.b, user.profile?.name, user.profile?.name ?? 'anon');
    "#;
    assert_eq!(log1(source), "9 4 2 undefined anon");
}

#[test]
fn test_template_literals() {
    assert_eq!(log1("const n = 3; console.log(`n=${n}, twice=${n * 2}`)"), "n=3, twice=6");
}

#[test]
fn test_object_key_order_and_for_in() {
    let source = r#"
        const o = { b: 1, a: 2 };
        o.c = 3;
        const keys = [];
        for (const k in o) keys.push(k);
        console.log(keys.join(','), Object.keys(o).length, o.hasOwnProperty('a'), 'z' in o);
    "#;
    assert_eq!(log1(source), "b,a,c 3 true false");
}

#[test]
fn test_json_round_trip() {
    assert_eq!(
        log1(r#"console.log(JSON.stringify({ a: [1, 'x', null], b: undefined }))"#),
        r#"{"a":[1,"x",null]}"#
    );
    assert_eq!(log1(r#"console.log(JSON.parse('{"k": [1, 2]}').k[1])"#), "2");
    assert_eq!(error("JSON.parse('{bad')"), "Unexpected token b in JSON at position 1");
}

#[test]
fn test_cycles_in_log_and_json() {
    let source = "const o = { name: 'o' }; o.self = o; console.log(o)";
    assert_eq!(log1(source), "{\n  \"name\": \"o\",\n  \"self\": \"[Circular]\"\n}");

    let source = "const o = {}; o.self = o; JSON.stringify(o)";
    assert_eq!(error(source), "Converting circular structure to JSON");
}

#[test]
fn test_arrays_are_pretty_printed() {
    assert_eq!(log1("console.log([1, 'two'])"), "[\n  1,\n  \"two\"\n]");
    assert_eq!(log1("console.log([1, 2] + '')"), "1,2");
}

#[test]
fn test_number_helpers() {
    assert_eq!(
        log1("console.log((3.14159).toFixed(2), (255).toString(16), parseInt('42px'), Number('  8 '))"),
        "3.14 ff 42 8"
    );
}

#[test]
fn test_trailing_value() {
    assert_eq!(trailing("1 + 1"), Some("2".to_string()));
    assert_eq!(trailing("'text'"), Some("text".to_string()));
    assert_eq!(trailing("let a = 1;"), None);
    assert_eq!(trailing("undefined"), None);
}

#[test]
fn test_syntax_errors_do_not_run_anything() {
    let host = CaptureBuffer::new();
    let result = run_source(
        "console.log('early'); let = ;",
        Console::new(host.clone()),
        ExecutionLimits::default(),
    );
    assert!(matches!(result, Err(RunError::Syntax(_))));
    assert!(host.is_empty());
}

#[test]
fn test_step_budget() {
    let limits = ExecutionLimits {
        max_steps: Some(100),
        ..ExecutionLimits::default()
    };
    let result = run_source("for (;;) {}", Console::new(CaptureBuffer::new()), limits);
    assert!(matches!(result, Err(RunError::Halted(_))));

    let outcome = run_source("for (let i = 0; i < 10; i++) {}", Console::new(CaptureBuffer::new()), limits).unwrap();
    assert!(outcome.steps <= 100);
}

#[test]
fn test_runs_are_isolated() {
    let console = Console::new(CaptureBuffer::new());
    run_source("globalThis.leak = 1; var x = 2;", console.clone(), ExecutionLimits::default()).unwrap();
    let outcome = run_source("typeof leak + ' ' + typeof x", console, ExecutionLimits::default()).unwrap();
    assert_eq!(outcome.result.as_deref(), Some("undefined undefined"));
}

#[test]
fn test_functions_print_their_source_text() {
    assert_eq!(
        log1("console.log(function add(a, b) { return a + b; })"),
        "function add(a, b) { return a + b; }"
    );
    assert_eq!(log1("console.log(String(x => x * 2))"), "x => x * 2");
    assert_eq!(log1("console.log(`${(a, ...rest) => { return rest }}`)"), "(a, ...rest) => { return rest }");
    assert_eq!(log1("console.log(({ twice(n) { return n * 2 } }).twice)"), "twice(n) { return n * 2 }");

    let source = "function greet(name) {\n  return 'hi ' + name;\n}\nconsole.log(greet.toString())";
    assert_eq!(log1(source), "function greet(name) {\n  return 'hi ' + name;\n}");
}

#[test]
fn test_surrogate_pair_escapes() {
    assert_eq!(
        log1(r"console.log('\ud83d\ude00' === '😀', '\u{1F600}' === '😀')"),
        "true true"
    );
    assert_eq!(log1(r#"console.log(JSON.parse('"\\ud83d\\ude00"') === '😀')"#), "true");
}

#[test]
fn test_deep_values_are_bounded() {
    assert_eq!(
        error("JSON.parse('['.repeat(100000) + ']'.repeat(100000))"),
        "Maximum nesting depth exceeded in JSON at position 256"
    );

    let nest = "let a = 1; for (let i = 0; i < 1000; i++) a = [a];";
    assert_eq!(
        error(&format!("{} JSON.stringify(a)", nest)),
        "Maximum call stack size exceeded"
    );
    assert!(log1(&format!("{} console.log(a)", nest)).contains("\"[Array]\""));
}

#[test]
fn test_deep_join_and_flat_are_range_errors() {
    let nest = "let a = 1; for (let i = 0; i < 1000; i++) a = [a];";
    let messages = thread::Builder::new()
        .stack_size(256 * 1024 * 1024)
        .spawn(move || {
            [
                format!("{} String(a)", nest),
                format!("{} a.flat(Infinity)", nest),
            ]
            .map(|source| error(&source))
        })
        .expect("spawn interpreter thread")
        .join()
        .expect("interpreter thread panicked");

    assert_eq!(
        messages,
        ["Maximum call stack size exceeded", "Maximum call stack size exceeded"]
    );
}

#[test]
fn test_rebinding_keeps_the_first_binding() {
    let source = r#"
        function show(a, b) { return this.tag + a + b; }
        let f = show.bind({ tag: 'x' }, 1);
        for (let i = 0; i < 1000; i++) f = f.bind({ tag: 'y' });
        console.log(f(2), f.name.startsWith('bound bound'));
    "#;
    assert_eq!(log1(source), "x12 true");
}

