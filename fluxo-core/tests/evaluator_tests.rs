//! End-to-end evaluator tests: operator semantics, scoping, control
//! flow, and error recovery as observed through the event log

mod common;

use common::{error_messages, log_messages, run_script, run_units};
use fluxo_core::runtime::EventKind;

#[test]
fn test_plus_is_concatenation_when_either_side_is_textual() {
    let events = run_script(
        r#"
        console.log("I'm " + "Taylor")
        console.log(2 + 3)
        console.log("count: " + 2)
        console.log(2 + " apples")
        console.log("" + null)
        console.log("" + true)
        "#,
    );
    assert_eq!(
        log_messages(&events),
        vec!["I'm Taylor", "5", "count: 2", "2 apples", "null", "true"]
    );
}

#[test]
fn test_plus_rule_holds_inside_function_returns() {
    let events = run_script(
        r#"
        function greet(name) { return "Hello, " + name }
        console.log(greet("world"))
        console.log(greet(42))
        "#,
    );
    assert_eq!(log_messages(&events), vec!["Hello, world", "Hello, 42"]);
}

#[test]
fn test_number_formatting_drops_integer_decimal_point() {
    let events = run_script(
        r#"
        console.log(10 / 4)
        console.log(10 / 5)
        console.log(0.5 + 0.25)
        "#,
    );
    assert_eq!(log_messages(&events), vec!["2.5", "2", "0.75"]);
}

#[test]
fn test_comparison_semantics() {
    let events = run_script(
        r#"
        console.log(1 < 2)
        console.log("apple" < "banana")
        console.log("10" > 9)
        console.log("abc" < 9)
        console.log(5 == "5")
        console.log(5 != "6")
        "#,
    );
    assert_eq!(
        log_messages(&events),
        vec!["true", "true", "true", "false", "true", "true"]
    );
}

#[test]
fn test_control_flow() {
    let events = run_script(
        r#"
        local x = 7
        if (x > 10) {
            console.log("big")
        } else if (x > 5) {
            console.log("medium")
        } else {
            console.log("small")
        }

        local sum = 0
        for (local i = 1; i <= 3; i = i + 1) { sum = sum + i }
        console.log(sum)

        local n = 2
        while (n > 0) { n = n - 1 }
        console.log(n)
        "#,
    );
    assert_eq!(log_messages(&events), vec!["medium", "6", "0"]);
}

#[test]
fn test_closures_share_their_defining_scope() {
    let events = run_script(
        r#"
        function counter() {
            local count = 0
            function bump() {
                count = count + 1
                return count
            }
            return bump
        }
        local tick = counter()
        console.log(tick())
        console.log(tick())
        console.log(tick())
        "#,
    );
    assert_eq!(log_messages(&events), vec!["1", "2", "3"]);
}

#[test]
fn test_rest_parameter_collects_remaining_arguments() {
    let events = run_script(
        r#"
        function label(prefix, ...values) {
            return prefix + ": " + values
        }
        console.log(label("nums", 1, 2, 3))
        console.log(label("empty"))
        "#,
    );
    assert_eq!(log_messages(&events), vec!["nums: 1,2,3", "empty: "]);
}

#[test]
fn test_short_circuit_evaluation() {
    let events = run_script(
        r#"
        function boom() { missing_function() }
        console.log(false && boom())
        console.log(true || boom())
        "#,
    );
    // The right-hand sides never run, so no error events
    assert!(error_messages(&events).is_empty());
    assert_eq!(log_messages(&events), vec!["false", "true"]);
}

#[test]
fn test_reference_error_attribution() {
    let events = run_script("local a = 1\nconsole.log(missing)");
    let errors: Vec<_> = events
        .iter()
        .filter(|e| e.kind == EventKind::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("ReferenceError"));
    assert!(errors[0].message.contains("missing"));
    assert_eq!(errors[0].source_file.as_deref(), Some("/main.fxo"));
    assert_eq!(errors[0].line, Some(2));
}

#[test]
fn test_type_error_for_calling_non_function() {
    let events = run_script("local x = 5\nx(1)");
    let errors = error_messages(&events);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("TypeError"));
}

#[test]
fn test_errors_are_recoverable_per_file() {
    let events = run_units(&[
        ("/one.fxo", "console.log(\"one\")\nboom()"),
        ("/two.fxo", "console.log(\"two\")"),
        ("/three.fxo", "console.log(\"three\")"),
    ]);
    // Statements before the failure already emitted; siblings still run
    assert_eq!(log_messages(&events), vec!["one", "two", "three"]);
    assert_eq!(error_messages(&events).len(), 1);
}

#[test]
fn test_console_kinds_map_to_event_kinds() {
    let events = run_script(
        r#"
        console.log("info")
        console.warn("careful")
        console.error("broken")
        "#,
    );
    let kinds: Vec<EventKind> = events
        .iter()
        .filter(|e| e.kind != EventKind::Success)
        .map(|e| e.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![EventKind::Log, EventKind::Warning, EventKind::Error]
    );
}

#[test]
fn test_event_order_is_evaluation_order() {
    let events = run_script(
        r#"
        console.log("first")
        console.log("second")
        console.log("third")
        "#,
    );
    let ids: Vec<u64> = events.iter().map(|e| e.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
    assert_eq!(log_messages(&events), vec!["first", "second", "third"]);
}
