//! Sandboxed runtime bridge: request de-duplication, timeout bounds,
//! and a simulated host document serving module sources

use fluxo_config::{BridgeConfig, EngineConfig, LimitConfig};
use fluxo_core::bridge::{
    CollectingTransport, LoadState, ManualClock, ModuleBridge, ModuleMessage,
};
use fluxo_core::runtime::EventKind;
use fluxo_log::Logger;
use std::collections::HashMap;

fn new_bridge(timeout_ms: u64) -> (ModuleBridge, CollectingTransport, ManualClock) {
    let transport = CollectingTransport::new();
    let clock = ManualClock::new();
    let bridge = ModuleBridge::new(
        Box::new(transport.clone()),
        Box::new(clock.clone()),
        BridgeConfig {
            load_timeout_ms: timeout_ms,
        },
        EngineConfig::default(),
        LimitConfig::default(),
        Logger::noop(),
    );
    (bridge, transport, clock)
}

/// Simulated host document: answers every outstanding request from a
/// path -> source map until the queue is quiet
fn serve(bridge: &mut ModuleBridge, transport: &CollectingTransport, files: &[(&str, &str)]) {
    let sources: HashMap<&str, &str> = files.iter().copied().collect();
    loop {
        let requests = transport.take();
        if requests.is_empty() {
            break;
        }
        for message in requests {
            if let ModuleMessage::ModuleRequest { path } = message {
                match sources.get(path.as_str()) {
                    Some(code) => bridge.deliver(ModuleMessage::ModuleResponse {
                        path,
                        code: (*code).to_string(),
                    }),
                    None => bridge.deliver(ModuleMessage::ModuleError {
                        path,
                        error: "file not found".to_string(),
                    }),
                }
            }
        }
    }
}

fn logs(bridge: &ModuleBridge) -> Vec<String> {
    bridge
        .events()
        .iter()
        .filter(|e| e.kind == EventKind::Log)
        .map(|e| e.message.clone())
        .collect()
}

#[test]
fn test_entry_code_discovers_and_awaits_modules_lazily() {
    let (mut bridge, transport, _) = new_bridge(1000);
    bridge
        .execute_inline("import from \"/m\" { add }\nconsole.log(add(2, 3))")
        .unwrap();
    // Nothing has run yet; the module is in flight
    assert!(logs(&bridge).is_empty());
    assert_eq!(bridge.state("/m", None), LoadState::Pending);

    serve(
        &mut bridge,
        &transport,
        &[("/m.fxm", "module m { export function add(a, b) { return a + b } }")],
    );
    assert_eq!(logs(&bridge), vec!["5"]);
    assert_eq!(bridge.state("/m", None), LoadState::Loaded);
}

#[test]
fn test_transitive_dependency_chain_loads_in_cascade() {
    let (mut bridge, transport, _) = new_bridge(1000);
    bridge
        .execute_inline("import from \"/a\" { a }\nconsole.log(a())")
        .unwrap();
    serve(
        &mut bridge,
        &transport,
        &[
            (
                "/a.fxm",
                "import from \"/b\" { b }\nmodule a { export function a() { return \"a\" + b() } }",
            ),
            (
                "/b.fxm",
                "import from \"/c\" { c }\nmodule b { export function b() { return \"b\" + c() } }",
            ),
            ("/c.fxm", "module c { export function c() { return \"c\" } }"),
        ],
    );
    assert_eq!(logs(&bridge), vec!["abc"]);
}

#[test]
fn test_concurrent_references_produce_exactly_one_request() {
    let (mut bridge, transport, _) = new_bridge(1000);
    // Three different spellings of the same canonical path, while the
    // module is not yet loaded
    bridge.load_module("/shared", None);
    bridge.load_module("/shared.fxm", None);
    bridge.load_module("./shared", Some("/entry.fxo"));
    bridge.load_module("../shared", Some("/sub/mod.fxm"));
    assert_eq!(transport.request_count("/shared.fxm"), 1);
}

#[test]
fn test_diamond_dependency_requests_shared_module_once() {
    let (mut bridge, transport, _) = new_bridge(1000);
    bridge
        .execute_inline("import from \"/left\" { l }\nimport from \"/right\" { r }\nconsole.log(l() + r())")
        .unwrap();

    let sources = [
        (
            "/left.fxm",
            "import from \"/base\" { base }\nmodule left { export function l() { return base() } }",
        ),
        (
            "/right.fxm",
            "import from \"/base\" { base }\nmodule right { export function r() { return base() } }",
        ),
        ("/base.fxm", "module base { export function base() { return 1 } }"),
    ];
    serve(&mut bridge, &transport, &sources);

    assert_eq!(logs(&bridge), vec!["2"]);
    // All posted messages are recorded before take(); count via a replay
    let (mut bridge2, transport2, _) = new_bridge(1000);
    bridge2
        .execute_inline("import from \"/left\" { l }\nimport from \"/right\" { r }")
        .unwrap();
    // Answer only the first wave, leaving /base requests visible
    let first_wave = transport2.take();
    for message in first_wave {
        if let ModuleMessage::ModuleRequest { path } = message {
            let code = sources
                .iter()
                .find(|(p, _)| *p == path)
                .map(|(_, c)| *c)
                .unwrap();
            bridge2.deliver(ModuleMessage::ModuleResponse {
                path,
                code: code.to_string(),
            });
        }
    }
    assert_eq!(transport2.request_count("/base.fxm"), 1);
}

#[test]
fn test_timeout_is_not_early_and_not_late() {
    let (mut bridge, _, clock) = new_bridge(750);
    bridge.load_module("/m", None);

    clock.set(749);
    bridge.poll_timeouts();
    assert_eq!(
        bridge.state("/m", None),
        LoadState::Pending,
        "must not reject at timeout - 1ms"
    );

    clock.set(751);
    bridge.poll_timeouts();
    assert_eq!(
        bridge.state("/m", None),
        LoadState::Failed,
        "must reject at timeout + 1ms"
    );
    assert!(bridge
        .events()
        .iter()
        .any(|e| e.message.contains("ModuleLoadTimeoutError")));
}

#[test]
fn test_timeout_failure_frees_the_path_for_retry() {
    let (mut bridge, transport, clock) = new_bridge(100);
    bridge.load_module("/m", None);
    clock.set(200);
    bridge.poll_timeouts();
    assert_eq!(bridge.pending_count(), 0);

    // The next reference issues a fresh request
    assert_eq!(bridge.load_module("/m", None), LoadState::Pending);
    assert_eq!(transport.request_count("/m.fxm"), 2);
}

#[test]
fn test_awaiting_dependents_reject_in_turn() {
    let (mut bridge, transport, clock) = new_bridge(100);
    bridge
        .execute_inline("import from \"/a\" { x }\nconsole.log(\"never\")")
        .unwrap();

    // /a arrives but depends on /b, which never answers
    for message in transport.take() {
        if let ModuleMessage::ModuleRequest { path } = message {
            assert_eq!(path, "/a.fxm");
            bridge.deliver(ModuleMessage::ModuleResponse {
                path,
                code: "import from \"/b\" { y }\nmodule a { }".to_string(),
            });
        }
    }
    clock.set(150);
    bridge.poll_timeouts();

    assert_eq!(bridge.state("/b", None), LoadState::Failed);
    assert_eq!(bridge.state("/a", None), LoadState::Failed);
    assert!(logs(&bridge).is_empty(), "inline entry must not run");
    // Both the timeout and the cascaded failure are on the diagnostics
    // channel
    let errors: Vec<&str> = bridge
        .events()
        .iter()
        .filter(|e| e.kind == EventKind::Error)
        .map(|e| e.message.as_str())
        .collect();
    assert!(errors.iter().any(|m| m.contains("ModuleLoadTimeoutError")));
    assert!(errors.iter().any(|m| m.contains("dependency")));
}

#[test]
fn test_host_module_error_rejects_the_load() {
    let (mut bridge, transport, _) = new_bridge(1000);
    bridge
        .execute_inline("import from \"/missing\" { x }")
        .unwrap();
    serve(&mut bridge, &transport, &[]);
    assert_eq!(bridge.state("/missing", None), LoadState::Failed);
}

#[test]
fn test_module_cycle_over_the_bridge() {
    let (mut bridge, transport, _) = new_bridge(1000);
    bridge.load_module("/a", None);
    serve(
        &mut bridge,
        &transport,
        &[
            ("/a.fxm", "import from \"/b\" { x }\nmodule a { }"),
            ("/b.fxm", "import from \"/a\" { y }\nmodule b { }"),
        ],
    );
    assert!(bridge
        .events()
        .iter()
        .any(|e| e.message.contains("CyclicImportError")));
}

#[test]
fn test_inline_entry_runs_synchronously_without_cache() {
    let (mut bridge, transport, _) = new_bridge(1000);
    bridge
        .execute_inline("local x = 2 + 3\nconsole.log(\"x = \" + x)")
        .unwrap();
    assert_eq!(logs(&bridge), vec!["x = 5"]);
    assert!(transport.posted().is_empty());
}

#[test]
fn test_bridge_timers_interleave_with_module_loads() {
    let (mut bridge, transport, _) = new_bridge(1000);
    bridge
        .execute_inline(
            "wait(0.5) { console.log(\"timer\") }\nimport from \"/m\" { x }\nconsole.log(x)",
        )
        .unwrap();
    serve(
        &mut bridge,
        &transport,
        &[("/m.fxm", "module m { local x = 7\nexport { x } }")],
    );
    bridge.flush_timers();
    let messages: Vec<String> = bridge
        .events()
        .iter()
        .filter(|e| e.kind == EventKind::Log)
        .map(|e| e.message.clone())
        .collect();
    assert_eq!(messages, vec!["7", "timer"]);
}
