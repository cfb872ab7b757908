use std::sync::atomic::Ordering;
use std::sync::Arc;

use actiondispatch::cors::{AllowOrigin, MaxAge};
use actiondispatch::handler::RouteSummaryCollector;
use actiondispatch::{
    ActionRequest, ActionResult, AfterInterceptorChain, AppConfig, ControllerAction, CorsSpec,
    DispatchError, Dispatcher, HandlerRegistry, RouteEntry, RouteTable,
};
use http::Method;
use serde_json::json;

mod common;
use common::handlers::{CountingInvoker, Recorder};

const CONFIG: &str = r#"
routes:
  - handler: list_pets
    controller:
      allow_origin: https://app.example.com
      max_age: 600
    action:
      expose_headers: X-Total-Count
      allow_headers: true
    allowed_methods: [GET, OPTIONS]
    session_free: true
    express: true
    interceptors: [audit, etag]
  - handler: admin
    controller:
      allow_origin: true
    action:
      disable: true
  - handler: plain
"#;

fn registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register_action("list_pets", |_ctx| Ok(ActionResult::ok(json!([]))));
    registry.register_action("admin", |_ctx| Ok(ActionResult::ok(json!({"ok": true}))));
    registry.register_action("plain", |ctx| {
        let method = ctx.req().method()?;
        Ok(ActionResult::ok(json!({
            "method": method.as_str(),
            "secure": ctx.req().secure(),
        })))
    });
    registry.register_interceptor("etag", || Box::new(Recorder::new("etag", 10)));
    registry.register_interceptor("audit", || Box::new(Recorder::new("audit", 1)));
    registry
}

fn dispatcher() -> Dispatcher {
    Dispatcher::from_config(AppConfig::from_yaml_str(CONFIG).unwrap(), &registry()).unwrap()
}

#[test]
fn test_actual_request_gets_origin_only() {
    let dispatcher = dispatcher();
    let mut ctx = dispatcher.context(ActionRequest::new(Method::GET, "/pets"));
    let result = dispatcher.dispatch("list_pets", &mut ctx).unwrap();
    let resp = ctx.into_response(result);

    assert_eq!(
        resp.header("Access-Control-Allow-Origin"),
        Some("https://app.example.com")
    );
    assert_eq!(resp.header("Access-Control-Allow-Methods"), None);
    assert_eq!(resp.header("Access-Control-Max-Age"), None);
    assert_eq!(resp.header("Access-Control-Expose-Headers"), None);
    // interceptors ran in priority order
    assert_eq!(resp.body, json!(["audit", "etag"]));
}

#[test]
fn test_preflight_via_override_gets_every_header() {
    let dispatcher = dispatcher();
    let mut ctx = dispatcher.context(
        ActionRequest::new(Method::POST, "/pets").with_header("X-HTTP-Method-Override", "options"),
    );
    let result = dispatcher.dispatch("list_pets", &mut ctx).unwrap();
    let resp = ctx.into_response(result);

    assert_eq!(
        resp.header("access-control-allow-origin"),
        Some("https://app.example.com")
    );
    assert_eq!(resp.header("access-control-allow-methods"), Some("GET, OPTIONS"));
    assert_eq!(resp.header("access-control-expose-headers"), Some("X-Total-Count"));
    assert_eq!(resp.header("access-control-allow-headers"), Some("*"));
    assert_eq!(resp.header("access-control-max-age"), Some("600"));
}

#[test]
fn test_disabled_route_writes_nothing() {
    let dispatcher = dispatcher();
    let mut ctx = dispatcher.context(ActionRequest::new(Method::OPTIONS, "/admin"));
    let result = dispatcher.dispatch("admin", &mut ctx).unwrap();
    assert!(ctx.cors_disabled());
    let resp = ctx.into_response(result);
    assert_eq!(resp.header("access-control-allow-origin"), None);
    assert_eq!(resp.body, json!({"ok": true}));
}

#[test]
fn test_route_without_cors_sees_resolved_facts() {
    let dispatcher = dispatcher();
    let mut ctx = dispatcher.context(
        ActionRequest::new(Method::POST, "/plain?_method=delete").with_header("X-Forwarded-Proto", "https"),
    );
    let result = dispatcher.dispatch("plain", &mut ctx).unwrap();
    assert!(!ctx.cors_disabled());
    let resp = ctx.into_response(result);
    assert_eq!(resp.body, json!({"method": "DELETE", "secure": true}));
    assert!(resp.headers.is_empty());
}

#[test]
fn test_interceptor_spec_wins_over_action_spec() {
    let mut registry = HandlerRegistry::new();
    registry.register_action("pets", |_ctx| Ok(ActionResult::ok(json!([]))));
    registry.register_interceptor("gate", || {
        Box::new(Recorder::new("gate", 0).with_cors(
            CorsSpec::builder()
                .with_allow_origin(Some(AllowOrigin("https://gate.example.com".into())))
                .with_max_age(Some(MaxAge(5)))
                .build(),
        ))
    });
    let config = AppConfig::from_yaml_str(
        r#"
routes:
  - handler: pets
    action:
      allow_origin: https://action.example.com
      max_age: 900
      allow_headers: X-Custom
    interceptors: [gate]
"#,
    )
    .unwrap();
    let dispatcher = Dispatcher::from_config(config, &registry).unwrap();

    let mut ctx = dispatcher.context(ActionRequest::new(Method::OPTIONS, "/pets"));
    let result = dispatcher.dispatch("pets", &mut ctx).unwrap();
    let resp = ctx.into_response(result);

    // chain is first-writer-wins; fields the interceptor leaves out still come through
    assert_eq!(
        resp.header("access-control-allow-origin"),
        Some("https://gate.example.com")
    );
    assert_eq!(resp.header("access-control-max-age"), Some("5"));
    assert_eq!(resp.header("access-control-allow-headers"), Some("X-Custom"));
}

#[test]
fn test_action_failure_propagates_unchanged() {
    #[derive(Debug, PartialEq)]
    struct Teapot;
    impl std::fmt::Display for Teapot {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "I'm a teapot")
        }
    }
    impl std::error::Error for Teapot {}

    let mut registry = HandlerRegistry::new();
    registry.register_action("brew", |_ctx| Err(Teapot.into()));
    let config = AppConfig::from_yaml_str("routes:\n  - handler: brew\n").unwrap();
    let dispatcher = Dispatcher::from_config(config, &registry).unwrap();

    let mut ctx = dispatcher.context(ActionRequest::new(Method::GET, "/"));
    let err = dispatcher.dispatch("brew", &mut ctx).unwrap_err();
    assert_eq!(err.downcast_ref::<Teapot>(), Some(&Teapot));
}

#[test]
fn test_unknown_route() {
    let dispatcher = dispatcher();
    let mut ctx = dispatcher.context(ActionRequest::new(Method::GET, "/"));
    let err = dispatcher.dispatch("nope", &mut ctx).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DispatchError>(),
        Some(DispatchError::HandlerNotFound { .. })
    ));
}

#[test]
fn test_concurrent_dispatch_then_reload_releases_once() {
    let invoker = CountingInvoker::new("count");
    let calls = Arc::clone(&invoker.calls);
    let action_destroyed = Arc::clone(&invoker.destroyed);
    let recorder = Recorder::new("rec", 0);
    let interceptor_destroyed = Arc::clone(&recorder.destroyed);

    let mut table = RouteTable::new();
    table.register(
        RouteEntry::new(
            ControllerAction::new(Box::new(invoker)),
            AfterInterceptorChain::from_interceptors(vec![Box::new(recorder)]),
        )
        .unwrap(),
    );
    let dispatcher = Arc::new(Dispatcher::new(table));

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let dispatcher = Arc::clone(&dispatcher);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    let mut ctx = dispatcher.context(ActionRequest::new(Method::GET, "/count"));
                    let result = dispatcher.dispatch("count", &mut ctx).unwrap();
                    assert_eq!(result.body.as_array().map(Vec::len), Some(2));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 400);
    assert_eq!(action_destroyed.load(Ordering::SeqCst), 0);

    dispatcher.reload(RouteTable::new());
    dispatcher.reload(RouteTable::new());
    drop(dispatcher);

    assert_eq!(action_destroyed.load(Ordering::SeqCst), 1);
    assert_eq!(interceptor_destroyed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_route_listing_serializes() {
    let dispatcher = dispatcher();
    let routes = dispatcher.routes();
    let names: Vec<_> = routes.iter().map(|r| r.route.as_str()).collect();
    assert_eq!(names, vec!["admin", "list_pets", "plain"]);

    let value = serde_json::to_value(&routes[1]).unwrap();
    assert_eq!(
        value,
        json!({
            "route": "list_pets",
            "nodes": [
                {"kind": "action", "name": "list_pets", "cors": true, "session_free": true, "express": true},
                {"kind": "after_interceptor", "name": "audit", "priority": 1, "cors": false, "session_free": true, "express": true},
                {"kind": "after_interceptor", "name": "etag", "priority": 10, "cors": false, "session_free": true, "express": true},
            ]
        })
    );
}

#[test]
fn test_walk_after_teardown_reports_released() {
    let mut table = RouteTable::new();
    table.register(
        RouteEntry::new(
            ControllerAction::new(Box::new(CountingInvoker::new("count"))),
            AfterInterceptorChain::new(),
        )
        .unwrap(),
    );
    table.teardown();

    let mut collector = RouteSummaryCollector::new();
    table.walk(&mut collector);
    let routes = collector.into_routes();
    assert_eq!(routes[0].nodes[0].kind, "released");
}
