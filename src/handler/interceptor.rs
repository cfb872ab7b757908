use std::fmt;

use tracing::{debug, info};

use crate::context::ActionContext;
use crate::cors::CorsSpec;
use crate::response::ActionResult;

use super::visitor::{HandlerNode, InvokerVisitor};

/// Post-processing step run after the controller action.
///
/// Lower priorities run first. `session_free` and `express` are fixed when
/// the interceptor is built.
pub trait AfterInterceptor: Send + Sync {
    fn name(&self) -> &str;

    fn priority(&self) -> i32;

    /// Transform or replace the action result. An error stops the chain.
    fn handle(&self, result: ActionResult, ctx: &mut ActionContext) -> anyhow::Result<ActionResult>;

    /// CORS contribution chained ahead of the action's own spec
    fn cors_spec(&self) -> &CorsSpec {
        CorsSpec::dumb()
    }

    fn session_free(&self) -> bool;

    fn express(&self) -> bool;

    fn accept(&self, visitor: &mut dyn InvokerVisitor) {
        visitor.visit(&HandlerNode::AfterInterceptor {
            name: self.name(),
            priority: self.priority(),
            cors: self.cors_spec(),
            session_free: self.session_free(),
            express: self.express(),
        });
    }

    /// Release whatever the interceptor holds. Called once, on teardown.
    fn destroy(&mut self) {}
}

/// After-interceptors of one route, kept in ascending priority order.
///
/// Ties keep registration order.
#[derive(Default)]
pub struct AfterInterceptorChain {
    interceptors: Vec<Box<dyn AfterInterceptor>>,
    destroyed: bool,
}

impl fmt::Debug for AfterInterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AfterInterceptorChain")
            .field("interceptors", &self.names())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl AfterInterceptorChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain from interceptors in registration order
    #[must_use]
    pub fn from_interceptors(interceptors: Vec<Box<dyn AfterInterceptor>>) -> Self {
        let mut chain = Self {
            interceptors,
            destroyed: false,
        };
        chain.sort();
        chain
    }

    pub fn add(&mut self, interceptor: Box<dyn AfterInterceptor>) {
        self.interceptors.push(interceptor);
        self.sort();
    }

    // slice::sort_by_key is stable
    fn sort(&mut self) {
        self.interceptors.sort_by_key(|i| i.priority());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Names in execution order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    /// Run every interceptor over `result` in order.
    pub fn handle(&self, result: ActionResult, ctx: &mut ActionContext) -> anyhow::Result<ActionResult> {
        let mut result = result;
        for interceptor in &self.interceptors {
            debug!(
                request_id = %ctx.request_id(),
                interceptor = interceptor.name(),
                priority = interceptor.priority(),
                "After-interceptor execution"
            );
            result = interceptor.handle(result, ctx)?;
        }
        Ok(result)
    }

    /// Interceptor specs chained in execution order
    #[must_use]
    pub fn cors_spec(&self) -> CorsSpec {
        self.interceptors
            .iter()
            .fold(CorsSpec::DUMB, |acc, i| acc.chain(i.cors_spec()))
    }

    /// True when no interceptor needs a session
    #[must_use]
    pub fn session_free(&self) -> bool {
        self.interceptors.iter().all(|i| i.session_free())
    }

    /// True when every interceptor allows the express path
    #[must_use]
    pub fn express(&self) -> bool {
        self.interceptors.iter().all(|i| i.express())
    }

    pub fn accept(&self, visitor: &mut dyn InvokerVisitor) {
        for interceptor in &self.interceptors {
            interceptor.accept(visitor);
        }
    }

    /// Destroy every interceptor once. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        for interceptor in &mut self.interceptors {
            interceptor.destroy();
        }
        if !self.interceptors.is_empty() {
            info!(count = self.interceptors.len(), "After-interceptors destroyed");
        }
    }
}

impl Drop for AfterInterceptorChain {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cors::{AllowOrigin, CorsSpec, Disable};
    use crate::request::ActionRequest;
    use http::Method;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Tag {
        name: &'static str,
        priority: i32,
        cors: CorsSpec,
        session_free: bool,
        calls: Arc<AtomicUsize>,
        destroyed: Arc<AtomicUsize>,
    }

    impl Tag {
        fn new(name: &'static str, priority: i32) -> Self {
            Self {
                name,
                priority,
                cors: CorsSpec::DUMB,
                session_free: true,
                calls: Arc::new(AtomicUsize::new(0)),
                destroyed: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl AfterInterceptor for Tag {
        fn name(&self) -> &str {
            self.name
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        fn handle(&self, mut result: ActionResult, _ctx: &mut ActionContext) -> anyhow::Result<ActionResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Value::Array(items) = &mut result.body {
                items.push(json!(self.name));
            }
            Ok(result)
        }
        fn cors_spec(&self) -> &CorsSpec {
            &self.cors
        }
        fn session_free(&self) -> bool {
            self.session_free
        }
        fn express(&self) -> bool {
            true
        }
        fn destroy(&mut self) {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fail;

    impl AfterInterceptor for Fail {
        fn name(&self) -> &str {
            "fail"
        }
        fn priority(&self) -> i32 {
            5
        }
        fn handle(&self, _result: ActionResult, _ctx: &mut ActionContext) -> anyhow::Result<ActionResult> {
            anyhow::bail!("interceptor failed")
        }
        fn session_free(&self) -> bool {
            true
        }
        fn express(&self) -> bool {
            false
        }
    }

    fn ctx() -> ActionContext {
        ActionContext::new(ActionRequest::new(Method::GET, "/"))
    }

    #[test]
    fn test_runs_in_priority_order_with_stable_ties() {
        let chain = AfterInterceptorChain::from_interceptors(vec![
            Box::new(Tag::new("c", 10)),
            Box::new(Tag::new("a1", 0)),
            Box::new(Tag::new("b", 5)),
            Box::new(Tag::new("a2", 0)),
            Box::new(Tag::new("neg", -3)),
        ]);
        assert_eq!(chain.names(), vec!["neg", "a1", "a2", "b", "c"]);

        let result = chain
            .handle(ActionResult::ok(json!([])), &mut ctx())
            .unwrap();
        assert_eq!(result.body, json!(["neg", "a1", "a2", "b", "c"]));
    }

    #[test]
    fn test_add_keeps_registration_order_for_ties() {
        let mut chain = AfterInterceptorChain::new();
        chain.add(Box::new(Tag::new("first", 1)));
        chain.add(Box::new(Tag::new("early", 0)));
        chain.add(Box::new(Tag::new("second", 1)));
        assert_eq!(chain.names(), vec!["early", "first", "second"]);
    }

    #[test]
    fn test_failure_short_circuits() {
        let before = Tag::new("before", 1);
        let after = Tag::new("after", 9);
        let before_calls = Arc::clone(&before.calls);
        let after_calls = Arc::clone(&after.calls);
        let chain = AfterInterceptorChain::from_interceptors(vec![
            Box::new(before),
            Box::new(Fail),
            Box::new(after),
        ]);
        let err = chain
            .handle(ActionResult::ok(json!([])), &mut ctx())
            .unwrap_err();
        assert_eq!(err.to_string(), "interceptor failed");
        assert_eq!(before_calls.load(Ordering::SeqCst), 1);
        assert_eq!(after_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_flags_require_every_member() {
        let mut needs_session = Tag::new("session", 0);
        needs_session.session_free = false;
        let chain = AfterInterceptorChain::from_interceptors(vec![
            Box::new(Tag::new("free", 0)),
            Box::new(needs_session),
        ]);
        assert!(!chain.session_free());
        assert!(chain.express());

        let chain = AfterInterceptorChain::from_interceptors(vec![Box::new(Fail)]);
        assert!(!chain.express());
        assert!(AfterInterceptorChain::new().session_free());
    }

    #[test]
    fn test_cors_spec_chains_members() {
        let mut a = Tag::new("a", 0);
        a.cors = CorsSpec::builder()
            .with_allow_origin(Some(AllowOrigin("a.com".into())))
            .build();
        let mut off = Tag::new("off", 1);
        off.cors = CorsSpec::builder().with_disable(Some(Disable)).build();

        let chain = AfterInterceptorChain::from_interceptors(vec![Box::new(a)]);
        assert_eq!(chain.cors_spec().origin(), Some("a.com"));

        let mut a = Tag::new("a", 0);
        a.cors = CorsSpec::builder()
            .with_allow_origin(Some(AllowOrigin("a.com".into())))
            .build();
        let chain = AfterInterceptorChain::from_interceptors(vec![Box::new(a), Box::new(off)]);
        assert!(chain.cors_spec().disabled());

        assert!(!AfterInterceptorChain::new().cors_spec().effective());
    }

    #[test]
    fn test_destroy_runs_once_per_member() {
        let first = Tag::new("first", 0);
        let second = Tag::new("second", 1);
        let counters = [Arc::clone(&first.destroyed), Arc::clone(&second.destroyed)];
        let mut chain =
            AfterInterceptorChain::from_interceptors(vec![Box::new(first), Box::new(second)]);
        chain.destroy();
        chain.destroy();
        drop(chain);
        for c in &counters {
            assert_eq!(c.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_accept_visits_in_order() {
        let chain = AfterInterceptorChain::from_interceptors(vec![
            Box::new(Tag::new("late", 3)),
            Box::new(Tag::new("early", 1)),
        ]);
        let mut seen = Vec::new();
        let mut visitor = |node: &HandlerNode<'_>| {
            if let HandlerNode::AfterInterceptor { name, priority, .. } = node {
                seen.push((name.to_string(), *priority));
            }
        };
        chain.accept(&mut visitor);
        assert_eq!(seen, vec![("early".to_string(), 1), ("late".to_string(), 3)]);
    }
}
