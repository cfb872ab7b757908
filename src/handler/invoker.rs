use std::fmt;
use std::sync::Arc;

use crate::context::ActionContext;
use crate::cors::CorsSpec;
use crate::csrf::CsrfSpec;
use crate::response::ActionResult;

use super::visitor::{HandlerNode, InvokerVisitor};

/// Downstream invoker wrapped by a [`ControllerAction`](super::ControllerAction).
///
/// Implementations are shared across worker threads; `handle` takes `&self`
/// and all per-request state lives in the [`ActionContext`].
pub trait ActionInvoker: Send + Sync {
    fn name(&self) -> &str;

    /// Run the action. Errors are returned to the dispatcher untouched.
    fn handle(&self, ctx: &mut ActionContext) -> anyhow::Result<ActionResult>;

    fn cors_spec(&self) -> &CorsSpec;

    fn csrf_spec(&self) -> &CsrfSpec {
        CsrfSpec::dumb()
    }

    /// Whether the action runs without a session
    fn session_free(&self) -> bool;

    /// Whether the action may take the express (fast) path
    fn express(&self) -> bool;

    fn accept(&self, visitor: &mut dyn InvokerVisitor) {
        visitor.visit(&HandlerNode::Action {
            name: self.name(),
            cors: self.cors_spec(),
            csrf: self.csrf_spec(),
            session_free: self.session_free(),
            express: self.express(),
        });
    }

    /// Release whatever the invoker holds. Called once, on teardown.
    fn destroy(&mut self) {}
}

/// Action function signature used by [`FnInvoker`]
pub type ActionFn = Arc<dyn Fn(&mut ActionContext) -> anyhow::Result<ActionResult> + Send + Sync>;

/// Invoker backed by a plain function plus the policy resolved for its route.
pub struct FnInvoker {
    name: String,
    action: Option<ActionFn>,
    cors: CorsSpec,
    csrf: CsrfSpec,
    session_free: bool,
    express: bool,
}

impl fmt::Debug for FnInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInvoker")
            .field("name", &self.name)
            .field("cors", &self.cors)
            .field("csrf", &self.csrf)
            .field("session_free", &self.session_free)
            .field("express", &self.express)
            .field("destroyed", &self.action.is_none())
            .finish()
    }
}

impl FnInvoker {
    pub fn new<F>(name: &str, action: F) -> Self
    where
        F: Fn(&mut ActionContext) -> anyhow::Result<ActionResult> + Send + Sync + 'static,
    {
        Self::from_shared(name, Arc::new(action))
    }

    #[must_use]
    pub fn from_shared(name: &str, action: ActionFn) -> Self {
        Self {
            name: name.to_string(),
            action: Some(action),
            cors: CorsSpec::DUMB,
            csrf: CsrfSpec::DUMB,
            session_free: false,
            express: false,
        }
    }

    #[must_use]
    pub fn with_cors(mut self, cors: CorsSpec) -> Self {
        self.cors = cors;
        self
    }

    #[must_use]
    pub fn with_csrf(mut self, csrf: CsrfSpec) -> Self {
        self.csrf = csrf;
        self
    }

    #[must_use]
    pub fn with_session_free(mut self, session_free: bool) -> Self {
        self.session_free = session_free;
        self
    }

    #[must_use]
    pub fn with_express(mut self, express: bool) -> Self {
        self.express = express;
        self
    }
}

impl ActionInvoker for FnInvoker {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, ctx: &mut ActionContext) -> anyhow::Result<ActionResult> {
        match &self.action {
            Some(action) => action(ctx),
            None => anyhow::bail!("action '{}' invoked after destroy", self.name),
        }
    }

    fn cors_spec(&self) -> &CorsSpec {
        &self.cors
    }

    fn csrf_spec(&self) -> &CsrfSpec {
        &self.csrf
    }

    fn session_free(&self) -> bool {
        self.session_free
    }

    fn express(&self) -> bool {
        self.express
    }

    fn destroy(&mut self) {
        self.action = None;
    }
}
