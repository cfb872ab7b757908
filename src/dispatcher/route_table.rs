use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::cors::CorsSpec;
use crate::handler::{AfterInterceptorChain, ControllerAction, HandlerVisitor};

use super::error::DispatchError;

/// One registered route: the action, its after-interceptors and the CORS
/// spec resolved for the pair at registration time.
#[derive(Debug)]
pub struct RouteEntry {
    action: ControllerAction,
    interceptors: AfterInterceptorChain,
    cors: CorsSpec,
    session_free: bool,
    express: bool,
}

impl RouteEntry {
    /// Resolve the route's policy. Interceptor specs apply ahead of the
    /// action's own spec, so their headers win.
    pub fn new(
        action: ControllerAction,
        interceptors: AfterInterceptorChain,
    ) -> Result<Self, DispatchError> {
        let cors = interceptors.cors_spec().chain(action.cors_spec()?);
        let session_free = action.session_free()? && interceptors.session_free();
        let express = action.express()? && interceptors.express();
        Ok(Self {
            action,
            interceptors,
            cors,
            session_free,
            express,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.action.name()
    }

    #[must_use]
    pub fn action(&self) -> &ControllerAction {
        &self.action
    }

    #[must_use]
    pub fn interceptors(&self) -> &AfterInterceptorChain {
        &self.interceptors
    }

    #[must_use]
    pub fn cors(&self) -> &CorsSpec {
        &self.cors
    }

    /// True when neither the action nor any interceptor needs a session
    #[must_use]
    pub fn session_free(&self) -> bool {
        self.session_free
    }

    #[must_use]
    pub fn express(&self) -> bool {
        self.express
    }

    /// Release the action and destroy its interceptors. Idempotent.
    pub fn release(&mut self) {
        self.action.release_resources();
        self.interceptors.destroy();
    }
}

/// Routes by handler name.
///
/// Built once, then served read-only. Tearing the table down (explicitly or
/// by dropping it) releases every entry exactly once.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: BTreeMap<String, RouteEntry>,
    torn_down: bool,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route. An existing route with the same name is released and replaced.
    pub fn register(&mut self, entry: RouteEntry) {
        let name = entry.name().to_string();
        if let Some(mut old) = self.routes.insert(name.clone(), entry) {
            old.release();
            warn!(
                handler_name = %name,
                total_handlers = self.routes.len(),
                "Replaced existing handler - old handler released"
            );
        } else {
            info!(
                handler_name = %name,
                total_handlers = self.routes.len(),
                "Handler registered successfully"
            );
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RouteEntry> {
        self.routes.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered handler names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Visit every route in name order: the action node first, then its
    /// interceptors in execution order.
    pub fn walk(&self, visitor: &mut dyn HandlerVisitor) {
        for (name, entry) in &self.routes {
            visitor.enter_route(name);
            entry.action.accept(visitor);
            entry.interceptors.accept(visitor.invoker_visitor());
        }
    }

    /// Release every route. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        for entry in self.routes.values_mut() {
            entry.release();
        }
        info!(routes = self.routes.len(), "Route table torn down");
    }
}

impl Drop for RouteTable {
    fn drop(&mut self) {
        self.teardown();
    }
}
