//! # Handler Registry
//!
//! Maps handler names from `config.yaml` to the functions that implement
//! them, and builds a [`RouteTable`] from an [`AppConfig`].
//!
//! Actions are shared function pointers, so a rebuilt table reuses them.
//! Interceptors are produced by a factory per route, so each route owns
//! (and destroys) its own instances.
//!
//! ```rust,ignore
//! let mut registry = HandlerRegistry::new();
//! registry.register_action("list_pets", |_ctx| Ok(ActionResult::ok(json!([]))));
//! registry.register_interceptor("audit", || Box::new(Audit::default()));
//!
//! let table = registry.build_table(&AppConfig::load("config.yaml")?)?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{AppConfig, ConfigError, RouteConfig};
use crate::context::ActionContext;
use crate::dispatcher::{RouteEntry, RouteTable};
use crate::handler::{ActionFn, AfterInterceptor, AfterInterceptorChain, ControllerAction, FnInvoker};
use crate::response::ActionResult;

/// Factory producing a fresh after-interceptor for one route
pub type InterceptorFactory = Arc<dyn Fn() -> Box<dyn AfterInterceptor> + Send + Sync>;

/// Named actions and interceptor factories.
#[derive(Default)]
pub struct HandlerRegistry {
    actions: HashMap<String, ActionFn>,
    interceptors: HashMap<String, InterceptorFactory>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut actions: Vec<_> = self.actions.keys().collect();
        actions.sort();
        let mut interceptors: Vec<_> = self.interceptors.keys().collect();
        interceptors.sort();
        f.debug_struct("HandlerRegistry")
            .field("actions", &actions)
            .field("interceptors", &interceptors)
            .finish()
    }
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_action<F>(&mut self, name: &str, action: F)
    where
        F: Fn(&mut ActionContext) -> anyhow::Result<ActionResult> + Send + Sync + 'static,
    {
        if self
            .actions
            .insert(name.to_string(), Arc::new(action))
            .is_some()
        {
            warn!(handler_name = %name, "Replaced existing action registration");
        }
    }

    pub fn register_interceptor<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn AfterInterceptor> + Send + Sync + 'static,
    {
        if self
            .interceptors
            .insert(name.to_string(), Arc::new(factory))
            .is_some()
        {
            warn!(interceptor = %name, "Replaced existing interceptor registration");
        }
    }

    #[must_use]
    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Build a route table for `config`.
    ///
    /// Routes naming an unregistered action are skipped with a warning. An
    /// invalid CORS declaration or an unknown interceptor fails the whole build.
    pub fn build_table(&self, config: &AppConfig) -> Result<RouteTable, ConfigError> {
        let mut table = RouteTable::new();
        for route in &config.routes {
            let Some(action) = self.actions.get(&route.handler) else {
                warn!(handler_name = %route.handler, "No action registered for route - skipped");
                continue;
            };
            table.register(self.build_entry(route, Arc::clone(action))?);
        }
        debug!(routes = table.len(), "Route table built");
        Ok(table)
    }

    fn build_entry(&self, route: &RouteConfig, action: ActionFn) -> Result<RouteEntry, ConfigError> {
        let invoker = FnInvoker::from_shared(&route.handler, action)
            .with_cors(route.cors_spec()?)
            .with_csrf(route.csrf_spec())
            .with_session_free(route.session_free)
            .with_express(route.express);

        let mut chain = AfterInterceptorChain::new();
        for name in &route.interceptors {
            let factory = self
                .interceptors
                .get(name)
                .ok_or_else(|| ConfigError::InvalidRoute {
                    handler: route.handler.clone(),
                    reason: format!("unknown interceptor '{}'", name),
                })?;
            chain.add(factory());
        }

        RouteEntry::new(ControllerAction::new(Box::new(invoker)), chain).map_err(|e| {
            ConfigError::InvalidRoute {
                handler: route.handler.clone(),
                reason: e.to_string(),
            }
        })
    }
}
