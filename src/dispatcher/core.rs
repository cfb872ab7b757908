use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{debug, error, info};

use crate::config::{AppConfig, ConfigError};
use crate::context::ActionContext;
use crate::handler::{RouteSummary, RouteSummaryCollector};
use crate::registry::HandlerRegistry;
use crate::request::ActionRequest;
use crate::response::ActionResult;

use super::error::DispatchError;
use super::route_table::RouteTable;

/// Dispatches requests to the live [`RouteTable`].
///
/// The table is swapped atomically on reload. A request keeps the table it
/// started with until it finishes, so the previous table is torn down only
/// after its last in-flight request.
pub struct Dispatcher {
    table: ArcSwap<RouteTable>,
    config: ArcSwap<AppConfig>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(RouteTable::new())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.table.load().len())
            .field("x_forwarded_protocol", &self.config.load().x_forwarded_protocol)
            .finish()
    }
}

impl Dispatcher {
    #[must_use]
    pub fn new(table: RouteTable) -> Self {
        Self {
            table: ArcSwap::from_pointee(table),
            config: ArcSwap::from_pointee(AppConfig::default()),
        }
    }

    /// Build the initial table for `config` from `registry`
    pub fn from_config(config: AppConfig, registry: &HandlerRegistry) -> Result<Self, ConfigError> {
        let table = registry.build_table(&config)?;
        Ok(Self {
            table: ArcSwap::from_pointee(table),
            config: ArcSwap::from_pointee(config),
        })
    }

    /// Wrap `req` in a context carrying the configured trusted forwarded protocol
    #[must_use]
    pub fn context(&self, req: ActionRequest) -> ActionContext {
        let config = self.config.load();
        ActionContext::new(req.with_forwarded_protocol(config.x_forwarded_protocol.as_deref()))
    }

    /// Snapshot of the live table
    #[must_use]
    pub fn table(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    /// Every route's handler graph, in name order
    #[must_use]
    pub fn routes(&self) -> Vec<RouteSummary> {
        let mut collector = RouteSummaryCollector::new();
        self.table.load().walk(&mut collector);
        collector.into_routes()
    }

    /// Run the route named `name` against `ctx`.
    ///
    /// The route's CORS spec is applied first, then the action, then the
    /// after-interceptors in priority order. Action and interceptor failures
    /// are returned unchanged; lookup and method failures are
    /// [`DispatchError`]s.
    pub fn dispatch(&self, name: &str, ctx: &mut ActionContext) -> anyhow::Result<ActionResult> {
        let table = self.table.load_full();
        let entry = table.get(name).ok_or_else(|| DispatchError::HandlerNotFound {
            name: name.to_string(),
        })?;

        let method = ctx.req().method().map_err(DispatchError::from)?;
        info!(
            request_id = %ctx.request_id(),
            handler_name = %name,
            method = %method,
            path = %ctx.req().path(),
            secure = ctx.req().secure(),
            session_free = entry.session_free(),
            express = entry.express(),
            "Request dispatched to handler"
        );

        entry.cors().apply_to(ctx);

        let result = match entry.action().handle(ctx) {
            Ok(result) => result,
            Err(e) => {
                error!(
                    request_id = %ctx.request_id(),
                    handler_name = %name,
                    error = %e,
                    "Handler failed"
                );
                return Err(e);
            }
        };
        let result = entry.interceptors().handle(result, ctx)?;
        debug!(
            request_id = %ctx.request_id(),
            handler_name = %name,
            status = result.status,
            "Handler response ready"
        );
        Ok(result)
    }

    /// Swap in `table`; the previous table is torn down once no request holds it.
    pub fn reload(&self, table: RouteTable) {
        let routes = table.len();
        let old = self.table.swap(Arc::new(table));
        match Arc::try_unwrap(old) {
            Ok(mut old) => old.teardown(),
            Err(in_flight) => {
                debug!(
                    holders = Arc::strong_count(&in_flight),
                    "Previous route table still in use - teardown deferred"
                );
            }
        }
        info!(routes, "Route table reloaded");
    }

    /// Rebuild the table for `config` and swap both in. On error the live
    /// table and config are left untouched.
    pub fn apply_config(&self, config: AppConfig, registry: &HandlerRegistry) -> Result<(), ConfigError> {
        let table = registry.build_table(&config)?;
        self.reload_config(config, table);
        Ok(())
    }

    /// Install `config` together with the table built from it, so requests
    /// see the reloaded trusted forwarded protocol.
    pub fn reload_config(&self, config: AppConfig, table: RouteTable) {
        self.config.store(Arc::new(config));
        self.reload(table);
    }
}
