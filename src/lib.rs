//! # actiondispatch
//!
//! **actiondispatch** is the request-dispatch and cross-origin policy layer of an
//! HTTP action pipeline. It resolves the effective method and transport
//! security of a request, composes CORS policy from layered declarations,
//! and runs controller actions through a lifecycle-managed handler chain
//! with prioritized after-interceptors.
//!
//! ## Architecture
//!
//! - **[`request`]** - Method override resolution and secure-transport detection,
//!   memoised per request
//! - **[`cors`]** - CORS declarations, the [`CorsSpec`] fold/chain algebra and
//!   header application
//! - **[`csrf`]** - Opaque CSRF policy carried by handlers
//! - **[`handler`]** - Controller actions, after-interceptors and the visitor protocol
//! - **[`dispatcher`]** - Route table, dispatch, and atomic reload
//! - **[`config`]** - YAML route declarations
//! - **[`registry`]** - Named actions and interceptors; builds route tables from config
//! - **[`hot_reload`]** - Rebuilds the route table when the config file changes
//! - **[`logging`]** - `tracing` subscriber setup
//!
//! ### Request Flow
//!
//! ```text
//! ActionRequest ─> Dispatcher::context ─> ActionContext
//!                                              │
//!   Dispatcher::dispatch(name) ─> RouteEntry ──┤
//!       1. method()            (override resolution, cached)
//!       2. CorsSpec::apply_to  (interceptor spec, then action spec)
//!       3. ControllerAction::handle
//!       4. AfterInterceptorChain::handle (ascending priority)
//!                                              │
//!                              ActionContext::into_response(result)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use actiondispatch::{ActionRequest, ActionResult, AppConfig, Dispatcher, HandlerRegistry};
//! use http::Method;
//! use serde_json::json;
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register_action("list_pets", |_ctx| Ok(ActionResult::ok(json!([]))));
//!
//! let dispatcher = Dispatcher::from_config(AppConfig::load("config.yaml")?, &registry)?;
//! let mut ctx = dispatcher.context(ActionRequest::new(Method::GET, "/pets"));
//! let result = dispatcher.dispatch("list_pets", &mut ctx)?;
//! let response = ctx.into_response(result);
//! ```

pub mod config;
pub mod context;
pub mod cors;
pub mod csrf;
pub mod dispatcher;
pub mod handler;
pub mod hot_reload;
pub mod logging;
pub mod registry;
pub mod request;
pub mod response;

pub use config::{AppConfig, ConfigError, RouteConfig};
pub use context::{ActionContext, CorsTarget};
pub use cors::{CorsDeclaration, CorsSpec, CorsSpecError};
pub use csrf::CsrfSpec;
pub use dispatcher::{DispatchError, Dispatcher, RouteEntry, RouteTable};
pub use handler::{
    ActionInvoker, AfterInterceptor, AfterInterceptorChain, ControllerAction, FnInvoker,
    HandlerNode, HandlerVisitor, InvokerVisitor,
};
pub use registry::HandlerRegistry;
pub use request::{ActionRequest, MethodError, RawRequest};
pub use response::{ActionResponse, ActionResult, ResponseHeaders};
