//! # Handler Module
//!
//! The handler graph each route dispatches through.
//!
//! - [`ActionInvoker`] is the low-level invoker for one controller action
//!   ([`FnInvoker`] wraps a plain function).
//! - [`ControllerAction`] owns exactly one invoker, delegates to it, and
//!   releases it deterministically on teardown.
//! - [`AfterInterceptor`]s post-process the action result in ascending
//!   priority order, collected in an [`AfterInterceptorChain`].
//! - [`HandlerNode`] and the visitor traits let tooling walk the graph
//!   without reaching into handler internals.
//!
//! ## Lifecycle
//!
//! ```text
//! register ──> serve (handle / cors_spec / accept, any thread)
//!                 │
//!              teardown: release_resources() / destroy()   (exactly once,
//!                 │                                          repeat = no-op)
//!              use after release ──> DispatchError::ReleasedHandler
//! ```

mod controller_action;
mod interceptor;
mod invoker;
mod visitor;

pub use controller_action::{ControllerAction, CONTROLLER_ACTION_PRIORITY};
pub use interceptor::{AfterInterceptor, AfterInterceptorChain};
pub use invoker::{ActionFn, ActionInvoker, FnInvoker};
pub use visitor::{
    HandlerNode, HandlerVisitor, InvokerVisitor, NodeSummary, RouteSummary, RouteSummaryCollector,
};
