//! # Dispatcher Module
//!
//! Owns the live route table and runs requests through it.
//!
//! ## Overview
//!
//! - [`RouteEntry`] pairs a [`ControllerAction`](crate::handler::ControllerAction)
//!   with its [`AfterInterceptorChain`](crate::handler::AfterInterceptorChain)
//!   and the CORS spec resolved for both at registration time.
//! - [`RouteTable`] is built once and then served read-only. Dropping or
//!   tearing it down releases every handler exactly once.
//! - [`Dispatcher`] holds the current table behind an `ArcSwap`, so reloads
//!   never block requests.
//!
//! ## Request Flow
//!
//! 1. Look up the route by handler name
//! 2. Resolve the effective method (overrides included)
//! 3. Apply the route's CORS spec to the response
//! 4. Invoke the controller action
//! 5. Fold the result through the after-interceptors
//!
//! ## Reload
//!
//! [`Dispatcher::reload`] swaps the table atomically. Requests already running
//! finish against the table they started with; the old table is torn down
//! when the last of them lets go.

mod core;
mod error;
mod route_table;

pub use core::Dispatcher;
pub use error::DispatchError;
pub use route_table::{RouteEntry, RouteTable};
