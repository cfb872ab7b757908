//! # CORS Module
//!
//! Layered CORS policy for action handlers.
//!
//! Policy is declared per controller and per action ([`CorsDeclaration`],
//! typically loaded from `config.yaml`), folded into a [`CorsSpec`] once at
//! route registration, and applied to every request that reaches the route.
//!
//! ## Layers
//!
//! ```text
//! controller declaration ─┐
//!                         ├─ fold (per field, action wins) ─┐
//! action declaration ─────┘                                 │
//! allowed methods ──────────── for_methods ─────────────────┤
//!                                                           ├─ chain ─> route spec
//! after-interceptor specs ──── chain (in priority order) ───┘
//! ```
//!
//! ## Application
//!
//! - A disabled spec flags the request context and writes nothing.
//! - `Access-Control-Allow-Origin` is written on every request.
//! - `Access-Control-Allow-Methods`, `-Expose-Headers`, `-Allow-Headers` and
//!   `-Max-Age` are written on `OPTIONS` preflights only.
//! - Headers already on the response are never replaced.

mod declaration;
mod error;
mod spec;

pub use declaration::{
    AllowHeaders, AllowOrigin, CorsDeclaration, Directive, Disable, ExposeHeaders, MaxAge,
    DEFAULT_MAX_AGE_SECS, WILDCARD,
};
pub use error::CorsSpecError;
pub use spec::{CorsSpec, CorsSpecBuilder};
