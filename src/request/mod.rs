//! # Request Module
//!
//! Per-request facts consulted by routing and CORS: the effective HTTP method
//! (with POST method overrides) and whether the request arrived over TLS.
//!
//! ## Method Resolution
//!
//! The native method of a request is used as-is unless it is `POST`. A `POST`
//! may carry an override in the `X-Http-Method-Override` header or, failing
//! that, in the `_method` query/form parameter:
//!
//! ```text
//! POST /pets/1                          -> POST
//! POST /pets/1  X-Http-Method-Override: PUT -> PUT
//! POST /pets/1?_method=delete           -> DELETE
//! POST /pets/1?_method=FOOBAR           -> MethodError::Unsupported
//! GET  /pets/1?_method=DELETE           -> GET
//! ```
//!
//! ## Security Classification
//!
//! A request is secure when the configured trusted forwarded protocol is
//! `https`, or when one of the de-facto proxy headers says so
//! (see [`FORWARDED_PROTO_HEADERS`]).
//!
//! Both facts are computed at most once per [`ActionRequest`] and frozen.

mod core;
mod error;
mod method;
mod secure;

pub use core::{ActionRequest, HeaderVec, ParamVec, RawRequest, MAX_INLINE_HEADERS, MAX_INLINE_PARAMS};
pub use error::MethodError;
pub use method::{
    parse_method, resolve_method, METHOD_OVERRIDE_PARAM, X_HTTP_METHOD_OVERRIDE,
};
pub use secure::{is_secure, FORWARDED_PROTO_HEADERS, TRUSTED_SECURE_PROTOCOL};
