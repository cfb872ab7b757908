use http::Method;
use tracing::{debug, warn};

use super::core::RawRequest;
use super::error::MethodError;

/// Request header carrying a method override on `POST` requests
pub const X_HTTP_METHOD_OVERRIDE: &str = "x-http-method-override";

/// Query/form parameter consulted when the override header is absent or blank
pub const METHOD_OVERRIDE_PARAM: &str = "_method";

/// Parse a method name case-insensitively.
///
/// Only the standard methods are accepted. `http::Method` would happily admit
/// any token as an extension method, which would let `FOOBAR` through.
pub fn parse_method(value: &str) -> Result<Method, MethodError> {
    let method = match value.to_ascii_uppercase().as_str() {
        "GET" => Method::GET,
        "HEAD" => Method::HEAD,
        "POST" => Method::POST,
        "PUT" => Method::PUT,
        "DELETE" => Method::DELETE,
        "CONNECT" => Method::CONNECT,
        "OPTIONS" => Method::OPTIONS,
        "TRACE" => Method::TRACE,
        "PATCH" => Method::PATCH,
        _ => {
            return Err(MethodError::Unsupported {
                value: value.to_string(),
            })
        }
    };
    Ok(method)
}

fn not_blank(s: &&str) -> bool {
    !s.trim().is_empty()
}

/// Resolve the effective method of a request.
///
/// Non-`POST` requests keep their native method whatever overrides they carry.
pub fn resolve_method<R: RawRequest + ?Sized>(req: &R) -> Result<Method, MethodError> {
    let native = req.native_method();
    if native != Method::POST {
        return Ok(native);
    }

    let over = req
        .header(X_HTTP_METHOD_OVERRIDE)
        .filter(not_blank)
        .or_else(|| req.param_value(METHOD_OVERRIDE_PARAM).filter(not_blank));

    let Some(value) = over else {
        return Ok(native);
    };

    match parse_method(value) {
        Ok(method) => {
            debug!(override_value = %value, method = %method, "Method override applied");
            Ok(method)
        }
        Err(e) => {
            warn!(override_value = %value, "Rejected method override");
            Err(e)
        }
    }
}
