use std::fmt;

use crate::request::MethodError;

/// Dispatch error
///
/// Action and interceptor failures are not wrapped in this type; they travel
/// through `handle` as the `anyhow::Error` the handler returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// A released handler was used
    ///
    /// Handlers are released during route table teardown. Reaching one means
    /// a caller kept a handler past its table's lifetime.
    ReleasedHandler {
        /// Name of the released handler
        name: String,
    },
    /// No route is registered under this handler name
    HandlerNotFound {
        /// The requested handler name
        name: String,
    },
    /// The request's effective method could not be resolved
    Method(MethodError),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::ReleasedHandler { name } => {
                write!(f, "Handler '{}' used after its resources were released", name)
            }
            DispatchError::HandlerNotFound { name } => {
                write!(f, "No handler registered under '{}'", name)
            }
            DispatchError::Method(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Method(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MethodError> for DispatchError {
    fn from(e: MethodError) -> Self {
        DispatchError::Method(e)
    }
}
