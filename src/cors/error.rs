use std::fmt;

/// CORS spec construction error
///
/// Raised at route registration time. A route whose spec cannot be built is
/// not registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsSpecError {
    /// A method-enumeration spec was requested with no methods
    ///
    /// `Access-Control-Allow-Methods` cannot be empty; an empty set means the
    /// route declaration is wrong, not that every method is allowed.
    EmptyMethodSet,
}

impl fmt::Display for CorsSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsSpecError::EmptyMethodSet => write!(
                f,
                "CORS configuration error: allowed methods must not be empty. \
                Omit allowed_methods entirely to skip Access-Control-Allow-Methods."
            ),
        }
    }
}

impl std::error::Error for CorsSpecError {}
