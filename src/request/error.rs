use std::fmt;

/// Method resolution error
///
/// Returned when a `POST` carries a method override that does not name a
/// known HTTP method. The override is never silently ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodError {
    /// The override value is not a recognised HTTP method
    Unsupported {
        /// The raw override value as received
        value: String,
    },
}

impl fmt::Display for MethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodError::Unsupported { value } => {
                write!(f, "Unsupported HTTP method override '{}'", value)
            }
        }
    }
}

impl std::error::Error for MethodError {}
