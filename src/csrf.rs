//! CSRF policy carried alongside CORS on each action. Token checking lives
//! elsewhere in the pipeline; handlers only expose the spec.

/// Default header carrying the CSRF token
pub const DEFAULT_CSRF_HEADER: &str = "x-xsrf-token";

static DUMB_SPEC: CsrfSpec = CsrfSpec::DUMB;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfSpec {
    enabled: bool,
    header_name: Option<String>,
}

impl Default for CsrfSpec {
    fn default() -> Self {
        Self::DUMB
    }
}

impl CsrfSpec {
    /// No CSRF protection declared
    pub const DUMB: CsrfSpec = CsrfSpec {
        enabled: false,
        header_name: None,
    };

    #[must_use]
    pub fn dumb() -> &'static CsrfSpec {
        &DUMB_SPEC
    }

    /// CSRF protection using `header_name`, or the default header
    #[must_use]
    pub fn enabled(header_name: Option<&str>) -> Self {
        Self {
            enabled: true,
            header_name: header_name.map(str::to_string),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn header_name(&self) -> &str {
        self.header_name.as_deref().unwrap_or(DEFAULT_CSRF_HEADER)
    }
}
