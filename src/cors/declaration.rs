use serde::Deserialize;

/// Default `Access-Control-Max-Age` in seconds (30 minutes)
pub const DEFAULT_MAX_AGE_SECS: i32 = 30 * 60;

/// Wildcard used by the header directives when no value is given
pub const WILDCARD: &str = "*";

/// Suppress all CORS headers for a controller or action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Disable;

/// `Access-Control-Allow-Origin` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowOrigin(pub String);

/// `Access-Control-Allow-Headers` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowHeaders(pub String);

/// `Access-Control-Expose-Headers` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposeHeaders(pub String);

/// `Access-Control-Max-Age` in seconds. Negative values leave the header unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxAge(pub i32);

impl Default for AllowOrigin {
    fn default() -> Self {
        Self(WILDCARD.to_string())
    }
}

impl Default for AllowHeaders {
    fn default() -> Self {
        Self(WILDCARD.to_string())
    }
}

impl Default for ExposeHeaders {
    fn default() -> Self {
        Self(WILDCARD.to_string())
    }
}

impl Default for MaxAge {
    fn default() -> Self {
        Self(DEFAULT_MAX_AGE_SECS)
    }
}

/// A directive in configuration: either `true` (use the default value),
/// `false` (absent), or an explicit value.
///
/// ```yaml
/// allow_origin: true            # "*"
/// allow_origin: https://a.com
/// max_age: 600
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Directive<T> {
    Flag(bool),
    Value(T),
}

impl<T: Clone> Directive<T> {
    fn resolve(directive: Option<&Self>, default: impl FnOnce() -> T) -> Option<T> {
        match directive? {
            Directive::Flag(true) => Some(default()),
            Directive::Flag(false) => None,
            Directive::Value(v) => Some(v.clone()),
        }
    }
}

/// CORS directives declared at one level (controller or action).
///
/// Each field is independent; an absent field leaves whatever an earlier
/// level declared in place when levels are folded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CorsDeclaration {
    pub disable: bool,
    pub allow_origin: Option<Directive<String>>,
    pub allow_headers: Option<Directive<String>>,
    pub expose_headers: Option<Directive<String>>,
    pub max_age: Option<Directive<i32>>,
}

impl CorsDeclaration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_disable(mut self) -> Self {
        self.disable = true;
        self
    }

    #[must_use]
    pub fn with_allow_origin(mut self, origin: &str) -> Self {
        self.allow_origin = Some(Directive::Value(origin.to_string()));
        self
    }

    #[must_use]
    pub fn with_allow_headers(mut self, headers: &str) -> Self {
        self.allow_headers = Some(Directive::Value(headers.to_string()));
        self
    }

    #[must_use]
    pub fn with_expose_headers(mut self, headers: &str) -> Self {
        self.expose_headers = Some(Directive::Value(headers.to_string()));
        self
    }

    #[must_use]
    pub fn with_max_age(mut self, secs: i32) -> Self {
        self.max_age = Some(Directive::Value(secs));
        self
    }

    #[must_use]
    pub fn disable(&self) -> Option<Disable> {
        self.disable.then_some(Disable)
    }

    #[must_use]
    pub fn allow_origin(&self) -> Option<AllowOrigin> {
        Directive::resolve(self.allow_origin.as_ref(), || WILDCARD.to_string()).map(AllowOrigin)
    }

    #[must_use]
    pub fn allow_headers(&self) -> Option<AllowHeaders> {
        Directive::resolve(self.allow_headers.as_ref(), || WILDCARD.to_string()).map(AllowHeaders)
    }

    #[must_use]
    pub fn expose_headers(&self) -> Option<ExposeHeaders> {
        Directive::resolve(self.expose_headers.as_ref(), || WILDCARD.to_string())
            .map(ExposeHeaders)
    }

    #[must_use]
    pub fn max_age(&self) -> Option<MaxAge> {
        Directive::resolve(self.max_age.as_ref(), || DEFAULT_MAX_AGE_SECS).map(MaxAge)
    }
}
