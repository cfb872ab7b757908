use std::sync::Arc;

use http::Method;
use once_cell::sync::OnceCell;
use smallvec::SmallVec;

use super::error::MethodError;
use super::method::resolve_method;
use super::secure::is_secure;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Maximum inline query/form parameters before heap allocation
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated header storage
///
/// Header names use `Arc<str>` since the same names repeat across requests.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Stack-allocated query/form parameter storage
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// The narrow view of an inbound request that method and security resolution need.
pub trait RawRequest {
    /// Method as it appeared on the wire, before any override
    fn native_method(&self) -> Method;
    /// Header value by name (case-insensitive)
    fn header(&self, name: &str) -> Option<&str>;
    /// Query or form parameter by name
    fn param_value(&self, name: &str) -> Option<&str>;
}

/// An inbound request together with its memoised method and security facts.
///
/// `method()` and `secure()` are computed on first access and frozen for the
/// lifetime of the request; later header changes are not observed because the
/// request is immutable once built.
#[derive(Debug)]
pub struct ActionRequest {
    native_method: Method,
    path: String,
    headers: HeaderVec,
    query_params: ParamVec,
    form_params: ParamVec,
    trusted_forwarded_proto: Option<Arc<str>>,
    method: OnceCell<Method>,
    secure: OnceCell<bool>,
}

impl ActionRequest {
    /// Build a request from its native method and request target (path plus
    /// optional query string).
    #[must_use]
    pub fn new(native_method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };
        let query_params: ParamVec = query
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (Arc::from(&*k), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            native_method,
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            headers: HeaderVec::new(),
            query_params,
            form_params: ParamVec::new(),
            trusted_forwarded_proto: None,
            method: OnceCell::new(),
            secure: OnceCell::new(),
        }
    }

    /// Add a request header
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .push((Arc::from(name.to_ascii_lowercase()), value.to_string()));
        self
    }

    /// Add a decoded form body parameter
    #[must_use]
    pub fn with_form_param(mut self, name: &str, value: &str) -> Self {
        self.form_params.push((Arc::from(name), value.to_string()));
        self
    }

    /// Set the deployment's trusted forwarded protocol (from `AppConfig`)
    #[must_use]
    pub fn with_forwarded_protocol(mut self, proto: Option<&str>) -> Self {
        self.trusted_forwarded_proto = proto.map(Arc::from);
        self
    }

    /// Request path without the query string
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Requests are always mounted at the root context
    #[must_use]
    pub fn context_path(&self) -> &str {
        ""
    }

    /// Effective method, resolving overrides on first call.
    ///
    /// A failed resolution is not cached; every call reports the same error
    /// since the request cannot change.
    pub fn method(&self) -> Result<Method, MethodError> {
        if let Some(method) = self.method.get() {
            return Ok(method.clone());
        }
        let resolved = resolve_method(self)?;
        Ok(self.method.get_or_init(|| resolved).clone())
    }

    /// Pin the effective method, bypassing override resolution
    pub fn set_method(&mut self, method: Method) {
        self.method = OnceCell::with_value(method);
    }

    /// Whether the request arrived over TLS, computed once
    #[must_use]
    pub fn secure(&self) -> bool {
        *self
            .secure
            .get_or_init(|| is_secure(self, self.trusted_forwarded_proto.as_deref()))
    }

    /// Get a query parameter by name (last occurrence wins)
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a form parameter by name (last occurrence wins)
    #[must_use]
    pub fn form_param(&self, name: &str) -> Option<&str> {
        self.form_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

impl RawRequest for ActionRequest {
    fn native_method(&self) -> Method {
        self.native_method.clone()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn param_value(&self, name: &str) -> Option<&str> {
        self.query_param(name).or_else(|| self.form_param(name))
    }
}
