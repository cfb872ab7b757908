use std::sync::Arc;

use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE,
};
use http::Method;

use super::declaration::{
    AllowHeaders, AllowOrigin, CorsDeclaration, Disable, ExposeHeaders, MaxAge,
};
use super::error::CorsSpecError;
use crate::context::CorsTarget;

static DUMB_SPEC: CorsSpec = CorsSpec::DUMB;

/// Resolved CORS directives for a handler.
///
/// A spec is one of:
/// - the identity (not effective, applies nothing),
/// - a directive set folded from declarations or an allowed-method list,
/// - a chain of two effective, non-disabled specs applied in order.
///
/// Specs are immutable and cheap to clone; the directive data is shared.
///
/// # Composition
///
/// Declarations at the same level are folded per field, later wins:
///
/// ```rust
/// use actiondispatch::cors::{CorsDeclaration, CorsSpec};
///
/// let class = CorsDeclaration::new().with_allow_origin("a.com").with_max_age(60);
/// let method = CorsDeclaration::new().with_allow_origin("b.com");
/// let spec = CorsSpec::fold([&class, &method]);
/// assert_eq!(spec.origin(), Some("b.com"));
/// assert_eq!(spec.max_age(), Some(60));
/// ```
///
/// Specs from different layers are combined with [`CorsSpec::chain`], where
/// both sides get to write headers and the first writer of each header wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CorsSpec {
    inner: Inner,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Inner {
    #[default]
    Dumb,
    Directives(Arc<Directives>),
    Chained(Arc<CorsSpec>, Arc<CorsSpec>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Directives {
    disabled: bool,
    origin: Option<String>,
    methods: Option<String>,
    expose_headers: Option<String>,
    allow_headers: Option<String>,
    max_age: Option<i32>,
}

impl CorsSpec {
    /// The identity spec: not effective, `apply_to` does nothing
    pub const DUMB: CorsSpec = CorsSpec { inner: Inner::Dumb };

    /// Shared reference to [`CorsSpec::DUMB`]
    #[must_use]
    pub fn dumb() -> &'static CorsSpec {
        &DUMB_SPEC
    }

    #[must_use]
    pub fn builder() -> CorsSpecBuilder {
        CorsSpecBuilder::default()
    }

    /// Fold declarations left to right (controller level first, then action).
    #[must_use]
    pub fn fold<'a, I>(layers: I) -> CorsSpec
    where
        I: IntoIterator<Item = &'a CorsDeclaration>,
    {
        layers
            .into_iter()
            .fold(CorsSpec::builder(), CorsSpecBuilder::with_declaration)
            .build()
    }

    /// Spec carrying only `Access-Control-Allow-Methods`.
    ///
    /// Methods are joined with `", "` in the given order, duplicates dropped.
    pub fn for_methods(methods: &[Method]) -> Result<CorsSpec, CorsSpecError> {
        if methods.is_empty() {
            return Err(CorsSpecError::EmptyMethodSet);
        }
        let mut names: Vec<&str> = Vec::with_capacity(methods.len());
        for m in methods {
            if !names.contains(&m.as_str()) {
                names.push(m.as_str());
            }
        }
        Ok(CorsSpec {
            inner: Inner::Directives(Arc::new(Directives {
                methods: Some(names.join(", ")),
                ..Directives::default()
            })),
        })
    }

    /// Whether the spec carries any directive at all
    #[must_use]
    pub fn effective(&self) -> bool {
        !matches!(self.inner, Inner::Dumb)
    }

    /// Whether the spec switches CORS off. A chain is never disabled itself:
    /// chaining with a disabled spec yields that spec instead.
    #[must_use]
    pub fn disabled(&self) -> bool {
        matches!(&self.inner, Inner::Directives(d) if d.disabled)
    }

    #[must_use]
    pub fn is_chain(&self) -> bool {
        matches!(self.inner, Inner::Chained(..))
    }

    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.directives()?.origin.as_deref()
    }

    #[must_use]
    pub fn allowed_methods(&self) -> Option<&str> {
        self.directives()?.methods.as_deref()
    }

    #[must_use]
    pub fn expose_headers(&self) -> Option<&str> {
        self.directives()?.expose_headers.as_deref()
    }

    #[must_use]
    pub fn allow_headers(&self) -> Option<&str> {
        self.directives()?.allow_headers.as_deref()
    }

    #[must_use]
    pub fn max_age(&self) -> Option<i32> {
        self.directives()?.max_age
    }

    fn directives(&self) -> Option<&Directives> {
        match &self.inner {
            Inner::Directives(d) => Some(d),
            _ => None,
        }
    }

    /// Combine with a spec declared further along the chain.
    ///
    /// - `next` not effective: `self`
    /// - `self` not effective: `next`
    /// - `next` disabled: `next`
    /// - `self` disabled: `self`
    /// - otherwise both apply, `self` first
    ///
    /// Unlike [`CorsSpec::fold`], this does not merge fields: the first spec
    /// to write a header keeps it, so `self` wins conflicts on the response.
    #[must_use]
    pub fn chain(&self, next: &CorsSpec) -> CorsSpec {
        if !next.effective() {
            return self.clone();
        }
        if !self.effective() {
            return next.clone();
        }
        if next.disabled() {
            return next.clone();
        }
        if self.disabled() {
            return self.clone();
        }
        CorsSpec {
            inner: Inner::Chained(Arc::new(self.clone()), Arc::new(next.clone())),
        }
    }

    /// Write this spec's headers to the context's response.
    ///
    /// Preflight-only headers (`Allow-Methods`, `Expose-Headers`,
    /// `Allow-Headers`, `Max-Age`) are written only for `OPTIONS` requests.
    /// Existing headers are never overwritten.
    pub fn apply_to<C: CorsTarget + ?Sized>(&self, ctx: &mut C) {
        match &self.inner {
            Inner::Dumb => {}
            Inner::Directives(d) => d.apply_to(ctx),
            Inner::Chained(first, second) => {
                first.apply_to(ctx);
                second.apply_to(ctx);
            }
        }
    }
}

impl Directives {
    fn apply_to<C: CorsTarget + ?Sized>(&self, ctx: &mut C) {
        if self.disabled {
            ctx.disable_cors();
            return;
        }
        let preflight = ctx.is_options_method();
        let r = ctx.resp();
        if let Some(origin) = &self.origin {
            r.add_header_if_not_added(ACCESS_CONTROL_ALLOW_ORIGIN.as_str(), origin);
        }
        if !preflight {
            return;
        }
        if let Some(methods) = &self.methods {
            r.add_header_if_not_added(ACCESS_CONTROL_ALLOW_METHODS.as_str(), methods);
        }
        if let Some(expose) = &self.expose_headers {
            r.add_header_if_not_added(ACCESS_CONTROL_EXPOSE_HEADERS.as_str(), expose);
        }
        if let Some(allow) = &self.allow_headers {
            r.add_header_if_not_added(ACCESS_CONTROL_ALLOW_HEADERS.as_str(), allow);
        }
        if let Some(age) = self.max_age.filter(|a| *a >= 0) {
            r.add_header_if_not_added(ACCESS_CONTROL_MAX_AGE.as_str(), &age.to_string());
        }
    }
}

/// Mutable build phase for a [`CorsSpec`].
///
/// Every present directive makes the resulting spec effective and overwrites
/// any value set earlier for the same field.
#[derive(Debug, Default)]
pub struct CorsSpecBuilder {
    directives: Directives,
    effective: bool,
}

impl CorsSpecBuilder {
    #[must_use]
    pub fn with_disable(mut self, disable: Option<Disable>) -> Self {
        if disable.is_some() {
            self.effective = true;
            self.directives.disabled = true;
        }
        self
    }

    #[must_use]
    pub fn with_allow_origin(mut self, origin: Option<AllowOrigin>) -> Self {
        if let Some(AllowOrigin(value)) = origin {
            self.effective = true;
            self.directives.origin = Some(value);
        }
        self
    }

    #[must_use]
    pub fn with_allow_headers(mut self, headers: Option<AllowHeaders>) -> Self {
        if let Some(AllowHeaders(value)) = headers {
            self.effective = true;
            self.directives.allow_headers = Some(value);
        }
        self
    }

    #[must_use]
    pub fn with_expose_headers(mut self, headers: Option<ExposeHeaders>) -> Self {
        if let Some(ExposeHeaders(value)) = headers {
            self.effective = true;
            self.directives.expose_headers = Some(value);
        }
        self
    }

    #[must_use]
    pub fn with_max_age(mut self, max_age: Option<MaxAge>) -> Self {
        if let Some(MaxAge(secs)) = max_age {
            self.effective = true;
            self.directives.max_age = Some(secs);
        }
        self
    }

    /// Apply every directive of one declaration level
    #[must_use]
    pub fn with_declaration(self, decl: &CorsDeclaration) -> Self {
        self.with_disable(decl.disable())
            .with_allow_origin(decl.allow_origin())
            .with_expose_headers(decl.expose_headers())
            .with_allow_headers(decl.allow_headers())
            .with_max_age(decl.max_age())
    }

    #[must_use]
    pub fn build(self) -> CorsSpec {
        if !self.effective {
            return CorsSpec::DUMB;
        }
        CorsSpec {
            inner: Inner::Directives(Arc::new(self.directives)),
        }
    }
}
