use http::Method;
use tracing::debug;
use ulid::Ulid;

use crate::request::ActionRequest;
use crate::response::{ActionResponse, ActionResult, ResponseHeaders};

/// The surface a CORS spec is applied against.
pub trait CorsTarget {
    /// Response the CORS headers are written to
    fn resp(&mut self) -> &mut dyn ResponseHeaders;
    /// Whether the current request is an `OPTIONS` preflight
    fn is_options_method(&self) -> bool;
    /// Record that CORS is disabled for this request
    fn disable_cors(&mut self);
}

/// Per-request dispatch context threaded through handlers and interceptors.
#[derive(Debug)]
pub struct ActionContext {
    request_id: Ulid,
    req: ActionRequest,
    resp: ActionResponse,
    cors_disabled: bool,
}

impl ActionContext {
    #[must_use]
    pub fn new(req: ActionRequest) -> Self {
        Self {
            request_id: Ulid::new(),
            req,
            resp: ActionResponse::default(),
            cors_disabled: false,
        }
    }

    #[must_use]
    pub fn request_id(&self) -> Ulid {
        self.request_id
    }

    #[must_use]
    pub fn req(&self) -> &ActionRequest {
        &self.req
    }

    pub fn req_mut(&mut self) -> &mut ActionRequest {
        &mut self.req
    }

    #[must_use]
    pub fn response(&self) -> &ActionResponse {
        &self.resp
    }

    pub fn response_mut(&mut self) -> &mut ActionResponse {
        &mut self.resp
    }

    /// Whether a disabling CORS spec was applied to this request
    #[must_use]
    pub fn cors_disabled(&self) -> bool {
        self.cors_disabled
    }

    /// Finish the request: fold the handler result into the response
    #[must_use]
    pub fn into_response(mut self, result: ActionResult) -> ActionResponse {
        self.resp.commit(result);
        self.resp
    }
}

impl CorsTarget for ActionContext {
    fn resp(&mut self) -> &mut dyn ResponseHeaders {
        &mut self.resp
    }

    /// A method that cannot be resolved is not a preflight.
    fn is_options_method(&self) -> bool {
        matches!(self.req.method(), Ok(m) if m == Method::OPTIONS)
    }

    fn disable_cors(&mut self) {
        debug!(request_id = %self.request_id, "CORS disabled for request");
        self.cors_disabled = true;
    }
}
