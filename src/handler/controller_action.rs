use std::fmt;
use std::sync::Arc;

use tracing::{error, info};

use crate::context::ActionContext;
use crate::cors::CorsSpec;
use crate::csrf::CsrfSpec;
use crate::dispatcher::DispatchError;
use crate::response::ActionResult;

use super::invoker::ActionInvoker;
use super::visitor::{HandlerNode, HandlerVisitor};

/// Priority of the controller action itself relative to interceptors
pub const CONTROLLER_ACTION_PRIORITY: i32 = -1;

/// Dispatch node that owns exactly one downstream [`ActionInvoker`].
///
/// Every accessor delegates to the invoker. Once
/// [`release_resources`](Self::release_resources) has run the invoker is gone
/// and every accessor returns [`DispatchError::ReleasedHandler`].
pub struct ControllerAction {
    name: Arc<str>,
    invoker: Option<Box<dyn ActionInvoker>>,
}

impl fmt::Debug for ControllerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerAction")
            .field("name", &self.name)
            .field("released", &self.invoker.is_none())
            .finish()
    }
}

impl ControllerAction {
    #[must_use]
    pub fn new(invoker: Box<dyn ActionInvoker>) -> Self {
        Self {
            name: Arc::from(invoker.name()),
            invoker: Some(invoker),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn priority(&self) -> i32 {
        CONTROLLER_ACTION_PRIORITY
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.invoker.is_none()
    }

    fn invoker(&self) -> Result<&dyn ActionInvoker, DispatchError> {
        match self.invoker.as_deref() {
            Some(invoker) => Ok(invoker),
            None => {
                error!(handler_name = %self.name, "Released handler used - CRITICAL");
                Err(DispatchError::ReleasedHandler {
                    name: self.name.to_string(),
                })
            }
        }
    }

    /// Invoke the wrapped action; its failure is returned as-is.
    pub fn handle(&self, ctx: &mut ActionContext) -> anyhow::Result<ActionResult> {
        self.invoker()?.handle(ctx)
    }

    pub fn cors_spec(&self) -> Result<&CorsSpec, DispatchError> {
        Ok(self.invoker()?.cors_spec())
    }

    pub fn csrf_spec(&self) -> Result<&CsrfSpec, DispatchError> {
        Ok(self.invoker()?.csrf_spec())
    }

    pub fn session_free(&self) -> Result<bool, DispatchError> {
        Ok(self.invoker()?.session_free())
    }

    pub fn express(&self) -> Result<bool, DispatchError> {
        Ok(self.invoker()?.express())
    }

    /// Hand the invoker-level view of `visitor` to the wrapped invoker.
    ///
    /// A released action shows up as [`HandlerNode::Released`].
    pub fn accept(&self, visitor: &mut dyn HandlerVisitor) {
        let v = visitor.invoker_visitor();
        match self.invoker.as_deref() {
            Some(invoker) => invoker.accept(v),
            None => v.visit(&HandlerNode::Released { name: &self.name }),
        }
    }

    /// Destroy the wrapped invoker. Idempotent.
    pub fn release_resources(&mut self) {
        if let Some(mut invoker) = self.invoker.take() {
            invoker.destroy();
            info!(handler_name = %self.name, "Handler resources released");
        }
    }
}

impl Drop for ControllerAction {
    fn drop(&mut self) {
        self.release_resources();
    }
}
