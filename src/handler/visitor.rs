use serde::Serialize;

use crate::cors::CorsSpec;
use crate::csrf::CsrfSpec;

/// One node of a route's handler graph, as seen by a visitor.
///
/// The set of variants is closed; tooling matches on it instead of
/// downcasting handler types.
#[derive(Debug, Clone, Copy)]
pub enum HandlerNode<'a> {
    /// The controller action a route dispatches to
    Action {
        name: &'a str,
        cors: &'a CorsSpec,
        csrf: &'a CsrfSpec,
        session_free: bool,
        express: bool,
    },
    /// An after-interceptor attached to the route
    AfterInterceptor {
        name: &'a str,
        priority: i32,
        cors: &'a CorsSpec,
        session_free: bool,
        express: bool,
    },
    /// A handler whose resources were released
    Released { name: &'a str },
}

impl HandlerNode<'_> {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            HandlerNode::Action { name, .. }
            | HandlerNode::AfterInterceptor { name, .. }
            | HandlerNode::Released { name } => name,
        }
    }
}

/// Visitor over invoker-level nodes.
pub trait InvokerVisitor {
    fn visit(&mut self, node: &HandlerNode<'_>);
}

impl<F> InvokerVisitor for F
where
    F: FnMut(&HandlerNode<'_>),
{
    fn visit(&mut self, node: &HandlerNode<'_>) {
        self(node)
    }
}

/// Visitor over a route table.
///
/// Handlers narrow it to the [`InvokerVisitor`] their invoker understands.
pub trait HandlerVisitor {
    /// Called before the nodes of each route
    fn enter_route(&mut self, _route: &str) {}
    /// The invoker-level view of this visitor
    fn invoker_visitor(&mut self) -> &mut dyn InvokerVisitor;
}

/// Flattened, serializable view of one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSummary {
    pub kind: &'static str,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    pub cors: bool,
    pub session_free: bool,
    pub express: bool,
}

impl From<&HandlerNode<'_>> for NodeSummary {
    fn from(node: &HandlerNode<'_>) -> Self {
        match *node {
            HandlerNode::Action {
                name,
                cors,
                session_free,
                express,
                ..
            } => NodeSummary {
                kind: "action",
                name: name.to_string(),
                priority: None,
                cors: cors.effective(),
                session_free,
                express,
            },
            HandlerNode::AfterInterceptor {
                name,
                priority,
                cors,
                session_free,
                express,
            } => NodeSummary {
                kind: "after_interceptor",
                name: name.to_string(),
                priority: Some(priority),
                cors: cors.effective(),
                session_free,
                express,
            },
            HandlerNode::Released { name } => NodeSummary {
                kind: "released",
                name: name.to_string(),
                priority: None,
                cors: false,
                session_free: false,
                express: false,
            },
        }
    }
}

/// Nodes of one route in traversal order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteSummary {
    pub route: String,
    pub nodes: Vec<NodeSummary>,
}

/// Collects a [`RouteSummary`] per route; used for route listings and docs.
#[derive(Debug, Default)]
pub struct RouteSummaryCollector {
    routes: Vec<RouteSummary>,
}

impl RouteSummaryCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn into_routes(self) -> Vec<RouteSummary> {
        self.routes
    }
}

impl InvokerVisitor for RouteSummaryCollector {
    fn visit(&mut self, node: &HandlerNode<'_>) {
        if self.routes.is_empty() {
            self.routes.push(RouteSummary::default());
        }
        if let Some(route) = self.routes.last_mut() {
            route.nodes.push(NodeSummary::from(node));
        }
    }
}

impl HandlerVisitor for RouteSummaryCollector {
    fn enter_route(&mut self, route: &str) {
        self.routes.push(RouteSummary {
            route: route.to_string(),
            nodes: Vec::new(),
        });
    }

    fn invoker_visitor(&mut self) -> &mut dyn InvokerVisitor {
        self
    }
}
