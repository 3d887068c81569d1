//! Route table and dispatch.
//!
//! Routes are registered on a [`RouterBuilder`] and frozen into an
//! immutable [`Router`] before the server starts accepting. Every
//! connection task then reads the same `Arc<Router>` without locking.
//!
//! ```text
//! Request → path lookup ──missing──→ 404 NOT FOUND
//!                │
//!                ▼
//!           method lookup ──missing──→ 405 METHOD NOT ALLOWED
//!                │
//!                ▼
//!           handlers, in registration order, until one returns Stop
//! ```
//!
//! Path matching is exact string equality.

use std::collections::HashMap;
use std::sync::Arc;

use crate::http::context::Context;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};

/// What a handler tells the dispatcher once it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// Run the next handler registered for the route.
    #[default]
    Continue,
    /// Skip the remaining handlers.
    Stop,
}

impl From<()> for Flow {
    fn from(_: ()) -> Self {
        Flow::Continue
    }
}

pub type Handler = Arc<dyn Fn(&mut Context<'_>) -> Flow + Send + Sync>;

/// Outcome of a single dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    NotFound,
    MethodNotAllowed,
    /// Number of handlers that actually ran
    Handled { invoked: usize },
}

type RouteTable = HashMap<String, HashMap<Method, Vec<Handler>>>;

#[derive(Default)]
pub struct RouterBuilder {
    routes: RouteTable,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler to `[path][method]`.
    ///
    /// The handler may return `()` (always continue) or a [`Flow`].
    pub fn add_handler<F, R>(&mut self, path: impl Into<String>, method: Method, handler: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) -> R + Send + Sync + 'static,
        R: Into<Flow>,
    {
        let wrapped: Handler = Arc::new(move |ctx: &mut Context<'_>| -> Flow { handler(ctx).into() });
        self.routes
            .entry(path.into())
            .or_default()
            .entry(method)
            .or_default()
            .push(wrapped);
        self
    }

    pub fn get<F, R>(&mut self, path: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) -> R + Send + Sync + 'static,
        R: Into<Flow>,
    {
        self.add_handler(path, Method::GET, handler)
    }

    pub fn post<F, R>(&mut self, path: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) -> R + Send + Sync + 'static,
        R: Into<Flow>,
    {
        self.add_handler(path, Method::POST, handler)
    }

    pub fn build(self) -> Router {
        Router { routes: self.routes }
    }
}

/// Frozen route table.
pub struct Router {
    routes: RouteTable,
}

impl Router {
    /// Looks up the handlers for the request and runs them against `res`.
    ///
    /// Sets 404 or 405 on `res` when the lookup fails; handlers are not
    /// called in that case.
    pub fn dispatch(&self, req: &Request, res: &mut Response) -> Dispatch {
        let Some(methods) = self.routes.get(&req.path) else {
            res.set_status(StatusCode::NotFound);
            return Dispatch::NotFound;
        };

        let Some(handlers) = methods.get(&req.method) else {
            res.set_status(StatusCode::MethodNotAllowed);
            return Dispatch::MethodNotAllowed;
        };

        let mut ctx = Context::new(req, res);
        let mut invoked = 0;
        for handler in handlers {
            invoked += 1;
            if handler(&mut ctx) == Flow::Stop {
                break;
            }
        }

        Dispatch::Handled { invoked }
    }

    /// Methods registered for `path`, sorted by their wire token.
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut methods: Vec<Method> = self
            .routes
            .get(path)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::RequestBuilder;

    #[test]
    fn empty_router_answers_404() {
        let router = RouterBuilder::new().build();
        let req = RequestBuilder::new().method(Method::GET).path("/").build().unwrap();
        let mut res = Response::default();

        assert!(router.is_empty());
        assert_eq!(router.dispatch(&req, &mut res), Dispatch::NotFound);
        assert_eq!(res.status, 404);
        assert_eq!(res.message, "NOT FOUND");
    }
}
