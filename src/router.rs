//! Radix-trie request router.
//!
//! One trie serves every method: each matched node carries its own
//! method→handler map, which is what lets the router answer 405 (path known,
//! method not registered) instead of collapsing everything into 404.
//!
//! Build the router once at startup, then share it read-only across request
//! tasks. Registration chains:
//!
//! ```rust,no_run
//! # use byway::{MethodFlags, Request, Response, Router};
//! # async fn list(_: Request) -> Response { Response::text("") }
//! # async fn show(_: Request) -> Response { Response::text("") }
//! # async fn assets(_: Request) -> Response { Response::text("") }
//! let app = Router::new()
//!     .get("/users", list)
//!     .on(MethodFlags::GET | MethodFlags::HEAD, "/users/:id", show)
//!     .get("/assets/*path", assets);
//! ```

use std::sync::Arc;

use http::StatusCode;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::method::MethodFlags;
use crate::middleware::{Middleware, chain};
use crate::params::RouteParams;
use crate::response::Response;
use crate::tree::Tree;

/// The outcome of a route lookup. The three cases map onto handler dispatch,
/// 405, and 404 respectively — callers must keep the last two apart.
pub enum RouteMatch {
    /// A handler is registered for this path and method.
    Found {
        handler: BoxedHandler,
        params: RouteParams,
    },
    /// The path is registered, but not for this method.
    MethodNotAllowed { allow: MethodFlags },
    /// No route covers this path.
    NotFound,
}

/// The application router.
pub struct Router {
    tree: Tree,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Router {
    pub fn new() -> Self {
        Self { tree: Tree::new(), middlewares: Vec::new() }
    }

    /// Appends a middleware. Middleware wraps every route registered *after*
    /// this call — register middleware first, routes second. The first
    /// middleware added is outermost.
    pub fn wrap(mut self, middleware: impl Middleware) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Registers a handler for every method in `methods` (which may be a
    /// union, or [`MethodFlags::ALL`]). Returns `self` for chaining.
    ///
    /// Pattern syntax: literal segments, `:name` params, `:name(regex)`
    /// constrained params, and a trailing `*` / `*name` catch-all.
    ///
    /// # Panics
    ///
    /// Panics on a malformed pattern. Routes are static program structure;
    /// a bad one is a bug worth failing loudly at startup. Use
    /// [`try_on`](Router::try_on) to handle the error instead.
    pub fn on(self, methods: MethodFlags, pattern: &str, handler: impl Handler) -> Self {
        self.try_on(methods, pattern, handler)
            .unwrap_or_else(|e| panic!("invalid route `{pattern}`: {e}"))
    }

    /// Like [`on`](Router::on), but surfaces registration errors.
    pub fn try_on(
        mut self,
        methods: MethodFlags,
        pattern: &str,
        handler: impl Handler,
    ) -> Result<Self, Error> {
        let endpoint = chain(&self.middlewares, handler.into_boxed_handler());
        self.tree.insert(methods, pattern, endpoint)?;
        Ok(self)
    }

    pub fn get(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(MethodFlags::GET, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(MethodFlags::POST, pattern, handler)
    }

    pub fn put(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(MethodFlags::PUT, pattern, handler)
    }

    pub fn delete(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(MethodFlags::DELETE, pattern, handler)
    }

    pub fn patch(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(MethodFlags::PATCH, pattern, handler)
    }

    pub fn head(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(MethodFlags::HEAD, pattern, handler)
    }

    pub fn options(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(MethodFlags::OPTIONS, pattern, handler)
    }

    /// Registers under every method (the `ALL` sentinel).
    pub fn all(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(MethodFlags::ALL, pattern, handler)
    }

    /// Matches one request. `method` must be a single-method flag.
    ///
    /// Takes `&self` only — safe to call concurrently from many request
    /// tasks; per-request state lives entirely in the returned params.
    pub fn lookup(&self, method: MethodFlags, path: &str) -> RouteMatch {
        let mut params = RouteParams::new();
        match self.tree.find(path, &mut params) {
            None => RouteMatch::NotFound,
            Some(handlers) => match handlers.get(method) {
                Some(handler) => RouteMatch::Found { handler: Arc::clone(handler), params },
                None => RouteMatch::MethodNotAllowed { allow: handlers.allowed() },
            },
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// The default 405 response: enumerates the path's registered methods in an
/// `Allow` header, as RFC 9110 §15.5.6 requires.
pub fn method_not_allowed(allow: MethodFlags) -> Response {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("allow", &allow.allow_header())
        .text("Method Not Allowed")
}
