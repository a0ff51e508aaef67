//! Middleware layer: wrapping handlers in cross-cutting behavior.
//!
//! A middleware is a transform from the next handler to a new handler. The
//! router composes the registered middleware once, at route registration, so
//! the request hot path runs a pre-built chain with no per-request assembly.
//!
//! Composition order: the first-registered middleware is outermost — its
//! pre-logic runs first on the way in and its post-logic last on the way out.
//!
//! ```rust,no_run
//! use byway::{BoxedHandler, Handler, Request, Response, Router};
//!
//! fn trace(next: BoxedHandler) -> BoxedHandler {
//!     (move |req: Request| {
//!         let next = next.clone();
//!         async move {
//!             tracing::info!(path = %req.path(), "request");
//!             next.call(req).await
//!         }
//!     })
//!     .into_boxed_handler()
//! }
//!
//! # async fn index(_: Request) -> Response { Response::text("") }
//! let app = Router::new()
//!     .wrap(trace)
//!     .get("/", index);
//! ```

use std::sync::Arc;

use crate::handler::BoxedHandler;

/// A transform from the next handler in the chain to a wrapped handler.
///
/// Any `Fn(BoxedHandler) -> BoxedHandler` closure qualifies via the blanket
/// impl below.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler;
}

impl<F> Middleware for F
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
{
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        self(next)
    }
}

/// Composes `middlewares` around `endpoint`, right to left, so the first
/// element ends up outermost. An empty list returns `endpoint` untouched.
pub fn chain(middlewares: &[Arc<dyn Middleware>], endpoint: BoxedHandler) -> BoxedHandler {
    middlewares
        .iter()
        .rev()
        .fold(endpoint, |next, middleware| middleware.wrap(next))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::handler::Handler;
    use crate::{Request, Response};

    type Log = Arc<Mutex<Vec<String>>>;

    fn tagged(label: &'static str, log: Log) -> Arc<dyn Middleware> {
        Arc::new(move |next: BoxedHandler| -> BoxedHandler {
            let log = Arc::clone(&log);
            (move |req: Request| {
                let next = Arc::clone(&next);
                let log = Arc::clone(&log);
                async move {
                    log.lock().unwrap().push(format!("{label}:pre"));
                    let res = next.call(req).await;
                    log.lock().unwrap().push(format!("{label}:post"));
                    res
                }
            })
            .into_boxed_handler()
        })
    }

    fn endpoint(log: Log) -> BoxedHandler {
        (move |_req: Request| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push("handler".to_owned());
                Response::text("done")
            }
        })
        .into_boxed_handler()
    }

    #[tokio::test]
    async fn first_registered_runs_outermost() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let chained = chain(
            &[tagged("a", Arc::clone(&log)), tagged("b", Arc::clone(&log))],
            endpoint(Arc::clone(&log)),
        );

        chained.call(Request::test("/")).await;

        let entries = log.lock().unwrap();
        assert_eq!(
            entries.as_slice(),
            ["a:pre", "b:pre", "handler", "b:post", "a:post"]
        );
    }

    #[tokio::test]
    async fn empty_chain_returns_the_endpoint_unchanged() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let handler = endpoint(log);
        let chained = chain(&[], Arc::clone(&handler));
        assert!(Arc::ptr_eq(&chained, &handler));
    }
}
