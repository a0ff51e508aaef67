//! HTTP server and graceful shutdown.
//!
//! The router is the library's heart; this is the reference hosting layer
//! around it. On SIGTERM (what Kubernetes sends) or Ctrl-C the server stops
//! accepting, drains every in-flight connection, and returns from
//! [`Server::serve`] so `main` can exit cleanly. Size the platform's grace
//! period (`terminationGracePeriodSeconds`) above your slowest request.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::method::MethodFlags;
use crate::request::Request;
use crate::response::Response;
use crate::router::{RouteMatch, Router, method_not_allowed};

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { addr }
    }

    /// Accepts connections and dispatches them through `router`. Returns
    /// only after a full graceful shutdown.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;

        // Shared read-only across connection tasks; lookup takes &self.
        let router = Arc::new(router);

        info!(addr = %self.addr, "byway listening");

        // Every connection task lands in the JoinSet so shutdown can drain
        // them all before returning.
        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Check shutdown before the accept queue so a signal stops
                // new connections immediately.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move { dispatch(router, req, remote_addr).await }
                        });

                        // auto::Builder speaks whichever of HTTP/1.1 and
                        // HTTP/2 the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished tasks so the JoinSet stays bounded.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("byway stopped");
        Ok(())
    }
}

/// Hot path: routes one request and produces one response. All failures are
/// turned into responses here (404, 405, 501, …) — hyper never sees an error.
async fn dispatch(
    router: Arc<Router>,
    req: hyper::Request<hyper::body::Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    // Methods outside the routable nine never reach the trie. `ALL` is a
    // registration sentinel, not a request method.
    let method = match MethodFlags::from_method_name(req.method().as_str()) {
        Ok(m) if m != MethodFlags::ALL => m,
        _ => return Ok(Response::status(StatusCode::NOT_IMPLEMENTED).into_http()),
    };
    let path = req.uri().path().to_owned();

    let response = match router.lookup(method, &path) {
        RouteMatch::Found { handler, params } => {
            let (parts, body) = req.into_parts();
            let body = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    warn!(peer = %remote_addr, "failed to read request body: {e}");
                    return Ok(Response::status(StatusCode::BAD_REQUEST).into_http());
                }
            };
            handler.call(Request::new(parts, body, params)).await
        }
        RouteMatch::MethodNotAllowed { allow } => method_not_allowed(allow),
        RouteMatch::NotFound => Response::status(StatusCode::NOT_FOUND),
    };

    Ok(response.into_http())
}

/// Resolves on the first shutdown signal: SIGTERM or SIGINT on Unix, Ctrl-C
/// elsewhere.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    // On non-Unix platforms the SIGTERM arm never resolves.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
