//! # byway
//!
//! A radix-trie HTTP router for Rust services behind a reverse proxy.
//!
//! ## The contract
//!
//! Routing is the part that changes between applications, so it is the part
//! byway owns:
//!
//! - **Radix-trie matching** — one compressed trie for all methods, static
//!   segments, `:name` params, `:name(regex)` constrained params, and
//!   trailing `*` catch-alls. O(path-length) lookups, no allocation for the
//!   match itself, exact matches always beat wildcards.
//! - **Per-node method maps** — a path registered for GET but requested with
//!   DELETE answers `405` with a correct `Allow` header, not a misleading
//!   `404`.
//! - **Middleware chaining** — composed once at registration; the first
//!   middleware registered is the outermost at request time.
//! - **A hosting server** — tokio + hyper, HTTP/1.1 and HTTP/2, graceful
//!   SIGTERM / Ctrl-C shutdown that drains in-flight requests.
//!
//! TLS, rate limiting, body-size limits, and slow-client protection belong to
//! the proxy in front of you — nginx and its ingress cousins already ship
//! them, tested at scale.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use byway::{Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .get("/users/:id", get_user)
//!         .post("/users", create_user)
//!         .get("/files/*path", serve_file);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//!
//! async fn create_user(req: Request) -> Response {
//!     # let _ = req;
//!     Response::status(http::StatusCode::CREATED)
//! }
//!
//! async fn serve_file(req: Request) -> Response {
//!     Response::text(format!("would serve {}", req.param("path").unwrap_or("")))
//! }
//! ```
//!
//! Registration happens single-threaded at startup; once serving begins the
//! router is read-only and lookups run concurrently without locks.

mod error;
mod handler;
mod method;
mod params;
mod request;
mod response;
mod router;
mod server;
mod tree;

pub mod middleware;

pub use error::Error;
pub use handler::{BoxedHandler, ErasedHandler, Handler};
pub use method::MethodFlags;
pub use middleware::Middleware;
pub use params::{ParamRecorder, RouteParams};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::{RouteMatch, Router, method_not_allowed};
pub use server::Server;
