//! Minimal byway example — JSON endpoints, a regex-constrained route, a
//! catch-all, and one tracing middleware.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl http://localhost:3000/articles/7
//!   curl http://localhost:3000/articles/seven        # 404: regex wants digits
//!   curl -X DELETE http://localhost:3000/users/42    # 405 + Allow header
//!   curl http://localhost:3000/static/css/site.css

use byway::{BoxedHandler, Handler, Request, Response, Router, Server};
use http::StatusCode;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .wrap(trace)
        .get("/users/:id", get_user)
        .post("/users", create_user)
        .get("/articles/:id([0-9]+)", get_article)
        .get("/static/*path", serve_static);

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// Per-request log line: method, path, status. Registered first, so it wraps
// every route and observes the final response.
fn trace(next: BoxedHandler) -> BoxedHandler {
    (move |req: Request| {
        let next = next.clone();
        async move {
            let method = req.method().clone();
            let path = req.path().to_owned();
            let res = next.call(req).await;
            tracing::info!(%method, path, status = %res.status_code(), "request");
            res
        }
    })
    .into_boxed_handler()
}

async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes())
}

async fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }
    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(r#"{"id":"99"}"#.as_bytes().to_vec())
}

// Only reachable with a numeric id — the pattern's regex guards it.
async fn get_article(req: Request) -> Response {
    let id = req.param("id").unwrap_or("0");
    Response::json(format!(r#"{{"article":{id}}}"#).into_bytes())
}

async fn serve_static(req: Request) -> Response {
    Response::text(format!("would serve {}", req.param("path").unwrap_or("")))
}
