use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use evlog::meta;

use crate::db::Store;
use crate::runtime::get_logger;

/// State shared by every request handler.
#[derive(Clone)]
pub struct ShareData {
    pub store: Arc<dyn Store>,
}

impl ShareData {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
        }
    }
}

pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;

    get_logger().debug("Handled request.", meta! {
        "Method" => method,
        "Path" => path,
        "Status" => response.status().as_u16(),
    });

    response
}
