pub mod config;
pub mod db;
pub mod handler;
pub mod routes;
pub mod runtime;
pub mod support;

use axum::{middleware, Router};

use crate::handler::{log_request, ShareData};

pub fn app(data: ShareData) -> Router {
    routes::router()
        .layer(middleware::from_fn(log_request))
        .with_state(data)
}
