//! HTTP surface: page flow (name -> assessment -> results) and the JSON
//! prediction endpoint.

pub mod handlers;
pub mod pages;
pub mod session_cookie;

use crate::application::ml::pipeline::InferenceContext;
use crate::domain::session::SessionRepository;
use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared, read-mostly state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub inference: Arc<InferenceContext>,
    pub sessions: Arc<dyn SessionRepository>,
}

impl AppState {
    pub fn new(inference: Arc<InferenceContext>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self {
            inference,
            sessions,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/assessment", get(handlers::assessment))
        .route("/set_patient", post(handlers::set_patient))
        .route("/predict", post(handlers::predict))
        .route("/results", get(handlers::results))
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}
