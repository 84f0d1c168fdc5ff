use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    clock::Clock,
    db::DocumentStore,
    middleware::{request_id_middleware, request_span},
    services::{MonthlyLedger, RecommendationService},
};

pub mod ledger;
pub mod recommendations;
pub mod watched;
pub mod watchlist;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<MonthlyLedger>,
    pub store: Arc<dyn DocumentStore>,
    pub clock: Arc<dyn Clock>,
    pub recommendations: Arc<RecommendationService>,
    /// Window used by the history report when the request names none
    pub history_months: u32,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        recommendations: RecommendationService,
        history_months: u32,
    ) -> Self {
        Self {
            ledger: Arc::new(MonthlyLedger::new(store.clone(), clock.clone())),
            store,
            clock,
            recommendations: Arc::new(recommendations),
            history_months,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            // Outermost first: the request id must exist before the trace span is made
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/users/:user_id/ledger", get(ledger::get_ledger))
        .route("/users/:user_id/ledger/expenses", post(ledger::add_expense))
        .route(
            "/users/:user_id/ledger/subscriptions/:platform",
            delete(ledger::cancel_subscription),
        )
        .route("/users/:user_id/ledger/budget", put(ledger::set_budget))
        .route("/users/:user_id/ledger/history", get(ledger::history))
        .route("/users/:user_id/watched", get(watched::list))
        .route(
            "/users/:user_id/watched/:item_id",
            get(watched::get_item)
                .put(watched::record)
                .delete(watched::remove),
        )
        .route("/users/:user_id/watchlist", get(watchlist::list))
        .route(
            "/users/:user_id/watchlist/:item_id",
            get(watchlist::get_item)
                .put(watchlist::add)
                .delete(watchlist::remove),
        )
        .route("/users/:user_id/habits", get(watched::habits))
        .route(
            "/users/:user_id/recommendations",
            post(recommendations::recommend),
        )
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
