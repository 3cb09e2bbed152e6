//! HTTP JSON API.
//!
//! Every route lives under `/api`. Handlers are thin: they extract input,
//! call one [`Database`] operation and map the outcome onto a status code.
//! Mutations that record who acted require the `X-Admin-Id` header.

mod appointments;
mod error;
mod identity;
mod journeys;
mod ledger;
mod matches;
mod messaging;
mod participants;
mod screenings;
mod tasks;
mod types;

pub use error::{ApiError, ErrorBody};
pub use identity::{AdminIdentity, ADMIN_ID_HEADER};
pub use types::*;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use nestwell_core::{models::DashboardStats, Database};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::CorsOrigins;
use error::ApiResult;

pub fn create_router(db: Database, cors: &CorsOrigins) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/dashboard", get(dashboard))
        .merge(participants::routes())
        .merge(matches::routes())
        .merge(journeys::routes())
        .merge(tasks::routes())
        .merge(messaging::routes())
        .merge(appointments::routes())
        .merge(ledger::routes())
        .merge(screenings::routes());

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(cors)),
        )
        .with_state(db)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

async fn dashboard(State(db): State<Database>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(db.dashboard_stats(Utc::now())?))
}

fn build_cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allowed: Vec<HeaderValue> = match origins {
        CorsOrigins::Any => {
            tracing::warn!("CORS: allowing all origins");
            return CorsLayer::permissive();
        }
        CorsOrigins::List(list) => list
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("CORS: ignoring invalid origin '{}': {}", origin, e);
                    None
                }
            })
            .collect(),
        CorsOrigins::LocalhostOnly => [
            "http://localhost:3000",
            "http://localhost:5173",
            "http://127.0.0.1:3000",
            "http://127.0.0.1:5173",
        ]
        .into_iter()
        .map(HeaderValue::from_static)
        .collect(),
    };

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(ADMIN_ID_HEADER),
        ])
}
