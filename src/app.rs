use std::net::SocketAddr;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::{self, ApiError};
use crate::state::AppState;
use crate::{admin, auth, classes, homework, realtime, students};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(admin::router())
                .merge(classes::router())
                .merge(students::router())
                .merge(homework::router())
                .route("/health", get(health)),
        )
        .merge(realtime::router())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            error_detail_layer,
        ))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "5000".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    message: &'static str,
    timestamp: String,
}

async fn health() -> Json<Health> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    Json(Health {
        status: "OK",
        message: "Hifz Tracker API is running",
        timestamp,
    })
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".into())
}

/// Surfaces the raw internal-error detail outside production. The detail
/// travels as a response extension, so production responses stay opaque
/// without any process-global state.
async fn error_detail_layer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let resp = next.run(req).await;
    if state.config.is_production() {
        resp
    } else {
        error::reveal_error_detail(resp)
    }
}
