/// HTTP server setup and routing
use crate::{
    context::AppContext,
    db,
    error::{ConsoleError, ConsoleResult},
};
use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Build the main application router
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health_check))
        .merge(crate::api::routes())
        .with_state(ctx)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .fallback(not_found)
}

/// Health check handler
async fn health_check(State(ctx): State<AppContext>) -> Json<serde_json::Value> {
    let status = match db::test_connection(&ctx.db).await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            "degraded"
        }
    };

    Json(json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// 404 handler
async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "NotFound",
            "message": "Endpoint not found"
        })),
    )
}

/// Start the HTTP server
pub async fn serve(ctx: AppContext) -> ConsoleResult<()> {
    let addr = format!(
        "{}:{}",
        ctx.config.service.hostname, ctx.config.service.port
    );

    info!("Newsdesk console listening on {}", addr);
    info!("   Public URL: {}", ctx.public_url());

    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ConsoleError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ConsoleError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
