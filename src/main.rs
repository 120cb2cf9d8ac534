use anyhow::Context;
use axum::{http::HeaderValue, routing::get, Extension, Router};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use washline_api::auth::{AuthConfig, AuthService};
use washline_api::config::{init_tracing, load_config};
use washline_api::db::{establish_connection_from_app_config, run_migrations};
use washline_api::events::{process_events, EventSender};
use washline_api::{api_routes, openapi, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    init_tracing(config.log_level(), config.log_json);

    info!(
        environment = %config.environment,
        host = %config.host,
        port = config.port,
        "Starting washline-api"
    );

    let db = Arc::new(
        establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?,
    );

    if config.auto_migrate {
        run_migrations(&db)
            .await
            .context("failed to run database migrations")?;
    }

    let (event_tx, event_rx) = mpsc::channel(1000);
    let event_sender = EventSender::new(event_tx);
    tokio::spawn(process_events(event_rx));

    let auth_service = Arc::new(AuthService::new(AuthConfig::from(&config)));

    let cors = build_cors_layer(config.cors_allowed_origins.as_deref());
    let state = AppState::new(db, config.clone(), event_sender);

    let app = Router::new()
        .route("/", get(|| async { "washline-api" }))
        .nest("/api", api_routes())
        .route("/api-docs/openapi.json", get(openapi::serve_openapi))
        .layer(Extension(auth_service))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(address = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shutdown complete");
    Ok(())
}

fn build_cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    match allowed_origins {
        Some(origins) if !origins.trim().is_empty() => {
            let parsed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|origin| {
                    let origin = origin.trim();
                    match origin.parse::<HeaderValue>() {
                        Ok(value) => Some(value),
                        Err(_) => {
                            warn!(origin = %origin, "Skipping unparseable CORS origin");
                            None
                        }
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(parsed))
                .allow_methods(Any)
                .allow_headers(Any)
        }
        _ => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => warn!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
