mod core;
mod features;
mod shared;

use crate::core::config::{Config, LogConfig, StoreBackend};
use crate::core::openapi::build_openapi;
use crate::core::{database, logging, middleware};
use crate::features::villas::store::{
    seed_sample_villas, InMemoryVillaStore, PgVillaStore, VillaStore,
};
use crate::features::villas::{routes as villas_routes, VillaService};
use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    let log_config = LogConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    // Dropping the guard stops the file writer, keep it until the server exits
    let _log_guard = logging::init(&log_config)?;
    if log_config.file_enabled {
        tracing::info!("Writing logs to {}/{}.*", log_config.dir, log_config.file_prefix);
    }

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        "Configuration loaded (store={:?}, tokio_worker_threads={}, pid={})",
        config.store.backend,
        worker_threads,
        std::process::id()
    );

    let store: Arc<dyn VillaStore> = match config.store.backend {
        StoreBackend::Postgres => {
            let db_config = config
                .database
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("Database configuration missing"))?;
            let pool = database::create_pool(db_config).await?;
            database::run_migrations(&pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
            Arc::new(PgVillaStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory villa store; data is lost on restart");
            Arc::new(InMemoryVillaStore::new())
        }
    };

    if config.store.seed_sample_villas {
        let seeded = seed_sample_villas(store.as_ref())
            .await
            .map_err(|e| anyhow::anyhow!("Seeding sample villas failed: {}", e))?;
        tracing::info!("Seeded {} sample villa(s)", seeded);
    }

    let villa_service = Arc::new(VillaService::new(store));
    tracing::info!("Villa service initialized");

    let app = build_router(&config, villa_service);

    // Start server
    let addr = config.app.server_address();
    let listener = bind_listener(&addr)?;
    tracing::info!("Server listening on http://{}", addr);
    if config.swagger.enabled {
        tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn build_router(config: &Config, villa_service: Arc<VillaService>) -> Router {
    // Simple health check endpoint
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }

    let mut app = Router::new()
        .merge(villas_routes::routes(villa_service))
        .route("/health", axum::routing::get(health_check));

    if config.swagger.enabled {
        app = app.merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", build_openapi(&config.swagger)),
        );
    } else {
        tracing::info!("Swagger UI disabled");
    }

    app.layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(
            ServiceBuilder::new()
                // Generate X-Request-Id using UUID v7 (or keep a client-provided one)
                .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
                .layer(middleware::trace_layer())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::cors_layer(&config.app.cors_allowed_origins)),
        )
}

fn bind_listener(addr: &str) -> anyhow::Result<tokio::net::TcpListener> {
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    Ok(tokio::net::TcpListener::from_std(socket.into())?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
