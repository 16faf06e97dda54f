use axum::{extract::DefaultBodyLimit, middleware::from_fn, Router};
use std::sync::Arc;
use std::time::Duration;
use tourbook::core::config::Config;
use tourbook::core::openapi::{ApiDoc, SwaggerInfoModifier};
use tourbook::core::{database, middleware};
use tourbook::features::ads::{routes as ads_routes, AdService};
use tourbook::features::auth::{routes as auth_routes, SessionService};
use tourbook::features::categories::{routes as categories_routes, CategoryService};
use tourbook::features::destinations::{routes as destinations_routes, DestinationService};
use tourbook::features::images::{routes as images_routes, ImageService};
use tourbook::features::places::{routes as places_routes, PlaceService};
use tourbook::modules::storage::R2Storage;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

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
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1),
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Sessions and the bootstrap admin account
    let session_service = Arc::new(SessionService::new(pool.clone(), config.session.clone()));
    if session_service
        .ensure_bootstrap_admin()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create bootstrap admin: {}", e))?
    {
        tracing::info!("Bootstrap admin account created");
    }

    // Expired sessions are swept periodically; lookups already ignore them
    {
        let sessions = Arc::clone(&session_service);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
            loop {
                interval.tick().await;
                match sessions.purge_expired().await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!("Purged {} expired sessions", n),
                    Err(e) => tracing::warn!("Failed to purge expired sessions: {}", e),
                }
            }
        });
    }

    // Object storage for images
    let storage = R2Storage::new(config.storage.clone())
        .map_err(|e| anyhow::anyhow!("Failed to initialize object storage: {}", e))?;
    tracing::info!("Object storage initialized for bucket: {}", storage.bucket_name());
    let image_service = Arc::new(ImageService::new(Arc::new(storage)));

    // Content services
    let category_service = Arc::new(CategoryService::new(pool.clone(), Arc::clone(&image_service)));
    let destination_service = Arc::new(DestinationService::new(
        pool.clone(),
        Arc::clone(&image_service),
    ));
    let place_service = Arc::new(PlaceService::new(pool.clone(), Arc::clone(&image_service)));
    let ad_service = Arc::new(AdService::new(pool.clone(), Arc::clone(&image_service)));
    tracing::info!("Content services initialized");

    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Reads are public; mutations check the resolved user through the role guards
    let api_routes = Router::new()
        .merge(auth_routes::routes(Arc::clone(&session_service)))
        .merge(categories_routes::routes(category_service))
        .merge(destinations_routes::routes(destination_service))
        .merge(places_routes::routes(place_service))
        .merge(ads_routes::routes(ad_service))
        .merge(images_routes::routes(image_service))
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(axum::middleware::from_fn_with_state(
            session_service,
            middleware::session_middleware,
        ));

    let app = Router::new()
        .merge(swagger)
        .merge(api_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let listener = bind_listener(socket_addr)?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// TCP listener tuned through socket2 (reuse, nodelay, keepalive, buffers)
fn bind_listener(socket_addr: std::net::SocketAddr) -> anyhow::Result<tokio::net::TcpListener> {
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(Duration::from_secs(60))
            .with_interval(Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    Ok(tokio::net::TcpListener::from_std(socket.into())?)
}
