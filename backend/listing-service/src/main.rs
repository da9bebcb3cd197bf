use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use crypto_core::JwtKeys;
use db_pool::{create_pool, DbConfig};
use listing_service::config::StoreBackend;
use listing_service::db::{MemoryStore, PgStore};
use listing_service::storage::UploadStore;
use listing_service::{routes, AppState, Config};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn io_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

/// Listing Service
///
/// HTTP API for the LandSure land marketplace.
///
/// # Routes
///
/// - `/featured-listings` - Weighted featured feed plus recent listings
/// - `/api/listings/*` - Browse, search, create, edit and delete listings
/// - `/api/auth/*` - Register and log in
/// - `/refresh` - Exchange the refresh cookie for an access token
/// - `/api/users/*` - Profile and saved listings
/// - `/api/feedback` - Site feedback
/// - `/uploads/*` - Listing images
///
/// Listens on port 5000 unless `LISTING_SERVICE_PORT` or `PORT` says otherwise.
#[actix_web::main]
async fn main() -> io::Result<()> {
    // Missing .env is normal outside local development
    let _ = dotenvy::dotenv();

    init_tracing(listing_service::config::json_logs_from_env());

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting listing-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let jwt = JwtKeys::new(&config.auth.jwt_secret, &config.auth.refresh_secret)
        .map_err(|e| io_error("Failed to initialize JWT keys", e))?;

    let uploads = UploadStore::new(&config.uploads.dir, config.uploads.max_bytes);
    uploads
        .ensure_dir()
        .await
        .map_err(|e| io_error("Failed to create upload directory", e))?;

    let state = match config.database.backend {
        StoreBackend::Postgres => {
            let mut db_cfg = DbConfig::for_service("listing-service");
            db_cfg.database_url = config.database.url.clone();
            db_cfg.max_connections = config.database.max_connections;
            db_cfg.min_connections = db_cfg.min_connections.min(db_cfg.max_connections);
            db_cfg.log_config();

            let pool = match create_pool(db_cfg).await {
                Ok(pool) => pool,
                Err(e) => {
                    tracing::error!("Database pool creation failed: {:#}", e);
                    eprintln!("ERROR: Failed to create database pool: {}", e);
                    std::process::exit(1);
                }
            };

            let store = PgStore::new(pool);
            store
                .migrate()
                .await
                .map_err(|e| io_error("Failed to run database migrations", e))?;
            tracing::info!("Connected to PostgreSQL, migrations applied");

            AppState::new(
                Arc::new(store),
                jwt,
                uploads,
                config.auth.cookie_secure,
            )
        }
        StoreBackend::Memory => {
            tracing::warn!("STORE_BACKEND=memory: data is lost on restart");
            AppState::new(
                Arc::new(MemoryStore::new()),
                jwt,
                uploads,
                config.auth.cookie_secure,
            )
        }
    };
    let state = web::Data::new(state);

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(routes::configure)
    })
    .workers(config.app.workers)
    .bind(&bind_address)?
    .shutdown_timeout(30)
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, stopping HTTP server");
        handle.stop(true).await;
    });

    server.await?;
    tracing::info!("listing-service stopped");
    Ok(())
}
