use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use bookit_api::services::{seed_data, BookingNotifier, ConfirmationMailer, HttpNotifier, LogNotifier};
use bookit_api::store::{MemoryStore, PgStore, Stores};
use bookit_api::{build_router, database, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bookit_api=debug,tower_http=debug".into());
    if config.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting BookIt API server...");

    let stores = match &config.database_url {
        Some(url) => {
            let pool = database::new_pool(url).await?;
            info!("Database connection pool created");
            Stores::from_backend(Arc::new(PgStore::new(pool)))
        }
        None => {
            warn!("DATABASE_URL not set; using the in-memory store (data is lost on restart)");
            Stores::from_backend(Arc::new(MemoryStore::new()))
        }
    };

    seed_data::seed_admin(
        stores.users.as_ref(),
        config.admin_email.as_deref(),
        config.admin_password.as_deref(),
    )
    .await?;

    let notifier: Arc<dyn BookingNotifier> = match &config.notification_url {
        Some(url) => {
            info!(%url, timeout_secs = config.notification_timeout_secs, "Booking confirmations will be POSTed");
            Arc::new(HttpNotifier::new(url.clone(), config.notification_timeout())?)
        }
        None => {
            info!("BOOKING_CONFIRMATION_URL not set; booking confirmations are logged only");
            Arc::new(LogNotifier)
        }
    };

    let mailer = ConfirmationMailer::from_config(config.smtp.as_ref())?;
    info!(smtp = mailer.is_smtp(), "Confirmation mailer ready");

    let port = config.port;
    let app_state = AppState::new(config, stores, notifier, mailer);
    let app = build_router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    // Graceful shutdown
    let server = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal());
    if let Err(e) = server.await {
        error!("Server error: {}", e);
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, shutting down gracefully...");
}
