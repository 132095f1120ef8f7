use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use serveiq_db::store::PgRecordStore;
use serveiq_detect::CommandDetector;
use serveiq_worker::config::WorkerConfig;
use serveiq_worker::consumer::Consumer;
use serveiq_worker::processor::Processor;
use serveiq_worker::subscriber::{self, ChannelClient};

/// Events buffered between the socket reader and the consumer loop.
const EVENT_QUEUE_CAPACITY: usize = 256;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "serveiq_worker=debug,serveiq_detect=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env();
    tracing::info!(
        server = %config.server_ws_url,
        staging_dir = %config.staging_dir.display(),
        detector = %config.detector_program,
        "Loaded worker configuration"
    );

    let pool = serveiq_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    serveiq_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database connection pool created");

    let store = Arc::new(PgRecordStore::new(pool));
    let detector = CommandDetector::new(&config.detector_program, config.detector_args.clone())
        .with_timeout(config.detector_timeout);
    let processor = Processor::new(store, detector, config.staging_dir.clone());

    let cancel = CancellationToken::new();
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);

    let client = ChannelClient::new(config.server_ws_url.clone());
    let listener_cancel = cancel.clone();
    let listener_handle = tokio::spawn(async move {
        subscriber::run(&client, tx, &listener_cancel).await;
    });

    let consumer_handle = tokio::spawn(Consumer::new(processor).run(rx));
    tracing::info!("Worker started, waiting for new files");

    shutdown_signal().await;

    // Stopping the listener drops the sender; the consumer finishes the
    // record in hand and then exits.
    cancel.cancel();
    let _ = listener_handle.await;
    let _ = consumer_handle.await;
    tracing::info!("Worker shut down");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
