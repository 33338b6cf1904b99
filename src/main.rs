#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use nido_server::api::MgmtState;
use nido_server::config::Config;
use nido_server::services::health_service::HealthService;
use nido_server::services::message_service::MessageService;
use nido_server::services::release_service::ReleaseService;
use nido_server::services::settings_service::SettingsService;
use nido_server::storage::message_repo::MessageRepository;
use nido_server::storage::settings_repo::SettingsRepository;
use nido_server::workers::MessageReleaseWorker;
use nido_server::{storage, telemetry};
use std::net::SocketAddr;
use tokio::sync::watch;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let telemetry_guard = telemetry::init_telemetry(&config.telemetry)?;

    let boot_span = tracing::info_span!("boot_server");
    let (api_listener, mgmt_listener, app_router, mgmt_app, shutdown_tx, shutdown_rx, worker) = async {
        // Phase 1: Infrastructure
        let pool = storage::init_pool(&config.database_url).await?;
        storage::run_migrations(&pool).await?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        nido_server::spawn_signal_handler(shutdown_tx.clone());

        // Phase 2: Component wiring
        let message_repo = MessageRepository::new(pool.clone());
        let settings_repo = SettingsRepository::new(pool.clone());

        let message_service = MessageService::new(
            message_repo.clone(),
            settings_repo.clone(),
            config.messaging.org_utc_offset,
            config.messaging.conversation_batch_limit,
        );
        let settings_service = SettingsService::new(settings_repo);
        let release_service = ReleaseService::new(message_repo);
        let health_service = HealthService::new(pool);

        let worker = MessageReleaseWorker::new(release_service.clone(), config.messaging.release_interval_secs);

        // Phase 3: Listeners and routers
        let app_router = nido_server::api::app_router(config.clone(), message_service, settings_service);
        let mgmt_app = nido_server::api::mgmt_router(MgmtState {
            health_service,
            release_service,
            release_secret: config.messaging.release_secret.clone(),
        });

        let api_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        let mgmt_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.mgmt_port).parse()?;

        tracing::info!(address = %api_addr, "listening");
        tracing::info!(address = %mgmt_addr, "management server listening");

        let api_listener = tokio::net::TcpListener::bind(api_addr).await?;
        let mgmt_listener = tokio::net::TcpListener::bind(mgmt_addr).await?;

        Ok::<
            (
                tokio::net::TcpListener,
                tokio::net::TcpListener,
                axum::Router,
                axum::Router,
                watch::Sender<bool>,
                watch::Receiver<bool>,
                MessageReleaseWorker,
            ),
            anyhow::Error,
        >((api_listener, mgmt_listener, app_router, mgmt_app, shutdown_tx, shutdown_rx, worker))
    }
    .instrument(boot_span)
    .await?;

    // Phase 4: Runtime
    let worker_task = tokio::spawn(worker.run(shutdown_rx.clone()));

    let mut api_rx = shutdown_rx.clone();
    let api_server = axum::serve(api_listener, app_router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            let _ = api_rx.wait_for(|&s| s).await;
        });

    let mut mgmt_rx = shutdown_rx;
    let mgmt_server = axum::serve(mgmt_listener, mgmt_app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            let _ = mgmt_rx.wait_for(|&s| s).await;
        });

    if let Err(e) = tokio::try_join!(api_server, mgmt_server) {
        tracing::error!(error = %e, "Server error");
    }

    // Phase 5: Graceful shutdown
    let _ = shutdown_tx.send(true);
    tokio::select! {
        _ = worker_task => {
            tracing::info!("Background tasks finished.");
        }
        () = tokio::time::sleep(std::time::Duration::from_secs(config.server.shutdown_timeout_secs)) => {
            tracing::warn!("Timeout waiting for background tasks to finish.");
        }
    }

    telemetry_guard.shutdown();
    Ok(())
}
