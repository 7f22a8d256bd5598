//! # bmshubd: bmshub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct the remote gateway and the SmartThings probe (adapters)
//! - Start one supervised sync loop per configured integration
//! - Build the command dispatchers, the notification bus and the axum router,
//!   then serve until SIGINT
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use bmshub_adapter_http_axum::state::AppState;
use bmshub_adapter_remote_reqwest::{ReqwestGateway, SmartThingsProbe};
use bmshub_adapter_storage_sqlite_sqlx::{Config as StorageConfig, SqlitePlatformConfigRepository};
use bmshub_app::device_cache::InProcessDeviceCache;
use bmshub_app::notification_bus::InProcessNotificationBus;
use bmshub_app::services::platform_config_service::PlatformConfigService;
use bmshub_app::sync_control::SyncControl;
use bmshub_app::sync_scheduler::{SyncScheduler, SyncSettings};
use bmshub_app::workspace::WatchedWorkspace;
use bmshub_domain::integration::{Brise, IntegrationKind, SmartThings};

use crate::config::{Config, IntegrationName};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    init_tracing(&config.logging.filter);

    // Database
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let config_repo = SqlitePlatformConfigRepository::new(db.pool().clone());

    // Remote adapters
    let gateway = Arc::new(ReqwestGateway::new(config.gateway_config()?)?);
    let probe = SmartThingsProbe::new(&config.smartthings_api_url()?, config.request_timeout())?;

    // Sync loops
    let cache = Arc::new(InProcessDeviceCache::new(64));
    let sync = Arc::new(SyncControl::new(config.workspace_id()?, config.sync.enabled));
    let settings = config.sync_settings();

    let supervisors: Vec<JoinHandle<()>> = config
        .sync
        .integrations
        .iter()
        .map(|integration| {
            let wiring = SyncWiring {
                gateway: Arc::clone(&gateway),
                workspace: sync.workspace(),
                cache: Arc::clone(&cache),
                settings,
                enabled: sync.subscribe_enabled(),
            };
            match integration {
                IntegrationName::Brise => wiring.spawn::<Brise>(),
                IntegrationName::SmartThings => wiring.spawn::<SmartThings>(),
            }
        })
        .collect();

    // HTTP
    let notifications = Arc::new(InProcessNotificationBus::new(64));
    let state = AppState::new(
        PlatformConfigService::new(probe, config_repo),
        gateway,
        Arc::clone(&sync),
        notifications,
    );
    let app = bmshub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "bmshubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop polling first so no cycle starts while the supervisors wind down.
    sync.set_enabled(false);
    for supervisor in supervisors {
        supervisor.abort();
        match supervisor.await {
            Err(err) if !err.is_cancelled() => {
                tracing::warn!(error = %err, "sync supervisor ended abnormally");
            }
            _ => {}
        }
    }
    tracing::info!("bmshubd stopped");

    Ok(())
}

fn init_tracing(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown requested");
}

/// Shared pieces of one integration's sync loop.
struct SyncWiring {
    gateway: Arc<ReqwestGateway>,
    workspace: WatchedWorkspace,
    cache: Arc<InProcessDeviceCache>,
    settings: SyncSettings,
    enabled: watch::Receiver<bool>,
}

impl SyncWiring {
    fn spawn<I: IntegrationKind>(self) -> JoinHandle<()> {
        let workspace_rx = self.workspace.subscribe();
        let scheduler = Arc::new(SyncScheduler::<I, _, _, _>::new(
            self.gateway,
            self.workspace,
            self.cache,
            self.settings,
        ));
        tracing::debug!(integration = I::NAME, "sync loop supervised");
        scheduler.supervise(self.enabled, workspace_rx)
    }
}
