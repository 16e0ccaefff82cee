//! OCPI hub server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: database connection and
//! migrations, the partner directory and credentials service, the HTTP API,
//! metrics, and graceful shutdown.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::CredentialsService;
use crate::config::AppConfig;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{init_database, OsTokenIssuer, SeaOrmPartnerRepository};
use crate::interfaces::http::common::CallPolicy;
use crate::interfaces::http::modules::metrics::MetricsState;
use crate::interfaces::{create_api_router, OcpiAppState};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ── Options ────────────────────────────────────────────────────────

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true)
    pub auto_migrate: bool,
    /// Install the Prometheus recorder and serve `/metrics` (default: true)
    pub enable_metrics: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            enable_metrics: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running hub.
pub struct ServerHandle {
    pub service: Arc<CredentialsService>,
    pub config: AppConfig,
    /// Address the API actually bound to
    pub local_addr: SocketAddr,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Connect, migrate, build the service and start serving HTTP.
    pub async fn start(opts: ServerOptions) -> Result<Self, BoxError> {
        let config = opts.config;
        info!(version = %config.ocpi.version, "Starting OCPI hub");

        let metrics = if opts.enable_metrics {
            MetricsState {
                handle: prometheus_handle(),
            }
        } else {
            MetricsState::default()
        };

        let db = connect(&config, opts.auto_migrate).await?;
        let service = Arc::new(build_service(db.clone(), &config));

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let calls = CallPolicy::new(config.store_timeout(), shutdown_signal.token().clone());
        let router = create_api_router(
            OcpiAppState::new(Arc::clone(&service), calls).with_metrics(metrics),
        );

        let listener = tokio::net::TcpListener::bind(config.listen_address()).await?;
        let local_addr = listener.local_addr()?;
        info!(address = %local_addr, hub_url = %config.hub_url(), "OCPI API listening");
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(listener, router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("HTTP server received shutdown signal");
        });

        let failure_signal = shutdown_signal.clone();
        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!(error = %e, "HTTP server error");
                failure_signal.trigger();
            }
        });

        Ok(Self {
            service,
            config,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the shutdown signal, drain in-flight requests within the
    /// configured timeout, then close the database.
    pub async fn wait(self) {
        let api_task = self.api_task;
        let drained = self
            .shutdown
            .shutdown_with_cleanup(|| async move {
                if let Err(e) = api_task.await {
                    error!(error = %e, "HTTP server task panicked");
                }
            })
            .await;
        if !drained {
            warn!("In-flight requests abandoned at shutdown timeout");
        }

        if let Err(e) = self.db.close().await {
            warn!(error = %e, "Error closing database connection");
        } else {
            info!("Database connection closed");
        }
        info!("OCPI hub shutdown complete");
    }

    pub async fn shutdown(self) {
        self.trigger_shutdown();
        self.wait().await;
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Open the configured database and optionally bring its schema up to date.
pub async fn connect(config: &AppConfig, migrate: bool) -> Result<DatabaseConnection, BoxError> {
    let db = init_database(&config.database_config()).await?;
    if migrate {
        info!("Running database migrations...");
        Migrator::up(&db, None).await?;
        info!("Migrations completed");
    }
    Ok(db)
}

/// Credentials service over the SeaORM partner directory.
pub fn build_service(db: DatabaseConnection, config: &AppConfig) -> CredentialsService {
    CredentialsService::new(
        Arc::new(SeaOrmPartnerRepository::new(db)),
        Arc::new(OsTokenIssuer),
        config.hub_settings(),
    )
}

/// The global recorder can only be installed once per process; later
/// starts reuse the first handle.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!(error = %e, "Prometheus recorder unavailable, /metrics disabled");
                None
            }
        })
        .clone()
}

/// Initialize tracing from the application config.
///
/// `RUST_LOG` takes precedence over `[logging] level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    if let Err(e) = result {
        eprintln!("tracing already initialized: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseSection;

    fn test_config() -> AppConfig {
        AppConfig {
            server: crate::config::ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
                shutdown_timeout: 5,
                ..Default::default()
            },
            database: DatabaseSection {
                url: "sqlite::memory:".into(),
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn starts_serves_and_shuts_down() {
        let handle = ServerHandle::start(ServerOptions {
            config: test_config(),
            auto_migrate: true,
            enable_metrics: false,
        })
        .await
        .unwrap();
        assert_ne!(handle.local_addr.port(), 0);

        let ctx = crate::shared::CallContext::new();
        assert_eq!(handle.service.partner_count(&ctx).await.unwrap(), 0);

        tokio::time::timeout(std::time::Duration::from_secs(10), handle.shutdown())
            .await
            .unwrap();
    }
}
