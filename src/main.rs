//! ChargeSphere OCPI Hub: CLI
//!
//! ```sh
//! # Serve with the default config (~/.config/ocpi-hub/config.toml)
//! ocpi-hub
//!
//! # Custom config and port
//! ocpi-hub --config /etc/ocpi-hub/config.toml --port 8443 serve
//!
//! # Validate config without starting
//! ocpi-hub check
//!
//! # Partner administration
//! ocpi-hub partners list --page 2 --limit 50
//! ocpi-hub partners set-status DE-ABC SUSPENDED
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use ocpi_hub::config::{resolve_config_path, AppConfig, CONFIG_ENV};
use ocpi_hub::domain::PartnerStatus;
use ocpi_hub::server::{self, init_tracing, BoxError, ServerHandle, ServerOptions};
use ocpi_hub::shared::CallContext;

/// OCPI credentials hub for CPOs and eMSPs.
#[derive(Parser, Debug)]
#[command(name = "ocpi-hub", version, about = "OCPI credentials hub")]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = CONFIG_ENV, global = true)]
    config: Option<PathBuf>,

    /// Override the HTTP listen port.
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default).
    Serve {
        /// Skip database migrations on startup.
        #[arg(long)]
        no_migrate: bool,
    },
    /// Validate the configuration file and exit.
    Check,
    /// Inspect and manage registered partners.
    Partners {
        #[command(subcommand)]
        action: PartnersCommand,
    },
}

#[derive(Subcommand, Debug)]
enum PartnersCommand {
    /// List partners, newest registration first.
    List {
        #[arg(long)]
        page: Option<u64>,
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Change a partner's status; only ACTIVE partners can authenticate.
    SetStatus {
        /// `countryCode-partyId`, e.g. DE-ABC
        partner_id: String,
        /// ACTIVE, INACTIVE or SUSPENDED
        #[arg(value_parser = parse_status)]
        status: PartnerStatus,
    },
}

fn parse_status(s: &str) -> Result<PartnerStatus, String> {
    PartnerStatus::parse(s).ok_or_else(|| format!("unknown status '{s}'"))
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = resolve_config_path(cli.config);
    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default().with_env_overrides(), Some(e)),
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_tracing(&config);
    match &load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => error!(
            "Failed to load config from {}: {}. Using defaults.",
            config_path.display(),
            e
        ),
    }

    match cli.command.unwrap_or(Command::Serve { no_migrate: false }) {
        Command::Check => {
            if let Some(e) = load_error {
                return Err(e.into());
            }
            println!("Configuration is valid");
            println!("   Config file : {}", config_path.display());
            println!("   Listen      : {}", config.listen_address());
            println!("   Hub URL     : {}", config.hub_url());
            println!("   Database    : {}", config.database.url);
            println!("   Log level   : {}", config.logging.level);
            Ok(())
        }
        Command::Serve { no_migrate } => {
            let handle = ServerHandle::start(ServerOptions {
                config,
                auto_migrate: !no_migrate,
                enable_metrics: true,
            })
            .await?;
            handle.install_signal_handler();
            info!("Press Ctrl+C to shutdown gracefully.");
            handle.wait().await;
            Ok(())
        }
        Command::Partners { action } => run_partners(&config, action).await,
    }
}

async fn run_partners(config: &AppConfig, action: PartnersCommand) -> Result<(), BoxError> {
    let db = server::connect(config, true).await?;
    let service = server::build_service(db.clone(), config);
    let ctx = match config.store_timeout() {
        Some(limit) => CallContext::new().with_timeout(limit),
        None => CallContext::new(),
    };

    let result = match action {
        PartnersCommand::List { page, limit } => {
            service
                .list_partners(&ctx, page, limit)
                .await
                .map(|page| {
                    println!(
                        "{:<10} {:<5} {:<10} {:<26} NAME",
                        "PARTNER", "TYPE", "STATUS", "REGISTERED"
                    );
                    for p in &page.items {
                        println!(
                            "{:<10} {:<5} {:<10} {:<26} {}",
                            p.partner_id,
                            p.partner_type,
                            p.status,
                            p.created_at.to_rfc3339(),
                            p.name
                        );
                    }
                    println!(
                        "page {}/{} ({} partners)",
                        page.page,
                        page.total_pages.max(1),
                        page.total
                    );
                })
        }
        PartnersCommand::SetStatus { partner_id, status } => service
            .set_partner_status(&ctx, &partner_id, status)
            .await
            .map(|()| println!("{partner_id} is now {status}")),
    };

    db.close().await?;
    result.map_err(Into::into)
}
