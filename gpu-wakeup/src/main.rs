//! GPU Wakeup - serves the recovery page and the status/reset endpoints.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gpu_wakeup::{build_router, AppState, Config, NotifierHandle, ShellRunner};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    println!("gpu-wakeup {}", VERSION);
}

/// Config file from `--config <path>`, then `WAKEUP_CONFIG`, else `config.*` in the cwd.
fn config_path(args: &[String]) -> String {
    args.iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1).cloned())
        .or_else(|| env::var("WAKEUP_CONFIG").ok())
        .unwrap_or_else(|| "config".to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle --version / -V
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        print_version();
        return Ok(());
    }

    // Load configuration
    let config = Config::load_from(config_path(&args)).map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Make sure config.toml exists or set WAKEUP__AUTH__SECRET.",
            e
        )
    })?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Starting gpu-wakeup for instances {}-{}",
        config.instances.from,
        config.instances.to
    );

    let notifier = NotifierHandle::from_config(config.push.as_ref())?;
    match config.push {
        Some(ref push) => tracing::info!("Push notifications go to {}", push.endpoint),
        None => tracing::info!("No push target configured, notifications are only logged"),
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, Arc::new(ShellRunner::new()), notifier)?);
    let app = build_router(state);

    // Start server
    tracing::info!("Listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
