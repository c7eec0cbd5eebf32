//! AuthRecon: reconciliation gateway over remote authority services.

use std::sync::Arc;

use authrecon_core::GatewayConfig;
use authrecon_runtime::{QueryOutcome, QuerySpec};
use authrecon_server::{build_router, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    println!("AuthRecon: authority reconciliation gateway");
    println!();
    println!("Usage: authrecon [command]");
    println!();
    println!("Commands:");
    println!("  (none)                          Start the server");
    println!("  types                           Print the service metadata");
    println!("  reconcile <type> <text> [limit] Run one query and print the results");
    println!("  help                            Show this help message");
    println!();
    println!("Environment:");
    println!("  PORT, AUTHRECON_PROFILE (loc|qa|ucsc), AUTHRECON_PROFILE_FILE,");
    println!("  AUTHRECON_BASE_URL, AUTHRECON_FETCH_TIMEOUT_SECS,");
    println!("  AUTHRECON_MAX_CONCURRENCY, AUTHRECON_CACHE_ENTRIES, AUTHRECON_CACHE_TTL_SECS");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "types" => {
                let profile = GatewayConfig::from_env()?.load_profile()?;
                println!("{}", serde_json::to_string_pretty(&profile.metadata())?);
                return Ok(());
            }
            "reconcile" => {
                if args.len() < 4 {
                    eprintln!("Usage: authrecon reconcile <type> <text> [limit]");
                    std::process::exit(1);
                }
                let mut spec = QuerySpec::new(args[3].as_str()).with_type(args[2].as_str());
                if let Some(raw) = args.get(4) {
                    let limit = raw
                        .parse()
                        .map_err(|_| anyhow::anyhow!("Invalid limit: {}", raw))?;
                    spec = spec.with_limit(limit);
                }

                let state = AppState::new(GatewayConfig::from_env()?)?;
                match state.dispatcher.dispatch_single(&spec).await {
                    QueryOutcome::Results(candidates) => {
                        println!("{}", serde_json::to_string_pretty(&candidates)?);
                    }
                    QueryOutcome::Metadata(metadata) => {
                        println!("{}", serde_json::to_string_pretty(&metadata)?);
                    }
                    QueryOutcome::Error(kind) => {
                        eprintln!("{}", kind);
                        std::process::exit(1);
                    }
                }
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_usage();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'authrecon help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let config = GatewayConfig::from_env()?;
    let port = config.port;
    let state = Arc::new(AppState::new(config)?);
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("AuthRecon server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
