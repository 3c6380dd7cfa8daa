//! Radix Router CLI
//!
//! Loads a route table from TOML and answers questions about it without
//! starting a server.
//!
//! ```text
//!     radix-router --config routes.toml check
//!     radix-router --config routes.toml resolve GET /user/42
//!     radix-router clean /a/../b//c
//! ```

use std::path::PathBuf;

use axum::http::Method;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use radix_router::config::{load_config, RouterConfig};
use radix_router::observability::init_logging;
use radix_router::routing::{clean_path, Dispatch, Router};

#[derive(Parser)]
#[command(name = "radix-router")]
#[command(about = "Inspect and exercise a radix tree route table", long_about = None)]
struct Cli {
    /// Route table in TOML
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the configuration and build the router
    Check,
    /// Show how a request would be dispatched
    Resolve { method: String, path: String },
    /// Print the canonical form of a path
    Clean { path: String },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    init_logging(&config.observability.log_level);

    match cli.command {
        Commands::Check => {
            let router = Router::from_config(&config)?;
            let methods: Vec<&str> = router.methods().map(Method::as_str).collect();
            print_json(&json!({
                "routes": config.routes.len(),
                "methods": methods,
                "options": router.options(),
            }))?;
        }
        Commands::Resolve { method, path } => {
            let router = Router::from_config(&config)?;
            let method = Method::from_bytes(method.as_bytes())?;
            let dispatch = router.dispatch(&method, &path);
            print_json(&describe(&dispatch))?;
        }
        Commands::Clean { path } => {
            println!("{}", clean_path(&path));
        }
    }

    Ok(())
}

fn describe(dispatch: &Dispatch<'_, '_, String>) -> Value {
    let status = dispatch.status().as_u16();
    match dispatch {
        Dispatch::Matched { handler, params } => json!({
            "outcome": "matched",
            "status": status,
            "route": handler,
            "params": params,
        }),
        Dispatch::Redirect { location, .. } => json!({
            "outcome": "redirect",
            "status": status,
            "location": location,
        }),
        Dispatch::Options { allow } => json!({
            "outcome": "options",
            "status": status,
            "allow": allow,
        }),
        Dispatch::MethodNotAllowed { allow } => json!({
            "outcome": "method_not_allowed",
            "status": status,
            "allow": allow,
        }),
        Dispatch::NotFound => json!({
            "outcome": "not_found",
            "status": status,
        }),
    }
}

fn print_json(value: &Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
