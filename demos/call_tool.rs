//! Call one ADT tool against a live system and print what the model would see.
//!
//! Usage:
//!   SAP_URL=https://host:44300 SAP_USERNAME=dev SAP_PASSWORD=... cargo run --example call_tool -- --list
//!   cargo run --example call_tool -- --tool search_objects --args '{"query": "ZCL_*"}'
//!   cargo run --example call_tool -- --tool get_object_path --args '{"object_url": "/sap/bc/adt/programs/programs/zreport", "full": true}'
//!
//! Ctrl-C cancels an in-flight call.

use adt_tools::{AdtConfig, HttpTransport, ToolRegistry};
use clap::Parser;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "call_tool", about = "Run a single ADT tool call")]
struct Cli {
    /// Tool name, e.g. "search_objects"
    #[arg(long, short = 't')]
    tool: Option<String>,

    /// Tool arguments as a JSON object
    #[arg(long, short = 'a', default_value = "{}")]
    args: String,

    /// Print the tool catalog and exit
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = AdtConfig::from_env().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });
    let transport = HttpTransport::new(config).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });
    let registry = ToolRegistry::with_defaults(transport);

    if cli.list {
        for schema in registry.schemas() {
            println!(
                "{}\n  {}",
                schema["name"].as_str().unwrap_or_default(),
                schema["description"].as_str().unwrap_or_default()
            );
        }
        return;
    }

    let Some(tool) = cli.tool else {
        eprintln!("error: pass --tool <name> or --list");
        std::process::exit(2);
    };
    let args: Value = serde_json::from_str(&cli.args).unwrap_or_else(|e| {
        eprintln!("error: --args is not valid JSON: {e}");
        std::process::exit(2);
    });

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let output = registry.execute_with_cancel(&tool, &args, cancel).await;
    if output.is_error() {
        eprintln!("\x1b[31m[error: {tool}]\x1b[0m");
    }
    println!("{}", output.text());
    if output.is_error() {
        std::process::exit(1);
    }
}
