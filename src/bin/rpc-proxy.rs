//! rpc-proxy CLI — exercise the proxy against the in-memory CRUD service.
//!
//! Usage:
//!   rpc-proxy demo [--config path] [--fail] [--verbose]
//!   rpc-proxy grid [PREFIX] [--rows N]
//!   rpc-proxy config [--config path]

use clap::{Parser, Subcommand};
use rpc_proxy::memory::{CrudService, GridDataService};
use rpc_proxy::{
    Action, ActionHandler, DataReader, HandlerRegistry, JsonReader, ParamsFlattener, ProxyConfig,
    ProxyEvent, Record, RequestOutcome, RpcProxy,
};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "rpc-proxy",
    version,
    about = "Grid data proxy over remote-procedure stubs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to the YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log proxy internals at debug level
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a read/create/update/destroy cycle against the in-memory service
    Demo {
        /// Make the service fail every call on the transport path
        #[arg(long)]
        fail: bool,
    },
    /// Read generated rows from the grid-data service
    Grid {
        /// Name prefix (first 10 characters are kept)
        #[arg(default_value = "")]
        prefix: String,
        /// Rows to generate (clamped to 1..=1000)
        #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
        rows: i64,
    },
    /// Print the effective configuration as YAML
    Config,
}

/// Get the default config path (~/.config/rpc-proxy/proxy.yaml)
fn default_config_path() -> PathBuf {
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".config"));
    config_dir.join("rpc-proxy").join("proxy.yaml")
}

fn load_config(path: Option<PathBuf>) -> Result<ProxyConfig, String> {
    match path {
        Some(path) => ProxyConfig::load(&path)
            .map_err(|e| format!("Failed to load {}: {}", path.display(), e)),
        None => {
            let path = default_config_path();
            if path.exists() {
                ProxyConfig::load(&path)
                    .map_err(|e| format!("Failed to load {}: {}", path.display(), e))
            } else {
                Ok(ProxyConfig::default())
            }
        }
    }
}

fn print_outcome(label: &str, outcome: &RequestOutcome) {
    let status = if outcome.success { "ok" } else { "FAILED" };
    println!("{:<8} {:<6} {} record(s)", label, status, outcome.records().len());
    for record in outcome.records() {
        println!("    {}", Value::Object(record.data().clone()));
    }
}

fn describe(event: &ProxyEvent) -> String {
    match event {
        ProxyEvent::Exception { action, detail, .. } => {
            let kind = event
                .exception_kind()
                .map(|k| k.category())
                .unwrap_or_default();
            format!("exception ({}) on {}: {:?}", kind, action, detail)
        }
        ProxyEvent::LoadException { failure, .. } => {
            format!("loadexception: {}", failure)
        }
        other => other.name().to_string(),
    }
}

async fn cmd_demo(config: ProxyConfig, fail: bool) -> Result<(), String> {
    let service = CrudService::new();
    service.set_unavailable(fail);

    let reader: Arc<dyn DataReader> = Arc::new(JsonReader::new(config.reader.clone()));
    let proxy = RpcProxy::new(service.registry(), config).map_err(|e| e.to_string())?;
    proxy
        .events()
        .observe(|event| println!("  event: {}", describe(event)));

    let run = |action: Action, records: Vec<Record>| {
        proxy.execute(action, records, Map::new(), reader.clone(), Value::Null)
    };

    let read = run(Action::Read, vec![]).await.map_err(|e| e.to_string())?;
    print_outcome("read", &read);
    if !read.success {
        return Ok(());
    }

    let new_rows = [("Ada", "Lovelace"), ("Grace", "Hopper")]
        .into_iter()
        .filter_map(|(first, last)| {
            Record::from_value(json!({"firstName": first, "lastName": last}))
        })
        .collect();
    let created = run(Action::Create, new_rows).await.map_err(|e| e.to_string())?;
    print_outcome("create", &created);

    let mut changed = created.records().to_vec();
    for record in &mut changed {
        record.data.insert("lastName".into(), json!("Updated"));
    }
    let updated = run(Action::Update, changed).await.map_err(|e| e.to_string())?;
    print_outcome("update", &updated);

    let destroyed = run(Action::Destroy, updated.records().to_vec())
        .await
        .map_err(|e| e.to_string())?;
    print_outcome("destroy", &destroyed);

    println!("{} employee(s) remain", service.len());
    Ok(())
}

async fn cmd_grid(config: ProxyConfig, prefix: String, rows: i64) -> Result<(), String> {
    let handler =
        ActionHandler::new(GridDataService::remote()).with_args_builder(ParamsFlattener::default());
    let registry = HandlerRegistry::builder()
        .handler(Action::Read, handler)
        .build();
    let reader: Arc<dyn DataReader> = Arc::new(JsonReader::new(config.reader.clone()));
    let proxy = RpcProxy::new(registry, config).map_err(|e| e.to_string())?;
    proxy
        .events()
        .observe(|event| println!("  event: {}", describe(event)));

    let mut params = Map::new();
    params.insert(
        ParamsFlattener::default().args_key().to_string(),
        json!([prefix, rows]),
    );
    let read = proxy
        .execute(Action::Read, vec![], params, reader, Value::Null)
        .await
        .map_err(|e| e.to_string())?;
    print_outcome("grid", &read);
    Ok(())
}

fn cmd_config(config: &ProxyConfig) -> Result<(), String> {
    let yaml = config.to_yaml().map_err(|e| e.to_string())?;
    print!("{}", yaml);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = match load_config(cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Demo { fail } => cmd_demo(config, fail).await,
        Commands::Grid { prefix, rows } => cmd_grid(config, prefix, rows).await,
        Commands::Config => cmd_config(&config),
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
