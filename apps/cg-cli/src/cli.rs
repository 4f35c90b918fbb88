//! Command-line surface: `cg-cli build <root>` prints a summary of the
//! constructed graph; `cg-cli serve <root>` builds the graph once and then
//! serves `tools/call` requests over stdio, one line-delimited JSON-RPC
//! message per line.

use std::path::PathBuf;
use std::process;

use cg_foundation::config::LogFormat;
use cg_foundation::EngineConfig;
use cg_server::{Dispatcher, RpcRequest, RpcResponse};
use clap::{Parser, Subcommand};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use crate::pipeline;

#[derive(Parser)]
#[command(name = "cg-cli")]
#[command(about = "Builds and serves whole-program Go call graphs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the call graph for a Go module and print a summary.
    Build {
        /// Root directory of the Go module (must contain go.mod).
        root: PathBuf,
        /// Base URL to fetch the stdlib manifest from.
        #[arg(long)]
        stdlib_base_url: Option<String>,
        /// Skip loading the stdlib manifest entirely.
        #[arg(long)]
        no_stdlib: bool,
        /// Path to a TOML configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Log output format.
        #[arg(long, value_enum, default_value = "pretty")]
        log_format: CliLogFormat,
    },
    /// Build the call graph once, then serve tool-call queries over stdio.
    Serve {
        /// Root directory of the Go module (must contain go.mod).
        root: PathBuf,
        #[arg(long)]
        stdlib_base_url: Option<String>,
        #[arg(long)]
        no_stdlib: bool,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "pretty")]
        log_format: CliLogFormat,
    },
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum CliLogFormat {
    Pretty,
    Json,
}

impl From<CliLogFormat> for LogFormat {
    fn from(value: CliLogFormat) -> Self {
        match value {
            CliLogFormat::Pretty => LogFormat::Pretty,
            CliLogFormat::Json => LogFormat::Json,
        }
    }
}

pub async fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            root,
            stdlib_base_url,
            no_stdlib,
            config,
            log_format,
        } => {
            cg_foundation::logging::init(log_format.into());
            let config = load_config(config.as_deref(), stdlib_base_url);
            run_build(&root, &config, no_stdlib).await;
        }
        Commands::Serve {
            root,
            stdlib_base_url,
            no_stdlib,
            config,
            log_format,
        } => {
            cg_foundation::logging::init(log_format.into());
            let config = load_config(config.as_deref(), stdlib_base_url);
            run_serve(&root, &config, no_stdlib).await;
        }
    }
}

fn load_config(config_path: Option<&std::path::Path>, stdlib_base_url: Option<String>) -> EngineConfig {
    let mut config = EngineConfig::load(config_path).unwrap_or_else(|err| {
        error!(error = %err, "failed to load configuration, using defaults");
        EngineConfig::default()
    });
    if let Some(base_url) = stdlib_base_url {
        config.stdlib_base_url = base_url;
    }
    config
}

async fn run_build(root: &std::path::Path, config: &EngineConfig, no_stdlib: bool) {
    match pipeline::build(root, config, no_stdlib).await {
        Ok(outcome) => {
            let graph = outcome.graph.lock().expect("call graph lock poisoned");
            let summary = serde_json::json!({
                "module": outcome.registry.module_path(),
                "goVersion": outcome.registry.toolchain_version(),
                "filesProcessed": outcome.files_processed,
                "functions": graph.function_count(),
                "edges": graph.edge_count(),
                "unresolvedCallSites": graph.unresolved_call_site_count(),
                "imports": {
                    "stdlib": outcome.import_classifications.stdlib,
                    "thirdParty": outcome.import_classifications.third_party,
                    "local": outcome.import_classifications.local,
                },
                "stdlib": outcome.stdlib.as_ref().map(|s| serde_json::json!({
                    "version": s.version(),
                    "packages": s.package_count(),
                })),
            });
            println!("{}", serde_json::to_string_pretty(&summary).expect("summary always serializes"));
        }
        Err(err) => {
            error!(error = %err, "build failed");
            process::exit(1);
        }
    }
}

async fn run_serve(root: &std::path::Path, config: &EngineConfig, no_stdlib: bool) {
    let outcome = match pipeline::build(root, config, no_stdlib).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(error = %err, "build failed, cannot serve");
            process::exit(1);
        }
    };
    info!(files = outcome.files_processed, "graph built, serving on stdio");

    let dispatcher = Dispatcher::new(outcome.graph, outcome.stdlib, config.request_deadline());
    serve_stdio(&dispatcher).await;
}

async fn serve_stdio(dispatcher: &Dispatcher) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut reader = BufReader::new(stdin);

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!("EOF on stdin, shutting down");
                break;
            }
            Ok(_) => {
                if line.trim().is_empty() {
                    continue;
                }
                let response = match serde_json::from_str::<RpcRequest>(&line) {
                    Ok(request) => dispatcher.dispatch(request).await,
                    Err(err) => {
                        error!(error = %err, "failed to parse request");
                        continue;
                    }
                };
                if let Err(err) = write_response(&mut stdout, &response).await {
                    error!(error = %err, "failed to write response");
                    break;
                }
            }
            Err(err) => {
                error!(error = %err, "error reading stdin");
                break;
            }
        }
    }
}

async fn write_response(stdout: &mut io::Stdout, response: &RpcResponse) -> std::io::Result<()> {
    let json = serde_json::to_string(response).expect("RpcResponse always serializes");
    stdout.write_all(json.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}
