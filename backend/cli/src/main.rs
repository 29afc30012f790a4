mod analyze_cmd;
mod config;
mod report;
mod status_cmd;
mod terminal_output;

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use scriptscan_config::{collect_redacted_paths, redact, ScriptScanConfig};
use scriptscan_gateway::{start_server, GatewayState};
use scriptscan_logging::init_logger;
use scriptscan_understanding::{build_extraction_prompt, response_schema};

use analyze_cmd::AnalyzeArgs;
use terminal_output::{note_error, note_info};

#[derive(Parser)]
#[command(name = "scriptscan")]
#[command(about = "ScriptScan: read a prescription photo into structured, translated details")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.scriptscan/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the local web app
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Address to bind the HTTP server to
        #[arg(long)]
        bind: Option<String>,
    },
    /// Analyze one prescription image and print the result
    Analyze {
        /// Image file to analyze
        image: PathBuf,
        /// Use a canned model response instead of calling the service
        #[arg(long)]
        fixture: Option<PathBuf>,
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
        /// Skip drug image lookups
        #[arg(long)]
        no_images: bool,
    },
    /// Print the extraction prompt for the configured languages
    Prompt,
    /// Print the structured response schema
    Schema,
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Check a running server
    Status,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config with secrets redacted
    Show {
        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        note_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut cfg = config::load(cli.config.as_deref()).await?;
    init_logger(cfg.log_level(), cfg.log_dir().map(Path::new));

    match cli.command {
        Commands::Serve { port, bind } => {
            let server = cfg.server.get_or_insert_with(Default::default);
            if port.is_some() {
                server.port = port;
            }
            if bind.is_some() {
                server.bind = bind;
            }
            run_server(&cfg).await?;
        }
        Commands::Analyze {
            image,
            fixture,
            json,
            no_images,
        } => {
            let args = AnalyzeArgs {
                image,
                fixture,
                json,
                no_images,
            };
            analyze_cmd::run(&cfg, args).await?;
        }
        Commands::Prompt => {
            println!("{}", build_extraction_prompt(&config::language_policy(&cfg)));
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&response_schema())?);
        }
        Commands::Config {
            action: ConfigAction::Show { json },
        } => show_config(&cfg, json)?,
        Commands::Status => status_cmd::run(&cfg).await?,
    }

    Ok(())
}

async fn run_server(cfg: &ScriptScanConfig) -> Result<()> {
    let ip: IpAddr = cfg
        .bind()
        .parse()
        .with_context(|| format!("Invalid bind address: {}", cfg.bind()))?;
    let addr = SocketAddr::new(ip, cfg.port());

    let state = GatewayState::new(
        config::build_extractor(cfg)?,
        config::build_resolver(cfg),
        config::search_links(cfg),
        config::intake_policy(cfg),
    );
    info!(
        addr = %addr,
        model = cfg.model(),
        target_language = cfg.target_language(),
        "Starting ScriptScan"
    );
    note_info(&format!("ScriptScan is running at http://{addr}"));
    start_server(addr, state).await
}

fn show_config(cfg: &ScriptScanConfig, json: bool) -> Result<()> {
    let value = serde_json::to_value(cfg)?;
    let redacted = redact(&value);
    if json {
        println!("{}", serde_json::to_string_pretty(&redacted)?);
    } else {
        print!("{}", serde_yaml::to_string(&redacted)?);
    }
    let paths = collect_redacted_paths(&value);
    if !paths.is_empty() {
        note_info(&format!("Redacted: {}", paths.join(", ")));
    }
    Ok(())
}
