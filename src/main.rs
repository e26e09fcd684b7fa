use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use wallboard::config::KioskConfig;

#[derive(Parser)]
#[command(name = "wallboard")]
#[command(about = "Terminal kiosk dashboard client", long_about = None)]
struct Cli {
    /// Path to the config file
    #[arg(long, value_name = "PATH", default_value = "wallboard.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the config file and probe the server
    Check {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let cfg = KioskConfig::load(&cli.config)?;

    match cli.command {
        None => wallboard::kiosk::run(cfg),
        Some(Commands::Check { json }) => check(&cfg, json),
    }
}

fn check(cfg: &KioskConfig, json: bool) -> Result<()> {
    let healthy = probe_health(&cfg.server.base_url);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "server": cfg.server.base_url,
                "server_healthy": healthy,
                "sections": cfg.sections.iter().map(|s| &s.id).collect::<Vec<_>>(),
            }))
            .context("serialize check output")?
        );
    } else {
        println!("config ok ({} sections)", cfg.sections.len());
        for section in &cfg.sections {
            println!("  {} ({})", section.id, section.kind);
        }
        if healthy {
            println!("server ok: {}", cfg.server.base_url);
        } else {
            println!("server unreachable: {}", cfg.server.base_url);
        }
    }
    Ok(())
}

fn probe_health(base_url: &str) -> bool {
    let client = match reqwest::blocking::Client::builder()
        .user_agent("wallboard")
        .timeout(std::time::Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(_) => return false,
    };
    client
        .get(format!("{}/healthz", base_url.trim_end_matches('/')))
        .send()
        .map(|resp| resp.status().is_success())
        .unwrap_or(false)
}
