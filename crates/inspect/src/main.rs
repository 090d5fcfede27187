use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use comfywire_core::config::ValidationConfig;
use comfywire_inspect::report::{inspect, InspectKind};
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Validate a saved ComfyUI payload and print a JSON summary.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Payload kind
    #[arg(short, long, value_enum)]
    kind: InspectKind,

    /// JSON file to read, `-` for stdin
    #[arg(value_name = "FILE", default_value = "-")]
    input: PathBuf,

    /// Pretty-print the report
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comfywire_inspect=info,comfywire_protocol=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ValidationConfig::from_env()?;

    let text = read_input(&cli.input).await?;
    let raw: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", cli.input.display()))?;

    let report = inspect(cli.kind, &raw, &config)?;
    let out = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{out}");

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn read_input(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read stdin")?;
        return Ok(text);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}
