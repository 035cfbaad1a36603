//! # zplctl
//!
//! Command-line front end for the ZPL writer.
//!
//! ## Usage
//!
//! ```bash
//! # Print the sample label's ZPL
//! zplctl demo
//!
//! # Send a ZPL file to a network printer
//! zplctl print --host 192.168.1.50 label.zpl
//!
//! # Render a ZPL file (or stdin) to PDF
//! cat label.zpl | zplctl render - --out label.pdf
//! ```
//!
//! Device settings come from `--config settings.json` or the `ZPL_*`
//! environment variables.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use zpl_writer::{
    DEFAULT_PORT, LabelRenderer, LabelaryRenderer, NetworkPrinter, Printer, ZplConfig, ZplWriter,
};

/// zplctl - ZPL label utility
#[derive(Parser, Debug)]
#[command(name = "zplctl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with timeout, width, height and dpmm
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the sample label and write its ZPL to stdout
    Demo {
        /// Also send it to this printer
        #[arg(long)]
        host: Option<String>,

        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },

    /// Send a ZPL file to a network printer
    Print {
        /// ZPL file, or - for stdin
        file: PathBuf,

        #[arg(long)]
        host: String,

        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },

    /// Render a ZPL file to PDF
    Render {
        /// ZPL file, or - for stdin
        file: PathBuf,

        /// Output PDF path
        #[arg(long)]
        out: PathBuf,

        /// Render service base URL
        #[arg(long)]
        url: Option<String>,

        /// Request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zpl_writer=info,zplctl=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Demo { host, port } => {
            let zpl = demo_label(config);
            println!("{}", zpl.export());
            if let Some(host) = host {
                zpl.print(&host, port).await?;
            }
        }
        Commands::Print { file, host, port } => {
            let data = read_input(&file)?;
            NetworkPrinter::new(host, port)
                .with_timeout(Duration::from_secs(config.timeout()))
                .print(data.as_bytes())
                .await?;
        }
        Commands::Render {
            file,
            out,
            url,
            timeout,
        } => {
            let data = read_input(&file)?;
            let renderer = url
                .map(LabelaryRenderer::new)
                .unwrap_or_default()
                .with_timeout(Duration::from_secs(timeout));
            let pdf = renderer.render(&config, &data).await?;
            tokio::fs::write(&out, &pdf)
                .await
                .with_context(|| format!("writing {}", out.display()))?;
            tracing::info!(path = %out.display(), bytes = pdf.len(), "PDF written");
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ZplConfig> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
        }
        None => Ok(ZplConfig::from_env()),
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn demo_label(config: ZplConfig) -> ZplWriter {
    let mut zpl = ZplWriter::new(config);
    zpl.utf8()
        .graphic_box(1.0, 1.0, config.width() - 2.0, config.height() - 2.0, 0.3, 1)
        .font(4.0, None, 0.0, '0', false)
        .text("zpl-writer", 3.0, 3.0)
        .hline(3.0, 9.0, config.width() - 6.0, 0.3)
        .font(2.5, None, 0.0, '0', false)
        .to_reverse()
        .text("SAMPLE", 3.0, 11.0)
        .to_normal()
        .circle(config.width() - 12.0, 11.0, 8.0, 3)
        .qrcode(3.0, 16.0, &json!({"demo": true, "dpmm": config.dpmm()}), Some(3));
    zpl
}
