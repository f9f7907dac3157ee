//! `shopcloud`: issue and read shop tokens from the command line.
//!
//! Configuration comes from `SHOPCLOUD_SHOP_ID`, `SHOPCLOUD_SECRET`, and
//! `SHOPCLOUD_LOG_LEVEL`. Input is read from stdin; tokens and payloads are
//! written to stdout, logs to stderr.

use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use shopcloud::{telemetry, ShopCloud, ShopCloudConfig, ShopCloudError};

/// Issue and read encrypted shop tokens
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Validate a JSON payload from stdin and print its identified token
    Issue,
    /// Decrypt a token from stdin and print its payload as JSON
    Read,
    /// Print a partner token
    Partner,
    /// Validate a JSON payload from stdin and print any errors as JSON
    Check,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let cfg = ShopCloudConfig::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        shop_id = %cfg.shop_id,
        "shopcloud starting"
    );

    let mut shop = ShopCloud::from_config(&cfg).context("failed to initialise shop")?;
    let mut out = io::stdout().lock();

    match args.command {
        Command::Issue => {
            let value = read_json()?;
            match shop.identified_token_value(&value) {
                Ok(token) => writeln!(out, "{token}")?,
                Err(ShopCloudError::Validation(errors)) => {
                    serde_json::to_writer_pretty(&mut out, &errors)?;
                    writeln!(out)?;
                    anyhow::bail!("payload is invalid ({} error(s))", errors.len());
                }
                Err(e) => return Err(e).context("failed to issue token"),
            }
        }
        Command::Read => {
            let token = read_stdin()?;
            let payload = shop.read_token(token.trim()).context("failed to read token")?;
            serde_json::to_writer_pretty(&mut out, &payload)?;
            writeln!(out)?;
        }
        Command::Partner => {
            let token = shop.partner_token().context("failed to issue partner token")?;
            writeln!(out, "{token}")?;
        }
        Command::Check => {
            let validation = shopcloud::validate_value(&read_json()?);
            serde_json::to_writer_pretty(&mut out, validation.errors())?;
            writeln!(out)?;
            if !validation.is_valid() {
                anyhow::bail!("payload is invalid");
            }
        }
    }

    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

fn read_json() -> Result<serde_json::Value> {
    serde_json::from_str(&read_stdin()?).context("stdin is not valid JSON")
}
