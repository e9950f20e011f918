//! `tally` — command-line client for the tally attendance server.
//!
//! # Usage
//!
//! ```
//! tally register Ana Lopez 12345678
//! tally scan <64-char-token>
//! qr-decoder | tally watch
//! tally list
//! ```
//!
//! `watch` is the scanner-feed mode: it reads decoded QR payloads line by
//! line from stdin and submits each one, skipping consecutive repeats of the
//! same token (a QR code held in front of a camera decodes many times per
//! second).

mod client;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tally_core::record::IdentityToken;
use tokio::io::{AsyncBufReadExt as _, BufReader};

use client::{ApiClient, ApiConfig, ScanReply};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "tally", about = "Client for the tally attendance server")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the tally server (default: http://localhost:8037).
  #[arg(long, env = "TALLY_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Register a person and print their identity token (the QR payload).
  Register {
    given_name:  String,
    family_name: String,
    document_id: String,
  },
  /// Submit one decoded token.
  Scan { token: String },
  /// Read decoded tokens from stdin and submit each one.
  Watch,
  /// Print all attendance records.
  List,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8037".to_string()),
  };

  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::Register { given_name, family_name, document_id } => {
      let reply = client
        .register(&given_name, &family_name, &document_id)
        .await?;
      println!("{}", reply.message);
      println!("{} <{}>", reply.display_name, if reply.newly_created { "new" } else { "existing" });
      println!("{}", reply.token);
    }
    Command::Scan { token } => {
      submit(&client, &token).await?;
    }
    Command::Watch => {
      watch(&client).await?;
    }
    Command::List => {
      list(&client).await?;
    }
  }

  Ok(())
}

// ─── Commands ─────────────────────────────────────────────────────────────────

/// Validate locally, submit, and print the outcome on one line.
async fn submit(client: &ApiClient, token: &str) -> Result<()> {
  // Reject garbage before it leaves the machine; camera decoders emit all
  // sorts of payloads that are not our tokens.
  if token.parse::<IdentityToken>().is_err() {
    println!("ignored (not an identity token): {token}");
    return Ok(());
  }

  match client.scan(token).await? {
    ScanReply::Success { event, message, person } => {
      println!("[{event}] {person}: {message}");
    }
    ScanReply::Info { message } => println!("[info] {message}"),
    ScanReply::NotFound { message } => println!("[unknown] {message}"),
  }
  Ok(())
}

async fn watch(client: &ApiClient) -> Result<()> {
  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  let mut last_seen: Option<String> = None;

  while let Some(line) = lines.next_line().await.context("reading stdin")? {
    let token = line.trim();
    if token.is_empty() {
      continue;
    }
    // A code held in the frame decodes repeatedly; only the first of a run
    // counts. Scanning something else in between re-arms it.
    if last_seen.as_deref() == Some(token) {
      continue;
    }
    last_seen = Some(token.to_string());
    submit(client, token).await?;
  }
  Ok(())
}

async fn list(client: &ApiClient) -> Result<()> {
  let rows = client.records().await?;
  if rows.is_empty() {
    println!("no records");
    return Ok(());
  }

  println!(
    "{:<30} {:<12} {:<20} {:<20} {}",
    "name", "document", "entry", "exit", "stay"
  );
  for row in rows {
    println!(
      "{:<30} {:<12} {:<20} {:<20} {}",
      row.display_name,
      row.document_id.as_deref().unwrap_or("-"),
      row.entry_local.as_deref().unwrap_or("-"),
      row.exit_local.as_deref().unwrap_or("-"),
      row.stay.as_deref().unwrap_or("-"),
    );
  }
  Ok(())
}
