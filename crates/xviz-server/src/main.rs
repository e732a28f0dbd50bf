// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Demo XVIZ server.
//! Streams metadata on connect, then one state update per tick, to every
//! websocket client.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use axum_server::Handle;
use clap::{Parser, ValueEnum};
use tokio::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use xviz_server::{DemoHandler, DemoOptions, Encoding, ServerConfig, TlsPaths, XvizServer};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Binary,
}

impl From<Format> for Encoding {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => Self::Json,
            Format::Binary => Self::Binary,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "XVIZ demo websocket server")]
struct Args {
    /// TCP listener for clients (e.g. 0.0.0.0:3000)
    #[arg(long, default_value = "0.0.0.0:3000")]
    listen: SocketAddr,
    /// Milliseconds between state updates
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,
    /// Stop each session after this many state updates
    #[arg(long)]
    frame_limit: Option<u64>,
    /// State update encoding (clients may override with ?format=)
    #[arg(long, value_enum, default_value_t = Format::Binary)]
    format: Format,
    /// Image file streamed on the camera channel
    #[arg(long)]
    image: Option<PathBuf>,
    /// Largest inbound websocket message in bytes
    #[arg(long, default_value_t = 8 * 1024 * 1024)]
    max_message_bytes: usize,
    /// Optional allowed Origin values (repeatable). If none provided, all origins are accepted.
    #[arg(long)]
    allow_origin: Vec<String>,
    /// TLS certificate (PEM). If provided, key must also be provided.
    #[arg(long)]
    tls_cert: Option<PathBuf>,
    /// TLS private key (PEM). If provided, cert must also be provided.
    #[arg(long)]
    tls_key: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let tls = match (args.tls_cert, args.tls_key) {
        (Some(cert), Some(key)) => {
            // axum-server is built without a default crypto provider.
            let _ = rustls::crypto::ring::default_provider().install_default();
            Some(TlsPaths { cert, key })
        }
        (None, None) => None,
        _ => return Err(anyhow!("must provide both --tls-cert and --tls-key or neither")),
    };

    let image = match args.image {
        Some(path) => {
            let bytes = tokio::fs::read(&path).await.with_context(|| format!("read image {}", path.display()))?;
            info!(bytes = bytes.len(), path = %path.display(), "camera image loaded");
            Some(Arc::new(bytes))
        }
        None => {
            info!("no camera image configured");
            None
        }
    };

    let allow_origins =
        if args.allow_origin.is_empty() { None } else { Some(args.allow_origin.into_iter().collect()) };

    let config = ServerConfig {
        listen: args.listen,
        max_message_bytes: args.max_message_bytes,
        allow_origins,
        tls,
        ..ServerConfig::default()
    };
    let demo = DemoHandler::new(DemoOptions {
        interval: Duration::from_millis(args.interval_ms),
        frame_limit: args.frame_limit,
        encoding: args.format.into(),
        image,
    });

    let handle = Handle::new();
    // graceful shutdown on Ctrl+C
    let shutdown = handle.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("shutting down"),
            Err(err) => warn!(?err, "failed to listen for ctrl-c; shutting down"),
        }
        shutdown.graceful_shutdown(Some(Duration::from_secs(2)));
    });

    XvizServer::new(config).handler(demo).serve(handle).await.context("serve")?;
    Ok(())
}
