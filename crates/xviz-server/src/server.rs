// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! WebSocket listener: upgrades connections and runs one session each.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::ws::{self, WebSocket};
use axum::extract::{ConnectInfo, Query, State, WebSocketUpgrade};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinError;
use tokio::time::{self, Duration};
use tracing::{debug, error, info, warn};

use crate::session::{run_session, select_session, Frame, Link, Session, SessionHandler, SessionRequest};

type TaskResult<T> = std::result::Result<T, JoinError>;

/// Listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP listen address.
    pub listen: SocketAddr,
    /// Largest inbound websocket message accepted, in bytes.
    pub max_message_bytes: usize,
    /// Allowed `Origin` values; `None` accepts every origin.
    pub allow_origins: Option<HashSet<String>>,
    /// Keep-alive ping period; `None` disables pings.
    pub ping_interval: Option<Duration>,
    /// Outbound frames buffered per connection.
    pub outbound_buffer: usize,
    /// PEM certificate and key; plain TCP when `None`.
    pub tls: Option<TlsPaths>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 3000)),
            max_message_bytes: 8 * 1024 * 1024,
            allow_origins: None,
            ping_interval: Some(Duration::from_secs(30)),
            outbound_buffer: 256,
            tls: None,
        }
    }
}

/// PEM files for TLS.
#[derive(Debug, Clone)]
pub struct TlsPaths {
    /// Certificate chain.
    pub cert: PathBuf,
    /// Private key.
    pub key: PathBuf,
}

/// Listener failures.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or serving failed.
    #[error("serve: {0}")]
    Io(#[from] std::io::Error),
    /// Certificate or key could not be loaded.
    #[error("load tls config from {cert}: {source}")]
    Tls {
        /// Certificate path.
        cert: String,
        /// Underlying error.
        source: std::io::Error,
    },
}

struct AppState {
    config: ServerConfig,
    handlers: Vec<Arc<dyn SessionHandler>>,
}

/// Websocket server running XVIZ sessions.
pub struct XvizServer {
    config: ServerConfig,
    handlers: Vec<Arc<dyn SessionHandler>>,
}

impl std::fmt::Debug for XvizServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XvizServer")
            .field("config", &self.config)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl XvizServer {
    /// Server with no handlers.
    pub fn new(config: ServerConfig) -> Self {
        Self { config, handlers: Vec::new() }
    }

    /// Appends a handler; handlers are asked in registration order.
    pub fn handler(mut self, handler: impl SessionHandler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Listener settings.
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Router accepting upgrades on every path.
    pub fn router(self) -> Router {
        let state = Arc::new(AppState { config: self.config, handlers: self.handlers });
        Router::new().route("/", get(ws_handler)).route("/{*log}", get(ws_handler)).with_state(state)
    }

    /// Serves until `handle` is shut down.
    pub async fn serve(self, handle: Handle<SocketAddr>) -> Result<(), ServerError> {
        let listen = self.config.listen;
        let tls = self.config.tls.clone();
        let app = self.router().into_make_service_with_connect_info::<SocketAddr>();
        match tls {
            Some(paths) => {
                let tls_config = RustlsConfig::from_pem_file(&paths.cert, &paths.key)
                    .await
                    .map_err(|source| ServerError::Tls { cert: paths.cert.display().to_string(), source })?;
                info!("xviz server listening (TLS) on {listen}");
                axum_server::bind_rustls(listen, tls_config).handle(handle).serve(app).await?;
            }
            None => {
                info!("xviz server listening on {listen}");
                axum_server::bind(listen).handle(handle).serve(app).await?;
            }
        }
        Ok(())
    }
}

async fn ws_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(params): Query<HashMap<String, String>>,
    uri: Uri,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    if !origin_allowed(&state.config, &headers) {
        let origin = headers.get("origin").and_then(|v| v.to_str().ok()).unwrap_or("<missing>");
        warn!(%peer, origin = %origin, "origin rejected");
        return StatusCode::FORBIDDEN.into_response();
    }
    let request = SessionRequest { peer, path: uri.path().to_owned(), params };
    let Some(session) = select_session(&state.handlers, &request) else {
        warn!(%peer, path = %request.path, "no handler accepted the connection");
        return StatusCode::NOT_FOUND.into_response();
    };
    info!(%peer, path = %request.path, "session accepted");
    ws.max_message_size(state.config.max_message_bytes)
        .on_upgrade(move |socket| handle_socket(socket, state, peer, session))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, peer: SocketAddr, session: Box<dyn Session>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ws::Message>(state.config.outbound_buffer);
    let (frame_tx, mut frame_rx) = mpsc::channel::<Frame>(state.config.outbound_buffer);
    let (closed_tx, closed_rx) = watch::channel(false);

    // Writer task: websocket outbound messages (session frames, pongs, pings).
    let writer = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            if ws_tx.send(msg).await.is_err() {
                break;
            }
        }
    });

    // Session frames -> writer.
    let frame_out = out_tx.clone();
    let forward = tokio::spawn(async move {
        while let Some(frame) = frame_rx.recv().await {
            let msg = match frame {
                Frame::Text(text) => ws::Message::Text(text.into()),
                Frame::Binary(bytes) => ws::Message::Binary(bytes.into()),
            };
            if frame_out.send(msg).await.is_err() {
                break;
            }
        }
    });

    // Reader task: answers pings, watches for the peer leaving.
    let pong_tx = out_tx.clone();
    let reader = tokio::spawn(async move {
        while let Some(msg) = ws_rx.next().await {
            match msg {
                Ok(ws::Message::Ping(payload)) => {
                    let _ = pong_tx.send(ws::Message::Pong(payload)).await;
                }
                Ok(ws::Message::Close(_)) => break,
                Ok(ws::Message::Text(text)) => debug!(%peer, len = text.len(), "ignoring client text frame"),
                Ok(ws::Message::Binary(data)) => debug!(%peer, len = data.len(), "ignoring client binary frame"),
                Ok(ws::Message::Pong(_)) => {}
                Err(err) => {
                    warn!(?err, %peer, "ws recv error");
                    break;
                }
            }
        }
        let _ = closed_tx.send(true);
    });

    let ping = state.config.ping_interval.map(|period| {
        let ping_tx = out_tx.clone();
        tokio::spawn(async move {
            let mut interval = time::interval(period);
            // The first tick fires immediately; skip it so the handshake settles.
            interval.tick().await;
            loop {
                interval.tick().await;
                if ping_tx.send(ws::Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
        })
    });

    let link = Link::new(peer, frame_tx, closed_rx);
    let outcome = run_session(session, link).await;

    // The session is done; stop background tasks and flush a close frame.
    if let Some(ping) = &ping {
        ping.abort();
    }
    reader.abort();
    let code = if outcome.is_ok() { ws::close_code::NORMAL } else { ws::close_code::ERROR };
    // Frames queued before the session returned go out ahead of the close.
    let mut forward = forward;
    if time::timeout(Duration::from_millis(250), &mut forward).await.is_err() {
        forward.abort();
    }
    let _ = time::timeout(
        Duration::from_millis(250),
        out_tx.send(ws::Message::Close(Some(ws::CloseFrame { code, reason: "session ended".into() }))),
    )
    .await;
    drop(out_tx);

    // Best-effort flush; force-cancel on slow or broken clients.
    let mut writer = writer;
    match time::timeout(Duration::from_secs(1), &mut writer).await {
        Ok(res) => log_task_result("writer", peer, res),
        Err(_) => {
            writer.abort();
            log_task_result("writer", peer, writer.await);
        }
    }
    // Await the aborted tasks to surface panics (cancellation is expected).
    log_task_result("reader", peer, reader.await);
    if let Some(ping) = ping {
        log_task_result("ping", peer, ping.await);
    }
    info!(%peer, "session disconnected");
}

fn origin_allowed(config: &ServerConfig, headers: &HeaderMap) -> bool {
    let Some(allow) = &config.allow_origins else {
        return true;
    };
    headers
        .get("origin")
        .and_then(|origin| origin.to_str().ok())
        .is_some_and(|origin| allow.contains(origin))
}

fn log_task_result(name: &'static str, peer: SocketAddr, res: TaskResult<()>) {
    let Err(err) = res else {
        return;
    };
    if err.is_cancelled() {
        return;
    }
    if err.is_panic() {
        error!(%peer, ?err, "{name} task panicked");
    } else {
        warn!(%peer, ?err, "{name} task failed");
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn headers_with_origin(origin: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("origin", origin.parse().unwrap());
        headers
    }

    #[test]
    fn any_origin_without_allow_list() {
        let config = ServerConfig::default();
        assert!(origin_allowed(&config, &HeaderMap::new()));
        assert!(origin_allowed(&config, &headers_with_origin("http://example.test")));
    }

    #[test]
    fn allow_list_requires_a_listed_origin() {
        let config = ServerConfig {
            allow_origins: Some(HashSet::from(["http://localhost:8080".to_owned()])),
            ..ServerConfig::default()
        };
        assert!(origin_allowed(&config, &headers_with_origin("http://localhost:8080")));
        assert!(!origin_allowed(&config, &headers_with_origin("http://evil.test")));
        assert!(!origin_allowed(&config, &HeaderMap::new()));
    }
}
