// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Session boundary between the websocket transport and XVIZ producers.
//!
//! A [`SessionHandler`] inspects the connection request and may return a
//! [`Session`]. The server then drives that session through
//! `on_connect → main → on_disconnect`, handing it a [`Link`] for outbound
//! frames. Sessions never touch the socket directly.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};
use xviz_builder::{BuildError, Message, MessageType};

/// One outbound websocket frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text frame.
    Text(String),
    /// Binary frame.
    Binary(Vec<u8>),
}

/// How state updates are put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// JSON text frames.
    Json,
    /// `PBE1` binary frames.
    #[default]
    Binary,
}

impl Encoding {
    /// Encodes `message` as one frame.
    pub fn frame<T: MessageType>(self, message: &Message<T>) -> Result<Frame, BuildError> {
        match self {
            Self::Json => message.to_json_string().map(Frame::Text),
            Self::Binary => message.to_binary().map(Frame::Binary),
        }
    }
}

/// Errors a session can end with.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The peer went away; the link no longer accepts frames.
    #[error("link closed")]
    Closed,
    /// A text frame was not valid UTF-8.
    #[error("text frame is not utf-8: {0}")]
    NotUtf8(#[from] std::string::FromUtf8Error),
    /// Building or encoding a message failed.
    #[error(transparent)]
    Build(#[from] BuildError),
    /// Producer-specific failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Outbound half of a connection, handed to a running session.
#[derive(Debug, Clone)]
pub struct Link {
    peer: SocketAddr,
    tx: mpsc::Sender<Frame>,
    closed: watch::Receiver<bool>,
}

impl Link {
    /// Link over `tx`; `closed` flips to `true` when the peer disconnects.
    pub fn new(peer: SocketAddr, tx: mpsc::Sender<Frame>, closed: watch::Receiver<bool>) -> Self {
        Self { peer, tx, closed }
    }

    /// Remote address.
    pub const fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Sends `bytes` as a binary frame, or as a text frame when `is_binary`
    /// is false (the bytes must then be UTF-8).
    pub async fn send(&self, bytes: Vec<u8>, is_binary: bool) -> Result<(), SessionError> {
        let frame = if is_binary { Frame::Binary(bytes) } else { Frame::Text(String::from_utf8(bytes)?) };
        self.send_frame(frame).await
    }

    /// Sends a text frame.
    pub async fn send_text(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.send_frame(Frame::Text(text.into())).await
    }

    /// Sends a binary frame.
    pub async fn send_binary(&self, bytes: Vec<u8>) -> Result<(), SessionError> {
        self.send_frame(Frame::Binary(bytes)).await
    }

    /// Encodes and sends a finished message.
    pub async fn send_message<T: MessageType + Sync>(
        &self,
        message: &Message<T>,
        encoding: Encoding,
    ) -> Result<(), SessionError> {
        self.send_frame(encoding.frame(message)?).await
    }

    /// Queues `frame` for the socket writer.
    pub async fn send_frame(&self, frame: Frame) -> Result<(), SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }
        self.tx.send(frame).await.map_err(|_| SessionError::Closed)
    }

    /// `true` once the peer has disconnected.
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow() || self.tx.is_closed()
    }

    /// Resolves when the peer disconnects.
    pub async fn closed(&self) {
        let mut closed = self.closed.clone();
        // A dropped sender also means the connection is gone.
        let _ = closed.wait_for(|closed| *closed).await;
    }
}

/// Parameters of an incoming connection.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    /// Remote address.
    pub peer: SocketAddr,
    /// Request path, e.g. `/` or `/logs/run-1`.
    pub path: String,
    /// Decoded query parameters.
    pub params: HashMap<String, String>,
}

/// A live producer bound to one connection.
#[async_trait]
pub trait Session: Send {
    /// Runs once after the websocket upgrade.
    async fn on_connect(&mut self, link: &Link) -> Result<(), SessionError> {
        let _ = link;
        Ok(())
    }

    /// Runs until the peer disconnects or an error occurs.
    async fn main(&mut self, link: &Link) -> Result<(), SessionError>;

    /// Runs once after `main`, whatever its outcome.
    async fn on_disconnect(&mut self, link: &Link) {
        let _ = link;
    }
}

/// Chooses a session for an incoming connection.
pub trait SessionHandler: Send + Sync {
    /// Returns a session for `request`, or `None` to let the next handler try.
    fn session(&self, request: &SessionRequest) -> Option<Box<dyn Session>>;
}

/// Asks each handler in turn; the first `Some` wins.
pub fn select_session(handlers: &[Arc<dyn SessionHandler>], request: &SessionRequest) -> Option<Box<dyn Session>> {
    handlers.iter().find_map(|handler| handler.session(request))
}

/// Drives `session` through its lifecycle.
///
/// A `main` that ends because the link closed counts as a clean exit.
/// `on_disconnect` runs even when `on_connect` or `main` fail.
pub async fn run_session(mut session: Box<dyn Session>, link: Link) -> Result<(), SessionError> {
    let peer = link.peer();
    debug!(%peer, "session start");
    let result = match session.on_connect(&link).await {
        Ok(()) => session.main(&link).await,
        Err(err) => Err(err),
    };
    session.on_disconnect(&link).await;
    debug!(%peer, "session end");
    match result {
        Err(SessionError::Closed) => Ok(()),
        Err(err) => {
            warn!(%peer, %err, "session failed");
            Err(err)
        }
        Ok(()) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn link() -> (Link, mpsc::Receiver<Frame>, watch::Sender<bool>) {
        let (tx, rx) = mpsc::channel(4);
        let (closed_tx, closed_rx) = watch::channel(false);
        (Link::new(SocketAddr::from(([127, 0, 0, 1], 9)), tx, closed_rx), rx, closed_tx)
    }

    #[tokio::test]
    async fn send_picks_frame_kind() {
        let (link, mut rx, _closed) = link();
        link.send(b"{}".to_vec(), false).await.unwrap();
        link.send(vec![1, 2], true).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), Frame::Text("{}".into()));
        assert_eq!(rx.recv().await.unwrap(), Frame::Binary(vec![1, 2]));
    }

    #[tokio::test]
    async fn text_must_be_utf8() {
        let (link, _rx, _closed) = link();
        let err = link.send(vec![0xff], false).await.unwrap_err();
        assert!(matches!(err, SessionError::NotUtf8(_)));
    }

    #[tokio::test]
    async fn closed_link_refuses_frames() {
        let (link, _rx, closed) = link();
        closed.send(true).unwrap();
        assert!(link.is_closed());
        link.closed().await;
        assert!(matches!(link.send_text("x").await, Err(SessionError::Closed)));
    }
}
