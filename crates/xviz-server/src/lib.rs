// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! WebSocket transport for XVIZ producers.
//!
//! [`XvizServer`] accepts websocket upgrades, asks its [`SessionHandler`]s
//! for a [`Session`], and drives the session through
//! `on_connect → main → on_disconnect` on its own task. Sessions publish
//! frames through a [`Link`]; the server owns the socket.

pub mod scenario;
pub mod server;
pub mod session;

pub use scenario::{DemoHandler, DemoOptions, DemoSession, Scenario};
pub use server::{ServerConfig, ServerError, TlsPaths, XvizServer};
pub use session::{
    run_session, select_session, Encoding, Frame, Link, Session, SessionError, SessionHandler,
    SessionRequest,
};
