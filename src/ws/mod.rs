//! WebSocket transport
//!
//! Reusable client with automatic reconnection, exponential backoff and
//! ping/pong keepalive. Consumers get a stream of [`WsEvent`]s plus an
//! outbound sender, and are expected to re-issue their subscriptions on
//! every [`WsEvent::Connected`].

mod client;
mod types;

pub use client::WsClient;
pub use types::{WsConfig, WsError, WsEvent};
