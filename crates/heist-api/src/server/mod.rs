//! WebSocket server. Every session talks to the same game through one
//! shared [`GameApi`]; state changes fan out to all sessions as serialized
//! snapshot frames on a broadcast channel.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use contracts::{AdminAction, ApiError, ClientMessage, ErrorCode, GameConfig, ServerMessage};
use heist_core::ReadyOutcome;
use log::{debug, info, warn};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Mutex};

use crate::GameApi;

const STREAM_CHANNEL_CAPACITY: usize = 4096;

include!("error.rs");
include!("state.rs");
include!("routes/session.rs");

/// Binds the WebSocket endpoint and serves until the process is stopped.
pub async fn serve(addr: SocketAddr, config: GameConfig) -> Result<(), ServerError> {
    let state = AppState::new(config);
    let listener = TcpListener::bind(addr).await?;
    info!("heist server listening on {addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(session_upgrade))
        .with_state(state)
}
