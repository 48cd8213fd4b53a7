async fn session_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| session_socket(socket, state))
}

async fn session_socket(mut socket: WebSocket, state: AppState) {
    let mut rx = state.stream_tx.subscribe();
    let mut player_id: Option<String> = None;

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        let mut failed = false;
                        for reply in handle_text(&state, &mut player_id, text.as_str()).await {
                            if send_message(&mut socket, &reply).await.is_err() {
                                failed = true;
                                break;
                            }
                        }
                        if failed {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if socket.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        debug!("session socket error: {error}");
                        break;
                    }
                }
            }
            outgoing = rx.recv() => {
                match outgoing {
                    Ok(payload) => {
                        if socket.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // A fresh snapshot supersedes everything missed.
                        warn!("session lagged behind by {skipped} frames");
                        let payload = {
                            let inner = state.inner.lock().await;
                            snapshot_payload(&inner.api)
                        };
                        if socket.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    if let Some(id) = player_id {
        info!("session for {id} closed; disconnect grace begins");
        schedule_offline_removal(state, id).await;
    }
}

async fn send_message(socket: &mut WebSocket, message: &ServerMessage) -> Result<(), axum::Error> {
    socket.send(Message::Text(encode_message(message).into())).await
}

/// Parses one client frame and applies it. Direct replies go back on the
/// requesting socket only; anything that changed shared state is also
/// pushed to every session via the snapshot stream.
async fn handle_text(
    state: &AppState,
    player_id: &mut Option<String>,
    text: &str,
) -> Vec<ServerMessage> {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(error) => {
            return vec![ServerMessage::Error(ApiError::new(
                ErrorCode::InvalidMessage,
                format!("unparseable message: {error}"),
                None,
            ))];
        }
    };

    let mut inner = state.inner.lock().await;
    match message {
        ClientMessage::Join { player_name } => match inner.api.join(&player_name) {
            Ok(joined) => {
                *player_id = Some(joined.player_id.clone());
                info!("{player_name} joined as {}", joined.player_id);
                broadcast_state(state, &inner);
                vec![ServerMessage::Joined {
                    player_id: joined.player_id,
                    is_admin: joined.is_admin,
                }]
            }
            Err(error) => vec![ServerMessage::Error(error)],
        },
        ClientMessage::Reconnect { player_id: claimed } => match inner.api.reconnect(&claimed) {
            Ok(joined) => {
                inner.offline.remove(&joined.player_id);
                *player_id = Some(joined.player_id.clone());
                info!("player {} reconnected", joined.player_id);
                vec![
                    ServerMessage::Reconnected {
                        player_id: joined.player_id,
                    },
                    ServerMessage::GameState(inner.api.snapshot()),
                ]
            }
            Err(error) => vec![ServerMessage::Error(error)],
        },
        ClientMessage::JoinPublic => {
            // Spectators stay unbound; they only receive the stream.
            vec![ServerMessage::GameState(inner.api.snapshot())]
        }
        other => match player_id.clone() {
            Some(actor) => handle_player_message(state, &mut inner, &actor, other),
            None => vec![ServerMessage::Error(ApiError::new(
                ErrorCode::Unauthorized,
                "session is not bound to a player; join first",
                None,
            ))],
        },
    }
}

fn handle_player_message(
    state: &AppState,
    inner: &mut ServerInner,
    actor: &str,
    message: ClientMessage,
) -> Vec<ServerMessage> {
    match message {
        ClientMessage::HireMember => {
            let success = match inner.api.hire_member(actor) {
                Ok(member_id) => {
                    debug!("crew {actor} hired {member_id}");
                    true
                }
                Err(error) => {
                    debug!("hire refused for {actor}: {}", error.message);
                    false
                }
            };
            if success {
                broadcast_state(state, inner);
            }
            vec![ServerMessage::HireResult { success }]
        }
        ClientMessage::BuyPerk {
            member_id,
            perk_type,
        } => {
            let success = inner.api.buy_perk(actor, &member_id, perk_type).is_ok();
            if success {
                broadcast_state(state, inner);
            }
            vec![ServerMessage::BuyPerkResult { success }]
        }
        ClientMessage::AssignAction { member_id, action } => {
            match inner.api.assign_action(actor, &member_id, action) {
                Ok(()) => {
                    broadcast_state(state, inner);
                    vec![ServerMessage::ActionResult { success: true }]
                }
                Err(error) => vec![ServerMessage::Error(error)],
            }
        }
        ClientMessage::ReadyForNextPhase => match inner.api.ready_for_next_phase(actor) {
            Ok(outcome) => {
                broadcast_state(state, inner);
                if outcome == ReadyOutcome::TurnResolved {
                    schedule_next_turn(
                        state.clone(),
                        Duration::from_millis(inner.api.report_pause_ms()),
                    );
                }
                vec![ServerMessage::ActionResult { success: true }]
            }
            Err(error) => vec![ServerMessage::Error(error)],
        },
        ClientMessage::Chat { thread_id, content } => {
            match inner.api.send_chat(actor, &thread_id, &content) {
                Ok(()) => {
                    broadcast_state(state, inner);
                    Vec::new()
                }
                Err(error) => vec![ServerMessage::Error(error)],
            }
        }
        ClientMessage::MarkThreadRead { thread_id } => {
            match inner.api.mark_thread_read(actor, &thread_id) {
                Ok(()) => {
                    broadcast_state(state, inner);
                    Vec::new()
                }
                Err(error) => vec![ServerMessage::Error(error)],
            }
        }
        ClientMessage::Admin(action) => match inner.api.admin(actor, &action) {
            Ok(()) => {
                if let AdminAction::KickPlayer { player_id } = &action {
                    inner.offline.remove(player_id);
                    info!("player {player_id} kicked");
                }
                broadcast_state(state, inner);
                vec![ServerMessage::ActionResult { success: true }]
            }
            Err(error) => vec![ServerMessage::Error(error)],
        },
        ClientMessage::Join { .. } | ClientMessage::Reconnect { .. } | ClientMessage::JoinPublic => {
            vec![ServerMessage::Error(ApiError::new(
                ErrorCode::InvalidMessage,
                "session is already bound to a player",
                None,
            ))]
        }
    }
}
