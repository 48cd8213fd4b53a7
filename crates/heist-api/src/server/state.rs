/// Shared server state: the game facade behind one lock plus a broadcast
/// lane that pushes serialized snapshots to every connected session.
#[derive(Clone)]
struct AppState {
    inner: Arc<Mutex<ServerInner>>,
    stream_tx: broadcast::Sender<String>,
}

struct ServerInner {
    api: GameApi,
    /// Players whose socket closed, keyed by id. The value is a generation
    /// counter so a reconnect invalidates the pending removal.
    offline: HashMap<String, u64>,
    offline_generation: u64,
}

impl AppState {
    fn new(config: GameConfig) -> Self {
        let (stream_tx, _) = broadcast::channel(STREAM_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(ServerInner {
                api: GameApi::from_config(config),
                offline: HashMap::new(),
                offline_generation: 0,
            })),
            stream_tx,
        }
    }
}

fn encode_message(message: &ServerMessage) -> String {
    serde_json::to_string(message).unwrap_or_else(|error| {
        warn!("failed to encode server message: {error}");
        String::new()
    })
}

fn snapshot_payload(api: &GameApi) -> String {
    encode_message(&ServerMessage::GameState(api.snapshot()))
}

fn broadcast_state(state: &AppState, inner: &ServerInner) {
    // Send only fails when no session is subscribed.
    let _ = state.stream_tx.send(snapshot_payload(&inner.api));
}

/// Starts the disconnect-grace countdown for a player whose socket closed.
/// If no session reclaims the id before the grace runs out, the crew is
/// dropped from the game.
async fn schedule_offline_removal(state: AppState, player_id: String) {
    let (generation, grace) = {
        let mut inner = state.inner.lock().await;
        inner.offline_generation += 1;
        let generation = inner.offline_generation;
        inner.offline.insert(player_id.clone(), generation);
        (
            generation,
            Duration::from_secs(inner.api.disconnect_grace_secs()),
        )
    };
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        let mut inner = state.inner.lock().await;
        if inner.offline.get(&player_id) != Some(&generation) {
            return;
        }
        inner.offline.remove(&player_id);
        if inner.api.remove_player(&player_id) {
            info!("player {player_id} removed after disconnect grace expired");
            broadcast_state(&state, &inner);
        }
    });
}

/// After a turn resolves, the resolution snapshot stays up for the
/// configured pause before the next planning phase opens.
fn schedule_next_turn(state: AppState, pause: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(pause).await;
        let mut inner = state.inner.lock().await;
        match inner.api.begin_next_turn() {
            Ok(()) => broadcast_state(&state, &inner),
            Err(error) => warn!("could not open the next turn: {}", error.message),
        }
    });
}
