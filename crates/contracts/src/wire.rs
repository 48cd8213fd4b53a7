use serde::{Deserialize, Serialize};

use crate::{ApiError, GameSnapshot, PerkType, PlannedAction};

/// Admin intents. The first player to join a game holds admin rights.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", content = "payload", rename_all = "snake_case")]
pub enum AdminAction {
    StartGame,
    SetMinPlayers { min_players: usize },
    SetMaxPlayers { max_players: usize },
    KickPlayer { player_id: String },
}

/// Everything a session may send. The first message on a connection must be
/// `Join`, `Reconnect`, or `JoinPublic`; anything else is rejected until the
/// session is bound to a crew.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    Join {
        player_name: String,
    },
    Reconnect {
        player_id: String,
    },
    /// Read-only spectator session; receives snapshots, may not act.
    JoinPublic,
    HireMember,
    BuyPerk {
        member_id: String,
        perk_type: PerkType,
    },
    AssignAction {
        member_id: String,
        action: PlannedAction,
    },
    ReadyForNextPhase,
    Chat {
        thread_id: String,
        content: String,
    },
    MarkThreadRead {
        thread_id: String,
    },
    Admin(AdminAction),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    Joined { player_id: String, is_admin: bool },
    Reconnected { player_id: String },
    HireResult { success: bool },
    BuyPerkResult { success: bool },
    ActionResult { success: bool },
    GameState(GameSnapshot),
    Error(ApiError),
}
