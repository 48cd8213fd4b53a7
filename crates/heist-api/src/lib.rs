//! In-process API facade over the game world plus the WebSocket server.
//! Callers go through [`GameApi`], which validates intent, tracks which
//! player holds admin rights, and maps kernel errors onto the wire error
//! vocabulary. Transport concerns live in the `server` module.

mod server;

use contracts::{AdminAction, ApiError, ErrorCode, GameConfig, GameSnapshot, PerkType, PlannedAction};
use heist_core::{ActionError, GameWorld, ReadyOutcome};

pub use server::{serve, ServerError};

/// Identity handed back on a successful join or reconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedPlayer {
    pub player_id: String,
    pub is_admin: bool,
}

/// One game, one facade. The server keeps exactly one of these behind a
/// lock; every mutation funnels through here.
pub struct GameApi {
    world: GameWorld,
    admin_id: Option<String>,
}

impl GameApi {
    pub fn from_config(config: GameConfig) -> Self {
        Self {
            world: GameWorld::new(config),
            admin_id: None,
        }
    }

    pub fn world(&self) -> &GameWorld {
        &self.world
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.world.snapshot()
    }

    pub fn report_pause_ms(&self) -> u64 {
        self.world.config().report_pause_ms
    }

    pub fn disconnect_grace_secs(&self) -> u64 {
        self.world.config().disconnect_grace_secs
    }

    pub fn is_admin(&self, player_id: &str) -> bool {
        self.admin_id.as_deref() == Some(player_id)
    }

    /// Admits a player. The first player to join holds admin rights.
    pub fn join(&mut self, player_name: &str) -> Result<JoinedPlayer, ApiError> {
        let player_id = self.world.add_crew(player_name).map_err(api_error)?;
        if self.admin_id.is_none() {
            self.admin_id = Some(player_id.clone());
        }
        Ok(JoinedPlayer {
            is_admin: self.is_admin(&player_id),
            player_id,
        })
    }

    /// Validates a reconnect claim against the live roster.
    pub fn reconnect(&self, player_id: &str) -> Result<JoinedPlayer, ApiError> {
        if self.world.crew(player_id).is_none() {
            return Err(api_error(ActionError::CrewNotFound(player_id.to_string())));
        }
        Ok(JoinedPlayer {
            player_id: player_id.to_string(),
            is_admin: self.is_admin(player_id),
        })
    }

    /// Drops a player's crew from the game (kick or disconnect-grace
    /// expiry). If the admin leaves, rights pass to a remaining crew so the
    /// lobby stays controllable.
    pub fn remove_player(&mut self, player_id: &str) -> bool {
        let removed = self.world.remove_crew(player_id);
        if removed && self.is_admin(player_id) {
            self.admin_id = self.world.crews().next().map(|crew| crew.id.clone());
        }
        removed
    }

    pub fn hire_member(&mut self, crew_id: &str) -> Result<String, ApiError> {
        self.world.hire_crew_member(crew_id).map_err(api_error)
    }

    pub fn buy_perk(
        &mut self,
        crew_id: &str,
        member_id: &str,
        perk_type: PerkType,
    ) -> Result<(), ApiError> {
        self.world
            .buy_perk(crew_id, member_id, perk_type)
            .map_err(api_error)
    }

    pub fn assign_action(
        &mut self,
        crew_id: &str,
        member_id: &str,
        action: PlannedAction,
    ) -> Result<(), ApiError> {
        self.world
            .assign_action(crew_id, member_id, action)
            .map_err(api_error)
    }

    /// Marks the crew ready. When the last crew readies up the turn resolves
    /// inside this call and `TurnResolved` comes back; the caller is then
    /// responsible for scheduling [`Self::begin_next_turn`].
    pub fn ready_for_next_phase(&mut self, crew_id: &str) -> Result<ReadyOutcome, ApiError> {
        self.world.mark_crew_ready(crew_id).map_err(api_error)
    }

    pub fn begin_next_turn(&mut self) -> Result<(), ApiError> {
        self.world.begin_next_turn().map_err(api_error)
    }

    pub fn send_chat(
        &mut self,
        sender_id: &str,
        thread_id: &str,
        content: &str,
    ) -> Result<(), ApiError> {
        self.world
            .send_chat_message(sender_id, thread_id, content)
            .map_err(api_error)
    }

    pub fn mark_thread_read(&mut self, crew_id: &str, thread_id: &str) -> Result<(), ApiError> {
        self.world
            .mark_thread_read(crew_id, thread_id)
            .map_err(api_error)
    }

    /// Admin surface. Every action first checks that the caller holds admin
    /// rights.
    pub fn admin(&mut self, player_id: &str, action: &AdminAction) -> Result<(), ApiError> {
        if !self.is_admin(player_id) {
            return Err(ApiError::new(
                ErrorCode::Unauthorized,
                "admin rights required",
                None,
            ));
        }
        match action {
            AdminAction::StartGame => self.world.start_game().map_err(api_error),
            AdminAction::SetMinPlayers { min_players } => {
                self.world.set_min_players(*min_players).map_err(api_error)
            }
            AdminAction::SetMaxPlayers { max_players } => {
                self.world.set_max_players(*max_players).map_err(api_error)
            }
            AdminAction::KickPlayer { player_id: target } => {
                if self.remove_player(target) {
                    Ok(())
                } else {
                    Err(api_error(ActionError::CrewNotFound(target.clone())))
                }
            }
        }
    }
}

fn error_code(error: &ActionError) -> ErrorCode {
    match error {
        ActionError::CrewNotFound(_) => ErrorCode::CrewNotFound,
        ActionError::MemberNotFound { .. } => ErrorCode::MemberNotFound,
        ActionError::BankNotFound(_) => ErrorCode::BankNotFound,
        ActionError::ThreadNotFound(_) => ErrorCode::ThreadNotFound,
        ActionError::IncompleteActions { .. } => ErrorCode::IncompleteActions,
        ActionError::MixedIntent { .. } => ErrorCode::MixedIntent,
        ActionError::WrongPhase { .. } => ErrorCode::WrongPhase,
        ActionError::MemberUnavailable { .. } => ErrorCode::MemberUnavailable,
        ActionError::InsufficientFunds { .. } => ErrorCode::InsufficientFunds,
        ActionError::PerkAlreadyOwned { .. } => ErrorCode::PerkAlreadyOwned,
        ActionError::LobbyFull => ErrorCode::LobbyFull,
        ActionError::GameAlreadyStarted => ErrorCode::GameAlreadyStarted,
        ActionError::MinPlayersNotMet { .. } => ErrorCode::MinPlayersNotMet,
        ActionError::MaxPlayersBelowCurrent { .. } => ErrorCode::InvalidConfig,
        ActionError::NotAParticipant { .. } => ErrorCode::Unauthorized,
    }
}

fn api_error(error: ActionError) -> ApiError {
    ApiError::new(error_code(&error), error.to_string(), None)
}
