use serde::{Deserialize, Serialize};

use crate::SCHEMA_VERSION_V1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    CrewNotFound,
    MemberNotFound,
    BankNotFound,
    ThreadNotFound,
    IncompleteActions,
    MixedIntent,
    WrongPhase,
    MemberUnavailable,
    InsufficientFunds,
    PerkAlreadyOwned,
    LobbyFull,
    GameAlreadyStarted,
    MinPlayersNotMet,
    InvalidConfig,
    InvalidMessage,
    Unauthorized,
    InternalError,
}

/// Non-fatal error surfaced to the single requesting client; game state is
/// unchanged when one of these is returned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub schema_version: String,
    pub error_code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(error_code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            error_code,
            message: message.into(),
            details,
        }
    }
}
