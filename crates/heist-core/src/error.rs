use std::fmt;

use contracts::{CrewMemberStatus, GamePhase};

/// Validation and integrity failures surfaced to the requesting caller.
/// Every variant leaves game state unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    CrewNotFound(String),
    MemberNotFound { crew_id: String, member_id: String },
    BankNotFound(String),
    ThreadNotFound(String),
    IncompleteActions { crew_id: String },
    MixedIntent { crew_id: String, bank_id: String },
    WrongPhase { expected: GamePhase, actual: GamePhase },
    MemberUnavailable { member_id: String, status: CrewMemberStatus },
    InsufficientFunds { needed: i64, available: i64 },
    PerkAlreadyOwned { member_id: String },
    LobbyFull,
    GameAlreadyStarted,
    MinPlayersNotMet { joined: usize, required: usize },
    MaxPlayersBelowCurrent { current: usize, requested: usize },
    NotAParticipant { thread_id: String, crew_id: String },
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CrewNotFound(id) => write!(f, "crew not found: {id}"),
            Self::MemberNotFound { crew_id, member_id } => {
                write!(f, "member {member_id} not found in crew {crew_id}")
            }
            Self::BankNotFound(id) => write!(f, "bank not found: {id}"),
            Self::ThreadNotFound(id) => write!(f, "chat thread not found: {id}"),
            Self::IncompleteActions { crew_id } => {
                write!(f, "crew {crew_id} has members without assigned actions")
            }
            Self::MixedIntent { crew_id, bank_id } => write!(
                f,
                "crew {crew_id} mixes cooperative and hostile intent against bank {bank_id}"
            ),
            Self::WrongPhase { expected, actual } => {
                write!(f, "requires {expected} phase, game is in {actual}")
            }
            Self::MemberUnavailable { member_id, status } => {
                write!(f, "member {member_id} is unavailable ({status:?})")
            }
            Self::InsufficientFunds { needed, available } => {
                write!(f, "insufficient funds: need {needed}, have {available}")
            }
            Self::PerkAlreadyOwned { member_id } => {
                write!(f, "member {member_id} already owns that perk")
            }
            Self::LobbyFull => write!(f, "maximum number of players reached"),
            Self::GameAlreadyStarted => write!(f, "game has already started"),
            Self::MinPlayersNotMet { joined, required } => {
                write!(f, "cannot start: {joined} of {required} required players joined")
            }
            Self::MaxPlayersBelowCurrent { current, requested } => write!(
                f,
                "cannot set max players to {requested} below current count {current}"
            ),
            Self::NotAParticipant { thread_id, crew_id } => {
                write!(f, "crew {crew_id} is not a participant of thread {thread_id}")
            }
        }
    }
}

impl std::error::Error for ActionError {}
