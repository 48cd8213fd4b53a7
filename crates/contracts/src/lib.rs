//! v1 cross-boundary contracts for the heist game kernel, API server, and clients.

use std::fmt;

use serde::{Deserialize, Serialize};

mod error;
mod wire;

pub use error::{ApiError, ErrorCode};
pub use wire::{AdminAction, ClientMessage, ServerMessage};

pub const SCHEMA_VERSION_V1: &str = "1.0";

/// One turn cycle is Planning followed by Resolution; Initialization is the
/// pre-game lobby phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Initialization,
    Planning,
    Resolution,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Attack,
    Work,
    None,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    Hostile,
    Cooperative,
}

/// `Injured` is reserved and never assigned by the current rules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CrewMemberStatus {
    Healthy,
    Injured,
    Arrested,
    Dead,
}

/// `Partial` is reserved for a future graded-outcome rule; the combat engine
/// currently resolves every heist to `Success` or `Failure`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttackOutcome {
    Success,
    Partial,
    Failure,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Stealthy,
    BruteForce,
    Negotiation,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PerkType {
    Gun,
    Phone,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Perk {
    pub perk_type: PerkType,
    pub title: String,
    pub icon: String,
    pub description: String,
    pub cost: i64,
    pub power: i64,
}

impl Perk {
    pub fn catalog(perk_type: PerkType) -> Self {
        match perk_type {
            PerkType::Gun => Self {
                perk_type,
                title: "Armed and Ready".to_string(),
                icon: "local_police".to_string(),
                description: "Equip your crew member with a gun for better attack power"
                    .to_string(),
                cost: 25_000,
                power: 5,
            },
            PerkType::Phone => Self {
                perk_type,
                title: "Connected".to_string(),
                icon: "smartphone".to_string(),
                description: "Give your crew member a secure phone for better coordination"
                    .to_string(),
                cost: 15_000,
                power: 3,
            },
        }
    }
}

/// What a member intends to do next turn. Defaults to `None` until the player
/// assigns something; actions are sticky across turns once assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlannedAction {
    #[default]
    None,
    Work,
    Attack {
        target_id: String,
        attack_type: AttackType,
    },
}

impl PlannedAction {
    pub fn is_none(&self) -> bool {
        matches!(self, PlannedAction::None)
    }

    pub fn action_kind(&self) -> Action {
        match self {
            PlannedAction::None => Action::None,
            PlannedAction::Work => Action::Work,
            PlannedAction::Attack { .. } => Action::Attack,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrewMember {
    pub id: String,
    pub name: String,
    pub perks: Vec<Perk>,
    /// Last-known immediate action, updated when a turn resolves.
    pub action: Action,
    pub status: CrewMemberStatus,
    pub planned_action: Option<PlannedAction>,
    /// Remaining turns of arrest; only meaningful while `Arrested`.
    pub jail_term: Option<u32>,
}

impl CrewMember {
    pub fn has_perk(&self, perk_type: PerkType) -> bool {
        self.perks.iter().any(|perk| perk.perk_type == perk_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ReportDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collaborators: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<AttackOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earnings: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_words: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause_of_death: Option<String>,
}

/// Per-member narrative record of one resolved turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnReport {
    pub crew_member_id: String,
    pub message: String,
    pub details: ReportDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Crew {
    pub id: String,
    pub name: String,
    pub capital: i64,
    pub last_capital: i64,
    pub turn_capital_gain: i64,
    pub reputation: i64,
    pub morale: i64,
    pub income_per_turn: i64,
    pub strategy: Strategy,
    pub crew_members: Vec<CrewMember>,
    pub is_ready_for_next_phase: bool,
    pub turn_reports: Vec<TurnReport>,
}

impl Crew {
    pub fn healthy_members(&self) -> impl Iterator<Item = &CrewMember> {
        self.crew_members
            .iter()
            .filter(|member| member.status == CrewMemberStatus::Healthy)
    }

    pub fn member(&self, member_id: &str) -> Option<&CrewMember> {
        self.crew_members
            .iter()
            .find(|member| member.id == member_id)
    }

    pub fn member_mut(&mut self, member_id: &str) -> Option<&mut CrewMember> {
        self.crew_members
            .iter_mut()
            .find(|member| member.id == member_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Loot {
    pub kind: String,
    pub amount: i64,
}

/// One crew's contingent in a bank attack, tagged with the attack type its
/// members chose.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttackingCrew {
    pub crew_id: String,
    pub crew_name: String,
    pub attack_type: AttackType,
    pub crew_members: Vec<CrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CasualtyRecord {
    pub member: CrewMember,
    pub died: bool,
    pub jailed: bool,
    pub jail_term: u32,
}

/// Append-only history entry for one resolved attack against one bank.
/// Holds the bank's id and name rather than the bank itself, so histories
/// never form a cycle and serialize as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttackRecord {
    pub id: String,
    pub bank_id: String,
    pub bank_name: String,
    pub turn_number: u64,
    pub timestamp_ms: u64,
    pub attacking_crews: Vec<AttackingCrew>,
    pub outcome: AttackOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loot: Option<Loot>,
    pub winners: Vec<CrewMember>,
    /// Hostile tournament winners left standing when the heist itself had no
    /// survivors to fight.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub empty_survivors: Vec<CrewMember>,
    pub casualties: Vec<CasualtyRecord>,
    pub guards_defeated: u32,
}

impl AttackRecord {
    pub fn crews_of_type(&self, attack_type: AttackType) -> impl Iterator<Item = &AttackingCrew> {
        self.attacking_crews
            .iter()
            .filter(move |crew| crew.attack_type == attack_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bank {
    pub id: String,
    pub name: String,
    pub guard_min: u32,
    pub guard_max: u32,
    pub guards_current: u32,
    pub difficulty_level: u8,
    pub loot_potential: i64,
    pub min_loot_potential: i64,
    pub security_features: Vec<String>,
    pub attack_history: Vec<AttackRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    pub sender_id: String,
    pub content: String,
    pub sent_turn: u64,
    pub timestamp_ms: u64,
    pub is_read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatThread {
    pub id: String,
    pub participants: Vec<String>,
    pub messages: Vec<ChatMessage>,
    pub last_activity_turn: u64,
}

/// Full world snapshot pushed to every session after a state-changing
/// operation. Ordered list-of-pairs so the wire shape is stable across
/// serializers; acyclic by construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSnapshot {
    pub schema_version: String,
    pub phase: GamePhase,
    pub turn_number: u64,
    pub crews: Vec<(String, Crew)>,
    pub banks: Vec<(String, Bank)>,
    pub chat_threads: Vec<(String, ChatThread)>,
}

/// Tunable rules. Defaults reproduce the classic balance; tests override the
/// pieces they pin down.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    pub schema_version: String,
    #[serde(default = "default_seed")]
    pub seed: u64,
    pub min_players: usize,
    pub max_players: usize,
    pub starting_capital: i64,
    pub crew_member_cost: i64,
    pub base_work_salary: i64,
    pub work_salary_variance: i64,
    pub work_bonus_per_perk: i64,
    pub phone_work_bonus: i64,
    /// Credited to a crew with no healthy members so elimination never locks
    /// a player out economically.
    pub basic_income: i64,
    /// Win probability for an armed fighter against an unarmed one or a guard.
    pub gun_win_chance: f64,
    /// Chance that losing a guard fight kills rather than jails.
    pub guard_death_chance: f64,
    pub jail_term_armed: u32,
    pub jail_term_unarmed: u32,
    /// Fraction of the gap to `max_loot_multiplier` x current regenerated per turn.
    pub loot_regeneration_rate: f64,
    pub max_loot_multiplier: f64,
    /// Per-turn chance that one guard stands down toward `guard_min`.
    pub guard_decay_chance: f64,
    pub report_pause_ms: u64,
    pub disconnect_grace_secs: u64,
}

fn default_seed() -> u64 {
    1337
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            seed: default_seed(),
            min_players: 2,
            max_players: 8,
            starting_capital: 200_000,
            crew_member_cost: 50_000,
            base_work_salary: 5_000,
            work_salary_variance: 2_000,
            work_bonus_per_perk: 1_000,
            phone_work_bonus: 2_000,
            basic_income: 5_000,
            gun_win_chance: 0.7,
            guard_death_chance: 0.3,
            jail_term_armed: 5,
            jail_term_unarmed: 3,
            loot_regeneration_rate: 0.05,
            max_loot_multiplier: 2.0,
            guard_decay_chance: 0.5,
            report_pause_ms: 10_000,
            disconnect_grace_secs: 30 * 60,
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GamePhase::Initialization => write!(f, "initialization"),
            GamePhase::Planning => write!(f, "planning"),
            GamePhase::Resolution => write!(f, "resolution"),
        }
    }
}
