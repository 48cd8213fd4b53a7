//! The authoritative world: crews, banks, chat threads, phase, and turn
//! number, plus the turn orchestrator that mutates them. All randomness
//! flows through the single `GameRng` owned here.

use std::collections::BTreeMap;

mod banks;
mod chat;
mod lobby;
mod planning;
mod reports;
mod resolve;
mod roster;
mod snapshot;

use contracts::{
    Action, AttackOutcome, AttackRecord, AttackType, AttackingCrew, Bank, CasualtyRecord,
    ChatMessage, ChatThread, Crew, CrewMember, CrewMemberStatus, GameConfig, GamePhase,
    GameSnapshot, Loot, Perk, PerkType, PlannedAction, ReportDetails, Strategy, TurnReport,
    SCHEMA_VERSION_V1,
};

use crate::combat::{multi_crew_combat, CombatantResult};
use crate::error::ActionError;
use crate::util::{unix_millis, Dice, GameRng};

/// What `mark_crew_ready` did beyond flipping the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyOutcome {
    /// Other crews are still planning.
    Waiting,
    /// This was the last crew; the turn resolved and the world now sits in
    /// Resolution until `begin_next_turn` is called.
    TurnResolved,
}

/// Blueprint for one bank; see `GameWorld::create_bank`.
#[derive(Debug, Clone)]
pub struct BankConfig {
    pub name: String,
    pub guard_min: u32,
    pub guard_max: u32,
    pub guards_current: u32,
    pub difficulty_level: u8,
    pub loot_potential: i64,
    pub min_loot_potential: i64,
    pub security_features: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GameWorld {
    config: GameConfig,
    phase: GamePhase,
    turn_number: u64,
    crews: BTreeMap<String, Crew>,
    banks: BTreeMap<String, Bank>,
    chat_threads: BTreeMap<String, ChatThread>,
    accepting_players: bool,
    rng: GameRng,
}

impl GameWorld {
    pub fn new(config: GameConfig) -> Self {
        let rng = GameRng::new(config.seed);
        Self {
            config,
            phase: GamePhase::Initialization,
            turn_number: 0,
            crews: BTreeMap::new(),
            banks: BTreeMap::new(),
            chat_threads: BTreeMap::new(),
            accepting_players: true,
            rng,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn turn_number(&self) -> u64 {
        self.turn_number
    }

    pub fn accepting_players(&self) -> bool {
        self.accepting_players
    }

    pub fn crew_count(&self) -> usize {
        self.crews.len()
    }

    pub fn crew(&self, crew_id: &str) -> Option<&Crew> {
        self.crews.get(crew_id)
    }

    pub fn crews(&self) -> impl Iterator<Item = &Crew> {
        self.crews.values()
    }

    pub fn bank(&self, bank_id: &str) -> Option<&Bank> {
        self.banks.get(bank_id)
    }

    pub fn banks(&self) -> impl Iterator<Item = &Bank> {
        self.banks.values()
    }

    pub fn chat_thread(&self, thread_id: &str) -> Option<&ChatThread> {
        self.chat_threads.get(thread_id)
    }

    pub fn crew_of_member(&self, member_id: &str) -> Option<&Crew> {
        self.crews
            .values()
            .find(|crew| crew.member(member_id).is_some())
    }

    fn crew_id_of_member(&self, member_id: &str) -> Option<String> {
        self.crew_of_member(member_id).map(|crew| crew.id.clone())
    }
}
