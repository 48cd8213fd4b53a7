use super::*;

impl GameWorld {
    /// Pure projection of the whole world for broadcast. Safe to call at any
    /// time, including mid-resolution; acyclic because attack records carry
    /// only the bank's id and name.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            phase: self.phase,
            turn_number: self.turn_number,
            crews: self
                .crews
                .iter()
                .map(|(id, crew)| (id.clone(), crew.clone()))
                .collect(),
            banks: self
                .banks
                .iter()
                .map(|(id, bank)| (id.clone(), bank.clone()))
                .collect(),
            chat_threads: self
                .chat_threads
                .iter()
                .map(|(id, thread)| (id.clone(), thread.clone()))
                .collect(),
        }
    }

    /// Rebuilds a world from a snapshot. The random stream restarts from the
    /// configured seed; replay is only guaranteed within one process.
    pub fn restore(config: GameConfig, snapshot: GameSnapshot) -> Self {
        let accepting_players = snapshot.phase == GamePhase::Initialization;
        let rng = GameRng::new(config.seed);
        Self {
            config,
            phase: snapshot.phase,
            turn_number: snapshot.turn_number,
            crews: snapshot.crews.into_iter().collect(),
            banks: snapshot.banks.into_iter().collect(),
            chat_threads: snapshot.chat_threads.into_iter().collect(),
            accepting_players,
            rng,
        }
    }
}
