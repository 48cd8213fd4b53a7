use super::*;

impl GameWorld {
    /// Admits a new crew and returns its id. Refused once the game has
    /// started or the lobby is full.
    pub fn add_crew(&mut self, name: &str) -> Result<String, ActionError> {
        if !self.accepting_players {
            return Err(ActionError::GameAlreadyStarted);
        }
        if self.crews.len() >= self.config.max_players {
            return Err(ActionError::LobbyFull);
        }

        let id = self.rng.generate_id();
        let crew = Crew {
            id: id.clone(),
            name: name.to_string(),
            capital: self.config.starting_capital,
            last_capital: self.config.starting_capital,
            turn_capital_gain: 0,
            reputation: 0,
            morale: 100,
            income_per_turn: 0,
            strategy: Strategy::Stealthy,
            crew_members: Vec::new(),
            is_ready_for_next_phase: false,
            turn_reports: Vec::new(),
        };
        self.crews.insert(id.clone(), crew);
        Ok(id)
    }

    /// Drops a crew entirely (kick or disconnect-grace expiry). Unknown ids
    /// are treated as already gone.
    pub fn remove_crew(&mut self, crew_id: &str) -> bool {
        self.crews.remove(crew_id).is_some()
    }

    pub fn set_min_players(&mut self, min_players: usize) -> Result<(), ActionError> {
        if self.phase != GamePhase::Initialization {
            return Err(ActionError::GameAlreadyStarted);
        }
        self.config.min_players = min_players.max(1);
        Ok(())
    }

    pub fn set_max_players(&mut self, max_players: usize) -> Result<(), ActionError> {
        if self.phase != GamePhase::Initialization {
            return Err(ActionError::GameAlreadyStarted);
        }
        if max_players < self.crews.len() {
            return Err(ActionError::MaxPlayersBelowCurrent {
                current: self.crews.len(),
                requested: max_players,
            });
        }
        self.config.max_players = max_players;
        Ok(())
    }

    /// Closes the lobby, generates the bank set sized by the player count,
    /// and opens turn one.
    pub fn start_game(&mut self) -> Result<(), ActionError> {
        if self.phase != GamePhase::Initialization {
            return Err(ActionError::GameAlreadyStarted);
        }
        if self.crews.len() < self.config.min_players {
            return Err(ActionError::MinPlayersNotMet {
                joined: self.crews.len(),
                required: self.config.min_players,
            });
        }

        self.accepting_players = false;
        self.generate_banks();
        self.phase = GamePhase::Planning;
        self.turn_number = 1;
        Ok(())
    }
}
