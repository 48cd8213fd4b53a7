use super::*;

impl GameWorld {
    pub fn create_bank(&mut self, config: BankConfig) -> String {
        let id = self.rng.generate_id();
        let bank = Bank {
            id: id.clone(),
            name: config.name,
            guard_min: config.guard_min,
            guard_max: config.guard_max,
            guards_current: config
                .guards_current
                .clamp(config.guard_min, config.guard_max),
            difficulty_level: config.difficulty_level,
            loot_potential: config.loot_potential.max(config.min_loot_potential),
            min_loot_potential: config.min_loot_potential,
            security_features: config.security_features,
            attack_history: Vec::new(),
        };
        self.banks.insert(id.clone(), bank);
        id
    }

    /// One local bank per player, one regional per two, one national per
    /// four. Called once at game start.
    pub(super) fn generate_banks(&mut self) {
        self.banks.clear();
        let players = self.crews.len();

        for i in 0..players {
            self.create_bank(BankConfig {
                name: format!("Local Bank {}", i + 1),
                guard_min: 2,
                guard_max: 5,
                guards_current: 3,
                difficulty_level: 1,
                loot_potential: 50_000,
                min_loot_potential: 50_000,
                security_features: vec!["Basic Alarm".to_string()],
            });
        }

        for i in 0..players / 2 {
            self.create_bank(BankConfig {
                name: format!("Regional Bank {}", i + 1),
                guard_min: 4,
                guard_max: 8,
                guards_current: 6,
                difficulty_level: 2,
                loot_potential: 100_000,
                min_loot_potential: 100_000,
                security_features: vec![
                    "Advanced Alarm".to_string(),
                    "Security Cameras".to_string(),
                ],
            });
        }

        for i in 0..players / 4 {
            self.create_bank(BankConfig {
                name: format!("National Bank {}", i + 1),
                guard_min: 8,
                guard_max: 15,
                guards_current: 10,
                difficulty_level: 3,
                loot_potential: 200_000,
                min_loot_potential: 200_000,
                security_features: vec![
                    "Advanced Alarm".to_string(),
                    "Security Cameras".to_string(),
                    "Armed Guards".to_string(),
                    "Vault Timer".to_string(),
                ],
            });
        }
    }

    /// Appends the record to the bank's history and, on success, applies the
    /// economic fallout: the vault drains by the loot taken (never below the
    /// floor) and guards are reinforced by half the surviving robber count.
    /// A vanished bank id is treated as already removed.
    pub(super) fn on_bank_robbed(&mut self, bank_id: &str, record: AttackRecord) {
        let Some(bank) = self.banks.get_mut(bank_id) else {
            return;
        };

        if record.outcome == AttackOutcome::Success {
            let looted = record.loot.as_ref().map(|loot| loot.amount).unwrap_or(0);
            bank.loot_potential = (bank.loot_potential - looted).max(bank.min_loot_potential);

            let survivors = record.winners.len() as u32;
            bank.guards_current = (bank.guards_current + survivors.div_ceil(2)).min(bank.guard_max);
        }

        bank.attack_history.push(record);
    }

    /// Once per turn: every bank regenerates a configured fraction of the
    /// gap to twice its current potential, and with even odds one guard
    /// stands down toward the baseline.
    pub(super) fn process_end_of_day(&mut self) {
        for bank in self.banks.values_mut() {
            let ceiling = (bank.loot_potential as f64 * self.config.max_loot_multiplier) as i64;
            let gap = (ceiling - bank.loot_potential).max(0);
            bank.loot_potential += (gap as f64 * self.config.loot_regeneration_rate) as i64;

            if bank.guards_current > bank.guard_min
                && self.rng.chance(self.config.guard_decay_chance)
            {
                bank.guards_current -= 1;
            }
        }
    }
}
