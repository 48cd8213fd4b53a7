use super::*;

impl GameWorld {
    /// Resolves the whole turn synchronously. Called from `mark_crew_ready`
    /// when the last crew readies; the world is left in Resolution with
    /// fresh reports until `begin_next_turn` flips it back to Planning.
    pub(super) fn resolve_turn(&mut self) {
        self.phase = GamePhase::Resolution;

        for crew in self.crews.values_mut() {
            crew.turn_reports.clear();
            crew.income_per_turn = 0;
        }

        self.grant_basic_income();
        self.resolve_work();

        let assaults = self.collect_bank_assaults();
        let mut fresh_arrests: Vec<String> = Vec::new();
        for (bank_id, contingents) in assaults {
            self.resolve_bank_attack(&bank_id, contingents, &mut fresh_arrests);
        }

        self.advance_jail_terms(&fresh_arrests);

        for crew in self.crews.values_mut() {
            crew.is_ready_for_next_phase = false;
            crew.turn_capital_gain = crew.capital - crew.last_capital;
            crew.last_capital = crew.capital;
        }

        self.process_end_of_day();
    }

    /// Ends the Resolution pause and opens the next Planning phase. Planned
    /// actions stay on each member as next turn's default.
    pub fn begin_next_turn(&mut self) -> Result<(), ActionError> {
        if self.phase != GamePhase::Resolution {
            return Err(ActionError::WrongPhase {
                expected: GamePhase::Resolution,
                actual: self.phase,
            });
        }
        self.phase = GamePhase::Planning;
        self.turn_number += 1;
        Ok(())
    }

    /// A crew with nobody healthy still earns a trickle, so elimination
    /// never locks a player out economically.
    fn grant_basic_income(&mut self) {
        let amount = self.config.basic_income;
        for crew in self.crews.values_mut() {
            let nobody_healthy = crew
                .crew_members
                .iter()
                .all(|member| member.status != CrewMemberStatus::Healthy);
            if nobody_healthy {
                crew.capital += amount;
                crew.income_per_turn += amount;
                let report = Self::basic_income_report(&crew.id, amount);
                crew.turn_reports.push(report);
            }
        }
    }

    /// Pays every working member and records each member's immediate action
    /// for the turn.
    fn resolve_work(&mut self) {
        for crew in self.crews.values_mut() {
            for member in crew.crew_members.iter_mut() {
                if member.status != CrewMemberStatus::Healthy {
                    continue;
                }
                let Some(planned) = member.planned_action.clone() else {
                    continue;
                };
                member.action = planned.action_kind();
                if planned != PlannedAction::Work {
                    continue;
                }

                let variance =
                    (self.rng.roll() * self.config.work_salary_variance as f64) as i64;
                let perk_bonus = member.perks.len() as i64 * self.config.work_bonus_per_perk;
                let phone_bonus = if member.has_perk(PerkType::Phone) {
                    self.config.phone_work_bonus
                } else {
                    0
                };
                let salary =
                    self.config.base_work_salary + variance + perk_bonus + phone_bonus;

                crew.capital += salary;
                crew.income_per_turn += salary;
                crew.turn_reports.push(Self::work_report(&member.id, salary));
            }
        }
    }

    /// Groups every healthy member's planned attack by target bank, one
    /// contingent per crew per bank. Ready-time validation guarantees a
    /// crew's intent against one bank is uniform, so the contingent carries
    /// its first member's attack type.
    fn collect_bank_assaults(&self) -> BTreeMap<String, Vec<AttackingCrew>> {
        let mut assaults: BTreeMap<String, Vec<AttackingCrew>> = BTreeMap::new();
        for crew in self.crews.values() {
            let mut per_bank: BTreeMap<String, AttackingCrew> = BTreeMap::new();
            for member in crew.healthy_members() {
                if let Some(PlannedAction::Attack {
                    target_id,
                    attack_type,
                }) = &member.planned_action
                {
                    per_bank
                        .entry(target_id.clone())
                        .or_insert_with(|| AttackingCrew {
                            crew_id: crew.id.clone(),
                            crew_name: crew.name.clone(),
                            attack_type: *attack_type,
                            crew_members: Vec::new(),
                        })
                        .crew_members
                        .push(member.clone());
                }
            }
            for (bank_id, contingent) in per_bank {
                assaults.entry(bank_id).or_default().push(contingent);
            }
        }
        assaults
    }

    /// Runs combat for one bank and applies every consequence: casualties,
    /// loot split, reputation, reports, and the bank's own bookkeeping.
    /// A bank that vanished since planning is skipped without error, and no
    /// outcome here can abort the other banks' attacks.
    fn resolve_bank_attack(
        &mut self,
        bank_id: &str,
        contingents: Vec<AttackingCrew>,
        fresh_arrests: &mut Vec<String>,
    ) {
        let Some(bank) = self.banks.get(bank_id) else {
            return;
        };
        let guards = bank.guards_current;
        let bank_name = bank.name.clone();
        let loot_potential = bank.loot_potential;

        let coop: Vec<Vec<CrewMember>> = contingents
            .iter()
            .filter(|contingent| contingent.attack_type == AttackType::Cooperative)
            .map(|contingent| contingent.crew_members.clone())
            .collect();
        let hostile: Vec<Vec<CrewMember>> = contingents
            .iter()
            .filter(|contingent| contingent.attack_type == AttackType::Hostile)
            .map(|contingent| contingent.crew_members.clone())
            .collect();

        let result = multi_crew_combat(&self.config, &mut self.rng, coop, hostile, guards);

        let success = result.remaining_defenders == 0 && !result.winners.is_empty();
        let outcome = if success {
            AttackOutcome::Success
        } else {
            AttackOutcome::Failure
        };
        // Even split; the division remainder stays in the vault.
        let per_winner = if success {
            loot_potential / result.winners.len() as i64
        } else {
            0
        };
        let loot = success.then(|| Loot {
            kind: "money".to_string(),
            amount: per_winner * result.winners.len() as i64,
        });

        let mut casualties = Vec::new();
        let mut casualty_fights = Vec::new();
        for fallen in &result.casualties {
            if let CombatantResult::Crew {
                member,
                died,
                jailed,
                jail_term,
                guard_fight,
            } = fallen
            {
                let casualty = CasualtyRecord {
                    member: member.clone(),
                    died: *died,
                    jailed: *jailed,
                    jail_term: *jail_term,
                };
                casualties.push(casualty.clone());
                casualty_fights.push((casualty, *guard_fight));
            }
        }

        let record = AttackRecord {
            id: self.rng.generate_id(),
            bank_id: bank_id.to_string(),
            bank_name,
            turn_number: self.turn_number,
            timestamp_ms: unix_millis(),
            attacking_crews: contingents,
            outcome,
            loot,
            winners: result.winners.clone(),
            empty_survivors: result.empty_survivors.clone(),
            casualties,
            guards_defeated: result.guards_defeated(),
        };

        self.apply_casualties(&casualty_fights, fresh_arrests);
        self.credit_loot(&record, per_winner);
        self.apply_reputation(&record);
        self.report_heist(&record, per_winner, &casualty_fights);
        self.on_bank_robbed(bank_id, record);
    }

    fn apply_casualties(
        &mut self,
        fights: &[(CasualtyRecord, bool)],
        fresh_arrests: &mut Vec<String>,
    ) {
        for (casualty, _) in fights {
            let Some(crew_id) = self.crew_id_of_member(&casualty.member.id) else {
                continue;
            };
            let Some(crew) = self.crews.get_mut(&crew_id) else {
                continue;
            };
            let Some(member) = crew.member_mut(&casualty.member.id) else {
                continue;
            };
            member.planned_action = None;
            member.action = Action::None;
            if casualty.died {
                member.status = CrewMemberStatus::Dead;
                member.jail_term = None;
            } else if casualty.jailed {
                member.status = CrewMemberStatus::Arrested;
                member.jail_term = Some(casualty.jail_term);
                fresh_arrests.push(casualty.member.id.clone());
            }
        }
    }

    fn credit_loot(&mut self, record: &AttackRecord, per_winner: i64) {
        if record.outcome != AttackOutcome::Success || per_winner == 0 {
            return;
        }
        let mut shares: BTreeMap<String, i64> = BTreeMap::new();
        for winner in &record.winners {
            if let Some(crew_id) = self.crew_id_of_member(&winner.id) {
                *shares.entry(crew_id).or_insert(0) += per_winner;
            }
        }
        for (crew_id, share) in shares {
            if let Some(crew) = self.crews.get_mut(&crew_id) {
                crew.capital += share;
            }
        }
    }

    fn apply_reputation(&mut self, record: &AttackRecord) {
        let delta = if record.outcome == AttackOutcome::Success {
            10
        } else {
            -5
        };
        for contingent in &record.attacking_crews {
            if let Some(crew) = self.crews.get_mut(&contingent.crew_id) {
                crew.reputation += delta;
            }
        }
    }

    /// Serves one turn of every standing sentence. Members arrested during
    /// this very resolution keep their full term; a finished sentence
    /// restores the member and appends a release notice.
    fn advance_jail_terms(&mut self, fresh_arrests: &[String]) {
        for crew in self.crews.values_mut() {
            let mut released = Vec::new();
            for member in crew.crew_members.iter_mut() {
                if member.status != CrewMemberStatus::Arrested {
                    continue;
                }
                if fresh_arrests.iter().any(|id| id == &member.id) {
                    continue;
                }
                let remaining = member.jail_term.unwrap_or(1).saturating_sub(1);
                if remaining == 0 {
                    member.status = CrewMemberStatus::Healthy;
                    member.jail_term = None;
                    released.push(Self::release_report(member));
                } else {
                    member.jail_term = Some(remaining);
                }
            }
            crew.turn_reports.extend(released);
        }
    }
}
