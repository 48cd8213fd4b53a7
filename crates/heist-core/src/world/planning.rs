use super::*;

impl GameWorld {
    /// Last assignment wins; a member may be reassigned any number of times
    /// until the turn resolves. Only Healthy members can be given a real
    /// action, and attack targets must exist at assignment time.
    pub fn assign_action(
        &mut self,
        crew_id: &str,
        member_id: &str,
        action: PlannedAction,
    ) -> Result<(), ActionError> {
        if self.phase != GamePhase::Planning {
            return Err(ActionError::WrongPhase {
                expected: GamePhase::Planning,
                actual: self.phase,
            });
        }
        if let PlannedAction::Attack { target_id, .. } = &action {
            if !self.banks.contains_key(target_id) {
                return Err(ActionError::BankNotFound(target_id.clone()));
            }
        }

        let crew = self
            .crews
            .get_mut(crew_id)
            .ok_or_else(|| ActionError::CrewNotFound(crew_id.to_string()))?;
        let member = crew
            .member_mut(member_id)
            .ok_or_else(|| ActionError::MemberNotFound {
                crew_id: crew_id.to_string(),
                member_id: member_id.to_string(),
            })?;
        if member.status != CrewMemberStatus::Healthy && !action.is_none() {
            return Err(ActionError::MemberUnavailable {
                member_id: member_id.to_string(),
                status: member.status,
            });
        }

        member.planned_action = Some(action);
        Ok(())
    }

    /// Flags the crew as ready. The crew must have a real action for every
    /// Healthy member and may not split cooperative and hostile intent
    /// against one bank. When this was the last unready crew the whole turn
    /// resolves before the call returns.
    pub fn mark_crew_ready(&mut self, crew_id: &str) -> Result<ReadyOutcome, ActionError> {
        if self.phase != GamePhase::Planning {
            return Err(ActionError::WrongPhase {
                expected: GamePhase::Planning,
                actual: self.phase,
            });
        }
        let crew = self
            .crews
            .get(crew_id)
            .ok_or_else(|| ActionError::CrewNotFound(crew_id.to_string()))?;

        let incomplete = crew.healthy_members().any(|member| {
            member
                .planned_action
                .as_ref()
                .map_or(true, PlannedAction::is_none)
        });
        if incomplete {
            return Err(ActionError::IncompleteActions {
                crew_id: crew_id.to_string(),
            });
        }
        if let Some(bank_id) = Self::mixed_intent_bank(crew) {
            return Err(ActionError::MixedIntent {
                crew_id: crew_id.to_string(),
                bank_id,
            });
        }

        if let Some(crew) = self.crews.get_mut(crew_id) {
            crew.is_ready_for_next_phase = true;
        }

        // The ready check and the phase transition are one synchronous step,
        // so resolution fires exactly once.
        let all_ready = self
            .crews
            .values()
            .all(|crew| crew.is_ready_for_next_phase);
        if all_ready {
            self.resolve_turn();
            Ok(ReadyOutcome::TurnResolved)
        } else {
            Ok(ReadyOutcome::Waiting)
        }
    }

    /// First bank this crew targets with both cooperative and hostile
    /// members, if any.
    fn mixed_intent_bank(crew: &Crew) -> Option<String> {
        let mut intent_by_bank: BTreeMap<&str, AttackType> = BTreeMap::new();
        for member in crew.healthy_members() {
            if let Some(PlannedAction::Attack {
                target_id,
                attack_type,
            }) = &member.planned_action
            {
                match intent_by_bank.get(target_id.as_str()) {
                    Some(existing) if *existing != *attack_type => {
                        return Some(target_id.clone());
                    }
                    Some(_) => {}
                    None => {
                        intent_by_bank.insert(target_id, *attack_type);
                    }
                }
            }
        }
        None
    }
}
