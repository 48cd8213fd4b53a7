use super::*;

const CREW_NAMES: [&str; 10] = [
    "Shadow", "Ghost", "Cipher", "Echo", "Wraith", "Phantom", "Spectre", "Raven", "Wolf", "Fox",
];

impl GameWorld {
    /// Hires a fresh member for the crew and returns the member id.
    pub fn hire_crew_member(&mut self, crew_id: &str) -> Result<String, ActionError> {
        let cost = self.config.crew_member_cost;
        let capital = self
            .crews
            .get(crew_id)
            .map(|crew| crew.capital)
            .ok_or_else(|| ActionError::CrewNotFound(crew_id.to_string()))?;
        if capital < cost {
            return Err(ActionError::InsufficientFunds {
                needed: cost,
                available: capital,
            });
        }

        let member_id = self.rng.generate_id();
        let codename = CREW_NAMES[self.rng.pick(CREW_NAMES.len())];
        let name = format!("{codename}-{}", self.rng.pick(1_000));
        let member = CrewMember {
            id: member_id.clone(),
            name,
            perks: Vec::new(),
            action: Action::None,
            status: CrewMemberStatus::Healthy,
            planned_action: None,
            jail_term: None,
        };

        if let Some(crew) = self.crews.get_mut(crew_id) {
            crew.crew_members.push(member);
            crew.capital -= cost;
        }
        Ok(member_id)
    }

    /// Duplicate perks are refused; the price comes out of crew capital.
    pub fn buy_perk(
        &mut self,
        crew_id: &str,
        member_id: &str,
        perk_type: PerkType,
    ) -> Result<(), ActionError> {
        let perk = Perk::catalog(perk_type);
        let crew = self
            .crews
            .get_mut(crew_id)
            .ok_or_else(|| ActionError::CrewNotFound(crew_id.to_string()))?;
        if crew.capital < perk.cost {
            return Err(ActionError::InsufficientFunds {
                needed: perk.cost,
                available: crew.capital,
            });
        }
        let cost = perk.cost;
        let member = crew
            .member_mut(member_id)
            .ok_or_else(|| ActionError::MemberNotFound {
                crew_id: crew_id.to_string(),
                member_id: member_id.to_string(),
            })?;
        if member.has_perk(perk_type) {
            return Err(ActionError::PerkAlreadyOwned {
                member_id: member_id.to_string(),
            });
        }

        member.perks.push(perk);
        crew.capital -= cost;
        Ok(())
    }
}
