use super::*;

const LAST_WORDS: [&str; 5] = [
    "We were so close. Split my share between the others.",
    "Tell the crew the vault was everything we hoped for.",
    "Should have taken the day job.",
    "No regrets. Almost made it out the back.",
    "They came out of nowhere. Get the others home safe.",
];

impl GameWorld {
    pub(super) fn push_crew_report(&mut self, crew_id: &str, report: TurnReport) {
        if let Some(crew) = self.crews.get_mut(crew_id) {
            crew.turn_reports.push(report);
        }
    }

    /// Narrates one resolved bank attack to every crew involved: winners,
    /// casualties, and ambushers who never got their fight.
    pub(super) fn report_heist(
        &mut self,
        record: &AttackRecord,
        per_winner: i64,
        fights: &[(CasualtyRecord, bool)],
    ) {
        let details_text = Self::heist_details(record);

        for winner in &record.winners {
            let Some(crew_id) = self.crew_id_of_member(&winner.id) else {
                continue;
            };
            let report = TurnReport {
                crew_member_id: winner.id.clone(),
                message: format!(
                    "Successfully robbed {} and brought home ${per_winner}. {details_text}",
                    record.bank_name
                ),
                details: ReportDetails {
                    location: Some(record.bank_name.clone()),
                    collaborators: Self::contingent_collaborators(record, &winner.id),
                    outcome: Some(record.outcome),
                    earnings: Some(per_winner),
                    ..Default::default()
                },
            };
            self.push_crew_report(&crew_id, report);
        }

        for (casualty, guard_fight) in fights {
            let Some(crew_id) = self.crew_id_of_member(&casualty.member.id) else {
                continue;
            };
            let report = if casualty.died {
                self.death_report(record, casualty, *guard_fight)
            } else {
                Self::arrest_report(record, casualty)
            };
            self.push_crew_report(&crew_id, report);
        }

        for survivor in &record.empty_survivors {
            let Some(crew_id) = self.crew_id_of_member(&survivor.id) else {
                continue;
            };
            let report = TurnReport {
                crew_member_id: survivor.id.clone(),
                message: format!(
                    "Staked out {} to ambush the heist crew, but came home empty-handed.",
                    record.bank_name
                ),
                details: ReportDetails {
                    location: Some(record.bank_name.clone()),
                    outcome: Some(record.outcome),
                    ..Default::default()
                },
            };
            self.push_crew_report(&crew_id, report);
        }
    }

    /// A Phone perk lets the fallen member get one last message out.
    fn death_report(
        &mut self,
        record: &AttackRecord,
        casualty: &CasualtyRecord,
        guard_fight: bool,
    ) -> TurnReport {
        let name = &casualty.member.name;
        let (mut message, cause) = if guard_fight {
            (
                format!("{name} was gunned down by the guards at {}.", record.bank_name),
                "bank guards",
            )
        } else {
            (
                format!(
                    "{name} was killed in a firefight with a rival crew at {}.",
                    record.bank_name
                ),
                "rival crew",
            )
        };

        let mut last_words = None;
        if casualty.member.has_perk(PerkType::Phone) {
            let words = LAST_WORDS[self.rng.pick(LAST_WORDS.len())].to_string();
            message.push_str(&format!(" Their phone caught a final message: \"{words}\""));
            last_words = Some(words);
        }

        TurnReport {
            crew_member_id: casualty.member.id.clone(),
            message,
            details: ReportDetails {
                location: Some(record.bank_name.clone()),
                outcome: Some(record.outcome),
                cause_of_death: Some(cause.to_string()),
                last_words,
                ..Default::default()
            },
        }
    }

    fn arrest_report(record: &AttackRecord, casualty: &CasualtyRecord) -> TurnReport {
        TurnReport {
            crew_member_id: casualty.member.id.clone(),
            message: format!(
                "{} was arrested at {} and sentenced to {} turns.",
                casualty.member.name, record.bank_name, casualty.jail_term
            ),
            details: ReportDetails {
                location: Some(record.bank_name.clone()),
                outcome: Some(record.outcome),
                ..Default::default()
            },
        }
    }

    pub(super) fn work_report(member_id: &str, salary: i64) -> TurnReport {
        TurnReport {
            crew_member_id: member_id.to_string(),
            message: format!("Worked a regular job and earned ${salary}."),
            details: ReportDetails {
                earnings: Some(salary),
                ..Default::default()
            },
        }
    }

    pub(super) fn basic_income_report(crew_id: &str, amount: i64) -> TurnReport {
        TurnReport {
            crew_member_id: crew_id.to_string(),
            message: format!(
                "With nobody fit to send out, the crew scraped together ${amount} in basic income."
            ),
            details: ReportDetails {
                earnings: Some(amount),
                ..Default::default()
            },
        }
    }

    pub(super) fn release_report(member: &CrewMember) -> TurnReport {
        TurnReport {
            crew_member_id: member.id.clone(),
            message: format!("{} served their sentence and is back on the streets.", member.name),
            details: ReportDetails::default(),
        }
    }

    /// One-line roll call of the crews on this attack.
    fn heist_details(record: &AttackRecord) -> String {
        let describe = |attack_type: AttackType| {
            record
                .crews_of_type(attack_type)
                .map(|contingent| {
                    let count = contingent.crew_members.len();
                    let plural = if count == 1 { "" } else { "s" };
                    format!("{} with {count} member{plural}", contingent.crew_name)
                })
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut parts = Vec::new();
        let coop = describe(AttackType::Cooperative);
        if !coop.is_empty() {
            parts.push(format!("Cooperative crews: {coop}"));
        }
        let hostile = describe(AttackType::Hostile);
        if !hostile.is_empty() {
            parts.push(format!("Hostile crews: {hostile}"));
        }
        parts.join(". ")
    }

    /// Names of the other members in the same contingent as `member_id`.
    fn contingent_collaborators(record: &AttackRecord, member_id: &str) -> Vec<String> {
        record
            .attacking_crews
            .iter()
            .find(|contingent| {
                contingent
                    .crew_members
                    .iter()
                    .any(|member| member.id == member_id)
            })
            .map(|contingent| {
                contingent
                    .crew_members
                    .iter()
                    .filter(|member| member.id != member_id)
                    .map(|member| member.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}
