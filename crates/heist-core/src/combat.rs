//! Multi-party bank combat. Pure functions over owned member contingents;
//! the world applies statuses and economics from the returned results.
//!
//! A full heist resolves in up to three stages. Hostile crews first fight
//! each other in a single-elimination tournament. The cooperative crews
//! then merge into one shuffled coalition and run the guard gauntlet.
//! Finally the tournament winner ambushes whatever the coalition has left.

use std::collections::VecDeque;

use contracts::{Action, CrewMember, GameConfig, PerkType};

use crate::util::Dice;

/// One eliminated fighter. `guard_fight` distinguishes dying to a guard from
/// dying to a rival member, which reports phrase differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatantResult {
    Crew {
        member: CrewMember,
        died: bool,
        jailed: bool,
        jail_term: u32,
        guard_fight: bool,
    },
    Guard,
}

impl CombatantResult {
    pub fn is_guard(&self) -> bool {
        matches!(self, CombatantResult::Guard)
    }
}

#[derive(Debug, Clone)]
pub enum Defenders {
    Guards(u32),
    Crew(Vec<CrewMember>),
}

#[derive(Debug, Clone)]
pub struct TeamCombatResult {
    pub winners: Vec<CrewMember>,
    pub casualties: Vec<CombatantResult>,
    pub remaining_defenders: u32,
}

/// Outcome of a whole bank attack.
#[derive(Debug, Clone)]
pub struct HeistResult {
    pub winners: Vec<CrewMember>,
    /// Ambushers left standing when the vault was never opened. They walk
    /// away alive but with nothing to take.
    pub empty_survivors: Vec<CrewMember>,
    pub casualties: Vec<CombatantResult>,
    pub remaining_defenders: u32,
}

impl HeistResult {
    pub fn guards_defeated(&self) -> u32 {
        self.casualties
            .iter()
            .filter(|casualty| casualty.is_guard())
            .count() as u32
    }
}

/// Chance that `attacker` beats `defender`; `None` means a bank guard.
/// Equal footing is a coin flip; a gun tilts the odds against an unarmed
/// opponent or a guard, and two guns cancel out.
pub fn win_probability(
    config: &GameConfig,
    attacker: &CrewMember,
    defender: Option<&CrewMember>,
) -> f64 {
    let attacker_armed = attacker.has_perk(PerkType::Gun);
    match defender {
        None => {
            if attacker_armed {
                config.gun_win_chance
            } else {
                0.5
            }
        }
        Some(defender) => {
            let defender_armed = defender.has_perk(PerkType::Gun);
            if attacker_armed && !defender_armed {
                config.gun_win_chance
            } else if !attacker_armed && defender_armed {
                1.0 - config.gun_win_chance
            } else {
                0.5
            }
        }
    }
}

/// Rolls a single duel; true when the attacker wins.
pub fn fight_1v1<D: Dice>(
    config: &GameConfig,
    dice: &mut D,
    attacker: &CrewMember,
    defender: Option<&CrewMember>,
) -> bool {
    let probability = win_probability(config, attacker, defender);
    dice.chance(probability)
}

/// Losing to a rival member is always fatal. Losing to a guard kills with
/// `guard_death_chance`, otherwise it is an arrest; armed losers draw the
/// longer term and a jailed member's planned action is wiped.
fn process_casualty<D: Dice>(
    config: &GameConfig,
    dice: &mut D,
    mut member: CrewMember,
    guard_fight: bool,
) -> CombatantResult {
    let died = !guard_fight || dice.chance(config.guard_death_chance);
    let jailed = guard_fight && !died;
    let jail_term = if jailed {
        if member.has_perk(PerkType::Gun) {
            config.jail_term_armed
        } else {
            config.jail_term_unarmed
        }
    } else {
        0
    };
    if jailed {
        member.action = Action::None;
        member.planned_action = None;
    }
    CombatantResult::Crew {
        member,
        died,
        jailed,
        jail_term,
        guard_fight,
    }
}

/// One attacker fights guard after guard until the guards run out or the
/// attacker falls. Returns the attacker if they are still standing.
fn guard_gauntlet<D: Dice>(
    config: &GameConfig,
    dice: &mut D,
    attacker: CrewMember,
    remaining: &mut u32,
    casualties: &mut Vec<CombatantResult>,
) -> Option<CrewMember> {
    while *remaining > 0 {
        if fight_1v1(config, dice, &attacker, None) {
            *remaining -= 1;
            casualties.push(CombatantResult::Guard);
        } else {
            casualties.push(process_casualty(config, dice, attacker, true));
            return None;
        }
    }
    Some(attacker)
}

/// One attacker works through the defender line. A beaten defender dies and
/// the attacker keeps going; if the attacker falls, the current defender
/// returns to the front of the line for the next attacker.
fn crew_gauntlet<D: Dice>(
    config: &GameConfig,
    dice: &mut D,
    attacker: CrewMember,
    defenders: &mut VecDeque<CrewMember>,
    casualties: &mut Vec<CombatantResult>,
) -> Option<CrewMember> {
    while let Some(defender) = defenders.pop_front() {
        if fight_1v1(config, dice, &attacker, Some(&defender)) {
            casualties.push(process_casualty(config, dice, defender, false));
        } else {
            defenders.push_front(defender);
            casualties.push(process_casualty(config, dice, attacker, false));
            return None;
        }
    }
    Some(attacker)
}

/// Sequential team fight. Attackers step up one at a time; against crew
/// defenders, anyone left standing on the defending side is appended to the
/// winners since they keep the field.
pub fn team_combat<D: Dice>(
    config: &GameConfig,
    dice: &mut D,
    attackers: Vec<CrewMember>,
    defenders: Defenders,
) -> TeamCombatResult {
    let mut attackers: VecDeque<CrewMember> = attackers.into();
    let mut winners = Vec::new();
    let mut casualties = Vec::new();

    match defenders {
        Defenders::Guards(count) => {
            let mut remaining = count;
            while let Some(attacker) = attackers.pop_front() {
                if remaining == 0 {
                    winners.push(attacker);
                    continue;
                }
                if let Some(survivor) =
                    guard_gauntlet(config, dice, attacker, &mut remaining, &mut casualties)
                {
                    winners.push(survivor);
                }
            }
            TeamCombatResult {
                winners,
                casualties,
                remaining_defenders: remaining,
            }
        }
        Defenders::Crew(crew) => {
            let mut line: VecDeque<CrewMember> = crew.into();
            while let Some(attacker) = attackers.pop_front() {
                if line.is_empty() {
                    winners.push(attacker);
                    continue;
                }
                if let Some(survivor) =
                    crew_gauntlet(config, dice, attacker, &mut line, &mut casualties)
                {
                    winners.push(survivor);
                }
            }
            let remaining_defenders = line.len() as u32;
            winners.extend(line);
            TeamCombatResult {
                winners,
                casualties,
                remaining_defenders,
            }
        }
    }
}

/// Single-elimination bracket over hostile contingents. Crews pair off in
/// order; an odd crew out advances on a bye. Returns the last contingent
/// standing, which may be empty when a final bout wipes both sides.
fn hostile_tournament<D: Dice>(
    config: &GameConfig,
    dice: &mut D,
    crews: Vec<Vec<CrewMember>>,
    casualties: &mut Vec<CombatantResult>,
) -> Vec<CrewMember> {
    let mut contenders: Vec<Vec<CrewMember>> = crews
        .into_iter()
        .filter(|crew| !crew.is_empty())
        .collect();

    while contenders.len() > 1 {
        let mut next_round = Vec::new();
        while contenders.len() >= 2 {
            let challengers = contenders.remove(0);
            let opponents = contenders.remove(0);
            let bout = team_combat(config, dice, challengers, Defenders::Crew(opponents));
            casualties.extend(bout.casualties);
            if !bout.winners.is_empty() {
                next_round.push(bout.winners);
            }
        }
        next_round.extend(contenders.drain(..));
        contenders = next_round;
    }

    contenders.pop().unwrap_or_default()
}

/// Resolves one bank's attacks for the turn.
///
/// Hostile crews settle their bracket before anyone touches the bank, so
/// their losses land even when the heist itself collapses. The cooperative
/// coalition is shuffled into one anonymous team before the guard fight.
/// When the coalition never clears the guards, surviving ambushers are
/// reported as `empty_survivors` rather than winners.
pub fn multi_crew_combat<D: Dice>(
    config: &GameConfig,
    dice: &mut D,
    coop_crews: Vec<Vec<CrewMember>>,
    hostile_crews: Vec<Vec<CrewMember>>,
    guards: u32,
) -> HeistResult {
    let mut casualties = Vec::new();

    let ambushers = hostile_tournament(config, dice, hostile_crews, &mut casualties);

    let mut coalition: Vec<CrewMember> = coop_crews.into_iter().flatten().collect();
    dice.shuffle(&mut coalition);

    if coalition.is_empty() {
        // Nobody went for the vault; the bracket winner has nothing to take.
        return HeistResult {
            winners: Vec::new(),
            empty_survivors: ambushers,
            casualties,
            remaining_defenders: guards,
        };
    }

    let guard_fight = team_combat(config, dice, coalition, Defenders::Guards(guards));
    casualties.extend(guard_fight.casualties);

    if guard_fight.remaining_defenders > 0 {
        return HeistResult {
            winners: Vec::new(),
            empty_survivors: ambushers,
            casualties,
            remaining_defenders: guard_fight.remaining_defenders,
        };
    }

    if ambushers.is_empty() {
        return HeistResult {
            winners: guard_fight.winners,
            empty_survivors: Vec::new(),
            casualties,
            remaining_defenders: 0,
        };
    }

    let showdown = team_combat(
        config,
        dice,
        ambushers,
        Defenders::Crew(guard_fight.winners),
    );
    casualties.extend(showdown.casualties);

    HeistResult {
        winners: showdown.winners,
        empty_survivors: Vec::new(),
        casualties,
        remaining_defenders: 0,
    }
}

#[cfg(test)]
mod tests {
    use contracts::{CrewMemberStatus, Perk, PlannedAction};

    use super::*;
    use crate::util::testkit::{ConstDice, ScriptDice};

    fn member(id: &str, armed: bool) -> CrewMember {
        let mut perks = Vec::new();
        if armed {
            perks.push(Perk::catalog(PerkType::Gun));
        }
        CrewMember {
            id: id.to_string(),
            name: format!("Member {id}"),
            perks,
            action: Action::Attack,
            status: CrewMemberStatus::Healthy,
            planned_action: Some(PlannedAction::Work),
            jail_term: None,
        }
    }

    fn ids(members: &[CrewMember]) -> Vec<&str> {
        members.iter().map(|m| m.id.as_str()).collect()
    }

    fn config() -> GameConfig {
        GameConfig::default()
    }

    #[test]
    fn gun_tilts_the_odds() {
        let cfg = config();
        let armed = member("a", true);
        let unarmed = member("u", false);
        assert_eq!(win_probability(&cfg, &armed, None), 0.7);
        assert_eq!(win_probability(&cfg, &unarmed, None), 0.5);
        assert_eq!(win_probability(&cfg, &armed, Some(&unarmed)), 0.7);
        assert_eq!(win_probability(&cfg, &unarmed, Some(&armed)), 0.3);
        assert_eq!(win_probability(&cfg, &armed, Some(&armed)), 0.5);
        assert_eq!(win_probability(&cfg, &unarmed, Some(&unarmed)), 0.5);
    }

    #[test]
    fn crew_loser_always_dies() {
        let cfg = config();
        // Roll high so the guard-death branch would spare them if taken.
        let mut dice = ConstDice(0.99);
        let result = process_casualty(&cfg, &mut dice, member("x", false), false);
        match result {
            CombatantResult::Crew { died, jailed, .. } => {
                assert!(died);
                assert!(!jailed);
            }
            CombatantResult::Guard => panic!("expected a crew casualty"),
        }
    }

    #[test]
    fn surviving_a_guard_loss_means_jail_and_a_cleared_plan() {
        let cfg = config();
        let mut dice = ConstDice(0.99);
        let armed = process_casualty(&cfg, &mut dice, member("a", true), true);
        match armed {
            CombatantResult::Crew {
                member,
                died,
                jailed,
                jail_term,
                guard_fight,
            } => {
                assert!(!died);
                assert!(jailed);
                assert!(guard_fight);
                assert_eq!(jail_term, 5);
                assert_eq!(member.action, Action::None);
                assert!(member.planned_action.is_none());
            }
            CombatantResult::Guard => panic!("expected a crew casualty"),
        }

        let mut dice = ConstDice(0.99);
        let unarmed = process_casualty(&cfg, &mut dice, member("u", false), true);
        match unarmed {
            CombatantResult::Crew { jail_term, .. } => assert_eq!(jail_term, 3),
            CombatantResult::Guard => panic!("expected a crew casualty"),
        }
    }

    #[test]
    fn lone_attacker_clears_every_guard() {
        let cfg = config();
        let mut dice = ConstDice(0.0);
        let result = team_combat(&cfg, &mut dice, vec![member("a", false)], Defenders::Guards(4));
        assert_eq!(ids(&result.winners), ["a"]);
        assert_eq!(result.remaining_defenders, 0);
        assert_eq!(result.casualties.len(), 4);
        assert!(result.casualties.iter().all(CombatantResult::is_guard));
    }

    #[test]
    fn later_attackers_skip_a_finished_guard_fight() {
        let cfg = config();
        let mut dice = ConstDice(0.0);
        let attackers = vec![member("a", false), member("b", false)];
        let result = team_combat(&cfg, &mut dice, attackers, Defenders::Guards(2));
        // First attacker downs both guards; the second never fights.
        assert_eq!(ids(&result.winners), ["a", "b"]);
        assert_eq!(result.casualties.len(), 2);
    }

    #[test]
    fn guards_hold_when_every_attacker_falls() {
        let cfg = config();
        // Every combat roll loses; every death roll survives into jail.
        let mut dice = ConstDice(0.99);
        let attackers = vec![member("a", false), member("b", true)];
        let result = team_combat(&cfg, &mut dice, attackers, Defenders::Guards(3));
        assert!(result.winners.is_empty());
        assert_eq!(result.remaining_defenders, 3);
        assert_eq!(result.casualties.len(), 2);
        for casualty in &result.casualties {
            match casualty {
                CombatantResult::Crew { jailed, .. } => assert!(jailed),
                CombatantResult::Guard => panic!("no guard should fall"),
            }
        }
    }

    #[test]
    fn crew_defenders_who_hold_the_field_are_winners() {
        let cfg = config();
        // Attacker loses the first duel outright.
        let mut dice = ConstDice(0.99);
        let attackers = vec![member("a", false)];
        let defenders = vec![member("d1", false), member("d2", false)];
        let result = team_combat(&cfg, &mut dice, attackers, Defenders::Crew(defenders));
        assert_eq!(ids(&result.winners), ["d1", "d2"]);
        assert_eq!(result.remaining_defenders, 2);
        match &result.casualties[..] {
            [CombatantResult::Crew { member, died, .. }] => {
                assert_eq!(member.id, "a");
                assert!(died);
            }
            other => panic!("unexpected casualties: {other:?}"),
        }
    }

    #[test]
    fn attacker_runs_the_whole_defender_line() {
        let cfg = config();
        let mut dice = ConstDice(0.0);
        let attackers = vec![member("a", false)];
        let defenders = vec![member("d1", false), member("d2", false)];
        let result = team_combat(&cfg, &mut dice, attackers, Defenders::Crew(defenders));
        assert_eq!(ids(&result.winners), ["a"]);
        assert_eq!(result.remaining_defenders, 0);
        assert_eq!(result.casualties.len(), 2);
    }

    #[test]
    fn heist_without_rivals_is_just_the_guard_fight() {
        let cfg = config();
        let mut dice = ConstDice(0.0);
        let coop = vec![vec![member("a", false), member("b", false)]];
        let result = multi_crew_combat(&cfg, &mut dice, coop, Vec::new(), 3);
        assert_eq!(result.winners.len(), 2);
        assert!(result.empty_survivors.is_empty());
        assert_eq!(result.remaining_defenders, 0);
        assert_eq!(result.guards_defeated(), 3);
    }

    #[test]
    fn bracket_runs_even_when_the_heist_collapses() {
        let cfg = config();
        // Bracket duel first (h1 beats h2), then the lone robber loses to the
        // first guard and dies on the death roll.
        let mut dice = ScriptDice::new(&[0.0, 0.99, 0.0], 0.0);
        let coop = vec![vec![member("r", false)]];
        let hostile = vec![vec![member("h1", false)], vec![member("h2", false)]];
        let result = multi_crew_combat(&cfg, &mut dice, coop, hostile, 2);
        assert!(result.winners.is_empty());
        assert_eq!(ids(&result.empty_survivors), ["h1"]);
        assert_eq!(result.remaining_defenders, 2);
        // h2 fell in the bracket, r fell to the guards.
        let crew_losses: Vec<_> = result
            .casualties
            .iter()
            .filter_map(|c| match c {
                CombatantResult::Crew { member, .. } => Some(member.id.as_str()),
                CombatantResult::Guard => None,
            })
            .collect();
        assert_eq!(crew_losses, ["h2", "r"]);
    }

    #[test]
    fn bracket_winner_ambushes_the_heist_survivors() {
        let cfg = config();
        // Every attacker roll wins: h1 beats h2 in the bracket, r clears the
        // guard, then h1 cuts down r in the showdown.
        let mut dice = ConstDice(0.0);
        let coop = vec![vec![member("r", false)]];
        let hostile = vec![vec![member("h1", false)], vec![member("h2", false)]];
        let result = multi_crew_combat(&cfg, &mut dice, coop, hostile, 1);
        assert_eq!(ids(&result.winners), ["h1"]);
        assert!(result.empty_survivors.is_empty());
        assert_eq!(result.guards_defeated(), 1);
        let crew_losses: Vec<_> = result
            .casualties
            .iter()
            .filter_map(|c| match c {
                CombatantResult::Crew { member, died, .. } => {
                    assert!(died);
                    Some(member.id.as_str())
                }
                CombatantResult::Guard => None,
            })
            .collect();
        assert_eq!(crew_losses, ["h2", "r"]);
    }

    #[test]
    fn odd_bracket_gives_the_last_crew_a_bye() {
        let cfg = config();
        // Attackers always win their duels, so bout one goes to h1 and the
        // final goes to h1 over the bye crew h3.
        let mut dice = ConstDice(0.0);
        let hostile = vec![
            vec![member("h1", false)],
            vec![member("h2", false)],
            vec![member("h3", false)],
        ];
        let mut casualties = Vec::new();
        let winner = hostile_tournament(&cfg, &mut dice, hostile, &mut casualties);
        assert_eq!(ids(&winner), ["h1"]);
        assert_eq!(casualties.len(), 2);
    }

    #[test]
    fn hostiles_alone_leave_with_nothing() {
        let cfg = config();
        let mut dice = ConstDice(0.0);
        let hostile = vec![vec![member("h1", false)], vec![member("h2", false)]];
        let result = multi_crew_combat(&cfg, &mut dice, Vec::new(), hostile, 5);
        assert!(result.winners.is_empty());
        assert_eq!(ids(&result.empty_survivors), ["h1"]);
        assert_eq!(result.remaining_defenders, 5);
        assert_eq!(result.guards_defeated(), 0);
    }
}
