//! Scoring.
//!
//! Scores accumulate across rounds. Damage scores are credited as the
//! damage lands; kill bonuses are a percentage of the total damage the
//! killer had dealt to that victim, so they need the per-victim damage
//! ledger kept here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::actor::ActorId;

/// Survival points credited to every contestant still alive each time a
/// contestant dies, teammates of the deceased included.
pub const SURVIVAL_SCORE: f64 = 50.0;

/// Last-survivor bonus per enemy contestant in the round.
pub const LAST_SURVIVOR_BONUS: f64 = 10.0;

/// Kill bonus fraction for a killing bullet or mine.
pub const PROJECTILE_KILL_BONUS: f64 = 0.20;

/// Kill bonus fraction for a killing ram.
pub const RAM_KILL_BONUS: f64 = 0.30;

/// One contestant's accumulated score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorScore {
    /// Survival points.
    pub survival: f64,
    /// Last-survivor bonuses.
    pub last_survivor_bonus: f64,
    /// Projectile damage dealt.
    pub projectile_damage: f64,
    /// Kill bonuses from projectiles.
    pub projectile_kill_bonus: f64,
    /// Ram damage score (1.2 per ram inflicted).
    pub ram_damage: f64,
    /// Kill bonuses from rams.
    pub ram_kill_bonus: f64,
    /// Rounds this contestant outlived everyone.
    pub firsts: u32,
    /// Rounds this contestant placed second.
    pub seconds: u32,
    /// Rounds this contestant placed third.
    pub thirds: u32,
    /// Per-victim damage ledger for kill bonuses. Cleared between rounds.
    #[serde(skip)]
    damage_by_victim: BTreeMap<ActorId, f64>,
}

impl ActorScore {
    /// Total score.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.survival
            + self.last_survivor_bonus
            + self.projectile_damage
            + self.projectile_kill_bonus
            + self.ram_damage
            + self.ram_kill_bonus
    }
}

/// Scoreboard for the whole battle, keyed by actor id.
#[derive(Debug, Default)]
pub struct ScoreBoard {
    scores: BTreeMap<ActorId, ActorScore>,
}

impl ScoreBoard {
    /// Creates an empty board with an entry for each contestant.
    #[must_use]
    pub fn new(contestants: impl IntoIterator<Item = ActorId>) -> Self {
        Self {
            scores: contestants
                .into_iter()
                .map(|id| (id, ActorScore::default()))
                .collect(),
        }
    }

    /// Read access to one contestant's score.
    #[must_use]
    pub fn score(&self, id: ActorId) -> Option<&ActorScore> {
        self.scores.get(&id)
    }

    /// Credits projectile damage from `attacker` to `victim`.
    pub fn projectile_damage(&mut self, attacker: ActorId, victim: ActorId, damage: f64) {
        if let Some(s) = self.scores.get_mut(&attacker) {
            s.projectile_damage += damage;
            *s.damage_by_victim.entry(victim).or_insert(0.0) += damage;
        }
    }

    /// Credits ram score from the at-fault side and records the damage
    /// toward a possible ram kill bonus.
    pub fn ram_damage(&mut self, attacker: ActorId, victim: ActorId, damage: f64, score: f64) {
        if let Some(s) = self.scores.get_mut(&attacker) {
            s.ram_damage += score;
            *s.damage_by_victim.entry(victim).or_insert(0.0) += damage;
        }
    }

    /// Credits the kill bonus for `victim`'s death to `killer`.
    pub fn kill(&mut self, killer: ActorId, victim: ActorId, by_ram: bool) {
        if let Some(s) = self.scores.get_mut(&killer) {
            let dealt = s.damage_by_victim.get(&victim).copied().unwrap_or(0.0);
            if by_ram {
                s.ram_kill_bonus += RAM_KILL_BONUS * dealt;
            } else {
                s.projectile_kill_bonus += PROJECTILE_KILL_BONUS * dealt;
            }
        }
    }

    /// Credits survival points to every still-alive contestant when one
    /// dies.
    pub fn survival(&mut self, alive: &[ActorId]) {
        for id in alive {
            if let Some(s) = self.scores.get_mut(id) {
                s.survival += SURVIVAL_SCORE;
            }
        }
    }

    /// Credits the last-survivor bonus for outliving `enemies` contestants.
    pub fn last_survivor(&mut self, winner: ActorId, enemies: u32) {
        if let Some(s) = self.scores.get_mut(&winner) {
            s.last_survivor_bonus += LAST_SURVIVOR_BONUS * f64::from(enemies);
            s.firsts += 1;
        }
    }

    /// Records a non-winning placement for the round.
    pub fn placement(&mut self, id: ActorId, place: u32) {
        if let Some(s) = self.scores.get_mut(&id) {
            match place {
                1 => s.firsts += 1,
                2 => s.seconds += 1,
                3 => s.thirds += 1,
                _ => {}
            }
        }
    }

    /// Clears per-round ledgers. Called between rounds; cumulative scores
    /// stay.
    pub fn end_round(&mut self) {
        for s in self.scores.values_mut() {
            s.damage_by_victim.clear();
        }
    }

    /// Final results, ranked by total score descending.
    #[must_use]
    pub fn results(&self, names: &BTreeMap<ActorId, String>) -> Vec<ActorResults> {
        let mut results: Vec<ActorResults> = self
            .scores
            .iter()
            .map(|(id, score)| ActorResults {
                id: *id,
                name: names.get(id).cloned().unwrap_or_default(),
                rank: 0,
                score: score.clone(),
                total: score.total(),
            })
            .collect();
        results.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        for (i, r) in results.iter_mut().enumerate() {
            r.rank = u32::try_from(i).unwrap_or(u32::MAX) + 1;
        }
        results
    }
}

/// One contestant's final standing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorResults {
    /// Actor id.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// 1-based rank by total score.
    pub rank: u32,
    /// Score breakdown.
    pub score: ActorScore,
    /// Total score.
    pub total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: u64) -> Vec<ActorId> {
        (0..n).map(ActorId).collect()
    }

    #[test]
    fn kill_bonus_scales_with_damage_dealt() {
        let mut board = ScoreBoard::new(ids(2));
        board.projectile_damage(ActorId(0), ActorId(1), 30.0);
        board.kill(ActorId(0), ActorId(1), false);
        let s = board.score(ActorId(0)).unwrap();
        assert!((s.projectile_kill_bonus - 6.0).abs() < 1e-12);
        assert!((s.total() - 36.0).abs() < 1e-12);
    }

    #[test]
    fn ram_kill_bonus_is_thirty_percent() {
        let mut board = ScoreBoard::new(ids(2));
        board.ram_damage(ActorId(0), ActorId(1), 0.6, 1.2);
        board.kill(ActorId(0), ActorId(1), true);
        let s = board.score(ActorId(0)).unwrap();
        assert!((s.ram_kill_bonus - 0.18).abs() < 1e-12);
    }

    #[test]
    fn survival_credits_the_living() {
        let mut board = ScoreBoard::new(ids(3));
        board.survival(&[ActorId(0), ActorId(2)]);
        assert_eq!(board.score(ActorId(0)).unwrap().survival, SURVIVAL_SCORE);
        assert_eq!(board.score(ActorId(1)).unwrap().survival, 0.0);
    }

    #[test]
    fn results_ranked_by_total() {
        let mut board = ScoreBoard::new(ids(2));
        board.projectile_damage(ActorId(1), ActorId(0), 10.0);
        let names = ids(2)
            .into_iter()
            .map(|id| (id, format!("bot{}", id.0)))
            .collect();
        let results = board.results(&names);
        assert_eq!(results[0].id, ActorId(1));
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].rank, 2);
    }

    #[test]
    fn ledger_resets_between_rounds() {
        let mut board = ScoreBoard::new(ids(2));
        board.projectile_damage(ActorId(0), ActorId(1), 30.0);
        board.end_round();
        board.kill(ActorId(0), ActorId(1), false);
        assert_eq!(board.score(ActorId(0)).unwrap().projectile_kill_bonus, 0.0);
    }
}
