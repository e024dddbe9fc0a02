//! Match state machine: coin toss, rally sequencing, scoring and finish

use std::collections::HashMap;
use std::sync::Arc;

use log::{info, trace};
use serde::{Deserialize, Serialize};

use crate::catalog::{lookup, Attack, Block, ChoiceSlot, Defense};
use crate::error::{RallyError, Result};
use crate::player::{Player, Role};
use crate::rally::{resolve_rally, RallyResult};
use crate::random::SeededRng;
use crate::table::OutcomeTable;

/// Scoring and jitter parameters for a match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub points_to_win: u32,
    /// Required lead once a player reaches `points_to_win`
    pub win_margin: u32,
    pub jitter_low: f64,
    pub jitter_high: f64,
}

impl MatchConfig {
    /// Game to 21, win by 2, +/-5% jitter
    pub fn standard() -> Self {
        Self { points_to_win: 21, win_margin: 2, jitter_low: 0.95, jitter_high: 1.05 }
    }

    pub fn validate(&self) -> Result<()> {
        if self.points_to_win == 0 {
            return Err(RallyError::InvalidConfig("points_to_win must be positive".into()));
        }
        if self.win_margin == 0 {
            return Err(RallyError::InvalidConfig("win_margin must be positive".into()));
        }
        if !(self.jitter_low > 0.0 && self.jitter_low <= self.jitter_high) {
            return Err(RallyError::InvalidConfig(format!(
                "jitter range [{}, {}] must be positive and ordered",
                self.jitter_low, self.jitter_high
            )));
        }
        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchState {
    AwaitingCoinToss,
    InProgress,
    Finished,
}

impl MatchState {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchState::AwaitingCoinToss => "awaiting-coin-toss",
            MatchState::InProgress => "in-progress",
            MatchState::Finished => "finished",
        }
    }
}

/// Finished once either player reaches the target with the required lead
pub fn game_finished(points: [u32; 2], config: &MatchConfig) -> bool {
    if points[0] < config.points_to_win && points[1] < config.points_to_win {
        return false;
    }
    points[0].abs_diff(points[1]) >= config.win_margin
}

/// A game between two named players
#[derive(Clone, Debug)]
pub struct Match {
    table: Arc<OutcomeTable>,
    config: MatchConfig,
    rng: SeededRng,
    players: [Player; 2],
    score: [u32; 2],
    /// Index of the serving player; meaningless before the coin toss
    defender: usize,
    state: MatchState,
    rally_count: u32,
}

impl Match {
    /// New standard match. Names must differ.
    pub fn new(name1: &str, name2: &str, table: Arc<OutcomeTable>, seed: &[u8; 32]) -> Result<Self> {
        Self::with_config(name1, name2, table, MatchConfig::standard(), seed, 0)
    }

    pub fn with_config(
        name1: &str,
        name2: &str,
        table: Arc<OutcomeTable>,
        config: MatchConfig,
        seed: &[u8; 32],
        match_index: u32,
    ) -> Result<Self> {
        if name1 == name2 {
            return Err(RallyError::DuplicateName(name1.to_string()));
        }
        config.validate()?;

        Ok(Self {
            table,
            config,
            rng: SeededRng::new(seed, match_index),
            players: [Player::new(name1), Player::new(name2)],
            score: [0, 0],
            defender: 0,
            state: MatchState::AwaitingCoinToss,
            rally_count: 0,
        })
    }

    fn require(&self, expected: MatchState) -> Result<()> {
        if self.state != expected {
            return Err(RallyError::InvalidState {
                expected: expected.as_str(),
                actual: self.state.as_str(),
            });
        }
        Ok(())
    }

    /// Pick the first server at random. Returns (defender, attacker) names.
    pub fn coin_toss(&mut self) -> Result<(String, String)> {
        self.require(MatchState::AwaitingCoinToss)?;
        self.defender = self.rng.next_range(2) as usize;
        self.state = MatchState::InProgress;

        let defender = self.players[self.defender].name().to_string();
        let attacker = self.players[1 - self.defender].name().to_string();
        info!("coin toss: {} serves, {} attacks", defender, attacker);
        Ok((defender, attacker))
    }

    /// Record one choice for the current rally.
    ///
    /// `attack` goes to the attacker, the other slots to the defender.
    /// Returns the rally result when `defense2` completes the set and
    /// `None` otherwise. A rejected submission leaves the match unchanged.
    pub fn submit_choice(&mut self, slot: ChoiceSlot, index: usize) -> Result<Option<RallyResult>> {
        self.require(MatchState::InProgress)?;
        let attacker = 1 - self.defender;
        let defender = self.defender;

        match slot {
            ChoiceSlot::Attack => {
                let attack = lookup::<Attack>(slot, index)?;
                self.players[attacker].set_attack(attack);
            }
            ChoiceSlot::Block => {
                let block = lookup::<Block>(slot, index)?;
                self.players[defender].set_block(block);
            }
            ChoiceSlot::Defense1 => {
                let defense = lookup::<Defense>(slot, index)?;
                self.players[defender].set_defense1(defense);
            }
            ChoiceSlot::Defense2 => {
                let defense = lookup::<Defense>(slot, index)?;
                if let Some(&missing) = self.pending_slots().first().filter(|s| **s != slot) {
                    return Err(RallyError::InvalidChoice(missing));
                }
                self.players[defender].set_defense2(defense);
                return self.play_rally().map(Some);
            }
        }

        let owner = if slot.is_defender_slot() { defender } else { attacker };
        trace!("{} chose {} = {}", self.players[owner].name(), slot, index);
        Ok(None)
    }

    fn play_rally(&mut self) -> Result<RallyResult> {
        let attacker = 1 - self.defender;
        let mut rng = self.rng.for_rally(self.rally_count);
        let result = resolve_rally(
            &self.table,
            &self.players[attacker],
            &self.players[self.defender],
            &self.config,
            &mut rng,
        )?;

        // Winner serves the next rally
        let winner = match result.winner_role {
            Role::Defender => self.defender,
            Role::Attacker => attacker,
        };
        self.score[winner] += 1;
        self.defender = winner;
        self.rally_count += 1;
        for player in self.players.iter_mut() {
            player.clear_choices();
        }

        if game_finished(self.score, &self.config) {
            self.state = MatchState::Finished;
            info!(
                "match finished after {} rallies: {} {} - {} {}",
                self.rally_count,
                self.players[0].name(),
                self.score[0],
                self.score[1],
                self.players[1].name()
            );
        }
        Ok(result)
    }

    /// Choices still missing for the current rally, in submission order
    pub fn pending_slots(&self) -> Vec<ChoiceSlot> {
        if self.state != MatchState::InProgress {
            return Vec::new();
        }
        ChoiceSlot::ALL
            .iter()
            .copied()
            .filter(|slot| {
                let owner = if slot.is_defender_slot() { self.defender } else { 1 - self.defender };
                !self.players[owner].has_choice(*slot)
            })
            .collect()
    }

    pub fn is_finished(&self) -> bool {
        self.state == MatchState::Finished
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Points per player name
    pub fn current_score(&self) -> HashMap<String, u32> {
        self.players
            .iter()
            .zip(self.score.iter())
            .map(|(p, s)| (p.name().to_string(), *s))
            .collect()
    }

    /// Points in player creation order
    pub fn score(&self) -> [u32; 2] {
        self.score
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    pub fn rally_count(&self) -> u32 {
        self.rally_count
    }

    /// Current attacker, once the coin has been tossed
    pub fn attacker(&self) -> Option<&Player> {
        match self.state {
            MatchState::AwaitingCoinToss => None,
            _ => Some(&self.players[1 - self.defender]),
        }
    }

    /// Current defender (server), once the coin has been tossed
    pub fn defender(&self) -> Option<&Player> {
        match self.state {
            MatchState::AwaitingCoinToss => None,
            _ => Some(&self.players[self.defender]),
        }
    }

    /// Name of the higher-scoring player once the match is over
    pub fn winner(&self) -> Option<&str> {
        if !self.is_finished() {
            return None;
        }
        let idx = if self.score[0] > self.score[1] { 0 } else { 1 };
        Some(self.players[idx].name())
    }
}

/// Result of a complete simulated match
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchSummary {
    pub players: [String; 2],
    pub final_score: [u32; 2],
    pub winner: String,
    pub first_server: String,
    pub rallies: Vec<RallyResult>,
}

/// Play a full match with uniformly random choices on both sides.
///
/// Deterministic for a given seed and match index.
pub fn simulate_match(
    table: Arc<OutcomeTable>,
    config: MatchConfig,
    names: (&str, &str),
    seed: &[u8; 32],
    match_index: u32,
) -> Result<MatchSummary> {
    let mut game = Match::with_config(names.0, names.1, table, config, seed, match_index)?;
    let mut chooser = SeededRng::new(seed, match_index).for_rally(u32::MAX);
    let (first_server, _) = game.coin_toss()?;
    let mut rallies = Vec::new();

    while !game.is_finished() {
        for slot in ChoiceSlot::ALL {
            let index = chooser.next_range(slot.catalog_len() as u32) as usize;
            if let Some(result) = game.submit_choice(slot, index)? {
                rallies.push(result);
            }
        }
    }

    let winner = game.winner().unwrap_or_default().to_string();
    Ok(MatchSummary {
        players: [names.0.to_string(), names.1.to_string()],
        final_score: game.score(),
        winner,
        first_server,
        rallies,
    })
}

/// Catalog bounds check for choices arriving from untyped input
pub fn is_valid_index(slot: ChoiceSlot, index: usize) -> bool {
    index < slot.catalog_len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::build_outcome_table;
    use proptest::prelude::*;

    fn new_match(seed: u8) -> Match {
        Match::new("Ana", "Ben", Arc::new(build_outcome_table()), &[seed; 32]).unwrap()
    }

    fn play_one(game: &mut Match, choices: [usize; 4]) -> RallyResult {
        assert!(game.submit_choice(ChoiceSlot::Attack, choices[0]).unwrap().is_none());
        assert!(game.submit_choice(ChoiceSlot::Block, choices[1]).unwrap().is_none());
        assert!(game.submit_choice(ChoiceSlot::Defense1, choices[2]).unwrap().is_none());
        game.submit_choice(ChoiceSlot::Defense2, choices[3]).unwrap().unwrap()
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = Match::new("Ana", "Ana", Arc::new(build_outcome_table()), &[0u8; 32]).unwrap_err();
        assert_eq!(err, RallyError::DuplicateName("Ana".to_string()));
    }

    #[test]
    fn test_termination_cases() {
        let config = MatchConfig::standard();
        assert!(!game_finished([0, 0], &config));
        assert!(!game_finished([20, 19], &config));
        assert!(!game_finished([20, 18], &config));
        assert!(!game_finished([21, 20], &config));
        assert!(game_finished([21, 19], &config));
        assert!(game_finished([19, 21], &config));
        assert!(!game_finished([21, 21], &config));
        assert!(!game_finished([22, 21], &config));
        assert!(game_finished([23, 21], &config));
        assert!(game_finished([25, 23], &config));
        assert!(game_finished([21, 0], &config));
    }

    #[test]
    fn test_config_validation() {
        assert!(MatchConfig::standard().validate().is_ok());
        let mut config = MatchConfig::standard();
        config.points_to_win = 0;
        assert!(matches!(config.validate(), Err(RallyError::InvalidConfig(_))));

        let config = MatchConfig { jitter_low: 1.1, jitter_high: 0.9, ..MatchConfig::standard() };
        assert!(config.validate().is_err());

        let table = Arc::new(build_outcome_table());
        let config = MatchConfig { win_margin: 0, ..MatchConfig::standard() };
        assert!(Match::with_config("Ana", "Ben", table, config, &[0u8; 32], 0).is_err());
    }

    #[test]
    fn test_config_json() {
        let config: MatchConfig = serde_json::from_str(
            r#"{"points_to_win": 11, "win_margin": 2, "jitter_low": 1.0, "jitter_high": 1.0}"#,
        )
        .unwrap();
        assert_eq!(config.points_to_win, 11);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_must_toss_before_submitting() {
        let mut game = new_match(1);
        assert_eq!(game.state(), MatchState::AwaitingCoinToss);
        assert!(game.attacker().is_none());
        let err = game.submit_choice(ChoiceSlot::Attack, 0).unwrap_err();
        assert!(matches!(err, RallyError::InvalidState { .. }));

        let (defender, attacker) = game.coin_toss().unwrap();
        assert_ne!(defender, attacker);
        assert_eq!(game.defender().map(|p| p.name()), Some(defender.as_str()));
        assert_eq!(game.attacker().map(|p| p.name()), Some(attacker.as_str()));
        assert!(game.coin_toss().is_err());
    }

    #[test]
    fn test_coin_toss_picks_both_players() {
        let mut servers = std::collections::HashSet::new();
        for seed in 0..32u8 {
            let mut game = new_match(seed);
            servers.insert(game.coin_toss().unwrap().0);
        }
        assert_eq!(servers.len(), 2);
    }

    #[test]
    fn test_incremental_submission() {
        let mut game = new_match(2);
        game.coin_toss().unwrap();
        assert_eq!(game.pending_slots(), ChoiceSlot::ALL.to_vec());

        assert!(game.submit_choice(ChoiceSlot::Attack, 1).unwrap().is_none());
        assert!(game.submit_choice(ChoiceSlot::Block, 0).unwrap().is_none());
        assert!(game.submit_choice(ChoiceSlot::Defense1, 3).unwrap().is_none());
        assert_eq!(game.pending_slots(), vec![ChoiceSlot::Defense2]);
        assert_eq!(game.score(), [0, 0]);

        let result = game.submit_choice(ChoiceSlot::Defense2, 1).unwrap().unwrap();
        assert_eq!(result.attack, Attack::DiaHit);
        assert_eq!(result.block, Block::Dia);
        assert_eq!(game.score().iter().sum::<u32>(), 1);
        assert_eq!(game.rally_count(), 1);
        assert_eq!(game.pending_slots().len(), 4);
    }

    #[test]
    fn test_invalid_index_leaves_state_untouched() {
        let mut game = new_match(3);
        game.coin_toss().unwrap();
        let err = game.submit_choice(ChoiceSlot::Block, 2).unwrap_err();
        assert_eq!(
            err,
            RallyError::InvalidActionIndex { slot: ChoiceSlot::Block, index: 2, len: 2 }
        );
        assert!(game.submit_choice(ChoiceSlot::Attack, 6).is_err());
        assert_eq!(game.pending_slots(), ChoiceSlot::ALL.to_vec());
        assert!(!is_valid_index(ChoiceSlot::Defense1, 6));
        assert!(is_valid_index(ChoiceSlot::Defense2, 5));
    }

    #[test]
    fn test_early_defense2_is_rejected() {
        let mut game = new_match(4);
        game.coin_toss().unwrap();
        game.submit_choice(ChoiceSlot::Attack, 0).unwrap();
        let err = game.submit_choice(ChoiceSlot::Defense2, 0).unwrap_err();
        assert_eq!(err, RallyError::InvalidChoice(ChoiceSlot::Block));
        assert_eq!(
            game.pending_slots(),
            vec![ChoiceSlot::Block, ChoiceSlot::Defense1, ChoiceSlot::Defense2]
        );
        assert_eq!(game.rally_count(), 0);
    }

    #[test]
    fn test_winner_serves_next() {
        let mut game = new_match(5);
        game.coin_toss().unwrap();
        for _ in 0..30 {
            if game.is_finished() {
                break;
            }
            let result = play_one(&mut game, [0, 1, 2, 3]);
            assert_eq!(game.defender().unwrap().name(), result.winner);
            assert_eq!(game.attacker().unwrap().name(), result.loser);
        }
    }

    #[test]
    fn test_match_runs_to_completion() {
        let mut game = new_match(6);
        game.coin_toss().unwrap();
        while !game.is_finished() {
            play_one(&mut game, [3, 1, 3, 4]);
        }
        let [a, b] = game.score();
        assert!(a.max(b) >= 21);
        assert!(a.abs_diff(b) >= 2);
        let winner = game.winner().unwrap();
        assert_eq!(game.current_score()[winner], a.max(b));

        let err = game.submit_choice(ChoiceSlot::Attack, 0).unwrap_err();
        assert!(matches!(err, RallyError::InvalidState { .. }));
        assert!(game.pending_slots().is_empty());
    }

    #[test]
    fn test_simulation_is_deterministic() {
        let table = Arc::new(build_outcome_table());
        let seed = [42u8; 32];
        let a = simulate_match(table.clone(), MatchConfig::standard(), ("Ana", "Ben"), &seed, 0).unwrap();
        let b = simulate_match(table.clone(), MatchConfig::standard(), ("Ana", "Ben"), &seed, 0).unwrap();
        assert_eq!(a.final_score, b.final_score);
        assert_eq!(a.rallies, b.rallies);

        let c = simulate_match(table, MatchConfig::standard(), ("Ana", "Ben"), &seed, 1).unwrap();
        assert_ne!(a.rallies, c.rallies);
    }

    #[test]
    fn test_many_matches_share_one_table() {
        let table = Arc::new(build_outcome_table());
        for i in 0..50 {
            let summary =
                simulate_match(table.clone(), MatchConfig::standard(), ("Ana", "Ben"), &[7u8; 32], i)
                    .unwrap();
            let [a, b] = summary.final_score;
            assert!(game_finished(summary.final_score, &MatchConfig::standard()));
            assert_eq!(summary.rallies.len() as u32, a + b);
            let top = if a > b { "Ana" } else { "Ben" };
            assert_eq!(summary.winner, top);
        }
    }

    #[test]
    fn test_short_config() {
        let table = Arc::new(build_outcome_table());
        let config = MatchConfig { points_to_win: 5, ..MatchConfig::standard() };
        let summary = simulate_match(table, config, ("Ana", "Ben"), &[1u8; 32], 0).unwrap();
        let [a, b] = summary.final_score;
        assert!(a.max(b) >= 5 && a.abs_diff(b) >= 2);
    }

    proptest! {
        #[test]
        fn prop_rally_invariants(
            seed in any::<u8>(),
            picks in proptest::collection::vec((0usize..6, 0usize..2, 0usize..6, 0usize..6), 1..40),
        ) {
            let mut game = new_match(seed);
            game.coin_toss().unwrap();
            for (attack, block, d1, d2) in picks {
                if game.is_finished() {
                    break;
                }
                let before = game.current_score();
                let result = play_one(&mut game, [attack, block, d1, d2]);
                let after = game.current_score();

                prop_assert_eq!(game.defender().unwrap().name(), result.winner.as_str());
                prop_assert_eq!(game.attacker().unwrap().name(), result.loser.as_str());
                prop_assert_eq!(after[&result.winner], before[&result.winner] + 1);
                prop_assert_eq!(after[&result.loser], before[&result.loser]);
            }
        }

        #[test]
        fn prop_finish_rule(a in 0u32..40, b in 0u32..40) {
            let finished = game_finished([a, b], &MatchConfig::standard());
            prop_assert_eq!(finished, (a >= 21 || b >= 21) && a.abs_diff(b) >= 2);
        }
    }
}
