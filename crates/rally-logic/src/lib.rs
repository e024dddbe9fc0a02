//! Rally logic for a two-player net-sport game
//!
//! Resolves attack/block/defense choices into points and runs a game to
//! 21, win by 2. This crate is compiled to:
//! - Native (for hosts and automated simulation)
//! - WASM (for the browser UI)

mod catalog;
mod error;
mod game;
mod player;
mod random;
mod rally;
mod table;

#[cfg(feature = "wasm")]
mod wasm;

pub use catalog::{action_catalog, Action, ActionCatalog, ActionInfo, Attack, Block, ChoiceSlot, Defense};
pub use error::{RallyError, Result};
pub use game::{game_finished, is_valid_index, simulate_match, Match, MatchConfig, MatchState, MatchSummary};
pub use player::{Player, RallyChoices, Role};
pub use random::SeededRng;
pub use rally::{assess_defense, decide, resolve_rally, Commentary, DefenseAssessment, RallyResult};
pub use table::{base_chance, build_outcome_table, ChanceTier, OutcomeTable, TableEntry, DEFENSE_SLOTS};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_public_flow() {
        let table = Arc::new(build_outcome_table());
        let mut game = Match::new("Ana", "Ben", table, &[11u8; 32]).unwrap();
        let (defender, attacker) = game.coin_toss().unwrap();

        let choices: [(&str, usize); 4] =
            [("attack", 3), ("block", 1), ("defense1", 3), ("defense2", 4)];
        let mut result = None;
        for (slot, index) in choices {
            result = game.submit_choice(slot.parse().unwrap(), index).unwrap();
        }
        let result = result.unwrap();

        assert!([defender.as_str(), attacker.as_str()].contains(&result.winner.as_str()));
        assert_eq!(result.defense_chance, 90);
        assert_eq!(result.decisive_defense, Defense::LineHit);
        assert_eq!(game.current_score()[&result.winner], 1);
        assert!(!game.is_finished());
    }

    #[test]
    fn test_rally_result_serializes() {
        let summary = simulate_match(
            Arc::new(build_outcome_table()),
            MatchConfig::standard(),
            ("Ana", "Ben"),
            &[8u8; 32],
            0,
        )
        .unwrap();
        let json = serde_json::to_value(&summary.rallies[0]).unwrap();
        assert!(json["comment"].is_string());
        assert!(json["defense_chance"].is_u64());
        assert_eq!(json["winner_role"] == "Defender", summary.rallies[0].winner_role == Role::Defender);
    }
}
