//! Outcome table: base defense chance for every action combination
//!
//! The table is a fixed 4-dimensional array indexed by
//! (attack, block, defense slot, defense). It is built once and only read
//! afterwards, so one instance can back any number of matches.

use serde::{Deserialize, Serialize};

use crate::catalog::{Action, Attack, Block, Defense};

/// Number of defense picks per rally
pub const DEFENSE_SLOTS: usize = 2;

const ATTACKS: usize = 6;
const BLOCKS: usize = 2;
const DEFENSES: usize = 6;

/// Base chance (percent) that the defense succeeds
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChanceTier {
    /// Attack and block/defense are unrelated
    Mistake,
    /// Block covers the attack's direction but not the attack itself
    DirectionMatch,
    /// Second defense slot picked the attack exactly
    SecondaryMatch,
    /// Block matches the attack
    BlockMatch,
    /// First defense slot picked the attack exactly
    PrimaryMatch,
}

impl ChanceTier {
    pub const ALL: [ChanceTier; 5] = [
        ChanceTier::Mistake,
        ChanceTier::DirectionMatch,
        ChanceTier::SecondaryMatch,
        ChanceTier::BlockMatch,
        ChanceTier::PrimaryMatch,
    ];

    pub fn percent(self) -> u8 {
        match self {
            ChanceTier::Mistake => 5,
            ChanceTier::DirectionMatch => 25,
            ChanceTier::SecondaryMatch => 55,
            ChanceTier::BlockMatch => 75,
            ChanceTier::PrimaryMatch => 90,
        }
    }

    /// Tier for an exact attack/defense match in the given slot
    fn exact_match(slot: usize) -> Self {
        if slot == 0 {
            ChanceTier::PrimaryMatch
        } else {
            ChanceTier::SecondaryMatch
        }
    }
}

/// Block pairing for an attack, if the block covers it at all
fn block_pairing(attack: Attack, block: Block) -> Option<ChanceTier> {
    match (attack, block) {
        (Attack::DiaHit, Block::Dia) | (Attack::LineHit, Block::Line) => {
            Some(ChanceTier::BlockMatch)
        }
        (Attack::Cut, Block::Dia)
        | (Attack::DiaShot, Block::Dia)
        | (Attack::LineShot, Block::Line)
        | (Attack::ShortPoke, Block::Line) => Some(ChanceTier::DirectionMatch),
        _ => None,
    }
}

/// Chance for one (attack, block, slot, defense) combination.
/// First matching rule wins: exact defense match, then block pairing,
/// then general mistake.
pub fn base_chance(attack: Attack, block: Block, slot: usize, defense: Defense) -> ChanceTier {
    if attack.index() == defense.index() {
        return ChanceTier::exact_match(slot);
    }
    block_pairing(attack, block).unwrap_or(ChanceTier::Mistake)
}

/// Precomputed base chances for every valid action combination
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutcomeTable {
    chances: [[[[ChanceTier; DEFENSES]; DEFENSE_SLOTS]; BLOCKS]; ATTACKS],
}

impl OutcomeTable {
    /// Base chance for a combination. `slot` must be 0 or 1.
    pub fn chance(&self, attack: Attack, block: Block, slot: usize, defense: Defense) -> ChanceTier {
        self.chances[attack.index()][block.index()][slot][defense.index()]
    }

    /// Every entry as (attack, block, slot, defense, percent), in index order
    pub fn entries(&self) -> Vec<TableEntry> {
        let mut entries = Vec::with_capacity(ATTACKS * BLOCKS * DEFENSE_SLOTS * DEFENSES);
        for &attack in Attack::ALL {
            for &block in Block::ALL {
                for slot in 0..DEFENSE_SLOTS {
                    for &defense in Defense::ALL {
                        entries.push(TableEntry {
                            attack: attack.index(),
                            block: block.index(),
                            slot,
                            defense: defense.index(),
                            chance: self.chance(attack, block, slot, defense).percent(),
                        });
                    }
                }
            }
        }
        entries
    }
}

/// Flattened table row, for inspection by a UI
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub attack: usize,
    pub block: usize,
    pub slot: usize,
    pub defense: usize,
    pub chance: u8,
}

/// Build the outcome table. Pure and deterministic.
///
/// Only in-catalog indices are materialized; there is no row for an index
/// one past the end of a catalog.
pub fn build_outcome_table() -> OutcomeTable {
    let mut chances = [[[[ChanceTier::Mistake; DEFENSES]; DEFENSE_SLOTS]; BLOCKS]; ATTACKS];
    for &attack in Attack::ALL {
        for &block in Block::ALL {
            for slot in 0..DEFENSE_SLOTS {
                for &defense in Defense::ALL {
                    chances[attack.index()][block.index()][slot][defense.index()] =
                        base_chance(attack, block, slot, defense);
                }
            }
        }
    }
    OutcomeTable { chances }
}
