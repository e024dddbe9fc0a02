//! Player identity and per-rally choices

use serde::{Deserialize, Serialize};

use crate::catalog::{Attack, Block, ChoiceSlot, Defense};
use crate::error::{RallyError, Result};

/// Role of a player within one rally
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Attacker,
    /// Serves, blocks and defends
    Defender,
}

/// Complete set of choices for one rally
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RallyChoices {
    pub attack: Attack,
    pub block: Block,
    pub defenses: [Defense; 2],
}

/// A named player and the choices made for the current rally
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    name: String,
    attack: Option<Attack>,
    block: Option<Block>,
    defense1: Option<Defense>,
    defense2: Option<Defense>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attack: None,
            block: None,
            defense1: None,
            defense2: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attack(&self) -> Option<Attack> {
        self.attack
    }

    pub fn block(&self) -> Option<Block> {
        self.block
    }

    pub fn defenses(&self) -> [Option<Defense>; 2] {
        [self.defense1, self.defense2]
    }

    pub fn set_attack(&mut self, attack: Attack) {
        self.attack = Some(attack);
    }

    pub fn set_block(&mut self, block: Block) {
        self.block = Some(block);
    }

    pub fn set_defense1(&mut self, defense: Defense) {
        self.defense1 = Some(defense);
    }

    pub fn set_defense2(&mut self, defense: Defense) {
        self.defense2 = Some(defense);
    }

    pub fn set_defenses(&mut self, first: Defense, second: Defense) {
        self.set_defense1(first);
        self.set_defense2(second);
    }

    /// Forget all choices so none carry over to the next rally
    pub fn clear_choices(&mut self) {
        self.attack = None;
        self.block = None;
        self.defense1 = None;
        self.defense2 = None;
    }

    /// Whether the given slot has been chosen
    pub fn has_choice(&self, slot: ChoiceSlot) -> bool {
        match slot {
            ChoiceSlot::Attack => self.attack.is_some(),
            ChoiceSlot::Block => self.block.is_some(),
            ChoiceSlot::Defense1 => self.defense1.is_some(),
            ChoiceSlot::Defense2 => self.defense2.is_some(),
        }
    }
}

/// Collect the attacker's attack and the defender's block and defenses.
/// Fails with the first missing slot.
pub fn collect_choices(attacker: &Player, defender: &Player) -> Result<RallyChoices> {
    let attack = attacker.attack.ok_or(RallyError::InvalidChoice(ChoiceSlot::Attack))?;
    let block = defender.block.ok_or(RallyError::InvalidChoice(ChoiceSlot::Block))?;
    let first = defender.defense1.ok_or(RallyError::InvalidChoice(ChoiceSlot::Defense1))?;
    let second = defender.defense2.ok_or(RallyError::InvalidChoice(ChoiceSlot::Defense2))?;
    Ok(RallyChoices { attack, block, defenses: [first, second] })
}
