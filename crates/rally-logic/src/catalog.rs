//! Action catalogs: attacks, blocks and defenses
//!
//! Each catalog is a closed enum with stable indices starting at 0.
//! Attacks and defenses share names and indices but are distinct types,
//! so an `Attack` can never be passed where a `Defense` is expected.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RallyError;

/// A catalog entry with a stable index and display name
pub trait Action: Copy + Sized + 'static {
    /// Every action of this catalog, ordered by index
    const ALL: &'static [Self];

    fn index(self) -> usize;

    fn name(self) -> &'static str;

    /// Look up an action by index. `None` when out of bounds.
    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Number of actions in the catalog
    fn count() -> usize {
        Self::ALL.len()
    }
}

/// Offensive action chosen by the attacker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attack {
    Cut,
    DiaHit,
    DiaShot,
    LineHit,
    LineShot,
    ShortPoke,
}

impl Action for Attack {
    const ALL: &'static [Self] = &[
        Attack::Cut,
        Attack::DiaHit,
        Attack::DiaShot,
        Attack::LineHit,
        Attack::LineShot,
        Attack::ShortPoke,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            Attack::Cut => "cut",
            Attack::DiaHit => "dia-hit",
            Attack::DiaShot => "dia-shot",
            Attack::LineHit => "line-hit",
            Attack::LineShot => "line-shot",
            Attack::ShortPoke => "short-poke",
        }
    }
}

/// Block direction chosen by the defender
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Block {
    Dia,
    Line,
}

impl Action for Block {
    const ALL: &'static [Self] = &[Block::Dia, Block::Line];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            Block::Dia => "dia",
            Block::Line => "line",
        }
    }
}

/// Reactive action chosen by the defender, twice per rally
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Defense {
    Cut,
    DiaHit,
    DiaShot,
    LineHit,
    LineShot,
    ShortPoke,
}

impl Action for Defense {
    const ALL: &'static [Self] = &[
        Defense::Cut,
        Defense::DiaHit,
        Defense::DiaShot,
        Defense::LineHit,
        Defense::LineShot,
        Defense::ShortPoke,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            Defense::Cut => "cut",
            Defense::DiaHit => "dia-hit",
            Defense::DiaShot => "dia-shot",
            Defense::LineHit => "line-hit",
            Defense::LineShot => "line-shot",
            Defense::ShortPoke => "short-poke",
        }
    }
}

/// One of the four choices that make up a rally
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChoiceSlot {
    Attack,
    Block,
    Defense1,
    Defense2,
}

impl ChoiceSlot {
    pub const ALL: [ChoiceSlot; 4] = [
        ChoiceSlot::Attack,
        ChoiceSlot::Block,
        ChoiceSlot::Defense1,
        ChoiceSlot::Defense2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChoiceSlot::Attack => "attack",
            ChoiceSlot::Block => "block",
            ChoiceSlot::Defense1 => "defense1",
            ChoiceSlot::Defense2 => "defense2",
        }
    }

    /// Size of the catalog this slot draws from
    pub fn catalog_len(self) -> usize {
        match self {
            ChoiceSlot::Attack => Attack::count(),
            ChoiceSlot::Block => Block::count(),
            ChoiceSlot::Defense1 | ChoiceSlot::Defense2 => Defense::count(),
        }
    }

    /// True for the slots filled by the defender
    pub fn is_defender_slot(self) -> bool {
        !matches!(self, ChoiceSlot::Attack)
    }
}

impl fmt::Display for ChoiceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChoiceSlot {
    type Err = RallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChoiceSlot::ALL
            .iter()
            .copied()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| RallyError::UnknownSlot(s.to_string()))
    }
}

/// Resolve an index against a catalog, reporting the slot on failure
pub fn lookup<A: Action>(slot: ChoiceSlot, index: usize) -> Result<A, RallyError> {
    A::from_index(index).ok_or(RallyError::InvalidActionIndex {
        slot,
        index,
        len: A::count(),
    })
}

/// Index/name pair for presenting a catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInfo {
    pub index: usize,
    pub name: String,
}

/// All three catalogs in presentation form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCatalog {
    pub attacks: Vec<ActionInfo>,
    pub blocks: Vec<ActionInfo>,
    pub defenses: Vec<ActionInfo>,
}

fn describe<A: Action>() -> Vec<ActionInfo> {
    A::ALL
        .iter()
        .map(|a| ActionInfo { index: a.index(), name: a.name().to_string() })
        .collect()
}

/// List every catalog, e.g. for building input prompts
pub fn action_catalog() -> ActionCatalog {
    ActionCatalog {
        attacks: describe::<Attack>(),
        blocks: describe::<Block>(),
        defenses: describe::<Defense>(),
    }
}
