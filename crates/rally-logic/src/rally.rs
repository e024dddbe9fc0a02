//! Rally resolution: turns one set of choices into a point winner

use log::debug;
use serde::{Deserialize, Serialize};

use crate::catalog::{Action, Attack, Block, Defense};
use crate::error::Result;
use crate::game::MatchConfig;
use crate::player::{collect_choices, Player, RallyChoices, Role};
use crate::random::SeededRng;
use crate::table::{ChanceTier, OutcomeTable};

/// Attack scores at or below this, against a mistake-tier defense, are
/// described as the ball going out.
const BALL_OUT_THRESHOLD: f64 = 5.0;

/// Highest unjittered attack score
const MAX_ATTACK_BASE: u32 = 100;

/// The defense slot that produced the effective chance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseAssessment {
    pub tier: ChanceTier,
    pub slot: usize,
    pub defense: Defense,
}

/// Effective defense: the better of the two slots. Slot 0 wins ties.
pub fn assess_defense(table: &OutcomeTable, choices: &RallyChoices) -> DefenseAssessment {
    let mut best = DefenseAssessment {
        tier: table.chance(choices.attack, choices.block, 0, choices.defenses[0]),
        slot: 0,
        defense: choices.defenses[0],
    };
    for (slot, &defense) in choices.defenses.iter().enumerate().skip(1) {
        let tier = table.chance(choices.attack, choices.block, slot, defense);
        if tier > best.tier {
            best = DefenseAssessment { tier, slot, defense };
        }
    }
    best
}

/// Ties go to the defender
pub fn decide(attack_score: f64, defense_score: f64) -> Role {
    if attack_score <= defense_score {
        Role::Defender
    } else {
        Role::Attacker
    }
}

/// Descriptive category of a rally. Never affects who wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Commentary {
    /// Weak attack against an unrelated defense
    BallOut,
    Defended(ChanceTier),
    Scored(ChanceTier),
}

impl Commentary {
    pub fn classify(winner: Role, tier: ChanceTier, attack_score: f64) -> Self {
        if attack_score <= BALL_OUT_THRESHOLD && tier.percent() <= 5 {
            return Commentary::BallOut;
        }
        match winner {
            Role::Defender => Commentary::Defended(tier),
            Role::Attacker => Commentary::Scored(tier),
        }
    }

    fn template(self) -> &'static str {
        match self {
            Commentary::BallOut | Commentary::Defended(ChanceTier::Mistake) => {
                "what on earth, [a] puts [attack] in out"
            }
            Commentary::Defended(ChanceTier::DirectionMatch) => {
                "[d] reaches far over the net and blocks [attack]"
            }
            Commentary::Defended(ChanceTier::SecondaryMatch) => {
                "[d] is too fast, [attack] spectacularly defended"
            }
            Commentary::Defended(ChanceTier::BlockMatch) => "MONSTERBLOCK",
            Commentary::Defended(ChanceTier::PrimaryMatch) => "[attack] easily defended by [d]",
            Commentary::Scored(ChanceTier::Mistake) => "[a] placed [attack] in empty space",
            Commentary::Scored(ChanceTier::DirectionMatch) => "beautiful [attack] from [a]",
            Commentary::Scored(ChanceTier::SecondaryMatch) => {
                "[a] with a fast [attack], too fast for [d]"
            }
            Commentary::Scored(ChanceTier::BlockMatch) => "[a] uses the [block] block from [d]",
            Commentary::Scored(ChanceTier::PrimaryMatch) => "[a] puts [attack] right on the line",
        }
    }

    /// Fill in the template with the rally's names
    pub fn render(self, attack: Attack, block: Block, attacker: &str, defender: &str) -> String {
        self.template()
            .replace("[attack]", attack.name())
            .replace("[block]", block.name())
            .replace("[a]", attacker)
            .replace("[d]", defender)
    }
}

/// Outcome of one resolved rally
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RallyResult {
    pub winner: String,
    pub loser: String,
    pub winner_role: Role,
    pub attack: Attack,
    pub block: Block,
    /// Defense from the slot that set the effective chance
    pub decisive_defense: Defense,
    pub decisive_slot: usize,
    pub tier: ChanceTier,
    /// Base chance in percent, one of 5, 25, 55, 75, 90
    pub defense_chance: u8,
    pub defense_score: f64,
    pub attack_score: f64,
    pub commentary: Commentary,
    pub comment: String,
}

/// Resolve a rally between the current attacker and defender.
///
/// Fails with `InvalidChoice` if any of the four choices is unset.
pub fn resolve_rally(
    table: &OutcomeTable,
    attacker: &Player,
    defender: &Player,
    config: &MatchConfig,
    rng: &mut SeededRng,
) -> Result<RallyResult> {
    let choices = collect_choices(attacker, defender)?;
    let assessment = assess_defense(table, &choices);
    let defense_chance = assessment.tier.percent();

    let defense_score =
        defense_chance as f64 * rng.next_uniform(config.jitter_low, config.jitter_high);
    let attack_score = rng.next_inclusive(MAX_ATTACK_BASE) as f64
        * rng.next_uniform(config.jitter_low, config.jitter_high);

    let winner_role = decide(attack_score, defense_score);
    let (winner, loser) = match winner_role {
        Role::Defender => (defender.name(), attacker.name()),
        Role::Attacker => (attacker.name(), defender.name()),
    };
    let commentary = Commentary::classify(winner_role, assessment.tier, attack_score);
    let comment = commentary.render(choices.attack, choices.block, attacker.name(), defender.name());

    debug!(
        "rally: {} {} vs {} block {} / defenses {} {} -> chance {} def {:.2} att {:.2}, {} wins",
        attacker.name(),
        choices.attack.name(),
        defender.name(),
        choices.block.name(),
        choices.defenses[0].name(),
        choices.defenses[1].name(),
        defense_chance,
        defense_score,
        attack_score,
        winner
    );

    Ok(RallyResult {
        winner: winner.to_string(),
        loser: loser.to_string(),
        winner_role,
        attack: choices.attack,
        block: choices.block,
        decisive_defense: assessment.defense,
        decisive_slot: assessment.slot,
        tier: assessment.tier,
        defense_chance,
        defense_score,
        attack_score,
        commentary,
        comment,
    })
}
