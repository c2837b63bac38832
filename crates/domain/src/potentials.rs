//! Potential calculator.
//!
//! Maps an [`AttributeSet`] to the percentage potentials it unlocks. Each
//! family (damage, resist, pierce) shares one weighted base; the outputs within
//! a family differ only by divisor:
//!
//! | Family | Weighted base                 | Outputs (divisor)                        |
//! |--------|-------------------------------|------------------------------------------|
//! | damage | `2*STR + 2*WILL + POWER`      | dealer (128), giver (200), boon (400)    |
//! | resist | `2*STR + 2*AGI + POWER`       | proof (125), defy (85), ward (100)       |
//! | pierce | `2*INT + 2*AGI + POWER`       | breaker (400), piercer (300)             |
//!
//! Results are rounded half-up to whole percentages. The calculation is pure
//! integer arithmetic, so identical input always yields identical output, and
//! it accepts any input, including negative or above-cap values.

use serde::{Deserialize, Serialize};

use crate::value_objects::AttributeSet;

const DEALER_DIVISOR: i64 = 128;
const GIVER_DIVISOR: i64 = 200;
const BOON_DIVISOR: i64 = 400;

const PROOF_DIVISOR: i64 = 125;
const DEFY_DIVISOR: i64 = 85;
const WARD_DIVISOR: i64 = 100;

const BREAKER_DIVISOR: i64 = 400;
const PIERCER_DIVISOR: i64 = 300;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DamagePotentials {
    pub dealer: i64,
    pub giver: i64,
    pub boon: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResistPotentials {
    pub proof: i64,
    pub defy: i64,
    pub ward: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PiercePotentials {
    pub breaker: i64,
    pub piercer: i64,
}

/// All potentials for one attribute set, in whole percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Potentials {
    pub damage: DamagePotentials,
    pub resist: ResistPotentials,
    pub pierce: PiercePotentials,
}

impl Potentials {
    /// Potentials of a creature with every attribute at its cap.
    pub fn maximum() -> Self {
        compute_potentials(&AttributeSet::at_cap())
    }

    /// All outputs flattened in display order, with their names.
    pub fn entries(&self) -> [(&'static str, i64); 8] {
        [
            ("dealer", self.damage.dealer),
            ("giver", self.damage.giver),
            ("boon", self.damage.boon),
            ("proof", self.resist.proof),
            ("defy", self.resist.defy),
            ("ward", self.resist.ward),
            ("breaker", self.pierce.breaker),
            ("piercer", self.pierce.piercer),
        ]
    }
}

/// Computes every potential for `attributes`.
pub fn compute_potentials(attributes: &AttributeSet) -> Potentials {
    let damage = damage_base(attributes);
    let resist = resist_base(attributes);
    let pierce = pierce_base(attributes);

    Potentials {
        damage: DamagePotentials {
            dealer: round_half_up(damage, DEALER_DIVISOR),
            giver: round_half_up(damage, GIVER_DIVISOR),
            boon: round_half_up(damage, BOON_DIVISOR),
        },
        resist: ResistPotentials {
            proof: round_half_up(resist, PROOF_DIVISOR),
            defy: round_half_up(resist, DEFY_DIVISOR),
            ward: round_half_up(resist, WARD_DIVISOR),
        },
        pierce: PiercePotentials {
            breaker: round_half_up(pierce, BREAKER_DIVISOR),
            piercer: round_half_up(pierce, PIERCER_DIVISOR),
        },
    }
}

fn damage_base(a: &AttributeSet) -> i64 {
    2 * i64::from(a.strength) + 2 * i64::from(a.will) + i64::from(a.power)
}

fn resist_base(a: &AttributeSet) -> i64 {
    2 * i64::from(a.strength) + 2 * i64::from(a.agility) + i64::from(a.power)
}

fn pierce_base(a: &AttributeSet) -> i64 {
    2 * i64::from(a.intellect) + 2 * i64::from(a.agility) + i64::from(a.power)
}

/// `floor(numerator / divisor + 1/2)` for a positive divisor.
fn round_half_up(numerator: i64, divisor: i64) -> i64 {
    (2 * numerator + divisor).div_euclid(2 * divisor)
}
