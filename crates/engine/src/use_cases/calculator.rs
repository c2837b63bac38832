//! `computePotentials`: public, stateless, no identity needed.

use familiar_domain::{compute_potentials, AttributeSet, Potentials};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PotentialsReport {
    pub potentials: Potentials,
    pub maximum: Potentials,
    pub total: i64,
}

#[derive(Debug, Default)]
pub struct ComputePotentials;

impl ComputePotentials {
    pub fn new() -> Self {
        Self
    }

    /// Values outside the caps are accepted so what-if numbers can be explored.
    pub fn execute(&self, attributes: &AttributeSet) -> PotentialsReport {
        PotentialsReport {
            potentials: compute_potentials(attributes),
            maximum: Potentials::maximum(),
            total: attributes.total(),
        }
    }
}
