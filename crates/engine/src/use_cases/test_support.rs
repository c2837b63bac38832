//! Shared fixtures for use case tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use familiar_domain::{
    AccountId, AttributeSet, Creature, CreatureProfile, Identity, Talents,
};

use crate::infrastructure::ports::{
    ClockPort, CommitReceipt, MockClockPort, RequestContext,
};

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 18, 30, 0).unwrap()
}

pub fn clock() -> Arc<dyn ClockPort> {
    let mut clock = MockClockPort::new();
    clock.expect_now().returning(now);
    Arc::new(clock)
}

pub fn receipt() -> CommitReceipt {
    CommitReceipt {
        committed_at: now(),
    }
}

pub fn identity(id: &str) -> Identity {
    Identity::new(
        AccountId::new(id).unwrap(),
        Some("Ember Wizard"),
        Some(format!("{id}@example.com")),
    )
}

pub fn ctx(id: &str) -> RequestContext {
    RequestContext::authenticated(identity(id))
}

pub fn creature_of(owner: &str) -> Creature {
    Creature::new(
        AccountId::new(owner).unwrap(),
        CreatureProfile::new(Some("Sparky"), Some("Fire Cat"), Some("Fire"), Some("Teen")).unwrap(),
        AttributeSet::new(200, 150, 210, 220, 180),
        AttributeSet::at_cap(),
        Talents::new(["Spell-Proof"]).unwrap(),
        now(),
    )
    .unwrap()
}
