//! Listing aggregate - a creature offered on the marketplace
//!
//! A listing carries a snapshot of the creature taken at publication time, so
//! marketplace readers never need the creature record itself.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregates::creature::Creature;
use crate::error::DomainError;
use crate::ids::{CreatureId, ListingId};
use crate::potentials::Potentials;
use crate::value_objects::{AccountId, AttributeSet, DisplayName, Identity, ListingPrice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    Withdrawn,
}

impl ListingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "withdrawn" => Ok(Self::Withdrawn),
            other => Err(DomainError::parse(format!("unknown listing status: {other}"))),
        }
    }
}

/// Denormalized creature fields shown on a listing, refreshed whenever the
/// creature is saved while listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureSnapshot {
    pub nickname: Option<String>,
    pub species: String,
    pub school: String,
    pub age: String,
    pub attributes: AttributeSet,
    pub max_attributes: AttributeSet,
    pub talents: Vec<String>,
    pub potentials: Potentials,
}

impl CreatureSnapshot {
    pub fn of(creature: &Creature) -> Self {
        let profile = creature.profile();
        Self {
            nickname: profile.nickname().map(|n| n.as_str().to_string()),
            species: profile.species().as_str().to_string(),
            school: profile.school().as_str().to_string(),
            age: profile.age().as_str().to_string(),
            attributes: *creature.attributes(),
            max_attributes: *creature.max_attributes(),
            talents: creature.talents().names(),
            potentials: creature.potentials(),
        }
    }
}

/// A marketplace listing.
///
/// # Invariants
///
/// - at most one `Active` listing exists per creature
/// - `withdrawn_at` is set exactly when the status is `Withdrawn`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    id: ListingId,
    creature_id: CreatureId,
    seller_id: AccountId,
    seller_name: DisplayName,
    seller_contact: Option<String>,
    snapshot: CreatureSnapshot,
    price: ListingPrice,
    status: ListingStatus,
    listed_at: DateTime<Utc>,
    withdrawn_at: Option<DateTime<Utc>>,
}

impl Listing {
    /// Publishes `creature` on behalf of `seller`.
    ///
    /// Ownership is checked by the caller before a listing is built.
    pub fn publish(
        creature: &Creature,
        seller: &Identity,
        price: ListingPrice,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ListingId::new(),
            creature_id: creature.id(),
            seller_id: seller.account_id().clone(),
            seller_name: seller.display_name().clone(),
            seller_contact: seller.email().map(str::to_string),
            snapshot: CreatureSnapshot::of(creature),
            price,
            status: ListingStatus::Active,
            listed_at: now,
            withdrawn_at: None,
        }
    }

    #[inline]
    pub fn id(&self) -> ListingId {
        self.id
    }

    #[inline]
    pub fn creature_id(&self) -> CreatureId {
        self.creature_id
    }

    #[inline]
    pub fn seller_id(&self) -> &AccountId {
        &self.seller_id
    }

    #[inline]
    pub fn seller_name(&self) -> &DisplayName {
        &self.seller_name
    }

    #[inline]
    pub fn seller_contact(&self) -> Option<&str> {
        self.seller_contact.as_deref()
    }

    #[inline]
    pub fn snapshot(&self) -> &CreatureSnapshot {
        &self.snapshot
    }

    #[inline]
    pub fn price(&self) -> &ListingPrice {
        &self.price
    }

    #[inline]
    pub fn status(&self) -> ListingStatus {
        self.status
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }

    #[inline]
    pub fn listed_at(&self) -> DateTime<Utc> {
        self.listed_at
    }

    #[inline]
    pub fn withdrawn_at(&self) -> Option<DateTime<Utc>> {
        self.withdrawn_at
    }

    // =========================================================================
    // Builder Methods (for restoring persisted state)
    // =========================================================================

    pub fn with_withdrawn_at(mut self, withdrawn_at: Option<DateTime<Utc>>) -> Self {
        self.status = if withdrawn_at.is_some() {
            ListingStatus::Withdrawn
        } else {
            ListingStatus::Active
        };
        self.withdrawn_at = withdrawn_at;
        self
    }

    /// Restores a listing row without re-reading the creature.
    pub fn restore(
        id: ListingId,
        creature_id: CreatureId,
        seller_id: AccountId,
        seller_name: DisplayName,
        seller_contact: Option<String>,
        snapshot: CreatureSnapshot,
        price: ListingPrice,
        listed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            creature_id,
            seller_id,
            seller_name,
            seller_contact,
            snapshot,
            price,
            status: ListingStatus::Active,
            listed_at,
            withdrawn_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregates::creature::CreatureProfile;
    use crate::value_objects::Talents;

    fn seller() -> Identity {
        Identity::new(
            AccountId::new("seller").unwrap(),
            Some("Merle"),
            Some("merle@example.com".to_string()),
        )
    }

    fn creature() -> Creature {
        Creature::new(
            AccountId::new("seller").unwrap(),
            CreatureProfile::new(Some("Pip"), Some("Piggle"), Some("Life"), None).unwrap(),
            AttributeSet::at_cap(),
            AttributeSet::at_cap(),
            Talents::new(["Pain-Giver", "Spell-Proof"]).unwrap(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn publish_snapshots_the_creature() {
        let c = creature();
        let listing = Listing::publish(&c, &seller(), ListingPrice::default(), Utc::now());

        assert!(listing.is_active());
        assert_eq!(listing.creature_id(), c.id());
        assert_eq!(listing.seller_contact(), Some("merle@example.com"));
        assert_eq!(listing.snapshot().nickname.as_deref(), Some("Pip"));
        assert_eq!(listing.snapshot().age, "Baby");
        assert_eq!(listing.snapshot().potentials, Potentials::maximum());
        assert_eq!(listing.snapshot().talents, vec!["Pain-Giver", "Spell-Proof"]);
    }

    #[test]
    fn restored_withdrawal_sets_status() {
        let listing = Listing::publish(&creature(), &seller(), ListingPrice::default(), Utc::now());
        let at = Utc::now();
        let withdrawn = listing.clone().with_withdrawn_at(Some(at));
        assert_eq!(withdrawn.status(), ListingStatus::Withdrawn);
        assert_eq!(withdrawn.withdrawn_at(), Some(at));
        assert!(withdrawn.with_withdrawn_at(None).is_active());
    }

    #[test]
    fn status_parses_its_own_names() {
        for status in [ListingStatus::Active, ListingStatus::Withdrawn] {
            assert_eq!(status.as_str().parse::<ListingStatus>().unwrap(), status);
        }
        assert!("sold".parse::<ListingStatus>().is_err());
    }
}
