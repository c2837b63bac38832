//! Creature aggregate - a player's recorded pet
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: state changes go through methods that keep invariants
//! - **Valid by construction**: attributes are range-checked in `new()`/`revise()`
//! - **Builder methods**: `with_*` methods restore persisted state in adapters

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::ids::CreatureId;
use crate::potentials::{compute_potentials, Potentials};
use crate::value_objects::{AccountId, AttributeSet, CreatureLabel, Nickname, Talents};

pub const DEFAULT_SPECIES: &str = "Unknown Pet";
pub const DEFAULT_SCHOOL: &str = "Unknown";
pub const DEFAULT_AGE: &str = "Baby";

/// Descriptive, owner-editable fields of a creature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatureProfile {
    nickname: Option<Nickname>,
    species: CreatureLabel,
    school: CreatureLabel,
    age: CreatureLabel,
}

impl CreatureProfile {
    /// Builds a profile, applying defaults for missing or blank labels.
    ///
    /// A blank nickname means "no nickname".
    pub fn new(
        nickname: Option<&str>,
        species: Option<&str>,
        school: Option<&str>,
        age: Option<&str>,
    ) -> Result<Self, DomainError> {
        let nickname = match nickname.map(str::trim).filter(|n| !n.is_empty()) {
            Some(n) => Some(Nickname::new(n)?),
            None => None,
        };
        Ok(Self {
            nickname,
            species: label("species", species, DEFAULT_SPECIES)?,
            school: label("school", school, DEFAULT_SCHOOL)?,
            age: label("age", age, DEFAULT_AGE)?,
        })
    }

    #[inline]
    pub fn nickname(&self) -> Option<&Nickname> {
        self.nickname.as_ref()
    }

    #[inline]
    pub fn species(&self) -> &CreatureLabel {
        &self.species
    }

    #[inline]
    pub fn school(&self) -> &CreatureLabel {
        &self.school
    }

    #[inline]
    pub fn age(&self) -> &CreatureLabel {
        &self.age
    }

    /// Nickname when set, otherwise the species.
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_ref()
            .map(Nickname::as_str)
            .unwrap_or_else(|| self.species.as_str())
    }
}

impl Default for CreatureProfile {
    fn default() -> Self {
        // Defaults are constant, short and non-empty.
        Self::new(None, None, None, None).unwrap_or_else(|_| unreachable!("default labels are valid"))
    }
}

fn label(field: &'static str, value: Option<&str>, default: &str) -> Result<CreatureLabel, DomainError> {
    let value = value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(default);
    CreatureLabel::new(value).map_err(|e| match e {
        DomainError::Validation { message, .. } => DomainError::validation(field, message),
        other => other,
    })
}

/// What a release changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Released,
    /// The creature was listed; its active listing must be withdrawn too.
    ReleasedAndUnlisted,
}

/// A creature owned by exactly one account.
///
/// # Invariants
///
/// - `owner_id` never changes after creation
/// - `attributes` and `max_attributes` are within per-attribute caps
/// - a released creature is never edited or listed again
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creature {
    id: CreatureId,
    owner_id: AccountId,
    profile: CreatureProfile,
    attributes: AttributeSet,
    max_attributes: AttributeSet,
    talents: Talents,
    listed: bool,
    released: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Creature {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// Creates a new, unlisted creature for `owner_id`.
    ///
    /// # Errors
    ///
    /// `DomainError::Validation` if either attribute set is out of range.
    pub fn new(
        owner_id: AccountId,
        profile: CreatureProfile,
        attributes: AttributeSet,
        max_attributes: AttributeSet,
        talents: Talents,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        attributes.validate("attributes")?;
        max_attributes.validate("max_attributes")?;
        Ok(Self {
            id: CreatureId::new(),
            owner_id,
            profile,
            attributes,
            max_attributes,
            talents,
            listed: false,
            released: false,
            created_at: now,
            updated_at: now,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> CreatureId {
        self.id
    }

    #[inline]
    pub fn owner_id(&self) -> &AccountId {
        &self.owner_id
    }

    #[inline]
    pub fn profile(&self) -> &CreatureProfile {
        &self.profile
    }

    #[inline]
    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    #[inline]
    pub fn max_attributes(&self) -> &AttributeSet {
        &self.max_attributes
    }

    #[inline]
    pub fn talents(&self) -> &Talents {
        &self.talents
    }

    #[inline]
    pub fn is_listed(&self) -> bool {
        self.listed
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        self.released
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Potentials of the current attributes.
    pub fn potentials(&self) -> Potentials {
        compute_potentials(&self.attributes)
    }

    // =========================================================================
    // State changes
    // =========================================================================

    /// Fails if the creature has been released.
    pub fn ensure_active(&self) -> Result<(), DomainError> {
        if self.released {
            return Err(DomainError::validation("creature", "has already been released"));
        }
        Ok(())
    }

    /// Replaces every owner-editable field at once.
    pub fn revise(
        &mut self,
        profile: CreatureProfile,
        attributes: AttributeSet,
        max_attributes: AttributeSet,
        talents: Talents,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_active()?;
        attributes.validate("attributes")?;
        max_attributes.validate("max_attributes")?;
        self.profile = profile;
        self.attributes = attributes;
        self.max_attributes = max_attributes;
        self.talents = talents;
        self.updated_at = now;
        Ok(())
    }

    pub fn mark_listed(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_active()?;
        if self.listed {
            return Err(DomainError::invalid_state_transition("creature is already listed"));
        }
        self.listed = true;
        self.updated_at = now;
        Ok(())
    }

    pub fn mark_unlisted(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.listed {
            return Err(DomainError::invalid_state_transition("creature is not listed"));
        }
        self.listed = false;
        self.updated_at = now;
        Ok(())
    }

    /// Soft-retires the creature. A listed creature is unlisted as part of the release.
    pub fn release(&mut self, now: DateTime<Utc>) -> Result<ReleaseOutcome, DomainError> {
        self.ensure_active()?;
        let outcome = if self.listed {
            ReleaseOutcome::ReleasedAndUnlisted
        } else {
            ReleaseOutcome::Released
        };
        self.released = true;
        self.listed = false;
        self.updated_at = now;
        Ok(outcome)
    }

    // =========================================================================
    // Builder Methods (for restoring persisted state)
    // =========================================================================

    pub fn with_id(mut self, id: CreatureId) -> Self {
        self.id = id;
        self
    }

    pub fn with_listed(mut self, listed: bool) -> Self {
        self.listed = listed;
        self
    }

    pub fn with_released(mut self, released: bool) -> Self {
        self.released = released;
        self
    }

    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> AccountId {
        AccountId::new("owner-1").unwrap()
    }

    fn creature() -> Creature {
        Creature::new(
            owner(),
            CreatureProfile::new(Some("Sparky"), Some("Storm Beetle"), Some("Storm"), Some("Adult"))
                .unwrap(),
            AttributeSet::new(200, 180, 220, 210, 190),
            AttributeSet::at_cap(),
            Talents::new(["Spell-Proof"]).unwrap(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn profile_applies_defaults() {
        let profile = CreatureProfile::new(Some("  "), None, Some(""), None).unwrap();
        assert!(profile.nickname().is_none());
        assert_eq!(profile.species().as_str(), DEFAULT_SPECIES);
        assert_eq!(profile.school().as_str(), DEFAULT_SCHOOL);
        assert_eq!(profile.age().as_str(), DEFAULT_AGE);
        assert_eq!(profile.display_name(), DEFAULT_SPECIES);
    }

    #[test]
    fn profile_reports_the_offending_label() {
        let err = CreatureProfile::new(None, Some(&"x".repeat(61)), None, None).unwrap_err();
        assert_eq!(err.field(), Some("species"));
    }

    #[test]
    fn new_creature_is_unlisted() {
        let c = creature();
        assert!(!c.is_listed());
        assert!(!c.is_released());
        assert_eq!(c.profile().display_name(), "Sparky");
    }

    #[test]
    fn new_rejects_out_of_range_attributes() {
        let err = Creature::new(
            owner(),
            CreatureProfile::default(),
            AttributeSet::new(256, 0, 0, 0, 0),
            AttributeSet::at_cap(),
            Talents::default(),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("attributes"));
    }

    #[test]
    fn listing_toggles_are_guarded() {
        let mut c = creature();
        c.mark_listed(Utc::now()).unwrap();
        assert!(c.mark_listed(Utc::now()).is_err());
        c.mark_unlisted(Utc::now()).unwrap();
        assert!(c.mark_unlisted(Utc::now()).is_err());
    }

    #[test]
    fn release_unlists_and_freezes() {
        let mut c = creature();
        c.mark_listed(Utc::now()).unwrap();
        assert_eq!(
            c.release(Utc::now()).unwrap(),
            ReleaseOutcome::ReleasedAndUnlisted
        );
        assert!(c.is_released());
        assert!(!c.is_listed());

        let err = c
            .revise(
                CreatureProfile::default(),
                AttributeSet::default(),
                AttributeSet::at_cap(),
                Talents::default(),
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err.field(), Some("creature"));
        assert!(c.mark_listed(Utc::now()).is_err());
        assert!(c.release(Utc::now()).is_err());
    }

    #[test]
    fn release_of_unlisted_creature() {
        let mut c = creature();
        assert_eq!(c.release(Utc::now()).unwrap(), ReleaseOutcome::Released);
    }

    #[test]
    fn revise_replaces_all_fields() {
        let mut c = creature();
        let attrs = AttributeSet::new(1, 2, 3, 4, 5);
        c.revise(
            CreatureProfile::default(),
            attrs,
            AttributeSet::at_cap(),
            Talents::default(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(c.attributes(), &attrs);
        assert!(c.talents().is_empty());
        assert!(c.profile().nickname().is_none());
    }
}
