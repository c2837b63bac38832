//! Creature use cases: save, read, list own, release.

use std::sync::Arc;

use familiar_domain::{
    AttributeSet, Creature, CreatureId, CreatureProfile, Identity, ReleaseOutcome, Talents,
};
use tracing::{debug, info, warn};

use crate::infrastructure::ports::{
    ClockPort, CreatureRepo, RequestContext, TransactionPort, WriteBatch, WriteOp,
};

use super::error::{require_identity, CoreError};

/// Container for creature use cases.
pub struct CreatureUseCases {
    pub save: Arc<SaveCreature>,
    pub get: Arc<GetCreature>,
    pub mine: Arc<MyCreatures>,
    pub release: Arc<ReleaseCreature>,
}

impl CreatureUseCases {
    pub fn new(
        save: Arc<SaveCreature>,
        get: Arc<GetCreature>,
        mine: Arc<MyCreatures>,
        release: Arc<ReleaseCreature>,
    ) -> Self {
        Self {
            save,
            get,
            mine,
            release,
        }
    }
}

/// Loads `id` and checks that `identity` owns it.
pub(crate) async fn load_owned(
    creatures: &dyn CreatureRepo,
    identity: &Identity,
    id: CreatureId,
) -> Result<Creature, CoreError> {
    let creature = creatures
        .get(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Creature", id))?;

    if !identity.owns(creature.owner_id()) {
        return Err(CoreError::PermissionDenied {
            entity_type: "Creature",
        });
    }
    Ok(creature)
}

// =============================================================================
// Save
// =============================================================================

/// Raw save input. `id = None` creates a new creature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveCreatureInput {
    pub id: Option<CreatureId>,
    pub nickname: Option<String>,
    pub species: Option<String>,
    pub school: Option<String>,
    pub age: Option<String>,
    pub attributes: AttributeSet,
    /// Defaults to every attribute at its cap.
    pub max_attributes: Option<AttributeSet>,
    pub talents: Vec<String>,
}

struct ValidatedFields {
    profile: CreatureProfile,
    attributes: AttributeSet,
    max_attributes: AttributeSet,
    talents: Talents,
}

impl SaveCreatureInput {
    fn validate(&self) -> Result<ValidatedFields, CoreError> {
        let attributes = self.attributes;
        let max_attributes = self.max_attributes.unwrap_or_else(AttributeSet::at_cap);
        attributes.validate("attributes")?;
        max_attributes.validate("max_attributes")?;

        Ok(ValidatedFields {
            profile: CreatureProfile::new(
                self.nickname.as_deref(),
                self.species.as_deref(),
                self.school.as_deref(),
                self.age.as_deref(),
            )?,
            attributes,
            max_attributes,
            talents: Talents::new(&self.talents)?,
        })
    }
}

/// `saveCreature`: insert a new creature or replace an owned one's fields.
pub struct SaveCreature {
    creatures: Arc<dyn CreatureRepo>,
    tx: Arc<dyn TransactionPort>,
    clock: Arc<dyn ClockPort>,
}

impl SaveCreature {
    pub fn new(
        creatures: Arc<dyn CreatureRepo>,
        tx: Arc<dyn TransactionPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            creatures,
            tx,
            clock,
        }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        input: SaveCreatureInput,
    ) -> Result<CreatureId, CoreError> {
        let identity = require_identity(ctx)?;
        let now = self.clock.now();

        let (creature, op) = match input.id {
            None => {
                let fields = input.validate()?;
                let creature = Creature::new(
                    identity.account_id().clone(),
                    fields.profile,
                    fields.attributes,
                    fields.max_attributes,
                    fields.talents,
                    now,
                )?;
                (creature.clone(), WriteOp::InsertCreature(creature))
            }
            Some(id) => {
                let mut creature = load_owned(self.creatures.as_ref(), identity, id).await?;
                let fields = input.validate()?;
                creature.revise(
                    fields.profile,
                    fields.attributes,
                    fields.max_attributes,
                    fields.talents,
                    now,
                )?;
                (creature.clone(), WriteOp::UpdateCreature(creature))
            }
        };

        let is_new = input.id.is_none();
        self.tx
            .commit(WriteBatch::new().with(op))
            .await
            .map_err(|e| {
                warn!(creature_id = %creature.id(), error = %e, "Creature save failed");
                CoreError::from(e)
            })?;

        info!(
            creature_id = %creature.id(),
            owner = %identity.account_id(),
            created = is_new,
            "Creature saved"
        );
        Ok(creature.id())
    }
}

// =============================================================================
// Reads
// =============================================================================

/// `getCreature`: owner-only read.
pub struct GetCreature {
    creatures: Arc<dyn CreatureRepo>,
}

impl GetCreature {
    pub fn new(creatures: Arc<dyn CreatureRepo>) -> Self {
        Self { creatures }
    }

    pub async fn execute(&self, ctx: &RequestContext, id: CreatureId) -> Result<Creature, CoreError> {
        let identity = require_identity(ctx)?;
        let creature = load_owned(self.creatures.as_ref(), identity, id).await?;
        debug!(creature_id = %id, "Loaded creature");
        Ok(creature)
    }
}

/// `myCreatures`: the caller's creatures, newest first.
pub struct MyCreatures {
    creatures: Arc<dyn CreatureRepo>,
}

impl MyCreatures {
    pub fn new(creatures: Arc<dyn CreatureRepo>) -> Self {
        Self { creatures }
    }

    pub async fn execute(&self, ctx: &RequestContext) -> Result<Vec<Creature>, CoreError> {
        let identity = require_identity(ctx)?;
        let creatures = self.creatures.list_by_owner(identity.account_id()).await?;
        debug!(owner = %identity.account_id(), count = creatures.len(), "Listed creatures");
        Ok(creatures)
    }
}

// =============================================================================
// Release
// =============================================================================

/// Soft-retires a creature, withdrawing its listing in the same commit.
pub struct ReleaseCreature {
    creatures: Arc<dyn CreatureRepo>,
    tx: Arc<dyn TransactionPort>,
    clock: Arc<dyn ClockPort>,
}

impl ReleaseCreature {
    pub fn new(
        creatures: Arc<dyn CreatureRepo>,
        tx: Arc<dyn TransactionPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            creatures,
            tx,
            clock,
        }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        id: CreatureId,
    ) -> Result<ReleaseOutcome, CoreError> {
        let identity = require_identity(ctx)?;
        let mut creature = load_owned(self.creatures.as_ref(), identity, id).await?;
        let outcome = creature.release(self.clock.now())?;

        let mut batch = WriteBatch::new();
        if outcome == ReleaseOutcome::ReleasedAndUnlisted {
            batch.push(WriteOp::SetCreatureListed {
                creature_id: id,
                expected: true,
                listed: false,
            });
            batch.push(WriteOp::WithdrawActiveListing { creature_id: id });
        }
        batch.push(WriteOp::ReleaseCreature { creature_id: id });

        self.tx.commit(batch).await.map_err(|e| {
            warn!(creature_id = %id, error = %e, "Release failed");
            CoreError::from(e)
        })?;

        info!(creature_id = %id, ?outcome, "Creature released");
        Ok(outcome)
    }
}
