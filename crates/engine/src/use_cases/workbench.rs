//! Attribute workbench: unsaved drafts layered over saved creatures.
//!
//! The editor state is rebuilt on every call from the authoritative record
//! plus whatever the draft cache holds for the caller. A cache that is
//! unreachable or holds garbage never blocks editing; the draft is simply
//! treated as absent.

use std::sync::Arc;

use familiar_domain::{
    AccountId, AttributeSet, Creature, CreatureId, Draft, DraftEditor, DraftKey, Identity,
};
use tracing::{debug, info, warn};

use crate::infrastructure::ports::{CreatureRepo, DraftCachePort, RequestContext};

use super::creatures::{load_owned, SaveCreature, SaveCreatureInput};
use super::error::{require_identity, CoreError};

/// Profile fields sent along with a draft commit.
///
/// Anything left `None` keeps the saved creature's value, or the default for
/// a new creature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitDetails {
    pub nickname: Option<String>,
    pub species: Option<String>,
    pub school: Option<String>,
    pub age: Option<String>,
    pub max_attributes: Option<AttributeSet>,
    pub talents: Option<Vec<String>>,
}

impl CommitDetails {
    fn into_save_input(
        self,
        existing: Option<&Creature>,
        attributes: AttributeSet,
    ) -> SaveCreatureInput {
        let profile = existing.map(Creature::profile);
        SaveCreatureInput {
            id: existing.map(Creature::id),
            nickname: self.nickname.or_else(|| {
                profile
                    .and_then(|p| p.nickname())
                    .map(|n| n.as_str().to_string())
            }),
            species: self
                .species
                .or_else(|| profile.map(|p| p.species().as_str().to_string())),
            school: self
                .school
                .or_else(|| profile.map(|p| p.school().as_str().to_string())),
            age: self
                .age
                .or_else(|| profile.map(|p| p.age().as_str().to_string())),
            attributes,
            max_attributes: self
                .max_attributes
                .or_else(|| existing.map(|c| *c.max_attributes())),
            talents: self
                .talents
                .or_else(|| existing.map(|c| c.talents().names()))
                .unwrap_or_default(),
        }
    }
}

pub struct CreatureWorkbench {
    creatures: Arc<dyn CreatureRepo>,
    cache: Arc<dyn DraftCachePort>,
    save: Arc<SaveCreature>,
}

impl CreatureWorkbench {
    pub fn new(
        creatures: Arc<dyn CreatureRepo>,
        cache: Arc<dyn DraftCachePort>,
        save: Arc<SaveCreature>,
    ) -> Self {
        Self {
            creatures,
            cache,
            save,
        }
    }

    /// Opens the editor for `key`, resuming a cached draft when one exists.
    pub async fn open(&self, ctx: &RequestContext, key: DraftKey) -> Result<DraftEditor, CoreError> {
        let identity = require_identity(ctx)?;
        let (_, editor) = self.load(identity, key).await?;
        debug!(draft = %key, status = ?editor.status(), "Opened draft");
        Ok(editor)
    }

    /// Replaces the working attributes and persists the draft.
    ///
    /// Editing back to the saved values clears the cached draft.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        key: DraftKey,
        attributes: AttributeSet,
    ) -> Result<DraftEditor, CoreError> {
        let identity = require_identity(ctx)?;
        let (_, mut editor) = self.load(identity, key).await?;
        editor.replace(attributes);

        let owner = identity.account_id();
        if editor.is_dirty() {
            let blob = serde_json::to_string(&editor.to_draft())
                .map_err(|e| CoreError::TransactionFailed(e.to_string()))?;
            self.cache.set(owner, key, blob).await?;
        } else {
            self.cache.clear(owner, key).await?;
        }

        debug!(draft = %key, status = ?editor.status(), "Updated draft");
        Ok(editor)
    }

    /// Drops unsaved edits for `key`.
    pub async fn discard(&self, ctx: &RequestContext, key: DraftKey) -> Result<DraftEditor, CoreError> {
        let identity = require_identity(ctx)?;
        let (_, mut editor) = self.load(identity, key).await?;
        editor.discard();
        self.cache.clear(identity.account_id(), key).await?;
        debug!(draft = %key, "Discarded draft");
        Ok(editor)
    }

    /// Saves the working attributes with `details` through `saveCreature`.
    ///
    /// Returns the saved creature's id and the editor re-keyed to it, clean at
    /// the new baseline. On failure the cached draft is left untouched so no edits are
    /// lost.
    pub async fn commit(
        &self,
        ctx: &RequestContext,
        key: DraftKey,
        details: CommitDetails,
    ) -> Result<(CreatureId, DraftEditor), CoreError> {
        let identity = require_identity(ctx)?;
        let (existing, mut editor) = self.load(identity, key).await?;
        let attributes = *editor.effective();
        let input = details.into_save_input(existing.as_ref(), attributes);

        let creature_id = match self.save.execute(ctx, input).await {
            Ok(id) => id,
            Err(e) => {
                warn!(draft = %key, status = ?editor.commit_failed(), error = %e, "Draft commit failed, edits kept");
                return Err(e);
            }
        };
        editor.commit_succeeded(DraftKey::Creature(creature_id), attributes);

        if let Err(e) = self.cache.clear(identity.account_id(), key).await {
            warn!(draft = %key, error = %e, "Saved draft but could not clear cache");
        }

        info!(draft = %key, creature_id = %creature_id, "Draft committed");
        Ok((creature_id, editor))
    }

    async fn load(
        &self,
        identity: &Identity,
        key: DraftKey,
    ) -> Result<(Option<Creature>, DraftEditor), CoreError> {
        let existing = match key {
            DraftKey::New => None,
            DraftKey::Creature(id) => {
                let creature = load_owned(self.creatures.as_ref(), identity, id).await?;
                creature.ensure_active()?;
                Some(creature)
            }
        };
        let baseline = existing
            .as_ref()
            .map(|c| *c.attributes())
            .unwrap_or_else(AttributeSet::at_cap);

        let cached = self.cached(identity.account_id(), key).await;
        let editor = DraftEditor::open(key, baseline, cached.as_ref());
        Ok((existing, editor))
    }

    async fn cached(&self, owner: &AccountId, key: DraftKey) -> Option<Draft> {
        let blob = match self.cache.get(owner, key).await {
            Ok(blob) => blob?,
            Err(e) => {
                warn!(draft = %key, error = %e, "Draft cache unavailable, starting clean");
                return None;
            }
        };
        match serde_json::from_str(&blob) {
            Ok(draft) => Some(draft),
            Err(e) => {
                warn!(draft = %key, error = %e, "Ignoring unreadable cached draft");
                None
            }
        }
    }
}
