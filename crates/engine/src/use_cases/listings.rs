//! Marketplace use cases.
//!
//! Publishing and unlisting each touch two documents (the creature's `listed`
//! flag and the listing itself); both land in one commit so the invariant
//! `listed == true <=> exactly one active listing` holds after every action.

use std::sync::Arc;

use familiar_domain::{CreatureId, DomainError, Listing, ListingId, ListingPrice};
use tracing::{debug, info, warn};

use crate::infrastructure::ports::{
    ClockPort, CreatureRepo, ListingRepo, RequestContext, TransactionPort, WriteBatch, WriteOp,
};

use super::creatures::load_owned;
use super::error::{require_identity, CoreError};

pub const DEFAULT_MARKETPLACE_LIMIT: u32 = 50;
pub const MAX_MARKETPLACE_LIMIT: u32 = 100;

/// Container for marketplace use cases.
pub struct ListingUseCases {
    pub list: Arc<ListCreature>,
    pub unlist: Arc<UnlistCreature>,
    pub marketplace: Arc<Marketplace>,
}

impl ListingUseCases {
    pub fn new(
        list: Arc<ListCreature>,
        unlist: Arc<UnlistCreature>,
        marketplace: Arc<Marketplace>,
    ) -> Self {
        Self {
            list,
            unlist,
            marketplace,
        }
    }
}

/// Seller-supplied listing metadata; missing fields take the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCreatureInput {
    pub currency: Option<String>,
    pub amount: Option<u32>,
}

/// `listCreature`: publish an owned creature to the marketplace.
pub struct ListCreature {
    creatures: Arc<dyn CreatureRepo>,
    tx: Arc<dyn TransactionPort>,
    clock: Arc<dyn ClockPort>,
}

impl ListCreature {
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
        creature_id: CreatureId,
        input: ListCreatureInput,
    ) -> Result<ListingId, CoreError> {
        let identity = require_identity(ctx)?;
        let mut creature = load_owned(self.creatures.as_ref(), identity, creature_id).await?;
        creature.ensure_active()?;
        creature.attributes().validate("attributes")?;
        let price = ListingPrice::from_parts(input.currency.as_deref(), input.amount)?;

        let now = self.clock.now();
        creature.mark_listed(now).map_err(|e| match e {
            DomainError::InvalidStateTransition(_) => CoreError::AlreadyListed,
            other => other.into(),
        })?;
        let listing = Listing::publish(&creature, identity, price, now);
        let listing_id = listing.id();

        let batch = WriteBatch::new()
            .with(WriteOp::SetCreatureListed {
                creature_id,
                expected: false,
                listed: true,
            })
            .with(WriteOp::InsertListing(listing));

        self.tx.commit(batch).await.map_err(|e| {
            warn!(creature_id = %creature_id, error = %e, "Listing publication rejected");
            CoreError::from(e)
        })?;

        info!(
            creature_id = %creature_id,
            listing_id = %listing_id,
            seller = %identity.account_id(),
            "Creature listed"
        );
        Ok(listing_id)
    }
}

/// `unlistCreature`: withdraw an owned creature's active listing.
pub struct UnlistCreature {
    creatures: Arc<dyn CreatureRepo>,
    tx: Arc<dyn TransactionPort>,
}

impl UnlistCreature {
    pub fn new(creatures: Arc<dyn CreatureRepo>, tx: Arc<dyn TransactionPort>) -> Self {
        Self { creatures, tx }
    }

    pub async fn execute(&self, ctx: &RequestContext, creature_id: CreatureId) -> Result<(), CoreError> {
        let identity = require_identity(ctx)?;
        let creature = load_owned(self.creatures.as_ref(), identity, creature_id).await?;
        if !creature.is_listed() {
            return Err(CoreError::NotListed);
        }

        let batch = WriteBatch::new()
            .with(WriteOp::SetCreatureListed {
                creature_id,
                expected: true,
                listed: false,
            })
            .with(WriteOp::WithdrawActiveListing { creature_id });

        self.tx.commit(batch).await.map_err(|e| {
            warn!(creature_id = %creature_id, error = %e, "Unlisting rejected");
            CoreError::from(e)
        })?;

        info!(creature_id = %creature_id, "Creature unlisted");
        Ok(())
    }
}

/// `marketplace`: active listings, newest first.
pub struct Marketplace {
    listings: Arc<dyn ListingRepo>,
}

impl Marketplace {
    pub fn new(listings: Arc<dyn ListingRepo>) -> Self {
        Self { listings }
    }

    pub async fn execute(&self, limit: Option<u32>) -> Result<Vec<Listing>, CoreError> {
        let limit = limit
            .unwrap_or(DEFAULT_MARKETPLACE_LIMIT)
            .clamp(1, MAX_MARKETPLACE_LIMIT);
        let listings = self.listings.list_active(limit).await?;
        debug!(limit, count = listings.len(), "Listed marketplace");
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{
        MockCreatureRepo, MockListingRepo, MockTransactionPort, PreconditionFailed,
    };
    use crate::use_cases::test_support::{clock, creature_of, ctx, receipt};
    use familiar_domain::Creature;
    use mockall::predicate::eq;

    fn repo_with(creature: Creature) -> MockCreatureRepo {
        let mut repo = MockCreatureRepo::new();
        repo.expect_get()
            .returning(move |_| Ok(Some(creature.clone())));
        repo
    }

    fn pet_potentials() -> familiar_domain::Potentials {
        creature_of("user-1").potentials()
    }

    fn list_use_case(creature: Creature, tx: MockTransactionPort) -> ListCreature {
        ListCreature::new(Arc::new(repo_with(creature)), Arc::new(tx), clock())
    }

    #[tokio::test]
    async fn publish_flips_flag_and_inserts_listing_together() {
        let pet = creature_of("user-1");
        let id = pet.id();
        let mut tx = MockTransactionPort::new();
        tx.expect_commit()
            .withf(move |batch| match batch.ops() {
                [WriteOp::SetCreatureListed {
                    creature_id,
                    expected: false,
                    listed: true,
                }, WriteOp::InsertListing(listing)] => {
                    *creature_id == id
                        && listing.creature_id() == id
                        && listing.is_active()
                        && listing.price().amount() == 75
                        && listing.price().currency() == "Empowers"
                        && listing.seller_contact() == Some("user-1@example.com")
                        && listing.snapshot().potentials == pet_potentials()
                }
                _ => false,
            })
            .times(1)
            .returning(|_| Ok(receipt()));

        let input = ListCreatureInput {
            currency: None,
            amount: Some(75),
        };
        let result = list_use_case(pet, tx).execute(&ctx("user-1"), id, input).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn non_owner_cannot_publish() {
        let pet = creature_of("owner");
        let id = pet.id();
        let mut tx = MockTransactionPort::new();
        tx.expect_commit().never();

        let result = list_use_case(pet, tx)
            .execute(&ctx("intruder"), id, ListCreatureInput::default())
            .await;
        assert_eq!(
            result,
            Err(CoreError::PermissionDenied {
                entity_type: "Creature"
            })
        );
    }

    #[tokio::test]
    async fn anonymous_cannot_publish() {
        let pet = creature_of("owner");
        let id = pet.id();
        let mut tx = MockTransactionPort::new();
        tx.expect_commit().never();

        let result = list_use_case(pet, tx)
            .execute(&RequestContext::anonymous(), id, ListCreatureInput::default())
            .await;
        assert_eq!(result, Err(CoreError::Unauthorized));
    }

    #[tokio::test]
    async fn already_listed_is_rejected_without_writing() {
        let pet = creature_of("user-1").with_listed(true);
        let id = pet.id();
        let mut tx = MockTransactionPort::new();
        tx.expect_commit().never();

        let result = list_use_case(pet, tx)
            .execute(&ctx("user-1"), id, ListCreatureInput::default())
            .await;
        assert_eq!(result, Err(CoreError::AlreadyListed));
    }

    #[tokio::test]
    async fn losing_a_publish_race_is_already_listed() {
        let pet = creature_of("user-1");
        let id = pet.id();
        let mut tx = MockTransactionPort::new();
        tx.expect_commit().returning(move |_| {
            Err(PreconditionFailed::ListedFlag {
                creature_id: id,
                actual: true,
            }
            .into())
        });

        let result = list_use_case(pet, tx)
            .execute(&ctx("user-1"), id, ListCreatureInput::default())
            .await;
        assert_eq!(result, Err(CoreError::AlreadyListed));
    }

    #[tokio::test]
    async fn invalid_price_is_a_validation_failure() {
        let pet = creature_of("user-1");
        let id = pet.id();
        let mut tx = MockTransactionPort::new();
        tx.expect_commit().never();

        let input = ListCreatureInput {
            currency: Some("  ".into()),
            amount: None,
        };
        let result = list_use_case(pet, tx).execute(&ctx("user-1"), id, input).await;
        assert!(matches!(result, Err(CoreError::ValidationFailed { .. })));
    }

    #[tokio::test]
    async fn unlist_requires_listed_creature() {
        let pet = creature_of("user-1");
        let id = pet.id();
        let mut tx = MockTransactionPort::new();
        tx.expect_commit().never();

        let use_case = UnlistCreature::new(Arc::new(repo_with(pet)), Arc::new(tx));
        assert_eq!(
            use_case.execute(&ctx("user-1"), id).await,
            Err(CoreError::NotListed)
        );
    }

    #[tokio::test]
    async fn unlist_clears_flag_and_withdraws() {
        let pet = creature_of("user-1").with_listed(true);
        let id = pet.id();
        let mut tx = MockTransactionPort::new();
        tx.expect_commit()
            .with(eq(WriteBatch::new()
                .with(WriteOp::SetCreatureListed {
                    creature_id: id,
                    expected: true,
                    listed: false,
                })
                .with(WriteOp::WithdrawActiveListing { creature_id: id })))
            .times(1)
            .returning(|_| Ok(receipt()));

        let use_case = UnlistCreature::new(Arc::new(repo_with(pet)), Arc::new(tx));
        assert_eq!(use_case.execute(&ctx("user-1"), id).await, Ok(()));
    }

    #[tokio::test]
    async fn released_creature_cannot_be_listed() {
        let pet = creature_of("user-1").with_released(true);
        let id = pet.id();
        let mut tx = MockTransactionPort::new();
        tx.expect_commit().never();

        let result = list_use_case(pet, tx)
            .execute(&ctx("user-1"), id, ListCreatureInput::default())
            .await;
        assert!(matches!(
            result,
            Err(CoreError::ValidationFailed { field: "creature", .. })
        ));
    }

    #[tokio::test]
    async fn marketplace_limit_is_defaulted_and_capped() {
        let mut listings = MockListingRepo::new();
        listings
            .expect_list_active()
            .with(eq(DEFAULT_MARKETPLACE_LIMIT))
            .times(1)
            .returning(|_| Ok(vec![]));
        listings
            .expect_list_active()
            .with(eq(MAX_MARKETPLACE_LIMIT))
            .times(1)
            .returning(|_| Ok(vec![]));

        let use_case = Marketplace::new(Arc::new(listings));
        assert!(use_case.execute(None).await.unwrap().is_empty());
        assert!(use_case.execute(Some(10_000)).await.unwrap().is_empty());
    }
}
