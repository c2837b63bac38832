//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Database reads (could swap SQLite -> Postgres)
//! - Atomic multi-document commits
//! - The draft cache (could swap in-process -> Redis)
//! - Clock (for testing)

mod context;
mod error;
mod repos;
mod testing;
mod transaction;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{CreatureRepo, ListingRepo, ThreadRepo};

// =============================================================================
// Write Primitive
// =============================================================================
pub use transaction::{CommitReceipt, TransactionPort, WriteBatch, WriteOp};

// =============================================================================
// Errors
// =============================================================================
pub use error::{CacheError, PreconditionFailed, RepoError, TxError};

// =============================================================================
// Identity Context
// =============================================================================
pub use context::RequestContext;

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{MockCreatureRepo, MockListingRepo, MockThreadRepo};

#[cfg(test)]
pub use testing::{MockClockPort, MockDraftCachePort};

#[cfg(test)]
pub use transaction::MockTransactionPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, DraftCachePort};
