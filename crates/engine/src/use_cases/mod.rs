//! Use cases - User story orchestration.
//!
//! Each module contains the use cases for one area. Every write builds a
//! single `WriteBatch` and submits it once, so an action either fully lands
//! or leaves no trace.

pub mod board;
pub mod calculator;
pub mod creatures;
pub mod error;
pub mod listings;
pub mod workbench;

#[cfg(test)]
pub(crate) mod test_support;

pub use board::BoardUseCases;
pub use calculator::{ComputePotentials, PotentialsReport};
pub use creatures::CreatureUseCases;
pub use error::CoreError;
pub use listings::ListingUseCases;
pub use workbench::{CommitDetails, CreatureWorkbench};
