//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    ports::{ClockPort, CreatureRepo, DraftCachePort, ListingRepo, ThreadRepo, TransactionPort},
    sqlite::SqliteStore,
};
use crate::use_cases;

/// Main application state.
///
/// Holds all ports and use cases. Passed to HTTP handlers via Axum state.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Container for the injected ports.
pub struct Repositories {
    pub creature: Arc<dyn CreatureRepo>,
    pub listing: Arc<dyn ListingRepo>,
    pub thread: Arc<dyn ThreadRepo>,
    pub tx: Arc<dyn TransactionPort>,
    pub drafts: Arc<dyn DraftCachePort>,
}

impl Repositories {
    /// All document ports backed by one SQLite store.
    pub fn sqlite(store: Arc<SqliteStore>, drafts: Arc<dyn DraftCachePort>) -> Self {
        Self {
            creature: store.clone(),
            listing: store.clone(),
            thread: store.clone(),
            tx: store,
            drafts,
        }
    }
}

/// Container for all use cases.
pub struct UseCases {
    pub creatures: use_cases::CreatureUseCases,
    pub listings: use_cases::ListingUseCases,
    pub board: use_cases::BoardUseCases,
    pub workbench: Arc<use_cases::CreatureWorkbench>,
    pub calculator: use_cases::ComputePotentials,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(repositories: Repositories, clock: Arc<dyn ClockPort>) -> Self {
        let repos = &repositories;

        let save = Arc::new(use_cases::creatures::SaveCreature::new(
            repos.creature.clone(),
            repos.tx.clone(),
            clock.clone(),
        ));
        let creatures = use_cases::CreatureUseCases::new(
            save.clone(),
            Arc::new(use_cases::creatures::GetCreature::new(repos.creature.clone())),
            Arc::new(use_cases::creatures::MyCreatures::new(repos.creature.clone())),
            Arc::new(use_cases::creatures::ReleaseCreature::new(
                repos.creature.clone(),
                repos.tx.clone(),
                clock.clone(),
            )),
        );

        let listings = use_cases::ListingUseCases::new(
            Arc::new(use_cases::listings::ListCreature::new(
                repos.creature.clone(),
                repos.tx.clone(),
                clock.clone(),
            )),
            Arc::new(use_cases::listings::UnlistCreature::new(
                repos.creature.clone(),
                repos.tx.clone(),
            )),
            Arc::new(use_cases::listings::Marketplace::new(repos.listing.clone())),
        );

        let board = use_cases::BoardUseCases::new(
            Arc::new(use_cases::board::CreateThread::new(
                repos.creature.clone(),
                repos.tx.clone(),
                clock.clone(),
            )),
            Arc::new(use_cases::board::PostReply::new(
                repos.thread.clone(),
                repos.tx.clone(),
                clock,
            )),
            Arc::new(use_cases::board::ListThreads::new(repos.thread.clone())),
            Arc::new(use_cases::board::GetThread::new(repos.thread.clone())),
        );

        let workbench = Arc::new(use_cases::CreatureWorkbench::new(
            repos.creature.clone(),
            repos.drafts.clone(),
            save,
        ));

        let use_cases = UseCases {
            creatures,
            listings,
            board,
            workbench,
            calculator: use_cases::ComputePotentials::new(),
        };

        Self {
            repositories,
            use_cases,
        }
    }
}
