//! Familiar Engine library.
//!
//! Server-side code for the Familiar creature workshop: saved creatures and
//! their attribute drafts, the marketplace, and the discussion board.
//!
//! ## Structure
//!
//! - `use_cases/` - User story orchestration over the ports
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
