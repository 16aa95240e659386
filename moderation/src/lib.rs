//! Admin moderation for the Unswachh report engine.
//!
//! Reports enter the system in review. An admin, holding an [`AdminSession`]
//! obtained from [`ModerationEngine::login`], can approve a report (making it
//! public and votable) or remove it. No other transitions exist.

pub mod engine;
pub mod error;
pub mod gate;

pub use engine::{AdminSession, ApproveOutcome, ModerationEngine, ReviewQueue};
pub use error::ModerationError;
pub use gate::{AdminGate, StaticPasswordGate, StoredPasswordGate};
