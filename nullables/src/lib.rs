//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the engine (clock, device position,
//! reverse geocoder, image pipeline, storage) sits behind a trait. This
//! crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be scripted to fail on demand
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod geo;
pub mod media;
pub mod store;

pub use clock::NullClock;
pub use geo::{NullGeocoder, NullPositionProvider};
pub use media::NullImagePipeline;
pub use store::{NullMetaStore, NullReportStore, StoreOp};
