//! Feed content resolution: identity keys, reshare visibility, and assembly
//! of client-facing feed items.

pub mod assembler;
pub mod batch;
pub mod identity_key;
pub mod metadata;
pub mod page;
pub mod pg_store;
pub mod store;
pub mod visibility;

pub use batch::FeedBatchResolver;
pub use identity_key::generate_key;
pub use pg_store::PgFeedStore;
pub use visibility::{Resolution, UnavailablePlaceholder, UnavailableReason, VisibilityResolver};
