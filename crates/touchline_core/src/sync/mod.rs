//! Remote store bridging with a durable local fallback.

pub mod cache;
pub mod engine;
pub mod memory_store;
pub mod store;

pub use cache::LocalCache;
pub use engine::{ClearOutcome, LoadOutcome, MutateOutcome, SaveOutcome, SyncEngine, SyncReport};
pub use memory_store::MemoryStore;
pub use store::{backoff_delay, GameStore, RetryClass, StoreError};
