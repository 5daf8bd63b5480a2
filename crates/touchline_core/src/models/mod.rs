//! Persisted data model.

pub mod game_record;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use game_record::{
    GamePatch, GameRecord, GameResult, GameType, SyncState, RECORD_SCHEMA_VERSION,
};
