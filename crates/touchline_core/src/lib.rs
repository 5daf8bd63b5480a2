//! # touchline_core - Live Soccer Game Session Engine
//!
//! This library provides the session layer for a touchline stat-tracking
//! app: a drift-resistant match clock, goal and stat capture while the
//! game runs, and a sync engine that keeps history safe when the remote
//! store is unreachable.
//!
//! ## Features
//! - Wall-clock anchored timing (a stalled tick loop never loses time)
//! - Two-half timer with a hard stop at each half's boundary
//! - Stat ledger with derived conversion and success rates
//! - Remote store sync with a durable local JSON fallback
//! - CSV and JSON history exports

pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod session;
pub mod sync;

pub use config::{RetryPolicy, SessionConfig};
pub use error::{CacheError, ExportError, SessionError, SyncError};
pub use models::{GamePatch, GameRecord, GameResult, GameType, SyncState};
pub use session::clock::{Clock, ManualTimeSource, SystemTimeSource, TimeSource};
pub use session::controller::{CommitOutcome, GameInfo, SessionController};
pub use session::goal_timeline::{GoalEvent, GoalHistory, GoalTimeline, Side};
pub use session::half_timer::{Half, HalfTimer, TimerPhase, TimerTick};
pub use session::ledger::{Stat, StatLedger, StatSnapshot};
pub use sync::{GameStore, LocalCache, MemoryStore, StoreError, SyncEngine};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn full_session_commits_through_the_engine() {
        let time = Arc::new(ManualTimeSource::new(0));
        let config = SessionConfig::default();
        let mut controller = SessionController::new(
            GameInfo {
                date: chrono::NaiveDate::from_ymd_opt(2026, 5, 2).unwrap(),
                player_name: "Jamie".to_string(),
                opponent: "Harbor FC".to_string(),
                game_type: GameType::League,
            },
            &config,
            time.clone(),
        )
        .unwrap();

        controller.timer_mut().start().unwrap();
        time.advance_secs(600);
        controller.timer_mut().tick();
        controller.log_goal(Side::Us).unwrap();
        controller.ledger_mut().increment(Stat::ShotsLeft);
        controller.ledger_mut().increment(Stat::GoalsLeft);

        let store = Arc::new(MemoryStore::new());
        let dir = tempfile::tempdir().unwrap();
        let mut engine = SyncEngine::new(
            store.clone() as Arc<dyn GameStore>,
            dir.path(),
            "pin",
            RetryPolicy::default(),
        );

        match controller.commit(&mut engine, false).await {
            CommitOutcome::Committed { record, degraded } => {
                assert!(degraded.is_none());
                assert_eq!(record.our_goals, 1);
                assert_eq!(record.goal_history.us[0].minute, 10);
            }
            CommitOutcome::NeedsConfirmation(warnings) => {
                panic!("unexpected warnings: {:?}", warnings)
            }
        }
        assert_eq!(store.record_count("pin"), 1);
    }
}
