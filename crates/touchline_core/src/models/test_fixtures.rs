//! Shared record fixtures for unit tests.

use chrono::{NaiveDate, Utc};

use super::game_record::{GameRecord, GameResult, GameType, SyncState, RECORD_SCHEMA_VERSION};
use crate::session::goal_timeline::{GoalTimeline, Side};
use crate::session::ledger::StatSnapshot;

/// A committed two-one win with a populated timeline and fresh derived
/// fields. `id` is left empty so stores can assign one.
pub fn sample_record() -> GameRecord {
    let mut timeline = GoalTimeline::default();
    timeline.add_goal(Side::Us, 120).unwrap();
    timeline.add_goal(Side::Us, 900).unwrap();
    timeline.add_goal(Side::Them, 1500).unwrap();

    let mut record = GameRecord {
        schema_version: RECORD_SCHEMA_VERSION,
        id: String::new(),
        date: NaiveDate::from_ymd_opt(2026, 4, 18).unwrap(),
        player_name: "Jamie".to_string(),
        opponent: "Harbor FC".to_string(),
        game_type: GameType::League,
        our_goals: 0,
        their_goals: 0,
        game_result: GameResult::Tie,
        goal_history: timeline.snapshot(),
        halftime_minutes: 30,
        halftime_elapsed_seconds: 3600,
        halftime_remaining_seconds: 0,
        halftime_complete: true,
        player_minutes_played: 60,
        stats: StatSnapshot::default(),
        game_notes: String::new(),
        created_at: Utc::now(),
        last_modified: None,
        sync_state: SyncState::LocalOnly,
    };
    record.rederive();
    record
}
