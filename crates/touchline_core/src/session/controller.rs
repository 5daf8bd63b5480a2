//! One in-progress game: timer, goal timeline, stat ledger and the scalar
//! game info, plus the commit-to-record operation.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::clock::TimeSource;
use super::goal_timeline::{GoalEvent, GoalTimeline, Side};
use super::half_timer::HalfTimer;
use super::ledger::StatLedger;
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::models::{GameRecord, GameResult, GameType, SyncState, RECORD_SCHEMA_VERSION};
use crate::sync::engine::SyncEngine;
use crate::sync::store::StoreError;

/// Session-scoped game info. Survives a commit so a tournament day of games
/// against rotating opponents needs minimal re-entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameInfo {
    pub date: NaiveDate,
    pub player_name: String,
    pub opponent: String,
    pub game_type: GameType,
}

/// Result of [`SessionController::commit`].
#[derive(Debug)]
pub enum CommitOutcome {
    /// Ledger validation produced soft warnings and `force` was false.
    /// Nothing was persisted and no live state changed; the caller should
    /// confirm with the user and retry with `force = true`.
    NeedsConfirmation(Vec<String>),
    /// The record was stored (remotely, or locally when `degraded` is set)
    /// and the per-game state was reset.
    Committed { record: GameRecord, degraded: Option<StoreError> },
}

pub struct SessionController {
    info: GameInfo,
    timer: HalfTimer,
    timeline: GoalTimeline,
    ledger: StatLedger,
    notes: String,
    player_minutes_played: Option<u32>,
    goal_entry_locked: bool,
}

impl SessionController {
    pub fn new(
        info: GameInfo,
        config: &SessionConfig,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            info,
            timer: HalfTimer::new(time, config.half_duration_seconds())?,
            timeline: GoalTimeline::new(config.goal_capacity_per_side),
            ledger: StatLedger::new(),
            notes: String::new(),
            player_minutes_played: None,
            goal_entry_locked: false,
        })
    }

    pub fn info(&self) -> &GameInfo {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut GameInfo {
        &mut self.info
    }

    pub fn timer(&self) -> &HalfTimer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut HalfTimer {
        &mut self.timer
    }

    pub fn timeline(&self) -> &GoalTimeline {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut GoalTimeline {
        &mut self.timeline
    }

    pub fn ledger(&self) -> &StatLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut StatLedger {
        &mut self.ledger
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn set_player_minutes_played(&mut self, minutes: u32) {
        self.player_minutes_played = Some(minutes);
    }

    pub fn goal_entry_locked(&self) -> bool {
        self.goal_entry_locked
    }

    /// Guard against accidental double-taps on the goal buttons.
    pub fn set_goal_entry_locked(&mut self, locked: bool) {
        self.goal_entry_locked = locked;
    }

    /// Log a goal at the current game-clock position (cumulative across
    /// halves, so second-half goals display minute >= the half length).
    pub fn log_goal(&mut self, side: Side) -> Result<GoalEvent, SessionError> {
        if self.goal_entry_locked {
            return Err(SessionError::GoalEntryLocked);
        }
        let position = self.timer.total_game_seconds();
        let event = self.timeline.add_goal(side, position)?;
        log::info!("goal for {:?} at {}'", side, event.minute);
        Ok(event)
    }

    /// Assemble a record from the current session state. Pure with respect to
    /// the live counters; `commit` is the only caller that resets them.
    pub fn build_record(&self) -> GameRecord {
        let goal_history = self.timeline.snapshot();
        let minutes_played =
            self.player_minutes_played.unwrap_or_else(|| self.timer.total_game_seconds() / 60);
        let mut record = GameRecord {
            schema_version: RECORD_SCHEMA_VERSION,
            id: String::new(),
            date: self.info.date,
            player_name: self.info.player_name.clone(),
            opponent: self.info.opponent.clone(),
            game_type: self.info.game_type,
            our_goals: 0,
            their_goals: 0,
            game_result: GameResult::Tie,
            goal_history,
            halftime_minutes: self.timer.half_duration_seconds() / 60,
            halftime_elapsed_seconds: self.timer.total_game_seconds(),
            halftime_remaining_seconds: self.timer.remaining_seconds(),
            halftime_complete: self.timer.is_game_complete(),
            player_minutes_played: minutes_played,
            stats: self.ledger.snapshot(),
            game_notes: self.notes.clone(),
            created_at: Utc::now(),
            last_modified: None,
            sync_state: SyncState::LocalOnly,
        };
        record.rederive();
        record
    }

    /// Commit the current game to history.
    ///
    /// Ledger warnings are soft: with `force == false` they abort the commit
    /// and come back as `NeedsConfirmation`. Once committed, the per-game
    /// state (ledger, timeline, notes, lock, timer position) resets while the
    /// session identity (date, player, opponent, timer duration) is kept. A
    /// degraded save still resets: the record lives on in the local cache, so
    /// the user is never blocked from starting the next game.
    pub async fn commit(&mut self, sync: &mut SyncEngine, force: bool) -> CommitOutcome {
        let warnings = self.ledger.validate();
        if !warnings.is_empty() && !force {
            return CommitOutcome::NeedsConfirmation(warnings);
        }

        let record = self.build_record();
        let outcome = sync.save(record).await;
        if let Some(err) = &outcome.degraded {
            log::warn!("game stored locally only: {}", err);
        }
        self.reset_for_next_game();
        CommitOutcome::Committed { record: outcome.record, degraded: outcome.degraded }
    }

    fn reset_for_next_game(&mut self) {
        self.ledger.reset();
        self.timeline.clear();
        self.notes.clear();
        self.player_minutes_played = None;
        self.goal_entry_locked = false;
        self.timer.reset_game();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::session::clock::ManualTimeSource;
    use crate::session::half_timer::TimerPhase;
    use crate::session::ledger::Stat;
    use crate::sync::memory_store::MemoryStore;
    use crate::sync::store::GameStore;
    use tempfile::TempDir;

    fn controller(time: Arc<ManualTimeSource>) -> SessionController {
        let info = GameInfo {
            date: NaiveDate::from_ymd_opt(2026, 5, 2).unwrap(),
            player_name: "Jamie".to_string(),
            opponent: "Harbor FC".to_string(),
            game_type: GameType::League,
        };
        let config = SessionConfig { half_duration_minutes: 30, ..SessionConfig::default() };
        SessionController::new(info, &config, time as Arc<dyn TimeSource>).unwrap()
    }

    fn engine(dir: &TempDir) -> (SyncEngine, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let retry = RetryPolicy { max_attempts: 3, base_delay_ms: 1 };
        let engine =
            SyncEngine::new(store.clone() as Arc<dyn GameStore>, dir.path(), "pin-1", retry);
        (engine, store)
    }

    #[test]
    fn goals_use_cumulative_game_clock() {
        let time = Arc::new(ManualTimeSource::new(0));
        let mut session = controller(time.clone());

        session.timer_mut().start().unwrap();
        time.advance_secs(10);
        session.log_goal(Side::Us).unwrap();
        time.advance_secs(175);
        session.log_goal(Side::Us).unwrap();

        // Run out the first half, then score early in the second.
        time.advance_secs(1800);
        session.timer_mut().tick();
        session.timer_mut().start_second_half().unwrap();
        session.timer_mut().start().unwrap();
        time.advance_secs(910);
        session.log_goal(Side::Us).unwrap();

        let minutes: Vec<u32> = session.timeline().merged().map(|g| g.minute).collect();
        assert_eq!(minutes, vec![0, 3, 45]);
    }

    #[test]
    fn goal_entry_lock_blocks_logging() {
        let time = Arc::new(ManualTimeSource::new(0));
        let mut session = controller(time);
        session.set_goal_entry_locked(true);
        assert_eq!(session.log_goal(Side::Us), Err(SessionError::GoalEntryLocked));
        assert_eq!(session.timeline().count(Side::Us), 0);
    }

    #[tokio::test]
    async fn commit_without_force_stops_on_warnings() {
        let time = Arc::new(ManualTimeSource::new(0));
        let mut session = controller(time);
        let dir = TempDir::new().unwrap();
        let (mut sync, store) = engine(&dir);

        session.ledger_mut().set(Stat::ShotsLeft, 2);
        session.ledger_mut().set(Stat::GoalsLeft, 3);

        match session.commit(&mut sync, false).await {
            CommitOutcome::NeedsConfirmation(warnings) => {
                assert!(warnings.iter().any(|w| w == "left foot goals exceed shots"));
            }
            other => panic!("expected NeedsConfirmation, got {:?}", other),
        }
        // Nothing persisted, nothing reset.
        assert_eq!(store.record_count("pin-1"), 0);
        assert_eq!(session.ledger().get(Stat::GoalsLeft), 3);

        // Explicit confirmation persists despite the warning.
        match session.commit(&mut sync, true).await {
            CommitOutcome::Committed { degraded, .. } => assert!(degraded.is_none()),
            other => panic!("expected Committed, got {:?}", other),
        }
        assert_eq!(store.record_count("pin-1"), 1);
    }

    #[tokio::test]
    async fn commit_builds_record_and_resets_game_scoped_state() {
        let time = Arc::new(ManualTimeSource::new(0));
        let mut session = controller(time.clone());
        let dir = TempDir::new().unwrap();
        let (mut sync, _) = engine(&dir);

        session.timer_mut().start().unwrap();
        time.advance_secs(600);
        session.log_goal(Side::Us).unwrap();
        session.log_goal(Side::Them).unwrap();
        session.log_goal(Side::Us).unwrap();
        session.ledger_mut().set(Stat::ShotsLeft, 4);
        session.ledger_mut().set(Stat::GoalsLeft, 2);
        session.set_notes("windy day");
        session.timer_mut().pause();

        let record = match session.commit(&mut sync, false).await {
            CommitOutcome::Committed { record, .. } => record,
            other => panic!("expected Committed, got {:?}", other),
        };

        assert_eq!(record.our_goals, 2);
        assert_eq!(record.their_goals, 1);
        assert_eq!(record.game_result, GameResult::Win);
        assert_eq!(record.halftime_minutes, 30);
        assert_eq!(record.halftime_elapsed_seconds, 600);
        assert_eq!(record.game_notes, "windy day");
        assert_eq!(record.stats.goal_conversion_rate, "50.0%");

        // Game-scoped state is fresh; session identity survives.
        assert_eq!(session.timeline().count(Side::Us), 0);
        assert_eq!(session.ledger().get(Stat::ShotsLeft), 0);
        assert_eq!(session.notes(), "");
        assert_eq!(session.timer().phase(), TimerPhase::Paused);
        assert_eq!(session.timer().elapsed_seconds(), 0);
        assert_eq!(session.timer().half_duration_seconds(), 1800);
        assert_eq!(session.info().opponent, "Harbor FC");
    }

    #[tokio::test]
    async fn commit_resets_even_when_save_degrades() {
        let time = Arc::new(ManualTimeSource::new(0));
        let mut session = controller(time);
        let dir = TempDir::new().unwrap();
        let (mut sync, store) = engine(&dir);
        store.push_failures(StoreError::Unavailable("down".to_string()), 3);

        session.ledger_mut().set(Stat::Fouls, 2);
        let (record, degraded) = match session.commit(&mut sync, false).await {
            CommitOutcome::Committed { record, degraded } => (record, degraded),
            other => panic!("expected Committed, got {:?}", other),
        };

        assert!(degraded.is_some());
        assert_eq!(record.sync_state, SyncState::LocalOnly);
        assert_eq!(sync.records().len(), 1);
        // The user can start the next game immediately.
        assert_eq!(session.ledger().get(Stat::Fouls), 0);
    }

    #[tokio::test]
    async fn commit_then_identity_update_round_trips() {
        let time = Arc::new(ManualTimeSource::new(0));
        let mut session = controller(time);
        let dir = TempDir::new().unwrap();
        let (mut sync, _) = engine(&dir);

        session.log_goal(Side::Us).unwrap();
        let record = match session.commit(&mut sync, false).await {
            CommitOutcome::Committed { record, .. } => record,
            other => panic!("expected Committed, got {:?}", other),
        };

        // Re-submit the same data as an edit.
        let patch = crate::models::GamePatch {
            goal_history: Some(record.goal_history.clone()),
            stats: Some(record.stats.clone()),
            ..Default::default()
        };
        let updated = sync.update(&record.id, &patch).await.unwrap().record.unwrap();

        assert_eq!(updated.our_goals, record.our_goals);
        assert_eq!(updated.their_goals, record.their_goals);
        assert_eq!(updated.game_result, record.game_result);
        assert_eq!(updated.goal_history, record.goal_history);
        assert_eq!(updated.stats, record.stats);
        // Only modification metadata may differ.
        assert!(updated.last_modified.is_some());
    }
}
