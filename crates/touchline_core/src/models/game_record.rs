//! Persisted match record and the explicit edit patch.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::session::goal_timeline::GoalHistory;
use crate::session::ledger::StatSnapshot;

/// Record format version, bumped when persisted fields change meaning.
/// Counters absent from older records deserialize as zero (see
/// `StatSnapshot`), so reads never assert field presence.
pub const RECORD_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    League,
    Tournament,
    Showcase,
    Scrimmage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Win,
    Loss,
    Tie,
}

impl GameResult {
    /// Pure function of the final score.
    pub fn from_score(our_goals: u32, their_goals: u32) -> Self {
        match our_goals.cmp(&their_goals) {
            std::cmp::Ordering::Greater => GameResult::Win,
            std::cmp::Ordering::Less => GameResult::Loss,
            std::cmp::Ordering::Equal => GameResult::Tie,
        }
    }
}

/// Whether a record is confirmed durable remotely or only exists in the
/// local fallback cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SyncState {
    #[default]
    LocalOnly,
    Synced,
}

/// One committed game. Immutable after creation except through
/// [`GamePatch::apply_to`], which re-derives every derived field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Remote-assigned id, or `local-<uuid>` while the record is local-only.
    pub id: String,
    pub date: NaiveDate,
    pub player_name: String,
    pub opponent: String,
    pub game_type: GameType,
    pub our_goals: u32,
    pub their_goals: u32,
    pub game_result: GameResult,
    #[serde(default)]
    pub goal_history: GoalHistory,
    pub halftime_minutes: u32,
    pub halftime_elapsed_seconds: u32,
    pub halftime_remaining_seconds: u32,
    pub halftime_complete: bool,
    pub player_minutes_played: u32,
    #[serde(default)]
    pub stats: StatSnapshot,
    #[serde(default)]
    pub game_notes: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sync_state: SyncState,
}

fn default_schema_version() -> u32 {
    RECORD_SCHEMA_VERSION
}

impl GameRecord {
    /// Recompute everything derived from primary state: goal counts from the
    /// timeline snapshot, the result from the counts, and all ledger rates.
    /// Holds the record invariants after creation and after any edit.
    pub fn rederive(&mut self) {
        self.our_goals = self.goal_history.us.len() as u32;
        self.their_goals = self.goal_history.them.len() as u32;
        self.game_result = GameResult::from_score(self.our_goals, self.their_goals);
        self.stats.recompute();
    }

    pub fn is_local_only(&self) -> bool {
        self.sync_state == SyncState::LocalOnly
    }
}

/// Editable subset of a record. `None` fields are left untouched; applying a
/// patch always re-derives goals, result and rates, and stamps
/// `last_modified`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GamePatch {
    pub date: Option<NaiveDate>,
    pub opponent: Option<String>,
    pub game_type: Option<GameType>,
    pub goal_history: Option<GoalHistory>,
    pub stats: Option<StatSnapshot>,
    pub halftime_minutes: Option<u32>,
    pub player_minutes_played: Option<u32>,
    pub game_notes: Option<String>,
}

impl GamePatch {
    pub fn apply_to(&self, record: &mut GameRecord) {
        if let Some(date) = self.date {
            record.date = date;
        }
        if let Some(opponent) = &self.opponent {
            record.opponent = opponent.clone();
        }
        if let Some(game_type) = self.game_type {
            record.game_type = game_type;
        }
        if let Some(goal_history) = &self.goal_history {
            record.goal_history = goal_history.clone();
        }
        if let Some(stats) = &self.stats {
            record.stats = stats.clone();
        }
        if let Some(minutes) = self.halftime_minutes {
            record.halftime_minutes = minutes;
        }
        if let Some(minutes) = self.player_minutes_played {
            record.player_minutes_played = minutes;
        }
        if let Some(notes) = &self.game_notes {
            record.game_notes = notes.clone();
        }
        record.rederive();
        record.last_modified = Some(Utc::now());
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.opponent.is_none()
            && self.game_type.is_none()
            && self.goal_history.is_none()
            && self.stats.is_none()
            && self.halftime_minutes.is_none()
            && self.player_minutes_played.is_none()
            && self.game_notes.is_none()
    }
}
