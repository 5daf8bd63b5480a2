//! Ordered, mutable log of scoring events for one game.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Which team scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Us,
    Them,
}

/// A single goal, tagged with the game-clock position at entry time.
///
/// `sequence` is the identity key: it is assigned once at insertion and never
/// changes, even when the clock position is edited later. Ordering for
/// display is `(game_clock_seconds, sequence)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalEvent {
    pub side: Side,
    pub game_clock_seconds: u32,
    pub minute: u32,
    pub sequence: u64,
}

impl GoalEvent {
    fn new(side: Side, game_clock_seconds: u32, sequence: u64) -> Self {
        Self { side, game_clock_seconds, minute: game_clock_seconds / 60, sequence }
    }
}

/// Immutable per-game snapshot persisted inside a `GameRecord`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GoalHistory {
    #[serde(default)]
    pub us: Vec<GoalEvent>,
    #[serde(default)]
    pub them: Vec<GoalEvent>,
}

impl GoalHistory {
    /// All goals ordered by `(game_clock_seconds, sequence)`.
    pub fn merged(&self) -> Vec<GoalEvent> {
        let mut all: Vec<GoalEvent> = self.us.iter().chain(self.them.iter()).copied().collect();
        all.sort_by_key(|g| (g.game_clock_seconds, g.sequence));
        all
    }
}

pub const DEFAULT_GOAL_CAPACITY: usize = 20;

pub struct GoalTimeline {
    us: Vec<GoalEvent>,
    them: Vec<GoalEvent>,
    next_sequence: u64,
    capacity_per_side: usize,
}

impl Default for GoalTimeline {
    fn default() -> Self {
        Self::new(DEFAULT_GOAL_CAPACITY)
    }
}

impl GoalTimeline {
    pub fn new(capacity_per_side: usize) -> Self {
        Self { us: Vec::new(), them: Vec::new(), next_sequence: 0, capacity_per_side }
    }

    fn entries(&self, side: Side) -> &Vec<GoalEvent> {
        match side {
            Side::Us => &self.us,
            Side::Them => &self.them,
        }
    }

    fn entries_mut(&mut self, side: Side) -> &mut Vec<GoalEvent> {
        match side {
            Side::Us => &mut self.us,
            Side::Them => &mut self.them,
        }
    }

    pub fn count(&self, side: Side) -> usize {
        self.entries(side).len()
    }

    /// Append a goal at the given clock position. Rejects with
    /// `CapacityExceeded` (no state change) once the side is full.
    pub fn add_goal(&mut self, side: Side, game_clock_seconds: u32) -> Result<GoalEvent, SessionError> {
        if self.count(side) >= self.capacity_per_side {
            return Err(SessionError::CapacityExceeded { side, capacity: self.capacity_per_side });
        }
        let event = GoalEvent::new(side, game_clock_seconds, self.next_sequence);
        self.next_sequence += 1;
        self.entries_mut(side).push(event);
        Ok(event)
    }

    /// Remove the most recently inserted goal for the side, if any.
    pub fn remove_last(&mut self, side: Side) -> Option<GoalEvent> {
        let entries = self.entries_mut(side);
        let last = entries
            .iter()
            .enumerate()
            .max_by_key(|(_, g)| g.sequence)
            .map(|(i, _)| i)?;
        Some(entries.remove(last))
    }

    /// Move an existing goal to a new clock position. The minute is
    /// recomputed; the sequence (identity) is untouched.
    pub fn edit_entry(
        &mut self,
        side: Side,
        index: usize,
        new_clock_seconds: u32,
    ) -> Result<GoalEvent, SessionError> {
        let entries = self.entries_mut(side);
        let entry = entries
            .get_mut(index)
            .ok_or(SessionError::GoalIndexOutOfRange { side, index })?;
        entry.game_clock_seconds = new_clock_seconds;
        entry.minute = new_clock_seconds / 60;
        Ok(*entry)
    }

    /// Restartable ordered walk over all goals, sorted by
    /// `(game_clock_seconds, sequence)`.
    pub fn merged(&self) -> impl Iterator<Item = GoalEvent> {
        let mut all: Vec<GoalEvent> = self.us.iter().chain(self.them.iter()).copied().collect();
        all.sort_by_key(|g| (g.game_clock_seconds, g.sequence));
        all.into_iter()
    }

    pub fn snapshot(&self) -> GoalHistory {
        GoalHistory { us: self.us.clone(), them: self.them.clone() }
    }

    pub fn clear(&mut self) {
        self.us.clear();
        self.them.clear();
        self.next_sequence = 0;
    }
}
