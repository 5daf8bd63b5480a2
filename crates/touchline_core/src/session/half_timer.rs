//! Two-half game timer built on [`Clock`].
//!
//! The timer owns its clock exclusively. Time-up is never an explicit call:
//! the tick that observes elapsed >= half duration clamps the clock to the
//! boundary, force-pauses it and latches the time-up flag. Observers (UI,
//! audio cues) consume the returned tick snapshots; nothing here depends on
//! whether anyone is listening.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::clock::{Clock, TimeSource};
use crate::error::SessionError;

pub const MAX_HALF_DURATION_SECONDS: u32 = 90 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Half {
    First,
    Second,
}

/// Phase of the current half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Running,
    Paused,
    TimeUp,
}

/// Snapshot returned by [`HalfTimer::tick`] for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    pub half: Half,
    pub phase: TimerPhase,
    /// Seconds elapsed within the current half, clamped to the half duration.
    pub elapsed_seconds: u32,
    pub remaining_seconds: u32,
    /// Cumulative game seconds across both halves.
    pub total_game_seconds: u32,
    /// True only on the tick that crossed the half boundary.
    pub reached_time_up: bool,
}

pub struct HalfTimer {
    half: Half,
    clock: Clock,
    half_duration_seconds: u32,
    time_up: bool,
}

impl HalfTimer {
    /// New timer in `FIRST_PAUSED` with a zeroed clock.
    pub fn new(time: Arc<dyn TimeSource>, half_duration_seconds: u32) -> Result<Self, SessionError> {
        Self::validate_duration(half_duration_seconds)?;
        Ok(Self {
            half: Half::First,
            clock: Clock::new(time),
            half_duration_seconds,
            time_up: false,
        })
    }

    fn validate_duration(seconds: u32) -> Result<(), SessionError> {
        if seconds == 0 || seconds > MAX_HALF_DURATION_SECONDS {
            return Err(SessionError::InvalidHalfDuration { seconds });
        }
        Ok(())
    }

    pub fn half(&self) -> Half {
        self.half
    }

    pub fn half_duration_seconds(&self) -> u32 {
        self.half_duration_seconds
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn is_time_up(&self) -> bool {
        self.time_up
    }

    /// Terminal state: the second half has ended.
    pub fn is_game_complete(&self) -> bool {
        self.half == Half::Second && self.time_up
    }

    pub fn phase(&self) -> TimerPhase {
        if self.time_up {
            TimerPhase::TimeUp
        } else if self.clock.is_running() {
            TimerPhase::Running
        } else {
            TimerPhase::Paused
        }
    }

    /// Seconds elapsed in the current half, never past the half duration.
    pub fn elapsed_seconds(&self) -> u32 {
        self.clock.elapsed_seconds().min(self.half_duration_seconds)
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.half_duration_seconds - self.elapsed_seconds()
    }

    /// Cumulative game seconds: first-half elapsed, or a full first half plus
    /// second-half elapsed.
    pub fn total_game_seconds(&self) -> u32 {
        match self.half {
            Half::First => self.elapsed_seconds(),
            Half::Second => self.half_duration_seconds + self.elapsed_seconds(),
        }
    }

    /// Resume the current half. Rejected once the half is over; a no-op when
    /// already running.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.time_up {
            return Err(SessionError::TimeUp { half: self.half });
        }
        self.clock.start();
        Ok(())
    }

    /// Pause the current half. No-op when not running.
    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Recompute state from the wall clock. Call at the poll interval; the
    /// cadence only bounds how late the time-up latch fires, never accuracy.
    pub fn tick(&mut self) -> TimerTick {
        let mut reached_time_up = false;
        if !self.time_up && self.clock.elapsed_seconds() >= self.half_duration_seconds {
            // Clamp, not just compare: the stored total must land exactly on
            // the boundary even when the poll arrives late.
            self.clock.pause_clamped(self.half_duration_seconds);
            self.time_up = true;
            reached_time_up = true;
            log::debug!("half timer reached time-up in {:?} half", self.half);
        }
        TimerTick {
            half: self.half,
            phase: self.phase(),
            elapsed_seconds: self.elapsed_seconds(),
            remaining_seconds: self.remaining_seconds(),
            total_game_seconds: self.total_game_seconds(),
            reached_time_up,
        }
    }

    /// Move from `FIRST_TIME_UP` to `SECOND_PAUSED` with a fresh clock.
    pub fn start_second_half(&mut self) -> Result<(), SessionError> {
        if self.half != Half::First || !self.time_up {
            return Err(SessionError::SecondHalfNotReady);
        }
        self.clock.reset();
        self.half = Half::Second;
        self.time_up = false;
        Ok(())
    }

    /// Back to `FIRST_PAUSED` with a zeroed clock, from any state.
    pub fn reset_game(&mut self) {
        self.clock.reset();
        self.half = Half::First;
        self.time_up = false;
    }

    /// Change the half duration. Only allowed while the clock is paused, and
    /// implies a full game reset.
    pub fn set_half_duration_seconds(&mut self, seconds: u32) -> Result<(), SessionError> {
        Self::validate_duration(seconds)?;
        if self.clock.is_running() {
            return Err(SessionError::TimerRunning);
        }
        self.half_duration_seconds = seconds;
        self.reset_game();
        Ok(())
    }
}
