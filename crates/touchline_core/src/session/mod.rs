//! Live game-session engine: clock, half timer, goal timeline, stat ledger
//! and the controller that composes them.

pub mod clock;
pub mod controller;
pub mod goal_timeline;
pub mod half_timer;
pub mod ledger;

pub use clock::{Clock, ManualTimeSource, SystemTimeSource, TimeSource};
pub use controller::{CommitOutcome, GameInfo, SessionController};
pub use goal_timeline::{GoalEvent, GoalHistory, GoalTimeline, Side, DEFAULT_GOAL_CAPACITY};
pub use half_timer::{Half, HalfTimer, TimerPhase, TimerTick, MAX_HALF_DURATION_SECONDS};
pub use ledger::{percent, Stat, StatLedger, StatSnapshot};
