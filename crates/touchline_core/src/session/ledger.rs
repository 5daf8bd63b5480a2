//! Mutable stat counters for one in-progress game, plus the pure derivation
//! of rates and totals.
//!
//! All rates are derived at snapshot time and never cached; the snapshot is
//! the only thing that leaves this module, so a stale-rate bug cannot exist.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Closed enumeration of ledger stats. Every counter is a non-negative
/// integer; decrement floors at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    GoalsLeft,
    GoalsRight,
    ShotsLeft,
    ShotsRight,
    CornersTaken,
    CornerConversions,
    Offensive1v1Attempts,
    Offensive1v1Won,
    Defensive1v1Attempts,
    Defensive1v1Won,
    DefensiveTackles,
    DefensiveTackleFailures,
    DefensiveDisruptions,
    DefensiveDistributions,
    FreeKicksTaken,
    FreeKicksMade,
    Fouls,
    YellowCards,
    RedCards,
    GkShotsSaved,
    GkGoalsAllowed,
}

impl Stat {
    pub const ALL: [Stat; 21] = [
        Stat::GoalsLeft,
        Stat::GoalsRight,
        Stat::ShotsLeft,
        Stat::ShotsRight,
        Stat::CornersTaken,
        Stat::CornerConversions,
        Stat::Offensive1v1Attempts,
        Stat::Offensive1v1Won,
        Stat::Defensive1v1Attempts,
        Stat::Defensive1v1Won,
        Stat::DefensiveTackles,
        Stat::DefensiveTackleFailures,
        Stat::DefensiveDisruptions,
        Stat::DefensiveDistributions,
        Stat::FreeKicksTaken,
        Stat::FreeKicksMade,
        Stat::Fouls,
        Stat::YellowCards,
        Stat::RedCards,
        Stat::GkShotsSaved,
        Stat::GkGoalsAllowed,
    ];
}

/// Format `numerator / denominator` as a percentage with one decimal,
/// `"0%"` when the denominator is zero.
pub fn percent(numerator: u32, denominator: u32) -> String {
    if denominator == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", numerator as f64 / denominator as f64 * 100.0)
}

/// Immutable copy of the ledger with all derived fields computed at call
/// time. Also the persisted shape inside a `GameRecord`; counters default to
/// zero so records written before a stat existed still deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatSnapshot {
    pub goals_left: u32,
    pub goals_right: u32,
    pub shots_left: u32,
    pub shots_right: u32,
    pub corners_taken: u32,
    pub corner_conversions: u32,
    pub offensive_1v1_attempts: u32,
    pub offensive_1v1_won: u32,
    pub defensive_1v1_attempts: u32,
    pub defensive_1v1_won: u32,
    pub defensive_tackles: u32,
    pub defensive_tackle_failures: u32,
    pub defensive_disruptions: u32,
    pub defensive_distributions: u32,
    pub free_kicks_taken: u32,
    pub free_kicks_made: u32,
    pub fouls: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub gk_shots_saved: u32,
    pub gk_goals_allowed: u32,

    // Derived; recomputed, never edited directly.
    pub total_goals: u32,
    pub total_shots: u32,
    pub goal_conversion_rate: String,
    pub corner_conversion_rate: String,
    pub offensive_1v1_rate: String,
    pub defensive_1v1_rate: String,
    pub free_kick_conversion_rate: String,
    pub defensive_tackle_rate: String,
    pub defensive_distribution_rate: String,
}

impl Default for StatSnapshot {
    fn default() -> Self {
        let mut snapshot = Self {
            goals_left: 0,
            goals_right: 0,
            shots_left: 0,
            shots_right: 0,
            corners_taken: 0,
            corner_conversions: 0,
            offensive_1v1_attempts: 0,
            offensive_1v1_won: 0,
            defensive_1v1_attempts: 0,
            defensive_1v1_won: 0,
            defensive_tackles: 0,
            defensive_tackle_failures: 0,
            defensive_disruptions: 0,
            defensive_distributions: 0,
            free_kicks_taken: 0,
            free_kicks_made: 0,
            fouls: 0,
            yellow_cards: 0,
            red_cards: 0,
            gk_shots_saved: 0,
            gk_goals_allowed: 0,
            total_goals: 0,
            total_shots: 0,
            goal_conversion_rate: String::new(),
            corner_conversion_rate: String::new(),
            offensive_1v1_rate: String::new(),
            defensive_1v1_rate: String::new(),
            free_kick_conversion_rate: String::new(),
            defensive_tackle_rate: String::new(),
            defensive_distribution_rate: String::new(),
        };
        snapshot.recompute();
        snapshot
    }
}

impl StatSnapshot {
    /// Recompute every derived field from the raw counters. Called whenever
    /// counters change hands (snapshot, record edit, legacy deserialization).
    pub fn recompute(&mut self) {
        self.total_goals = self.goals_left + self.goals_right;
        self.total_shots = self.shots_left + self.shots_right;
        self.goal_conversion_rate = percent(self.total_goals, self.total_shots);
        self.corner_conversion_rate = percent(self.corner_conversions, self.corners_taken);
        self.offensive_1v1_rate = percent(self.offensive_1v1_won, self.offensive_1v1_attempts);
        self.defensive_1v1_rate = percent(self.defensive_1v1_won, self.defensive_1v1_attempts);
        self.free_kick_conversion_rate = percent(self.free_kicks_made, self.free_kicks_taken);
        self.defensive_tackle_rate = percent(
            self.defensive_tackles.saturating_sub(self.defensive_tackle_failures),
            self.defensive_tackles,
        );
        self.defensive_distribution_rate =
            percent(self.defensive_distributions, self.defensive_disruptions);
    }
}

/// The live counters. One aggregate object with an enumerated key set so a
/// single validation pass and a single derivation function cover everything.
#[derive(Debug, Default)]
pub struct StatLedger {
    counters: HashMap<Stat, u32>,
}

impl StatLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stat: Stat) -> u32 {
        self.counters.get(&stat).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, stat: Stat) -> u32 {
        let counter = self.counters.entry(stat).or_insert(0);
        *counter = counter.saturating_add(1);
        *counter
    }

    /// Decrement floors at zero; a decrement of an empty counter is a no-op.
    pub fn decrement(&mut self, stat: Stat) -> u32 {
        let counter = self.counters.entry(stat).or_insert(0);
        *counter = counter.saturating_sub(1);
        *counter
    }

    pub fn set(&mut self, stat: Stat, value: u32) {
        self.counters.insert(stat, value);
    }

    pub fn reset(&mut self) {
        self.counters.clear();
    }

    /// Immutable copy with all derived rates computed now.
    pub fn snapshot(&self) -> StatSnapshot {
        let mut snapshot = StatSnapshot {
            goals_left: self.get(Stat::GoalsLeft),
            goals_right: self.get(Stat::GoalsRight),
            shots_left: self.get(Stat::ShotsLeft),
            shots_right: self.get(Stat::ShotsRight),
            corners_taken: self.get(Stat::CornersTaken),
            corner_conversions: self.get(Stat::CornerConversions),
            offensive_1v1_attempts: self.get(Stat::Offensive1v1Attempts),
            offensive_1v1_won: self.get(Stat::Offensive1v1Won),
            defensive_1v1_attempts: self.get(Stat::Defensive1v1Attempts),
            defensive_1v1_won: self.get(Stat::Defensive1v1Won),
            defensive_tackles: self.get(Stat::DefensiveTackles),
            defensive_tackle_failures: self.get(Stat::DefensiveTackleFailures),
            defensive_disruptions: self.get(Stat::DefensiveDisruptions),
            defensive_distributions: self.get(Stat::DefensiveDistributions),
            free_kicks_taken: self.get(Stat::FreeKicksTaken),
            free_kicks_made: self.get(Stat::FreeKicksMade),
            fouls: self.get(Stat::Fouls),
            yellow_cards: self.get(Stat::YellowCards),
            red_cards: self.get(Stat::RedCards),
            gk_shots_saved: self.get(Stat::GkShotsSaved),
            gk_goals_allowed: self.get(Stat::GkGoalsAllowed),
            ..StatSnapshot::default()
        };
        snapshot.recompute();
        snapshot
    }

    /// Soft consistency warnings. These never block; the session controller
    /// surfaces them and asks for explicit confirmation before a commit.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.get(Stat::GoalsLeft) > self.get(Stat::ShotsLeft) {
            warnings.push("left foot goals exceed shots".to_string());
        }
        if self.get(Stat::GoalsRight) > self.get(Stat::ShotsRight) {
            warnings.push("right foot goals exceed shots".to_string());
        }
        if self.get(Stat::CornerConversions) > self.get(Stat::CornersTaken) {
            warnings.push("corner conversions exceed corners taken".to_string());
        }
        if self.get(Stat::Offensive1v1Won) > self.get(Stat::Offensive1v1Attempts) {
            warnings.push("offensive 1v1 wins exceed attempts".to_string());
        }
        if self.get(Stat::Defensive1v1Won) > self.get(Stat::Defensive1v1Attempts) {
            warnings.push("defensive 1v1 wins exceed attempts".to_string());
        }
        if self.get(Stat::FreeKicksMade) > self.get(Stat::FreeKicksTaken) {
            warnings.push("free kicks made exceed free kicks taken".to_string());
        }
        if self.get(Stat::DefensiveTackleFailures) > self.get(Stat::DefensiveTackles) {
            warnings.push("defensive failures exceed tackles".to_string());
        }
        if self.get(Stat::DefensiveDistributions) > self.get(Stat::DefensiveDisruptions) {
            warnings.push("defensive distributions exceed disruptions".to_string());
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn increment_and_get() {
        let mut ledger = StatLedger::new();
        assert_eq!(ledger.get(Stat::Fouls), 0);
        ledger.increment(Stat::Fouls);
        ledger.increment(Stat::Fouls);
        assert_eq!(ledger.get(Stat::Fouls), 2);
    }

    #[test]
    fn decrement_floors_at_zero() {
        let mut ledger = StatLedger::new();
        assert_eq!(ledger.decrement(Stat::ShotsLeft), 0);
        ledger.increment(Stat::ShotsLeft);
        ledger.decrement(Stat::ShotsLeft);
        ledger.decrement(Stat::ShotsLeft);
        assert_eq!(ledger.get(Stat::ShotsLeft), 0);
    }

    #[test]
    fn zero_denominator_rates_render_as_plain_zero() {
        let ledger = StatLedger::new();
        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.goal_conversion_rate, "0%");
        assert_eq!(snapshot.corner_conversion_rate, "0%");
        assert_eq!(snapshot.defensive_tackle_rate, "0%");
    }

    #[test]
    fn goal_conversion_rate_has_one_decimal() {
        let mut ledger = StatLedger::new();
        ledger.set(Stat::GoalsLeft, 1);
        ledger.set(Stat::ShotsLeft, 2);
        ledger.set(Stat::ShotsRight, 1);
        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.total_goals, 1);
        assert_eq!(snapshot.total_shots, 3);
        assert_eq!(snapshot.goal_conversion_rate, "33.3%");
    }

    #[test]
    fn tackle_rate_subtracts_failures() {
        let mut ledger = StatLedger::new();
        ledger.set(Stat::DefensiveTackles, 8);
        ledger.set(Stat::DefensiveTackleFailures, 2);
        assert_eq!(ledger.snapshot().defensive_tackle_rate, "75.0%");
    }

    #[test]
    fn validate_flags_goals_exceeding_shots() {
        let mut ledger = StatLedger::new();
        ledger.set(Stat::ShotsLeft, 2);
        ledger.set(Stat::GoalsLeft, 3);
        let warnings = ledger.validate();
        assert!(warnings.iter().any(|w| w == "left foot goals exceed shots"));
    }

    #[test]
    fn validate_is_quiet_for_consistent_counters() {
        let mut ledger = StatLedger::new();
        ledger.set(Stat::ShotsLeft, 4);
        ledger.set(Stat::GoalsLeft, 2);
        ledger.set(Stat::DefensiveTackles, 5);
        ledger.set(Stat::DefensiveTackleFailures, 1);
        assert!(ledger.validate().is_empty());
    }

    #[test]
    fn snapshot_is_a_copy_not_a_view() {
        let mut ledger = StatLedger::new();
        ledger.set(Stat::Fouls, 1);
        let snapshot = ledger.snapshot();
        ledger.increment(Stat::Fouls);
        assert_eq!(snapshot.fouls, 1);
    }

    #[test]
    fn reset_zeroes_every_stat() {
        let mut ledger = StatLedger::new();
        for stat in Stat::ALL {
            ledger.increment(stat);
        }
        ledger.reset();
        for stat in Stat::ALL {
            assert_eq!(ledger.get(stat), 0);
        }
    }

    proptest! {
        #[test]
        fn counters_match_saturating_model(ops in proptest::collection::vec(any::<bool>(), 0..64)) {
            let mut ledger = StatLedger::new();
            let mut expected: u32 = 0;
            for increment in ops {
                if increment {
                    ledger.increment(Stat::CornersTaken);
                    expected = expected.saturating_add(1);
                } else {
                    ledger.decrement(Stat::CornersTaken);
                    expected = expected.saturating_sub(1);
                }
                prop_assert_eq!(ledger.get(Stat::CornersTaken), expected);
            }
        }

        #[test]
        fn percent_stays_in_range_for_valid_ratios(n in 0u32..500, d in 1u32..500) {
            let n = n.min(d);
            let formatted = percent(n, d);
            prop_assert!(formatted.ends_with('%'));
            let value: f64 = formatted.trim_end_matches('%').parse().unwrap();
            prop_assert!((0.0..=100.0).contains(&value));
        }
    }
}
