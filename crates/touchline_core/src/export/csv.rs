//! Row-oriented CSV export: one row per game plus a synthetic totals row.

use crate::error::ExportError;
use crate::models::{GameRecord, GameResult, GameType, SyncState};
use crate::session::goal_timeline::GoalEvent;
use crate::session::ledger::percent;

const HEADER: [&str; 25] = [
    "date",
    "player",
    "opponent",
    "game_type",
    "our_goals",
    "their_goals",
    "result",
    "goal_minutes_us",
    "goal_minutes_them",
    "half_minutes",
    "minutes_played",
    "total_shots",
    "goal_conversion_rate",
    "corners_taken",
    "corner_conversion_rate",
    "offensive_1v1_rate",
    "defensive_tackle_rate",
    "free_kicks_taken",
    "free_kick_conversion_rate",
    "fouls",
    "yellow_cards",
    "red_cards",
    "gk_shots_saved",
    "sync_state",
    "notes",
];

fn game_type_label(game_type: GameType) -> &'static str {
    match game_type {
        GameType::League => "League",
        GameType::Tournament => "Tournament",
        GameType::Showcase => "Showcase",
        GameType::Scrimmage => "Scrimmage",
    }
}

fn result_label(result: GameResult) -> &'static str {
    match result {
        GameResult::Win => "Win",
        GameResult::Loss => "Loss",
        GameResult::Tie => "Tie",
    }
}

fn sync_state_label(state: SyncState) -> &'static str {
    match state {
        SyncState::Synced => "synced",
        SyncState::LocalOnly => "local-only",
    }
}

fn goal_minutes(goals: &[GoalEvent]) -> String {
    let mut sorted: Vec<&GoalEvent> = goals.iter().collect();
    sorted.sort_by_key(|g| (g.game_clock_seconds, g.sequence));
    sorted.iter().map(|g| g.minute.to_string()).collect::<Vec<_>>().join(";")
}

fn record_row(record: &GameRecord) -> Vec<String> {
    let stats = &record.stats;
    vec![
        record.date.to_string(),
        record.player_name.clone(),
        record.opponent.clone(),
        game_type_label(record.game_type).to_string(),
        record.our_goals.to_string(),
        record.their_goals.to_string(),
        result_label(record.game_result).to_string(),
        goal_minutes(&record.goal_history.us),
        goal_minutes(&record.goal_history.them),
        record.halftime_minutes.to_string(),
        record.player_minutes_played.to_string(),
        stats.total_shots.to_string(),
        stats.goal_conversion_rate.clone(),
        stats.corners_taken.to_string(),
        stats.corner_conversion_rate.clone(),
        stats.offensive_1v1_rate.clone(),
        stats.defensive_tackle_rate.clone(),
        stats.free_kicks_taken.to_string(),
        stats.free_kick_conversion_rate.clone(),
        stats.fouls.to_string(),
        stats.yellow_cards.to_string(),
        stats.red_cards.to_string(),
        stats.gk_shots_saved.to_string(),
        sync_state_label(record.sync_state).to_string(),
        record.game_notes.clone(),
    ]
}

/// Aggregate rates in the totals row are recomputed from summed counters,
/// not averaged from per-game strings.
fn summary_row(records: &[GameRecord]) -> Vec<String> {
    let mut wins = 0u32;
    let mut losses = 0u32;
    let mut ties = 0u32;
    let mut our_goals = 0u32;
    let mut their_goals = 0u32;
    let mut minutes = 0u32;
    let mut ledger_goals = 0u32;
    let mut shots = 0u32;
    let mut corners = 0u32;
    let mut corner_conversions = 0u32;
    let mut o1v1_attempts = 0u32;
    let mut o1v1_won = 0u32;
    let mut tackles = 0u32;
    let mut tackle_failures = 0u32;
    let mut free_kicks_taken = 0u32;
    let mut free_kicks_made = 0u32;
    let mut fouls = 0u32;
    let mut yellows = 0u32;
    let mut reds = 0u32;
    let mut saves = 0u32;

    for record in records {
        match record.game_result {
            GameResult::Win => wins += 1,
            GameResult::Loss => losses += 1,
            GameResult::Tie => ties += 1,
        }
        our_goals += record.our_goals;
        their_goals += record.their_goals;
        minutes += record.player_minutes_played;
        let stats = &record.stats;
        ledger_goals += stats.total_goals;
        shots += stats.total_shots;
        corners += stats.corners_taken;
        corner_conversions += stats.corner_conversions;
        o1v1_attempts += stats.offensive_1v1_attempts;
        o1v1_won += stats.offensive_1v1_won;
        tackles += stats.defensive_tackles;
        tackle_failures += stats.defensive_tackle_failures;
        free_kicks_taken += stats.free_kicks_taken;
        free_kicks_made += stats.free_kicks_made;
        fouls += stats.fouls;
        yellows += stats.yellow_cards;
        reds += stats.red_cards;
        saves += stats.gk_shots_saved;
    }

    vec![
        "TOTALS".to_string(),
        String::new(),
        String::new(),
        format!("{} games", records.len()),
        our_goals.to_string(),
        their_goals.to_string(),
        format!("{}W-{}L-{}T", wins, losses, ties),
        String::new(),
        String::new(),
        String::new(),
        minutes.to_string(),
        shots.to_string(),
        percent(ledger_goals, shots),
        corners.to_string(),
        percent(corner_conversions, corners),
        percent(o1v1_won, o1v1_attempts),
        percent(tackles.saturating_sub(tackle_failures), tackles),
        free_kicks_taken.to_string(),
        percent(free_kicks_made, free_kicks_taken),
        fouls.to_string(),
        yellows.to_string(),
        reds.to_string(),
        saves.to_string(),
        String::new(),
        String::new(),
    ]
}

/// Write records plus the totals row to any writer.
pub fn write_csv<W: std::io::Write>(records: &[GameRecord], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;
    for record in records {
        csv_writer.write_record(record_row(record))?;
    }
    csv_writer.write_record(summary_row(records))?;
    csv_writer.flush()?;
    Ok(())
}

/// Render the full export as a string.
pub fn csv_string(records: &[GameRecord]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_csv(records, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_fixtures::sample_record;

    #[test]
    fn one_row_per_record_plus_header_and_totals() {
        let records = vec![sample_record(), sample_record()];
        let out = csv_string(&records).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("date,player,opponent"));
        assert!(lines[3].starts_with("TOTALS"));
    }

    #[test]
    fn goal_minutes_are_clock_ordered() {
        let record = sample_record();
        let out = csv_string(&[record]).unwrap();
        let row = out.lines().nth(1).unwrap();
        // Goals at 120s and 900s for us -> minutes 2 and 15.
        assert!(row.contains("2;15"));
    }

    #[test]
    fn totals_row_recomputes_rates_from_sums() {
        let mut first = sample_record();
        first.stats.shots_left = 2;
        first.stats.goals_left = 1;
        first.stats.recompute();
        let mut second = sample_record();
        second.stats.shots_left = 2;
        second.stats.goals_left = 0;
        second.stats.recompute();

        let out = csv_string(&[first, second]).unwrap();
        let totals = out.lines().last().unwrap();
        // 1 goal on 4 shots across both games.
        assert!(totals.contains("25.0%"));
        assert!(totals.contains("2W-0L-0T"));
    }

    #[test]
    fn empty_history_still_yields_header_and_totals() {
        let out = csv_string(&[]).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("0 games"));
        // Zero-denominator aggregate rates render as plain zero.
        assert!(lines[1].contains("0%"));
    }
}
