//! Standings and the text summaries built from them.

use std::fmt::Write;

use crate::protocol::NUM_OPTIONS;

use super::state::Player;

/// Participants ordered by score, highest first. Players with equal scores
/// keep their registration order. The admin is never ranked.
pub fn rank<'a, I>(players: I) -> Vec<&'a Player>
where
    I: IntoIterator<Item = &'a Player>,
{
    let mut ranked: Vec<&Player> = players.into_iter().filter(|p| !p.is_admin()).collect();
    ranked.sort_by_key(|p| p.joined);
    // `sort_by` is stable, so ties stay in registration order.
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// First-ranked participant, if any.
pub fn winner<'a>(ranked: &[&'a Player]) -> Option<&'a Player> {
    ranked.first().copied()
}

fn write_standings(summary: &mut String, ranked: &[&Player]) {
    if ranked.is_empty() {
        summary.push_str("No players took part.");
        return;
    }
    for (i, player) in ranked.iter().enumerate() {
        if i > 0 {
            summary.push('\n');
        }
        let _ = write!(summary, "{}. {}: {} points", i + 1, player.name, player.score);
    }
}

/// Payload of `ROUND_OVER`: the correct answer followed by the standings.
pub fn round_summary(options: &[String; NUM_OPTIONS], correct: usize, ranked: &[&Player]) -> String {
    let mut summary = String::from("=== ROUND RESULTS ===\n");
    if let Some(option) = options.get(correct.wrapping_sub(1)) {
        let _ = writeln!(summary, "Correct answer: {correct}. {option}");
    }
    write_standings(&mut summary, ranked);
    summary
}

/// Payload of `GAME_OVER`: final standings and the winner.
pub fn final_summary(ranked: &[&Player]) -> String {
    let mut summary = String::from("=== FINAL SCORES ===\n");
    write_standings(&mut summary, ranked);
    if let Some(player) = winner(ranked) {
        let _ = write!(summary, "\nWINNER: {}!", player.name);
    }
    summary
}
