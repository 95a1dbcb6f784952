//! Adjustment policy: decide from history whether the plan has become too easy.

use crate::model::{Rpe, SessionLog};

/// History is only checked after every this-many sessions.
const CHECK_EVERY: usize = 4;

/// How many of the most recent sessions are inspected.
const RECENT_WINDOW: usize = 2;

/// Sessions at or below this RPE count as easy.
const EASY_CEILING: u8 = 6;

/// What an unrated session counts as. Only ever applied here.
const UNRATED_AS: u8 = 10;

/// Returns true when the plan should progress.
///
/// Checked on the 4th, 8th, 12th, ... session only. Fires when every one of
/// the last two sessions was rated 6 or lower; a skipped rating counts as 10.
pub fn should_adjust(history: &[SessionLog]) -> bool {
    if history.is_empty() || history.len() % CHECK_EVERY != 0 {
        return false;
    }
    history[history.len() - RECENT_WINDOW..]
        .iter()
        .all(|s| effort(s.rpe) <= EASY_CEILING)
}

/// The last two sessions, as sent along with an adjustment request.
pub fn recent_sessions(history: &[SessionLog]) -> &[SessionLog] {
    &history[history.len().saturating_sub(RECENT_WINDOW)..]
}

fn effort(rpe: Rpe) -> u8 {
    rpe.value().unwrap_or(UNRATED_AS)
}
