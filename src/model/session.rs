//! Session logs: completed workouts.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::plan::{Day, Exercise};
use super::rpe::Rpe;

/// A completed workout occurrence.
///
/// Immutable once created. Appended to history, never edited or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLog {
    /// The id of the plan day this session came from.
    pub id: String,

    pub name: String,

    /// Exercises as actually performed.
    pub exercises: Vec<Exercise>,

    pub is_completed: bool,

    #[serde(default)]
    pub rpe: Rpe,

    pub completed_at: Timestamp,
}

impl SessionLog {
    /// Builds a completed log from the day it was performed against.
    pub fn from_day(day: &Day, rpe: Rpe, completed_at: Timestamp) -> Self {
        Self {
            id: day.id.clone(),
            name: day.name.clone(),
            exercises: day.exercises.clone(),
            is_completed: true,
            rpe,
            completed_at,
        }
    }

    /// Total work: sets times reps (or seconds for timed exercises).
    ///
    /// Saturates at `u32::MAX`; plan values come from a remote model unchecked.
    pub fn volume(&self) -> u32 {
        self.exercises
            .iter()
            .map(|e| e.sets.saturating_mul(e.target.amount()))
            .fold(0, u32::saturating_add)
    }
}
