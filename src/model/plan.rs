//! Workout plan types: the mesocycle handed out by the planner.

use serde::{Deserialize, Serialize};

use super::rpe::Rpe;

/// A multi-week training block.
///
/// Created once by initial generation and replaced wholesale by every
/// successful adjustment. Never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    pub id: String,
    pub weeks: Vec<Week>,
}

/// One week of the mesocycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    pub id: String,

    /// Week number within the mesocycle, starting at 1.
    pub week: u32,

    /// The week's focus, e.g. "Volume Increase".
    pub description: String,

    pub days: Vec<Day>,
}

/// A single scheduled workout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    /// Unique within a plan. Session logs reference days by this id.
    pub id: String,

    /// Day number within the week.
    pub day: u32,

    pub name: String,
    pub exercises: Vec<Exercise>,
    pub is_completed: bool,

    /// Copied in from the session log once the day is recorded.
    #[serde(default, skip_serializing_if = "Rpe::is_unrated")]
    pub rpe: Rpe,
}

/// One exercise prescription within a day.
///
/// Persisted in the flat `reps` / `duration` shape; see [`Target`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawExercise", into = "RawExercise")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub sets: u32,
    pub target: Target,

    /// Rest between sets, in seconds.
    pub rest: u32,
}

/// What a single set asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A rep count. Zero means as many reps as possible.
    Reps { count: u32 },

    /// A hold or interval, in seconds.
    Timed { seconds: u32 },
}

impl Target {
    /// The per-set amount used for volume: reps, or seconds for timed sets.
    pub fn amount(self) -> u32 {
        match self {
            Self::Reps { count } => count,
            Self::Timed { seconds } => seconds,
        }
    }
}

/// An exercise with neither a rep nor a duration target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("exercise {0} has neither reps nor duration")]
pub struct MissingTarget(pub String);

/// Wire and storage shape of an exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExercise {
    id: String,
    name: String,
    sets: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<u32>,
    rest: u32,
}

impl TryFrom<RawExercise> for Exercise {
    type Error = MissingTarget;

    // A non-zero duration marks a timed exercise even if reps came along too.
    fn try_from(raw: RawExercise) -> Result<Self, Self::Error> {
        let target = match (raw.reps, raw.duration) {
            (_, Some(seconds)) if seconds > 0 => Target::Timed { seconds },
            (Some(count), _) => Target::Reps { count },
            (None, _) => return Err(MissingTarget(raw.id)),
        };
        Ok(Self {
            id: raw.id,
            name: raw.name,
            sets: raw.sets,
            target,
            rest: raw.rest,
        })
    }
}

impl From<Exercise> for RawExercise {
    fn from(exercise: Exercise) -> Self {
        let (reps, duration) = match exercise.target {
            Target::Reps { count } => (Some(count), None),
            Target::Timed { seconds } => (None, Some(seconds)),
        };
        Self {
            id: exercise.id,
            name: exercise.name,
            sets: exercise.sets,
            reps,
            duration,
            rest: exercise.rest,
        }
    }
}

impl WorkoutPlan {
    /// Finds a day by id across all weeks.
    pub fn find_day(&self, day_id: &str) -> Option<&Day> {
        self.weeks
            .iter()
            .flat_map(|w| w.days.iter())
            .find(|d| d.id == day_id)
    }

    /// Index of the first week that still has an unfinished day.
    ///
    /// Falls back to the first week when everything is done.
    pub fn current_week_index(&self) -> usize {
        self.weeks
            .iter()
            .position(|w| w.days.iter().any(|d| !d.is_completed))
            .unwrap_or(0)
    }
}
