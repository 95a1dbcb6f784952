//! Guided walkthrough of one plan day.
//!
//! A pure state machine; the caller drives timing and input. The position
//! moves when a set is done, so while resting it already names the set that
//! comes next.

use jiff::Timestamp;

use crate::model::{Day, Exercise, Rpe, SessionLog};

/// Seconds counted down before the first set.
pub const COUNTDOWN_SECS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Countdown,
    Exercise,
    Rest,
    Finished,
}

/// What follows the current set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextUp<'a> {
    Set { number: u32, exercise: &'a str },
    Exercise(&'a str),
    FinalExercise,
}

#[derive(Debug, Clone)]
pub struct Walkthrough<'a> {
    day: &'a Day,
    exercise: usize,
    set: u32,
    phase: Phase,
}

impl<'a> Walkthrough<'a> {
    /// Starts at the countdown. `None` if the day has no exercises.
    pub fn new(day: &'a Day) -> Option<Self> {
        if day.exercises.is_empty() {
            return None;
        }
        Some(Self {
            day,
            exercise: 0,
            set: 1,
            phase: Phase::Countdown,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn exercise(&self) -> &'a Exercise {
        &self.day.exercises[self.exercise]
    }

    /// 1-based set number within the current exercise.
    pub fn set(&self) -> u32 {
        self.set
    }

    /// Rest length for the current rest period, in seconds.
    pub fn rest_secs(&self) -> u32 {
        self.exercise().rest
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Moves to the next phase.
    ///
    /// Finishing a set goes to rest before the next set, or before the next
    /// exercise; after the last set of the last exercise the walkthrough is
    /// finished. Rest and countdown lead into the exercise at the current
    /// position.
    pub fn advance(&mut self) -> Phase {
        self.phase = match self.phase {
            Phase::Countdown | Phase::Rest => Phase::Exercise,
            Phase::Exercise if self.set < self.exercise().sets => {
                self.set += 1;
                Phase::Rest
            }
            Phase::Exercise if self.exercise + 1 < self.day.exercises.len() => {
                self.exercise += 1;
                self.set = 1;
                Phase::Rest
            }
            Phase::Exercise | Phase::Finished => Phase::Finished,
        };
        self.phase
    }

    pub fn next_up(&self) -> NextUp<'a> {
        let current = self.exercise();
        if self.set < current.sets {
            NextUp::Set {
                number: self.set + 1,
                exercise: &current.name,
            }
        } else if let Some(next) = self.day.exercises.get(self.exercise + 1) {
            NextUp::Exercise(&next.name)
        } else {
            NextUp::FinalExercise
        }
    }

    /// The session log for a finished walkthrough, `None` before that.
    pub fn finish(&self, rpe: Rpe, completed_at: Timestamp) -> Option<SessionLog> {
        self.is_finished()
            .then(|| SessionLog::from_day(self.day, rpe, completed_at))
    }
}
