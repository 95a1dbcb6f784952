//! Session recording: append to history and mark the plan day complete.
//!
//! Copy-on-write throughout. The caller's plan and history are never touched;
//! new values come back in [`Recorded`], so anyone holding an older snapshot
//! keeps seeing exactly what they had.

use crate::model::{SessionLog, WorkoutPlan};

/// A logged session that matches no day in the current plan.
///
/// Non-fatal: the session is still appended to history.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no plan day matches session {0}")]
pub struct PlanDayNotFound(pub String);

/// The state after recording one session.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub plan: WorkoutPlan,
    pub history: Vec<SessionLog>,
    pub miss: Option<PlanDayNotFound>,
}

/// Records a completed session.
///
/// The matching day (searched across every week) is marked complete and takes
/// the log's RPE, including its absence. A day that is already complete is
/// left as its first session set it.
pub fn record_session(plan: &WorkoutPlan, history: &[SessionLog], log: SessionLog) -> Recorded {
    let mut next_plan = plan.clone();
    let day = next_plan
        .weeks
        .iter_mut()
        .flat_map(|w| w.days.iter_mut())
        .find(|d| d.id == log.id);

    let miss = match day {
        Some(day) => {
            if !day.is_completed {
                day.is_completed = true;
                day.rpe = log.rpe;
            }
            None
        }
        None => Some(PlanDayNotFound(log.id.clone())),
    };

    let mut next_history = Vec::with_capacity(history.len() + 1);
    next_history.extend_from_slice(history);
    next_history.push(log);

    Recorded {
        plan: next_plan,
        history: next_history,
        miss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::model::*;

    fn sample_plan() -> WorkoutPlan {
        let day = |id: &str, n| Day {
            id: id.into(),
            day: n,
            name: format!("Day {n}"),
            exercises: vec![Exercise {
                id: format!("{id}-squat"),
                name: "Squats".into(),
                sets: 3,
                target: Target::Reps { count: 12 },
                rest: 60,
            }],
            is_completed: false,
            rpe: Rpe::Unrated,
        };
        WorkoutPlan {
            id: "plan-1".into(),
            weeks: vec![
                Week {
                    id: "week1".into(),
                    week: 1,
                    description: "Introduction/Baseline".into(),
                    days: vec![day("week1-day1", 1), day("week1-day2", 2)],
                },
                Week {
                    id: "week2".into(),
                    week: 2,
                    description: "Volume Increase".into(),
                    days: vec![day("week2-day1", 1)],
                },
            ],
        }
    }

    fn log_for(plan: &WorkoutPlan, id: &str, rpe: Rpe) -> SessionLog {
        SessionLog::from_day(plan.find_day(id).unwrap(), rpe, Timestamp::now())
    }

    #[test]
    fn marks_day_complete_and_copies_rpe() {
        let plan = sample_plan();
        let log = log_for(&plan, "week2-day1", Rpe::Rated(7));

        let recorded = record_session(&plan, &[], log);

        let day = recorded.plan.find_day("week2-day1").unwrap();
        assert!(day.is_completed);
        assert_eq!(day.rpe, Rpe::Rated(7));
        assert_eq!(recorded.history.len(), 1);
        assert!(recorded.miss.is_none());
    }

    #[test]
    fn copies_absent_rpe() {
        let plan = sample_plan();
        let log = log_for(&plan, "week1-day1", Rpe::Unrated);

        let recorded = record_session(&plan, &[], log);

        let day = recorded.plan.find_day("week1-day1").unwrap();
        assert!(day.is_completed);
        assert_eq!(day.rpe, Rpe::Unrated);
    }

    #[test]
    fn leaves_inputs_untouched() {
        let plan = sample_plan();
        let history = vec![log_for(&plan, "week1-day2", Rpe::Rated(8))];
        let log = log_for(&plan, "week1-day1", Rpe::Rated(5));

        let recorded = record_session(&plan, &history, log);

        assert!(!plan.find_day("week1-day1").unwrap().is_completed);
        assert_eq!(history.len(), 1);
        assert_eq!(recorded.history.len(), 2);
        assert_eq!(recorded.history[0].id, "week1-day2");
        assert_eq!(recorded.history[1].id, "week1-day1");
    }

    #[test]
    fn unknown_day_still_appends_to_history() {
        let plan = sample_plan();
        let mut log = log_for(&plan, "week1-day1", Rpe::Rated(5));
        log.id = "week9-day9".into();

        let recorded = record_session(&plan, &[], log);

        assert_eq!(recorded.plan, plan);
        assert_eq!(recorded.history.len(), 1);
        assert_eq!(recorded.miss, Some(PlanDayNotFound("week9-day9".into())));
    }

    #[test]
    fn duplicate_session_completes_once() {
        let plan = sample_plan();
        let first = record_session(&plan, &[], log_for(&plan, "week1-day1", Rpe::Rated(6)));
        let second = record_session(
            &first.plan,
            &first.history,
            log_for(&plan, "week1-day1", Rpe::Rated(9)),
        );

        let day = second.plan.find_day("week1-day1").unwrap();
        assert!(day.is_completed);
        assert_eq!(day.rpe, Rpe::Rated(6));
        assert_eq!(second.history.len(), 2);
        assert!(second.miss.is_none());
    }
}
