//! Output formatting for CLI display.

use crate::coordinator::AdjustmentOutcome;
use crate::model::{Day, Exercise, Target, Week};
use crate::performance::Summary;

pub(super) fn format_target(exercise: &Exercise) -> String {
    match exercise.target {
        Target::Reps { count: 0 } => format!("{} x AMRAP", exercise.sets),
        Target::Reps { count } => format!("{} x {count}", exercise.sets),
        Target::Timed { seconds } => format!("{} x {seconds}s", exercise.sets),
    }
}

pub(super) fn format_day(day: &Day) -> String {
    let mark = if day.is_completed { "x" } else { " " };
    let mut out = format!("  [{mark}] {}  {}", day.id, day.name);
    if day.is_completed {
        out.push_str(&format!("  ({})", day.rpe));
    }
    for exercise in &day.exercises {
        out.push_str(&format!(
            "\n        {:<28} {:<12} rest {}s",
            exercise.name,
            format_target(exercise),
            exercise.rest
        ));
    }
    out
}

pub(super) fn format_week(week: &Week) -> String {
    let done = week.days.iter().filter(|d| d.is_completed).count();
    let mut out = format!(
        "Week {}: {}  [{done}/{} done]",
        week.week,
        week.description,
        week.days.len()
    );
    for day in &week.days {
        out.push('\n');
        out.push_str(&format_day(day));
    }
    out
}

pub(super) fn format_summary(summary: &Summary) -> String {
    let mut lines: Vec<String> = summary
        .volume
        .iter()
        .map(|point| {
            let rpe = summary
                .rpe
                .iter()
                .find(|r| r.session == point.session)
                .map_or_else(|| "no rating".to_string(), |r| format!("RPE {}", r.rpe));
            format!(
                "{:>3}  {}  {:<24} volume {:>5}  {rpe}",
                point.session,
                point.completed_at.strftime("%Y-%m-%d"),
                point.name,
                point.volume
            )
        })
        .collect();
    if let Some(avg) = summary.average_rpe() {
        lines.push(format!("Average RPE: {avg:.1}"));
    }
    lines.join("\n")
}

pub(super) fn describe_outcome(outcome: &AdjustmentOutcome) -> String {
    match outcome {
        AdjustmentOutcome::Deferred => {
            "Offline: plan adjustment queued until you reconnect (`coach watch`).".to_string()
        }
        AdjustmentOutcome::AlreadyInFlight => {
            "A plan request is already running; not starting another.".to_string()
        }
        AdjustmentOutcome::Applied => "Your plan was adjusted for the next phase.".to_string(),
        AdjustmentOutcome::Failed(e) => {
            format!("{e}\nThe adjustment stays pending and is retried on reconnect.")
        }
        AdjustmentOutcome::Discarded => "Plan adjustment discarded after reset.".to_string(),
    }
}
