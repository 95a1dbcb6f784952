//! Coaching prompts for plan generation and adjustment.

use serde::Serialize;

use crate::model::{OnboardingData, SessionLog, WorkoutPlan};

/// Prompt for the first mesocycle.
pub(super) fn generation(data: &OnboardingData) -> String {
    let profile = &data.user_profile;
    let fitness = &data.fitness_profile;
    let baseline = &data.baseline;
    format!(
        "\
System Instruction: You are an expert calisthenics and fitness coach. Your task is to generate a \
structured, progressive 4-week workout plan in JSON format based on the user's profile, goals, and \
baseline assessment. Adhere strictly to the provided JSON schema.

User's Data:
- Profile: {{ weight: {weight}kg, height: {height}cm }}
- Fitness Goal: {goal}
- Sessions Per Week: {sessions}
- Baseline:
  - Max Push-ups: {pushups}
  - Max Plank: {plank} seconds
  - Can do standard push-ups: {standard}
  - Has Equipment: {equipment}

Workout Structure (Mesocycle):
- 4 weeks total.
- Week 1: Introduction/Baseline.
- Week 2: Volume Increase (e.g., add a set or reps).
- Week 3: Intensity Increase (e.g., harder exercise variation, less rest).
- Week 4: Deload/Skill Focus (e.g., lower volume, focus on form).

Goal-Specific Parameters:
- If goal is 'strength', use 4-8 reps and 90-120s rest.
- If goal is 'lean' (hypertrophy), use 8-15 reps and 45-90s rest.
- If goal is 'endurance', use timed sets (30-60 seconds) or AMRAP (As Many Reps As Possible) with \
20-45s rest. If using AMRAP, set \"reps\" to 0.

Exercise Selection Rules:
- Based on the user's baseline, select appropriate exercise variations.
- If 'hasEquipment' is false, you MUST ONLY suggest exercises that require no equipment. For pulling \
exercises, suggest alternatives like Bodyweight Rows (using a sturdy table or two chairs) or Floor \
Swimmers. DO NOT suggest pull-ups or chin-ups.
- If 'canPerformStandardPushup' is false or max pushups is low (<5), start with Incline Push-ups or \
Knee Push-ups.
- If max pushups is high (>20), consider Diamond Push-ups or Archer Push-ups for progression.
- Always include a balanced mix of push, pull, legs (e.g., Squats, Lunges), and core exercises \
(e.g., Planks, Leg Raises).
- Ensure exercises progress logically from week to week. For example, move from Squats to Jump \
Squats or Knee Push-ups to Standard Push-ups.

Generate a JSON object for a {sessions}-day per week plan. The output MUST conform to the schema.
",
        weight = profile.weight_kg,
        height = profile.height_cm,
        goal = fitness.primary_goal,
        sessions = fitness.sessions_per_week,
        pushups = baseline.max_pushups,
        plank = baseline.max_plank_seconds,
        standard = baseline.can_perform_standard_pushup,
        equipment = baseline.has_equipment,
    )
}

/// How a recent session is summarised for the coach.
#[derive(Serialize)]
struct RecentPerformance<'a> {
    #[serde(rename = "dayName")]
    day_name: &'a str,
    #[serde(rename = "RPE")]
    rpe: Option<u8>,
}

/// Prompt for the next mesocycle, given the current plan and recent sessions.
pub(super) fn adjustment(
    current: &WorkoutPlan,
    recent: &[SessionLog],
) -> Result<String, serde_json::Error> {
    let plan_json = serde_json::to_string_pretty(current)?;
    let performance: Vec<RecentPerformance<'_>> = recent
        .iter()
        .map(|s| RecentPerformance {
            day_name: &s.name,
            rpe: s.rpe.value(),
        })
        .collect();
    let performance_json = serde_json::to_string_pretty(&performance)?;

    Ok(format!(
        "\
System Instruction: You are an expert calisthenics coach. Your task is to adjust an existing workout \
plan based on the user's recent performance (RPE). Generate a new, complete 4-week plan that \
represents the next phase of training.

Previous Plan:
{plan_json}

Recent Performance (last {count} sessions):
{performance_json}

Adjustment Rules:
- IF average RPE of recent sessions is <= 6, THEN increase difficulty for the next mesocycle. This \
means progressing exercises (e.g., Incline Push-ups to Standard Push-ups), increasing volume (more \
sets/reps), or increasing intensity (less rest).
- IF average RPE is >= 9, THEN decrease difficulty or maintain. This could mean regressing an \
exercise or reducing a set.
- IF average RPE is 7-8, THEN maintain the current difficulty but perhaps introduce a new \
skill-based exercise.
- IMPORTANT: Respect the user's equipment availability from the original plan. If the original \
plan was equipment-free, the new plan must also be equipment-free.

Generate a brand new 4-week plan based on these adjustments. The new plan should follow the same \
JSON schema as the original.
",
        count = recent.len(),
    ))
}
