//! Onboarding data: who the user is and where they start from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Body measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub weight_kg: f64,
    pub height_cm: f64,
}

/// What the plan optimises for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FitnessGoal {
    Strength,
    /// Hypertrophy.
    Lean,
    Endurance,
}

impl fmt::Display for FitnessGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Strength => "strength",
            Self::Lean => "lean",
            Self::Endurance => "endurance",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessProfile {
    pub primary_goal: FitnessGoal,
    pub sessions_per_week: u32,
}

/// Starting capability, used to pick exercise variations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineAssessment {
    pub max_pushups: u32,
    pub max_plank_seconds: u32,
    pub can_perform_standard_pushup: bool,
    pub has_equipment: bool,
}

/// Everything collected during onboarding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingData {
    pub user_profile: UserProfile,
    pub fitness_profile: FitnessProfile,
    pub baseline: BaselineAssessment,
}
