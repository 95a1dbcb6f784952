//! Remote plan generation.
//!
//! The coach never builds plans itself. It hands onboarding data or recent
//! performance to a [`PlanService`] and takes back a complete plan, or an
//! error. Transport failures and unusable responses fail the same way.

mod gemini;
mod prompt;
mod schema;

use async_trait::async_trait;

use crate::model::{OnboardingData, SessionLog, WorkoutPlan};

pub use gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiPlanner};

/// Something that can write and rewrite workout plans.
///
/// Calls may be slow and may fail. Each call is one request; retrying is the
/// caller's business.
#[async_trait]
pub trait PlanService: Send + Sync {
    /// Builds the first plan from onboarding answers.
    async fn generate_plan(&self, data: &OnboardingData) -> Result<WorkoutPlan, GenerationError>;

    /// Builds the next plan from the current one and the most recent sessions.
    async fn adjust_plan(
        &self,
        current: &WorkoutPlan,
        recent: &[SessionLog],
    ) -> Result<WorkoutPlan, AdjustmentError>;
}

/// Why a remote planning call failed.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("no Gemini API key configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response arrived but is not a well-formed plan.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Initial plan generation failed. No plan was produced.
#[derive(Debug, thiserror::Error)]
#[error("failed to generate workout plan: {0}")]
pub struct GenerationError(#[from] pub PlannerError);

/// A plan adjustment failed. The adjustment stays pending.
#[derive(Debug, thiserror::Error)]
#[error("failed to adjust workout plan: {0}")]
pub struct AdjustmentError(#[from] pub PlannerError);
