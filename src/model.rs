//! Core data model for the coach.
//!
//! Plans, the sessions logged against them, and the onboarding data the
//! first plan is generated from.

mod plan;
mod profile;
mod rpe;
mod session;

pub use plan::{Day, Exercise, Target, Week, WorkoutPlan};
pub use profile::{BaselineAssessment, FitnessGoal, FitnessProfile, OnboardingData, UserProfile};
pub use rpe::Rpe;
pub use session::SessionLog;
