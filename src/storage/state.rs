//! Profile, plan, and pending-flag storage.
//!
//! Each key has a single writer path, so reads and writes are independent;
//! there is no cross-key transaction.

use crate::model::{UserProfile, WorkoutPlan};

use super::{Key, Result, Storage};

impl Storage {
    pub fn load_profile(&self) -> Result<Option<UserProfile>> {
        self.read_json(Key::UserProfile)
    }

    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.write_json(Key::UserProfile, profile)
    }

    pub fn load_plan(&self) -> Result<Option<WorkoutPlan>> {
        self.read_json(Key::WorkoutPlan)
    }

    /// Replaces the stored plan wholesale.
    pub fn save_plan(&self, plan: &WorkoutPlan) -> Result<()> {
        self.write_json(Key::WorkoutPlan, plan)
    }

    /// Loads the adjustment-pending flag. Absent means false.
    pub fn load_pending(&self) -> Result<bool> {
        Ok(self.read_json(Key::AdjustmentPending)?.unwrap_or(false))
    }

    pub fn save_pending(&self, pending: bool) -> Result<()> {
        self.write_json(Key::AdjustmentPending, &pending)
    }

    /// Erases profile, plan, history, and the pending flag.
    pub fn reset(&self) -> Result<()> {
        self.delete(Key::UserProfile)?;
        self.delete(Key::WorkoutPlan)?;
        self.delete(Key::AdjustmentPending)?;
        self.clear_history()
    }
}
