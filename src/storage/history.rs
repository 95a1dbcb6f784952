//! Session history storage: append and load session logs.

use tracing::warn;

use crate::model::{SessionLog, WorkoutPlan};

use super::{Key, Result, Storage, put_json};

impl Storage {
    /// Records a logged session in one transaction.
    ///
    /// Appends the log, replaces the plan when `plan` is given, and raises the
    /// pending flag when `pending` is set. Either all of it lands or none does.
    pub fn record_session(
        &self,
        log: &SessionLog,
        plan: Option<&WorkoutPlan>,
        pending: bool,
    ) -> Result<()> {
        let body = serde_json::to_string(log)?;
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute("INSERT INTO session_log (body) VALUES (?1)", [body])?;
        if let Some(plan) = plan {
            put_json(&tx, Key::WorkoutPlan, plan)?;
        }
        if pending {
            put_json(&tx, Key::AdjustmentPending, &true)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Loads the full history in chronological order.
    ///
    /// Rows that no longer parse are skipped.
    pub fn load_history(&self) -> Result<Vec<SessionLog>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT seq, body FROM session_log ORDER BY seq")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut history = Vec::new();
        for row in rows {
            let (seq, body) = row?;
            match serde_json::from_str(&body) {
                Ok(log) => history.push(log),
                Err(e) => warn!(seq, error = %e, "skipping malformed session log"),
            }
        }
        Ok(history)
    }

    pub(super) fn clear_history(&self) -> Result<()> {
        self.conn().execute("DELETE FROM session_log", [])?;
        Ok(())
    }
}
