//! Training trends derived from session history.

use jiff::Timestamp;

use crate::model::SessionLog;

/// One session's total work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumePoint {
    pub session: usize,
    pub name: String,
    pub volume: u32,
    pub completed_at: Timestamp,
}

/// One rated session. Unrated sessions have no point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpePoint {
    pub session: usize,
    pub rpe: u8,
}

#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub volume: Vec<VolumePoint>,
    pub rpe: Vec<RpePoint>,
}

/// Summarises history in logged order. Sessions are numbered from 1.
pub fn summarize(history: &[SessionLog]) -> Summary {
    let mut summary = Summary::default();
    for (i, log) in history.iter().enumerate() {
        let session = i + 1;
        summary.volume.push(VolumePoint {
            session,
            name: log.name.clone(),
            volume: log.volume(),
            completed_at: log.completed_at,
        });
        if let Some(rpe) = log.rpe.value() {
            summary.rpe.push(RpePoint { session, rpe });
        }
    }
    summary
}

impl Summary {
    /// Mean RPE over rated sessions, if any were rated.
    pub fn average_rpe(&self) -> Option<f64> {
        let count = u32::try_from(self.rpe.len()).ok().filter(|&n| n > 0)?;
        let total: f64 = self.rpe.iter().map(|p| f64::from(p.rpe)).sum();
        Some(total / f64::from(count))
    }
}
