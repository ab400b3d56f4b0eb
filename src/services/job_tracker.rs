//! Job tracking for long-running import jobs.
//!
//! Imports run in background tasks; the tracker is the shared record of
//! their progress. Handlers read it to answer status requests and to stream
//! log lines over SSE.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One timestamped log line attached to a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

/// A tracked background job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub logs: Vec<LogEntry>,
    /// Job outcome, present once the job completes.
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

/// Thread-safe in-memory job registry.
///
/// Cloning shares the underlying map, so the same tracker instance can live
/// in the HTTP state and inside spawned job tasks.
#[derive(Clone, Default)]
pub struct JobTracker {
    jobs: Arc<RwLock<HashMap<String, Job>>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new pending job and returns its id.
    pub fn create_job(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let job = Job {
            id: id.clone(),
            status: JobStatus::Pending,
            created_at: now,
            updated_at: now,
            logs: Vec::new(),
            result: None,
            error: None,
        };
        self.jobs.write().insert(id.clone(), job);
        id
    }

    /// Marks a job as running.
    pub fn start_job(&self, job_id: &str) {
        let mut jobs = self.jobs.write();
        if let Some(job) = jobs.get_mut(job_id) {
            job.status = JobStatus::Running;
            job.updated_at = Utc::now();
        }
    }

    /// Appends a log line to a job.
    pub fn add_log(&self, job_id: &str, level: LogLevel, message: impl Into<String>) {
        let mut jobs = self.jobs.write();
        if let Some(job) = jobs.get_mut(job_id) {
            job.logs.push(LogEntry {
                timestamp: Utc::now(),
                level,
                message: message.into(),
            });
            job.updated_at = Utc::now();
        }
    }

    /// Marks a job as completed with its result payload.
    pub fn complete_job(&self, job_id: &str, result: serde_json::Value) {
        let mut jobs = self.jobs.write();
        if let Some(job) = jobs.get_mut(job_id) {
            job.status = JobStatus::Completed;
            job.result = Some(result);
            job.updated_at = Utc::now();
        }
    }

    /// Marks a job as failed with an error message.
    pub fn fail_job(&self, job_id: &str, error: impl Into<String>) {
        let mut jobs = self.jobs.write();
        if let Some(job) = jobs.get_mut(job_id) {
            job.status = JobStatus::Failed;
            job.error = Some(error.into());
            job.updated_at = Utc::now();
        }
    }

    /// Snapshot of a job, if it exists.
    pub fn get_job(&self, job_id: &str) -> Option<Job> {
        self.jobs.read().get(job_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_lifecycle() {
        let tracker = JobTracker::new();
        let id = tracker.create_job();

        assert_eq!(tracker.get_job(&id).unwrap().status, JobStatus::Pending);

        tracker.start_job(&id);
        tracker.add_log(&id, LogLevel::Info, "Parsing transport log...");
        tracker.complete_job(&id, serde_json::json!({ "imported": 3 }));

        let job = tracker.get_job(&id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.logs.len(), 1);
        assert_eq!(job.result.unwrap()["imported"], 3);
    }

    #[test]
    fn failed_job_keeps_its_error() {
        let tracker = JobTracker::new();
        let id = tracker.create_job();
        tracker.fail_job(&id, "boom");

        let job = tracker.get_job(&id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("boom"));
    }

    #[test]
    fn unknown_job_is_none() {
        let tracker = JobTracker::new();
        assert!(tracker.get_job("nope").is_none());
    }
}
