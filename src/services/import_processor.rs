//! Background driver for transport-log import jobs.
//!
//! Spawned from the import endpoint; reports progress through the
//! [`JobTracker`] so the dashboard can follow along over SSE.

use std::sync::Arc;

use log::{error, info};

use crate::db::repository::FullRepository;
use crate::models::PartitionMonth;
use crate::services::import::{import_transport_log, ImportError};
use crate::services::job_tracker::{JobTracker, LogLevel};

/// Runs one import job to completion, updating the tracker as it goes.
pub async fn process_import_async(
    tracker: JobTracker,
    repository: Arc<dyn FullRepository>,
    job_id: String,
    content: String,
    entry_month: PartitionMonth,
) {
    tracker.start_job(&job_id);
    tracker.add_log(
        &job_id,
        LogLevel::Info,
        format!("Importing transport log into partition {}...", entry_month),
    );

    match import_transport_log(repository.as_ref(), &content, entry_month).await {
        Ok(summary) if summary.duplicate => {
            tracker.add_log(
                &job_id,
                LogLevel::Warning,
                format!(
                    "Duplicate transport log detected (checksum {}); nothing imported",
                    summary.checksum
                ),
            );
            match serde_json::to_value(&summary) {
                Ok(result) => tracker.complete_job(&job_id, result),
                Err(err) => tracker.fail_job(&job_id, err.to_string()),
            }
        }
        Ok(summary) => {
            if summary.skipped.is_empty() {
                tracker.add_log(
                    &job_id,
                    LogLevel::Success,
                    format!("✓ Imported {} records", summary.imported),
                );
            } else {
                tracker.add_log(
                    &job_id,
                    LogLevel::Warning,
                    format!(
                        "✓ Imported {} records, skipped {} unusable rows",
                        summary.imported,
                        summary.skipped.len()
                    ),
                );
                for row in &summary.skipped {
                    tracker.add_log(
                        &job_id,
                        LogLevel::Warning,
                        format!("  row {}: {}", row.row, row.reason),
                    );
                }
            }
            info!(
                "import job {} finished: {} imported, {} skipped",
                job_id,
                summary.imported,
                summary.skipped.len()
            );
            match serde_json::to_value(&summary) {
                Ok(result) => tracker.complete_job(&job_id, result),
                Err(err) => tracker.fail_job(&job_id, err.to_string()),
            }
        }
        Err(err) => {
            let message = match &err {
                ImportError::EmptyLog | ImportError::MissingColumn(_) | ImportError::Csv(_) => {
                    format!("Transport log rejected: {}", err)
                }
                ImportError::Repository(_) => format!("Storage failure during import: {}", err),
            };
            error!("import job {} failed: {}", job_id, err);
            tracker.add_log(&job_id, LogLevel::Error, message.clone());
            tracker.fail_job(&job_id, message);
        }
    }
}
