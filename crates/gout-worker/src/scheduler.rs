//! Interval scheduler driving the sweep.

use std::sync::Arc;

use chrono::Utc;
use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use gout_core::config::worker::WorkerConfig;
use gout_core::error::AppError;

use crate::orchestrator::JobOrchestrator;

/// Periodic trigger for the job sweep.
///
/// Multiple server processes may each run a scheduler; job idempotency
/// keys and compare-and-swap commits make overlapping sweeps harmless.
pub struct WorkerScheduler {
    scheduler: JobScheduler,
    orchestrator: Arc<JobOrchestrator>,
    config: WorkerConfig,
}

impl std::fmt::Debug for WorkerScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerScheduler").finish()
    }
}

impl WorkerScheduler {
    /// Create a new scheduler.
    pub async fn new(
        orchestrator: Arc<JobOrchestrator>,
        config: WorkerConfig,
    ) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            orchestrator,
            config,
        })
    }

    /// Register the sweep task.
    pub async fn register_sweep(&self) -> Result<(), AppError> {
        let orchestrator = Arc::clone(&self.orchestrator);
        let interval = std::time::Duration::from_secs(self.config.sweep_interval_seconds);

        let job = CronJob::new_repeated_async(interval, move |_uuid, _lock| {
            let orchestrator = Arc::clone(&orchestrator);
            Box::pin(async move {
                if let Err(e) = orchestrator.run_due(Utc::now()).await {
                    tracing::error!("Sweep pass failed: {e}");
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create sweep schedule: {e}")))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add sweep schedule: {e}")))?;

        tracing::info!(
            interval_seconds = self.config.sweep_interval_seconds,
            "Registered: job sweep"
        );
        Ok(())
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Worker scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Worker scheduler shut down");
        Ok(())
    }
}
