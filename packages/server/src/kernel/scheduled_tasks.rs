//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! One job: re-run every built-in scrape profile on the configured cron
//! schedule. Runs are sequential within the job; a run that is still going
//! when the next tick fires is skipped rather than overlapped.
//!
//! ```text
//! Scheduler (SCRAPE_SCHEDULE)
//!     │
//!     └─► scrape_profiles(profiles)
//!             └─► For each URL → fetch → extract → upsert policy
//! ```

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::policies::actions::scrape_profiles;
use crate::domains::policies::models::PolicyStore;
use crate::domains::policies::sources::SourceProfile;
use crate::kernel::ServerDeps;

/// Start the periodic scrape job
pub async fn start_scheduler(
    deps: ServerDeps,
    profiles: Vec<SourceProfile>,
    schedule: &str,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let profiles = Arc::new(profiles);
    let running = Arc::new(AtomicBool::new(false));

    let scrape_job = Job::new_async(schedule, move |_uuid, _lock| {
        let deps = deps.clone();
        let profiles = profiles.clone();
        let running = running.clone();
        Box::pin(async move {
            if running.swap(true, Ordering::SeqCst) {
                tracing::warn!("Previous scheduled scrape still running, skipping this tick");
                return;
            }
            run_scheduled_scrape(&deps, &profiles).await;
            running.store(false, Ordering::SeqCst);
        })
    })?;

    scheduler.add(scrape_job).await?;
    scheduler.start().await?;

    tracing::info!(schedule = %schedule, "Scheduled scrape started");
    Ok(scheduler)
}

/// Run every profile once and log the totals
async fn run_scheduled_scrape(deps: &ServerDeps, profiles: &[SourceProfile]) {
    tracing::info!(profiles = profiles.len(), "Running scheduled scrape");

    let sink = PolicyStore::new(deps.db_pool.clone());
    let reports = scrape_profiles(profiles, deps.fetcher.as_ref(), &sink, deps.scrape_delay).await;

    let stored: usize = reports.iter().map(|r| r.stored).sum();
    let failed: usize = reports.iter().map(|r| r.failed).sum();

    tracing::info!(
        profiles = reports.len(),
        stored,
        failed,
        "Scheduled scrape complete"
    );
}
