use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::repositories::scheduler::ExpiryScheduler;

/// A job that reached its deadline without being cancelled.
#[derive(Debug, Clone)]
pub struct FiredJob {
    pub key: String,
    pub payload: serde_json::Value,
}

type JobTable = Arc<Mutex<HashMap<String, JoinHandle<()>>>>;

/// In-process delayed jobs on the tokio timer wheel.
///
/// Each scheduled key holds one sleeping task; firing removes the task from
/// the table and pushes the job onto the channel consumed by the expiry
/// worker. Jobs do not survive a restart, which is why the periodic sweep
/// exists.
pub struct TokioExpiryScheduler {
    jobs: JobTable,
    fired_tx: mpsc::UnboundedSender<FiredJob>,
}

impl TokioExpiryScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FiredJob>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            jobs: Arc::new(Mutex::new(HashMap::new())),
            fired_tx,
        };
        (scheduler, fired_rx)
    }
}

fn remove_job(jobs: &JobTable, key: &str) -> Option<JoinHandle<()>> {
    match jobs.lock() {
        Ok(mut jobs) => jobs.remove(key),
        Err(poisoned) => poisoned.into_inner().remove(key),
    }
}

fn install_job(jobs: &JobTable, key: String, handle: JoinHandle<()>) {
    let previous = match jobs.lock() {
        Ok(mut jobs) => jobs.insert(key, handle),
        Err(poisoned) => poisoned.into_inner().insert(key, handle),
    };
    if let Some(previous) = previous {
        previous.abort();
    }
}

#[async_trait]
impl ExpiryScheduler for TokioExpiryScheduler {
    async fn schedule(
        &self,
        key: String,
        fire_at: DateTime<Utc>,
        payload: serde_json::Value,
    ) -> Result<()> {
        let delay = (fire_at - Utc::now())
            .to_std()
            .unwrap_or(std::time::Duration::ZERO);

        debug!(
            "tokio_expiry_scheduler: armed {} to fire in {:?}",
            key, delay
        );

        let jobs = Arc::clone(&self.jobs);
        let fired_tx = self.fired_tx.clone();
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            remove_job(&jobs, &task_key);
            let job = FiredJob {
                key: task_key.clone(),
                payload,
            };
            if fired_tx.send(job).is_err() {
                warn!(
                    "tokio_expiry_scheduler: worker channel closed, dropping {}",
                    task_key
                );
            }
        });

        install_job(&self.jobs, key, handle);
        Ok(())
    }

    async fn cancel(&self, key: &str) -> Result<()> {
        if let Some(handle) = remove_job(&self.jobs, key) {
            handle.abort();
            debug!("tokio_expiry_scheduler: cancelled {}", key);
        }
        Ok(())
    }
}
