use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::api::ReservationSource;
use crate::notifications::NotificationEmitter;

use super::email::EmailMemory;
use super::loop_worker::{poll_loop, PollTiming};
use super::state::{WatcherState, WatcherStatus};

const ENABLE_LOGS: bool = true;

use crate::log_info;

struct PollWorker {
    email: String,
    cancel_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PollWorker {
    async fn shutdown(&mut self) -> Result<()> {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("reservation watcher task failed to join")?;
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for PollWorker {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

/// Owns the Idle/Active lifecycle of the reservation poller. Idle while no
/// email is known; Active with exactly one polling task otherwise.
#[derive(Clone)]
pub struct WatcherController {
    source: Arc<dyn ReservationSource>,
    emitter: NotificationEmitter,
    emails: EmailMemory,
    timing: PollTiming,
    state: Arc<Mutex<WatcherState>>,
    worker: Arc<Mutex<Option<PollWorker>>>,
}

impl WatcherController {
    pub fn new(
        source: Arc<dyn ReservationSource>,
        emitter: NotificationEmitter,
        emails: EmailMemory,
        timing: PollTiming,
    ) -> Self {
        Self {
            source,
            emitter,
            emails,
            timing,
            state: Arc::new(Mutex::new(WatcherState::new())),
            worker: Arc::new(Mutex::new(None)),
        }
    }

    /// Starts polling for the remembered email, if any. Returns whether the
    /// watcher is now Active.
    pub async fn resume(&self) -> Result<bool> {
        match self.emails.recall()? {
            Some(email) => {
                self.start(email).await?;
                Ok(true)
            }
            None => {
                log_info!("No remembered email; reservation watcher stays idle");
                Ok(false)
            }
        }
    }

    /// Remembers `email` and watches it. Blank input changes nothing and
    /// returns false.
    pub async fn watch_email(&self, email: &str) -> Result<bool> {
        let Some(email) = self.emails.remember(email)? else {
            return Ok(false);
        };
        self.start(email).await?;
        Ok(true)
    }

    /// Stops polling and forgets the email, so the next start is Idle.
    pub async fn forget_email(&self) -> Result<()> {
        self.stop().await?;
        self.emails.forget()
    }

    /// Teardown: cancels the polling task and waits for it to finish.
    pub async fn stop(&self) -> Result<()> {
        let worker = self.worker.lock().await.take();

        if let Some(mut worker) = worker {
            log_info!("Stopping reservation watcher for {}", worker.email);
            worker.shutdown().await?;
        }

        self.state.lock().await.reset();
        Ok(())
    }

    pub async fn snapshot(&self) -> WatcherState {
        self.state.lock().await.clone()
    }

    pub async fn is_active(&self) -> bool {
        self.state.lock().await.status == WatcherStatus::Active
    }

    async fn start(&self, email: String) -> Result<()> {
        let mut worker_guard = self.worker.lock().await;

        if let Some(existing) = worker_guard.as_ref() {
            if existing.email == email && existing.is_running() {
                return Ok(());
            }
        }

        if let Some(mut previous) = worker_guard.take() {
            log_info!("Switching reservation watcher away from {}", previous.email);
            previous.shutdown().await?;
        }

        self.state.lock().await.begin(email.clone());

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(
            email.clone(),
            self.source.clone(),
            self.emitter.clone(),
            self.state.clone(),
            self.timing,
            cancel_token.clone(),
        ));

        log_info!(
            "Watching reservations for {} every {:?}",
            email,
            self.timing.interval
        );

        *worker_guard = Some(PollWorker {
            email,
            cancel_token,
            handle: Some(handle),
        });
        Ok(())
    }
}
