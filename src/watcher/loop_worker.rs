use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::ReservationSource;
use crate::models::Reservation;
use crate::notifications::NotificationEmitter;

use super::state::{ReservationBaseline, WatcherState};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

pub const POLL_INTERVAL_SECS: u64 = 30;
pub const FETCH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTiming {
    pub interval: Duration,
    pub fetch_timeout: Duration,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(POLL_INTERVAL_SECS),
            fetch_timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
        }
    }
}

/// Polls `source` for `email` right away and then once per interval until
/// `cancel_token` fires. A cycle always finishes its fetch before the next
/// tick is awaited, so cycles never overlap. Fetch errors and timeouts are
/// logged at debug level and otherwise ignored.
pub async fn poll_loop(
    email: String,
    source: Arc<dyn ReservationSource>,
    emitter: NotificationEmitter,
    state: Arc<Mutex<WatcherState>>,
    timing: PollTiming,
    cancel_token: CancellationToken,
) {
    let mut ticker = time::interval(timing.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut baseline = ReservationBaseline::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let fetched = tokio::select! {
                    result = time::timeout(timing.fetch_timeout, source.reservations_by_email(&email)) => result,
                    _ = cancel_token.cancelled() => break,
                };

                match fetched {
                    Ok(Ok(reservations)) => {
                        let emitted = apply_poll(&mut baseline, &reservations, &emitter);
                        state.lock().await.record_success(Utc::now());
                        if emitted > 0 {
                            log_info!("{emitted} new reservation notification(s) for {email}");
                        }
                    }
                    Ok(Err(err)) => {
                        state.lock().await.record_failure();
                        log_debug!("reservation check failed for {email}: {err:#}");
                    }
                    Err(_) => {
                        state.lock().await.record_failure();
                        log_debug!(
                            "reservation check timed out (> {:?}) for {email}",
                            timing.fetch_timeout
                        );
                    }
                }
            }
            _ = cancel_token.cancelled() => break,
        }
    }

    log_info!("reservation watcher for {email} shutting down");
}

/// Diffs one successful fetch against the baseline, hands every transition to
/// the emitter, and advances the baseline. Returns how many notifications were
/// actually stored (duplicates excluded).
pub fn apply_poll(
    baseline: &mut ReservationBaseline,
    fetched: &[Reservation],
    emitter: &NotificationEmitter,
) -> usize {
    baseline
        .advance(fetched)
        .into_iter()
        .filter_map(|transition| {
            log_debug!(
                "reservation {:?} moved from {} to {}",
                transition.reservation.id,
                transition.previous.as_str(),
                transition.current.as_str()
            );
            emitter.emit_status_change(&transition.reservation, &transition.current)
        })
        .count()
}
