use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Reservation, ReservationStatus};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum WatcherStatus {
    #[default]
    Idle,
    Active,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatcherState {
    pub status: WatcherStatus,
    pub email: Option<String>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
}

impl WatcherState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, email: String) {
        *self = Self {
            status: WatcherStatus::Active,
            email: Some(email),
            last_checked_at: None,
            consecutive_failures: 0,
        };
    }

    pub fn record_success(&mut self, at: DateTime<Utc>) {
        self.last_checked_at = Some(at);
        self.consecutive_failures = 0;
    }

    pub fn record_failure(&mut self) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A reservation whose status differs from the previous poll.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTransition {
    pub reservation: Reservation,
    pub previous: ReservationStatus,
    pub current: ReservationStatus,
}

/// Statuses seen on the last successful poll, keyed by reservation id.
/// `None` until the first poll lands.
#[derive(Debug, Default)]
pub struct ReservationBaseline {
    statuses: Option<HashMap<String, ReservationStatus>>,
}

impl ReservationBaseline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_primed(&self) -> bool {
        self.statuses.is_some()
    }

    /// Compares `fetched` with the previous poll, then makes `fetched` the new
    /// baseline. The first call only primes the baseline. Reservations absent
    /// from the previous poll are not transitions.
    pub fn advance(&mut self, fetched: &[Reservation]) -> Vec<StatusTransition> {
        let transitions = match &self.statuses {
            None => Vec::new(),
            Some(previous) => fetched
                .iter()
                .filter_map(|reservation| {
                    let id = reservation.id.as_ref()?;
                    let before = previous.get(id)?;
                    let after = reservation.canonical_status();
                    (*before != after).then(|| StatusTransition {
                        reservation: reservation.clone(),
                        previous: before.clone(),
                        current: after,
                    })
                })
                .collect(),
        };

        self.statuses = Some(
            fetched
                .iter()
                .filter_map(|reservation| {
                    reservation
                        .id
                        .clone()
                        .map(|id| (id, reservation.canonical_status()))
                })
                .collect(),
        );

        transitions
    }

    pub fn reset(&mut self) {
        self.statuses = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservation(id: &str, status: &str) -> Reservation {
        Reservation {
            id: Some(id.into()),
            date: "2024-08-01".into(),
            time: "10:00".into(),
            status: Some(status.into()),
            ..Reservation::default()
        }
    }

    #[test]
    fn first_poll_only_primes() {
        let mut baseline = ReservationBaseline::new();
        assert!(!baseline.is_primed());
        let transitions = baseline.advance(&[
            reservation("r1", "confirme"),
            reservation("r2", "annule"),
        ]);
        assert!(transitions.is_empty());
        assert!(baseline.is_primed());
    }

    #[test]
    fn detects_change_by_id_regardless_of_order() {
        let mut baseline = ReservationBaseline::new();
        baseline.advance(&[reservation("r1", "en_attente"), reservation("r2", "en_attente")]);

        let transitions = baseline.advance(&[
            reservation("r3", "confirme"),
            reservation("r2", "en_attente"),
            reservation("r1", "confirme"),
        ]);

        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].reservation.id.as_deref(), Some("r1"));
        assert_eq!(transitions[0].previous, ReservationStatus::Pending);
        assert_eq!(transitions[0].current, ReservationStatus::Confirmed);
    }

    #[test]
    fn accent_only_differences_are_not_transitions() {
        let mut baseline = ReservationBaseline::new();
        baseline.advance(&[reservation("r1", "confirme")]);
        assert!(baseline.advance(&[reservation("r1", "confirmé")]).is_empty());
        assert!(baseline.advance(&[reservation("r1", "CONFIRMÉ")]).is_empty());
    }

    #[test]
    fn baseline_moves_forward_each_poll() {
        let mut baseline = ReservationBaseline::new();
        baseline.advance(&[reservation("r1", "en_attente")]);
        assert_eq!(baseline.advance(&[reservation("r1", "confirme")]).len(), 1);
        assert!(baseline.advance(&[reservation("r1", "confirme")]).is_empty());
        assert_eq!(baseline.advance(&[reservation("r1", "annulé")]).len(), 1);
    }

    #[test]
    fn empty_first_poll_still_primes() {
        let mut baseline = ReservationBaseline::new();
        baseline.advance(&[]);
        assert!(baseline.is_primed());
        assert!(baseline.advance(&[reservation("r1", "confirme")]).is_empty());
    }

    #[test]
    fn reset_drops_the_baseline() {
        let mut baseline = ReservationBaseline::new();
        baseline.advance(&[reservation("r1", "en_attente")]);
        baseline.reset();
        assert!(baseline.advance(&[reservation("r1", "confirme")]).is_empty());
    }

    #[test]
    fn state_tracks_failures_until_success() {
        let mut state = WatcherState::new();
        state.begin("client@example.com".into());
        state.record_failure();
        state.record_failure();
        assert_eq!(state.consecutive_failures, 2);

        state.record_success(Utc::now());
        assert_eq!(state.consecutive_failures, 0);
        assert_eq!(state.status, WatcherStatus::Active);

        state.reset();
        assert_eq!(state, WatcherState::default());
    }
}
