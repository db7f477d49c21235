//! Client side of the salon REST backend.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Reservation;

pub mod auth;
mod client;

pub use auth::AuthToken;
pub use client::ApiClient;

pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

/// Where the poller gets reservations from.
#[async_trait]
pub trait ReservationSource: Send + Sync {
    async fn reservations_by_email(&self, email: &str) -> Result<Vec<Reservation>>;
}
