use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::models::{NewReservation, Reservation};

use super::{AuthToken, ReservationSource};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

const CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: AuthToken,
}

impl ApiClient {
    pub fn new(base_url: &str, token: AuthToken) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn create_reservation(&self, reservation: &NewReservation) -> Result<Reservation> {
        let url = format!("{}/reservations", self.base_url);
        let response = self.send(self.client.post(&url).json(reservation)).await?;
        response
            .json::<Reservation>()
            .await
            .context("failed to decode created reservation")
    }

    fn reservations_url(&self, email: &str) -> String {
        format!(
            "{}/reservations/email/{}",
            self.base_url,
            urlencoding::encode(email)
        )
    }

    /// Attaches the bearer token when one is stored; a 401/403 answer drops it.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = match self.token.get() {
            Ok(Some(token)) => request.bearer_auth(token),
            Ok(None) => request,
            Err(err) => {
                log_warn!("Could not read auth token: {err:#}");
                request
            }
        };

        let response = request.send().await.context("backend request failed")?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            log_debug!("Backend rejected credentials ({status}); dropping token");
            if let Err(err) = self.token.clear() {
                log_warn!("Failed to drop rejected token: {err:#}");
            }
        }

        response
            .error_for_status()
            .with_context(|| format!("backend answered {status}"))
    }
}

#[async_trait]
impl ReservationSource for ApiClient {
    async fn reservations_by_email(&self, email: &str) -> Result<Vec<Reservation>> {
        let url = self.reservations_url(email);
        let response = self.send(self.client.get(&url)).await?;
        response
            .json::<Vec<Reservation>>()
            .await
            .context("failed to decode reservations")
    }
}
