use crate::models::{AnalysisReport, ApiResponse, IngestReport, RawObservation, SessionInfo};
use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// Pushes fetched fee batches into a running gas-window server.
pub struct FeedClient {
    base_url: String,
    client: Client,
}

#[derive(Serialize)]
struct IngestBody<'a> {
    observations: &'a [RawObservation],
    replace: bool,
}

impl FeedClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub async fn create_session(&self) -> Result<Uuid> {
        let response = self
            .client
            .post(format!("{}/api/sessions", self.base_url))
            .send()
            .await
            .context("Failed to create session")?;

        let info: SessionInfo = Self::unwrap_response(response).await?;
        tracing::info!("Created session {}", info.session_id);
        Ok(info.session_id)
    }

    pub async fn push(
        &self,
        session: Uuid,
        observations: &[RawObservation],
        replace: bool,
    ) -> Result<IngestReport> {
        let response = self
            .client
            .post(format!("{}/api/sessions/{}/observations", self.base_url, session))
            .json(&IngestBody {
                observations,
                replace,
            })
            .send()
            .await
            .context("Failed to push observations")?;

        let report: IngestReport = Self::unwrap_response(response).await?;
        if report.rejected > 0 {
            tracing::warn!("Server rejected {} observations", report.rejected);
        }
        Ok(report)
    }

    pub async fn forecast(&self, session: Uuid) -> Result<AnalysisReport> {
        let response = self
            .client
            .get(format!("{}/api/sessions/{}/forecast", self.base_url, session))
            .send()
            .await
            .context("Failed to request forecast")?;

        Self::unwrap_response(response).await
    }

    async fn unwrap_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            bail!("Request failed with {}: {}", status, error_text);
        }

        let body: ApiResponse<T> = response
            .json()
            .await
            .context("Unexpected response body")?;
        Ok(body.data)
    }
}
