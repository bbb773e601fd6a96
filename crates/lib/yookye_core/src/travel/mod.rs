//! Typed wrappers for the travel endpoints.
//!
//! Job status/result responses are returned raw; the `jobs` module owns
//! the normalization of the server's status vocabulary.

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::models::travel::{
    Destination, SubmitFormResponse, TravelForm, TravelSummary, ValidationError,
};

/// Travel operation failures.
#[derive(Debug, Error)]
pub enum TravelError {
    /// Client-side form rejection; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct TravelsEnvelope {
    travels: Vec<TravelSummary>,
}

#[derive(Deserialize)]
struct DestinationsEnvelope {
    destinations: Vec<Destination>,
}

/// Travel API surface bound to a client.
#[derive(Clone)]
pub struct TravelApi {
    api: ApiClient,
}

impl TravelApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Submit the trip-preference form. Validation runs first; a
    /// rejected form never reaches the network.
    pub async fn submit_form(&self, form: &TravelForm) -> Result<SubmitFormResponse, TravelError> {
        form.validate()?;
        let body = serde_json::to_value(form)?;
        let value = self.api.post("/travel/submit-form", &body).await?;
        let response: SubmitFormResponse = serde_json::from_value(value)?;
        debug!(travel_id = %response.travel_id, job_id = ?response.external_job_id, "form submitted");
        Ok(response)
    }

    /// The caller's travel requests.
    pub async fn my_travels(&self) -> Result<Vec<TravelSummary>, TravelError> {
        let value = self.api.get("/travel/my-travels").await?;
        Ok(serde_json::from_value::<TravelsEnvelope>(value)?.travels)
    }

    /// Full detail for one travel request.
    pub async fn travel_details(&self, travel_id: &str) -> ApiResult<Value> {
        self.api.get(&format!("/travel/travel/{travel_id}")).await
    }

    /// Update a travel request status (expert/admin flows).
    pub async fn update_travel_status(&self, travel_id: &str, status: &str) -> ApiResult<Value> {
        let body = json!({ "status": status });
        self.api
            .put(&format!("/travel/travel/{travel_id}/status"), &body)
            .await
    }

    /// Aggregate statistics for the caller's travels.
    pub async fn statistics(&self) -> ApiResult<Value> {
        self.api.get("/travel/statistics").await
    }

    /// Available destinations (public, unauthenticated).
    pub async fn destinations(&self) -> Result<Vec<Destination>, TravelError> {
        let value = self.api.get("/travel/destinations").await?;
        Ok(serde_json::from_value::<DestinationsEnvelope>(value)?.destinations)
    }

    /// Raw status document for a recommendation job.
    pub async fn job_status(&self, job_id: &str) -> ApiResult<Value> {
        self.api.get(&format!("/travel/job/{job_id}/status")).await
    }

    /// Final result payload for a completed job. Not assumed idempotent;
    /// callers fetch at most once per job lifetime.
    pub async fn job_result(&self, job_id: &str) -> ApiResult<Value> {
        self.api.get(&format!("/travel/job/{job_id}/result")).await
    }

    /// Backend liveness probe.
    pub async fn health(&self) -> ApiResult<Value> {
        self.api.get("/health").await
    }
}
