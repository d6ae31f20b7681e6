//! Prediction requester: on-demand failure inference over HTTP.
//!
//! Snapshots the latest published readings, posts them to the inference
//! endpoint and publishes the verdict back to the store. Runs in the
//! caller's task, fully independent of the tick loop: a slow or dead
//! endpoint never delays tick scheduling, and a failed request never
//! overwrites the previously published verdict.

use crate::error::{PredictError, StoreError};
use crate::store::{keys, VariableStore};

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Published text when a failure is predicted.
pub const FAILURE_TEXT: &str = "Failure in future";
/// Published text when no failure is predicted.
pub const NO_FAILURE_TEXT: &str = "No failure";
/// Published reason when no failure is predicted.
pub const NO_FAILURE_REASON: &str = "No Failure";

/// A point-in-time copy of the published readings.
///
/// Copied out of the store before the request is sent, so ticks landing
/// while the call is in flight cannot mutate the payload. Field names
/// are the inference endpoint's wire schema.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionSnapshot {
    #[serde(rename = "productID")]
    pub product_id: String,
    pub air_temp: f32,
    pub process_temp: f32,
    pub rpm: f32,
    pub torque: f32,
    pub tool_wear: f32,
}

impl PredictionSnapshot {
    /// Copies the prediction inputs out of the store.
    pub fn from_store<S: VariableStore + ?Sized>(store: &S) -> Result<Self, StoreError> {
        Ok(Self {
            product_id: store.get_text(keys::PRODUCT_TYPE)?,
            air_temp: store.get_f32(keys::AIR_TEMPERATURE)?,
            process_temp: store.get_f32(keys::PROCESS_TEMPERATURE)?,
            rpm: store.get_f32(keys::ROTATIONAL_SPEED)?,
            torque: store.get_f32(keys::TORQUE)?,
            tool_wear: store.get_f32(keys::TOOL_WEAR)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    #[serde(default)]
    is_failure: i64,

    #[serde(default = "default_failure_type")]
    failure_type: String,
}

fn default_failure_type() -> String {
    "Unknown".to_string()
}

/// The parsed verdict of one inference call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionResult {
    pub is_failure: bool,
    pub failure_reason: String,
}

impl PredictionResult {
    fn from_response(response: PredictionResponse) -> Self {
        Self {
            is_failure: response.is_failure == 1,
            failure_reason: response.failure_type,
        }
    }

    /// Text published to the failure slot.
    pub fn failure_text(&self) -> &'static str {
        if self.is_failure {
            FAILURE_TEXT
        } else {
            NO_FAILURE_TEXT
        }
    }

    /// Text published to the reason slot.
    pub fn reason_text(&self) -> &str {
        if self.is_failure {
            &self.failure_reason
        } else {
            NO_FAILURE_REASON
        }
    }
}

/// HTTP client for the inference endpoint.
pub struct PredictionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl PredictionClient {
    /// Creates a client for the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Posts the snapshot and parses the verdict.
    ///
    /// The body is fetched as text first so a malformed reply surfaces as
    /// [`PredictError::Parse`] rather than being folded into the transport
    /// error.
    pub async fn request(
        &self,
        snapshot: &PredictionSnapshot,
    ) -> Result<PredictionResult, PredictError> {
        let response = self.http.post(&self.endpoint).json(snapshot).send().await?;
        let body = response.text().await?;
        debug!(%body, "inference endpoint replied");

        let parsed: PredictionResponse = serde_json::from_str(&body)?;
        Ok(PredictionResult::from_response(parsed))
    }

    /// Snapshots the store, requests a prediction and publishes the verdict.
    ///
    /// On any transport or parse failure the error is logged and returned;
    /// the previously published verdict slots stay untouched.
    pub async fn request_and_publish<S: VariableStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<PredictionResult, PredictError> {
        let snapshot = PredictionSnapshot::from_store(store)?;
        match self.request(&snapshot).await {
            Ok(result) => {
                publish(store, &result)?;
                Ok(result)
            }
            Err(e) => {
                error!("prediction request failed: {e}");
                Err(e)
            }
        }
    }
}

/// Writes the verdict to the store.
pub fn publish<S: VariableStore + ?Sized>(
    store: &S,
    result: &PredictionResult,
) -> Result<(), StoreError> {
    store.set(keys::FAILURE, result.failure_text().into())?;
    store.set(keys::FAILURE_REASON, result.reason_text().into())?;
    Ok(())
}
