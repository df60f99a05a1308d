//! Request handlers and wire types of the prediction service.

use super::ServiceContext;
use crate::classifier::ClassificationError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Body of `POST /predict`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(rename = "DNA_sequence", default)]
    pub dna_sequence: Option<String>,
}

impl PredictRequest {
    /// The sequence to classify, or [`RequestError::MissingSequence`] when
    /// the field is absent, null or empty.
    pub fn into_sequence(self) -> Result<String, RequestError> {
        match self.dna_sequence {
            Some(sequence) if !sequence.is_empty() => Ok(sequence),
            _ => Err(RequestError::MissingSequence),
        }
    }
}

/// Successful answer of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    /// The request's sequence, echoed unchanged.
    #[serde(rename = "DNA_sequence")]
    pub dna_sequence: String,
    pub prediction: u8,
    pub meaning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("No sequence provided")]
    MissingSequence,

    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    #[error("Prediction failed: {0}")]
    Prediction(#[from] ClassificationError),
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = match &self {
            RequestError::MissingSequence | RequestError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            RequestError::Prediction(e) => {
                error!("Prediction failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// `GET /`: liveness check.
pub async fn home() -> &'static str {
    "API Running!"
}

/// `POST /predict`: classifies one sequence.
pub async fn predict(
    State(ctx): State<Arc<ServiceContext>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, RequestError> {
    let Json(request) = payload.map_err(|rejection| RequestError::InvalidBody(rejection.body_text()))?;
    let sequence = request.into_sequence()?;
    let label = ctx.predict(&sequence)?;

    Ok(Json(PredictResponse {
        dna_sequence: sequence,
        prediction: label.as_u8(),
        meaning: label.meaning().to_string(),
    }))
}
