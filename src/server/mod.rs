//! HTTP prediction service.
//!
//! Both artifacts are loaded once into a [`ServiceContext`] before the
//! listener is bound; if loading fails the process never accepts a request.
//! The context is immutable afterwards and shared by reference across
//! request handlers.

pub mod routes;

use crate::bio::normalize_sequence;
use crate::classifier::{ClassificationError, Label, LinearSvc};
use crate::config::artifact_paths;
use crate::io::{load_json, ArtifactError};
use crate::vectorizer::KmerVectorizer;
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use log::{debug, info, warn};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Fitted vectorizer and classifier, shared read-only by every request.
#[derive(Debug, Clone)]
pub struct ServiceContext {
    vectorizer: KmerVectorizer,
    model: LinearSvc,
}

impl ServiceContext {
    /// Pairs a vectorizer and a model, rejecting combinations that could not
    /// have come from the same training run.
    pub fn new(
        vectorizer: KmerVectorizer,
        model: LinearSvc,
        expected_k: usize,
    ) -> Result<Self, ArtifactError> {
        if vectorizer.k() != expected_k {
            return Err(ArtifactError::KmerMismatch {
                artifact: vectorizer.k(),
                configured: expected_k,
            });
        }
        if model.n_features() != vectorizer.n_features() {
            return Err(ArtifactError::FeatureMismatch {
                model: model.n_features(),
                vectorizer: vectorizer.n_features(),
            });
        }
        Ok(ServiceContext { vectorizer, model })
    }

    /// Reads both artifacts from `artifact_dir`.
    pub fn load(artifact_dir: &Path, expected_k: usize) -> Result<Self, ArtifactError> {
        let (model_path, vectorizer_path) = artifact_paths(artifact_dir);
        let model: LinearSvc = load_json(&model_path)?;
        let vectorizer: KmerVectorizer = load_json(&vectorizer_path)?;
        info!(
            "Loaded model ({} features) and vectorizer (k={}) from {}",
            model.n_features(),
            vectorizer.k(),
            artifact_dir.display()
        );
        Self::new(vectorizer, model, expected_k)
    }

    /// K-mer size the service tokenizes with.
    pub fn k(&self) -> usize {
        self.vectorizer.k()
    }

    /// Normalizes, tokenizes, vectorizes and classifies one raw sequence.
    ///
    /// A sequence shorter than k becomes an all-zero vector; it is still
    /// scored (by the bias alone) and a warning is logged.
    pub fn predict(&self, raw: &str) -> Result<Label, ClassificationError> {
        let sequence = normalize_sequence(raw);
        if sequence.len() < self.k() {
            warn!(
                "Sequence of {} usable bases is shorter than k={}; prediction rests on the bias alone",
                sequence.len(),
                self.k()
            );
        }
        let features = self.vectorizer.transform_sequence(&sequence);
        let labels = self.model.predict(&features)?;
        debug!("Predicted {} for {} bases", labels[0], sequence.len());
        Ok(labels[0])
    }
}

/// Builds the router with permissive CORS on every route.
pub fn router(ctx: Arc<ServiceContext>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::home))
        .route("/predict", post(routes::predict))
        .layer(cors)
        .with_state(ctx)
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve(ctx: Arc<ServiceContext>, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(
        "Prediction service listening on http://{}",
        listener.local_addr()?
    );
    axum::serve(listener, router(ctx)).await?;
    Ok(())
}
