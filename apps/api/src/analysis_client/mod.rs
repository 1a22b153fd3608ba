//! The collaborator interface a refinement session talks to.
//!
//! `HttpAnalysisClient` reaches a running backend over HTTP;
//! `LocalAnalysisClient` runs the backend pipeline in-process.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{AnalyzeResponse, Document, RefineRequest, RefineResponse};

pub mod http;
pub mod local;

pub use http::HttpAnalysisClient;
pub use local::LocalAnalysisClient;

/// Failure of a collaborator call. Cloned into the session's `last_error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server error (status {status}): {message}")]
    Server { status: u16, message: String },
}

/// Document analysis and rewriting backend.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn analyze(
        &self,
        document: &Document,
        job_description: &str,
    ) -> Result<AnalyzeResponse, ClientError>;

    async fn refine(&self, request: &RefineRequest) -> Result<RefineResponse, ClientError>;
}

#[async_trait]
impl<T: AnalysisClient + ?Sized> AnalysisClient for Arc<T> {
    async fn analyze(
        &self,
        document: &Document,
        job_description: &str,
    ) -> Result<AnalyzeResponse, ClientError> {
        (**self).analyze(document, job_description).await
    }

    async fn refine(&self, request: &RefineRequest) -> Result<RefineResponse, ClientError> {
        (**self).refine(request).await
    }
}
