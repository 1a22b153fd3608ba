use std::sync::Arc;

use async_trait::async_trait;

use crate::analysis::{run_analysis, run_refinement, ResumeAnalyzer};
use crate::analysis_client::{AnalysisClient, ClientError};
use crate::errors::AppError;
use crate::models::{AnalyzeResponse, Document, RefineRequest, RefineResponse};

/// Runs the backend pipeline in-process. Used by offline hosts and tests.
#[derive(Clone)]
pub struct LocalAnalysisClient {
    analyzer: Arc<dyn ResumeAnalyzer>,
}

impl LocalAnalysisClient {
    pub fn new(analyzer: Arc<dyn ResumeAnalyzer>) -> Self {
        Self { analyzer }
    }
}

/// Same status and message a client of the HTTP backend would see.
fn to_client_error(err: AppError) -> ClientError {
    ClientError::Server {
        status: err.status_code().as_u16(),
        message: err.public_message(),
    }
}

#[async_trait]
impl AnalysisClient for LocalAnalysisClient {
    async fn analyze(
        &self,
        document: &Document,
        job_description: &str,
    ) -> Result<AnalyzeResponse, ClientError> {
        run_analysis(self.analyzer.as_ref(), document, job_description)
            .await
            .map_err(to_client_error)
    }

    async fn refine(&self, request: &RefineRequest) -> Result<RefineResponse, ClientError> {
        run_refinement(self.analyzer.as_ref(), request)
            .await
            .map_err(to_client_error)
    }
}
