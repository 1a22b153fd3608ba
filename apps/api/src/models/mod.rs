// Shared data model for the analysis workflow.
// These types cross every boundary: backend handlers, analysis clients, and the session.

pub mod analysis;
pub mod document;

pub use analysis::{
    AnalysisResult, AnalyzeResponse, OptimizationPayload, OptimizationResult, RefineRequest,
    RefineResponse, DEFAULT_HIRING_COMPANY, DEFAULT_TARGET_COUNTRY,
};
pub use document::Document;
