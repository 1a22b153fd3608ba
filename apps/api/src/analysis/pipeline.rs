//! Analysis pipeline: extract → analyze → optimize, and the refinement path.
//!
//! Shared by the HTTP handlers and the in-process `LocalAnalysisClient`, so
//! both hosts see the same validation and the same results.

use anyhow::Context;
use tracing::info;

use crate::analysis::analyzer::{OptimizeRequest, ResumeAnalyzer};
use crate::analysis::extract::extract_text;
use crate::errors::AppError;
use crate::models::{AnalyzeResponse, Document, OptimizationResult, RefineRequest, RefineResponse};

/// Extracts the résumé text, scores it against the job description and
/// produces the first rewrite.
///
/// The rewrite step is skipped when nothing is missing: the optimization is
/// then the extracted text unchanged.
pub async fn run_analysis(
    analyzer: &dyn ResumeAnalyzer,
    document: &Document,
    job_description: &str,
) -> Result<AnalyzeResponse, AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    if document.is_empty() {
        return Err(AppError::Validation("file cannot be empty".to_string()));
    }

    // PDF parsing is CPU-bound.
    let owned = document.clone();
    let extracted_text = tokio::task::spawn_blocking(move || extract_text(&owned))
        .await
        .context("Text extraction task panicked")??;

    info!(
        "Extracted {} chars from {} (backend={})",
        extracted_text.len(),
        document.file_name,
        analyzer.backend()
    );

    let analysis = analyzer.analyze(&extracted_text, job_description).await?;

    let optimization = if analysis.missing_keywords.is_empty() {
        OptimizationResult::new(extracted_text.as_str())
    } else {
        analyzer
            .optimize(OptimizeRequest {
                resume_text: &extracted_text,
                missing_keywords: &analysis.missing_keywords,
                hiring_company_name: analysis.hiring_company_or_default(),
                target_country: analysis.target_country_or_default(),
                user_feedback: None,
            })
            .await?
    };

    info!(
        "Analysis complete: score={} missing={}",
        analysis.match_score,
        analysis.missing_keywords.len()
    );

    Ok(AnalyzeResponse {
        extracted_text,
        analysis,
        optimization,
    })
}

/// Rewrites the original résumé again with the user's feedback applied.
pub async fn run_refinement(
    analyzer: &dyn ResumeAnalyzer,
    request: &RefineRequest,
) -> Result<RefineResponse, AppError> {
    if request.original_text.trim().is_empty() {
        return Err(AppError::Validation(
            "original_text cannot be empty".to_string(),
        ));
    }
    let feedback = request.feedback.trim();
    if feedback.is_empty() {
        return Err(AppError::Validation("feedback cannot be empty".to_string()));
    }

    let optimization = analyzer
        .optimize(OptimizeRequest {
            resume_text: &request.original_text,
            missing_keywords: &request.missing_keywords,
            hiring_company_name: &request.hiring_company_name,
            target_country: &request.target_country,
            user_feedback: Some(feedback),
        })
        .await?;

    info!(
        "Refinement complete: {} chars (backend={})",
        optimization.rewritten_text.len(),
        analyzer.backend()
    );

    Ok(RefineResponse { optimization })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::analysis::extract::ExtractError;
    use crate::analysis::KeywordAnalyzer;

    fn refine_request(feedback: &str) -> RefineRequest {
        RefineRequest {
            original_text: "John Doe, Java developer".to_string(),
            missing_keywords: BTreeSet::from(["Python".to_string(), "engineer".to_string()]),
            hiring_company_name: "the company".to_string(),
            target_country: "International".to_string(),
            feedback: feedback.to_string(),
        }
    }

    #[tokio::test]
    async fn test_analysis_of_text_resume() {
        let document = Document::new("resume.txt", "John Doe, Java developer");
        let response = run_analysis(&KeywordAnalyzer, &document, "Looking for a Python engineer")
            .await
            .unwrap();

        assert_eq!(response.extracted_text, "John Doe, Java developer");
        assert_eq!(response.analysis.extracted_text, response.extracted_text);
        assert!(response.analysis.missing_keywords.contains("Python"));
        assert!(response
            .optimization
            .rewritten_text
            .starts_with("John Doe, Java developer"));
        assert!(response.optimization.rewritten_text.contains("Python"));
    }

    #[tokio::test]
    async fn test_nothing_missing_keeps_text() {
        let document = Document::new("resume.md", "Rust and Kafka expert");
        let response = run_analysis(&KeywordAnalyzer, &document, "Rust, Kafka")
            .await
            .unwrap();
        assert_eq!(response.analysis.match_score, 100);
        assert_eq!(
            response.optimization.rewritten_text,
            "Rust and Kafka expert"
        );
    }

    #[tokio::test]
    async fn test_blank_job_description_is_rejected() {
        let document = Document::new("resume.txt", "John Doe");
        let err = run_analysis(&KeywordAnalyzer, &document, " \n ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unsupported_format_is_rejected() {
        let document = Document::new("resume.rtf", "{\\rtf1 John Doe}");
        let err = run_analysis(&KeywordAnalyzer, &document, "Python")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Extraction(ExtractError::UnsupportedFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_docx_resume_is_analyzed() {
        let bytes = crate::analysis::extract::docx_fixture(&["John Doe", "Python developer"]);
        let document = Document::new("resume.docx", bytes);
        let response = run_analysis(&KeywordAnalyzer, &document, "Python")
            .await
            .unwrap();
        assert_eq!(response.extracted_text, "John Doe\nPython developer");
        assert!(response.analysis.found_keywords.contains("Python"));
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected() {
        let document = Document::new("resume.txt", "   \n");
        let err = run_analysis(&KeywordAnalyzer, &document, "Python")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Extraction(ExtractError::NoText)));
    }

    #[tokio::test]
    async fn test_refinement_applies_feedback() {
        let response = run_refinement(&KeywordAnalyzer, &refine_request("  remove Python "))
            .await
            .unwrap();
        assert!(!response.optimization.rewritten_text.contains("Python"));
        assert!(response.optimization.rewritten_text.contains("engineer"));
    }

    #[tokio::test]
    async fn test_refinement_requires_feedback() {
        let err = run_refinement(&KeywordAnalyzer, &refine_request("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_refinement_requires_original_text() {
        let mut request = refine_request("more detail");
        request.original_text = String::new();
        let err = run_refinement(&KeywordAnalyzer, &request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
