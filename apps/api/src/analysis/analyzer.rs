//! Résumé analyzers: trait-based backends for keyword analysis and rewriting.
//!
//! Default: `LlmAnalyzer` (Claude via `llm_client`).
//! Offline: `KeywordAnalyzer` (pure-Rust, deterministic; see `keyword.rs`).
//!
//! `AppState` holds an `Arc<dyn ResumeAnalyzer>`, chosen at startup via `ANALYZER_BACKEND`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::analysis::prompts::{
    ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM, FEEDBACK_BLOCK_TEMPLATE, OPTIMIZE_PROMPT_TEMPLATE,
    OPTIMIZE_SYSTEM,
};
use crate::errors::AppError;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, TRUTHFULNESS_INSTRUCTION};
use crate::llm_client::LlmClient;
use crate::models::analysis::{deserialize_match_score, normalize_keywords, normalize_optional};
use crate::models::{AnalysisResult, OptimizationPayload, OptimizationResult};

/// Inputs for one rewrite of a résumé.
#[derive(Debug, Clone, Copy)]
pub struct OptimizeRequest<'a> {
    pub resume_text: &'a str,
    pub missing_keywords: &'a BTreeSet<String>,
    pub hiring_company_name: &'a str,
    pub target_country: &'a str,
    /// Present for refinements, absent for the initial rewrite.
    pub user_feedback: Option<&'a str>,
}

/// Implement this to swap analysis backends without touching handlers or clients.
#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<AnalysisResult, AppError>;

    async fn optimize(&self, request: OptimizeRequest<'_>) -> Result<OptimizationResult, AppError>;

    /// "llm" | "keyword", for logs.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmAnalyzer
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmAnalyzer(pub LlmClient);

#[async_trait]
impl ResumeAnalyzer for LlmAnalyzer {
    async fn analyze(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<AnalysisResult, AppError> {
        let prompt = build_analysis_prompt(resume_text, job_description);
        let report: AnalysisReport = self
            .0
            .call_json(&prompt, &system_prompt(ANALYSIS_SYSTEM))
            .await
            .map_err(|e| AppError::Llm(format!("Résumé analysis failed: {e}")))?;
        let result = report.into_result(resume_text);
        info!(
            "LLM analysis: score={} found={} missing={}",
            result.match_score,
            result.found_keywords.len(),
            result.missing_keywords.len()
        );
        Ok(result)
    }

    async fn optimize(&self, request: OptimizeRequest<'_>) -> Result<OptimizationResult, AppError> {
        let prompt = build_optimize_prompt(&request);
        let payload: OptimizationPayload = self
            .0
            .call_json(&prompt, &system_prompt(OPTIMIZE_SYSTEM))
            .await
            .map_err(|e| AppError::Llm(format!("Résumé rewrite failed: {e}")))?;
        payload
            .into_result()
            .ok_or_else(|| AppError::Llm("Rewrite response contained no text".to_string()))
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

/// Analysis as returned by the model, before normalization.
#[derive(Debug, Deserialize)]
pub struct AnalysisReport {
    #[serde(default)]
    pub hiring_company_name: Option<String>,
    #[serde(default)]
    pub target_country: Option<String>,
    #[serde(deserialize_with = "deserialize_match_score")]
    pub match_score: u8,
    #[serde(default)]
    pub found_keywords: Vec<String>,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

impl AnalysisReport {
    /// Normalizes keyword lists into disjoint sets. A keyword reported as both
    /// found and missing counts as found.
    pub fn into_result(self, extracted_text: &str) -> AnalysisResult {
        let found_keywords = normalize_keywords(&self.found_keywords);
        let missing_keywords = normalize_keywords(&self.missing_keywords)
            .into_iter()
            .filter(|k| !found_keywords.contains(k))
            .collect();
        AnalysisResult {
            extracted_text: extracted_text.to_string(),
            match_score: self.match_score,
            found_keywords,
            missing_keywords,
            summary: self.summary.trim().to_string(),
            hiring_company_name: normalize_optional(self.hiring_company_name),
            target_country: normalize_optional(self.target_country),
        }
    }
}

fn system_prompt(role: &str) -> String {
    format!("{role} {JSON_ONLY_SYSTEM}")
}

/// Substitutes `{name}` placeholders of `template` in a single scan. Inserted
/// values are never rescanned; unknown braces are copied as-is.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (close, *value))
        });
        match hit {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn build_analysis_prompt(resume_text: &str, job_description: &str) -> String {
    fill(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("job_description", job_description),
            ("resume_text", resume_text),
        ],
    )
}

fn build_optimize_prompt(request: &OptimizeRequest<'_>) -> String {
    let missing = if request.missing_keywords.is_empty() {
        "none".to_string()
    } else {
        request
            .missing_keywords
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let feedback_block = match request.user_feedback {
        Some(feedback) => fill(FEEDBACK_BLOCK_TEMPLATE, &[("feedback", feedback.trim())]),
        None => String::new(),
    };

    fill(
        OPTIMIZE_PROMPT_TEMPLATE,
        &[
            ("truthfulness_instruction", TRUTHFULNESS_INSTRUCTION),
            ("hiring_company", request.hiring_company_name),
            ("target_country", request.target_country),
            ("missing_keywords", &missing),
            ("feedback_block", &feedback_block),
            ("resume_text", request.resume_text),
        ],
    )
}
