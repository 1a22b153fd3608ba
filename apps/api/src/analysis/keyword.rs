use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;

use crate::analysis::analyzer::{OptimizeRequest, ResumeAnalyzer};
use crate::diff::tokenize::words;
use crate::errors::AppError;
use crate::models::{AnalysisResult, OptimizationResult};

/// Number of job-description keywords checked against the résumé.
pub const MAX_KEYWORDS: usize = 10;

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be",
    "been", "but", "by", "can", "do", "for", "from", "has", "have", "how", "i", "if", "in",
    "into", "is", "it", "its", "job", "join", "looking", "may", "more", "must", "not", "of", "on",
    "or", "our", "role", "should", "so", "such", "that", "the", "their", "them", "there", "these",
    "they", "this", "to", "us", "we", "what", "who", "will", "with", "work", "you", "your",
];

// ────────────────────────────────────────────────────────────────────────────
// KeywordAnalyzer
// ────────────────────────────────────────────────────────────────────────────

/// Pure-Rust keyword analyzer. Deterministic, no network.
///
/// Algorithm:
/// 1. Keywords are the distinct non-stopword words of the job description,
///    ranked by frequency, ties broken by first occurrence, capped at
///    `MAX_KEYWORDS`. A keyword keeps the casing of its first occurrence.
/// 2. A keyword is found when the résumé contains it as a whole word,
///    ignoring case.
/// 3. match_score = round(found / total × 100), 0 when there are no keywords.
///
/// Rewriting never invents experience: it appends a `Keywords:` line listing
/// the missing keywords the user did not push back on.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordAnalyzer;

#[async_trait]
impl ResumeAnalyzer for KeywordAnalyzer {
    async fn analyze(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<AnalysisResult, AppError> {
        Ok(compute_keyword_analysis(resume_text, job_description))
    }

    async fn optimize(&self, request: OptimizeRequest<'_>) -> Result<OptimizationResult, AppError> {
        Ok(append_missing_keywords(&request))
    }

    fn backend(&self) -> &'static str {
        "keyword"
    }
}

fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Ranks the job description's keywords. See `KeywordAnalyzer`.
pub fn extract_keywords(job_description: &str) -> Vec<String> {
    // lowercase -> (first spelling, frequency, first position)
    let mut seen: HashMap<String, (&str, u32, usize)> = HashMap::new();

    for (position, word) in words(job_description).enumerate() {
        let lower = word.to_lowercase();
        if lower.len() < 2 || is_stopword(&lower) || lower.chars().all(|c| c.is_numeric()) {
            continue;
        }
        seen.entry(lower)
            .and_modify(|(_, count, _)| *count += 1)
            .or_insert((word, 1, position));
    }

    let mut ranked: Vec<(&str, u32, usize)> = seen.into_values().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked
        .into_iter()
        .take(MAX_KEYWORDS)
        .map(|(word, _, _)| word.to_string())
        .collect()
}

fn lowercase_words(text: &str) -> HashSet<String> {
    words(text).map(str::to_lowercase).collect()
}

fn compute_keyword_analysis(resume_text: &str, job_description: &str) -> AnalysisResult {
    let keywords = extract_keywords(job_description);
    let resume_words = lowercase_words(resume_text);

    let (found, missing): (Vec<String>, Vec<String>) = keywords
        .iter()
        .cloned()
        .partition(|k| resume_words.contains(&k.to_lowercase()));

    let match_score = if keywords.is_empty() {
        0
    } else {
        ((found.len() as f64 / keywords.len() as f64) * 100.0).round() as u8
    };

    let summary = build_summary(match_score, keywords.is_empty(), &missing);

    AnalysisResult {
        extracted_text: resume_text.to_string(),
        match_score,
        found_keywords: found.into_iter().collect(),
        missing_keywords: missing.into_iter().collect(),
        summary,
        hiring_company_name: None,
        target_country: None,
    }
}

/// Human-readable summary from score and the highest-ranked gaps.
fn build_summary(score: u8, no_keywords: bool, missing: &[String]) -> String {
    if no_keywords {
        return "No keywords found in the job description; cannot score the match.".to_string();
    }
    let top_gaps: Vec<&str> = missing.iter().take(3).map(String::as_str).collect();

    if score >= 80 {
        "Strong match. The résumé covers the key terms of the job description.".to_string()
    } else if score >= 50 {
        format!(
            "Moderate match ({score}/100). Consider covering: {}.",
            top_gaps.join(", ")
        )
    } else {
        format!(
            "Low match ({score}/100). Significant gaps: {}.",
            top_gaps.join(", ")
        )
    }
}

fn append_missing_keywords(request: &OptimizeRequest<'_>) -> OptimizationResult {
    let rejected = request
        .user_feedback
        .map(lowercase_words)
        .unwrap_or_default();

    let kept: BTreeSet<&str> = request
        .missing_keywords
        .iter()
        .filter(|k| !rejected.contains(&k.to_lowercase()))
        .map(String::as_str)
        .collect();

    if kept.is_empty() {
        return OptimizationResult::new(request.resume_text);
    }

    let line = kept.into_iter().collect::<Vec<_>>().join(", ");
    OptimizationResult::new(format!(
        "{}\n\nKeywords: {line}",
        request.resume_text.trim_end()
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn request<'a>(
        resume_text: &'a str,
        missing: &'a BTreeSet<String>,
        feedback: Option<&'a str>,
    ) -> OptimizeRequest<'a> {
        OptimizeRequest {
            resume_text,
            missing_keywords: missing,
            hiring_company_name: "the company",
            target_country: "International",
            user_feedback: feedback,
        }
    }

    #[test]
    fn test_keywords_skip_stopwords() {
        let keywords = extract_keywords("Looking for a Python engineer");
        assert_eq!(keywords, vec!["Python", "engineer"]);
    }

    #[test]
    fn test_keywords_ranked_by_frequency_then_position() {
        let keywords = extract_keywords("Rust services. Kafka, Rust and Kafka. Rust tooling.");
        assert_eq!(keywords, vec!["Rust", "Kafka", "services", "tooling"]);
    }

    #[test]
    fn test_keywords_capped() {
        let jd = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu";
        let keywords = extract_keywords(jd);
        assert_eq!(keywords.len(), MAX_KEYWORDS);
        assert_eq!(keywords[0], "alpha");
        assert!(!keywords.contains(&"mu".to_string()));
    }

    #[test]
    fn test_java_resume_against_python_job() {
        let result = compute_keyword_analysis(
            "John Doe, Java developer",
            "Looking for a Python engineer",
        );
        assert_eq!(result.match_score, 0);
        assert_eq!(result.missing_keywords, set(&["Python", "engineer"]));
        assert!(result.found_keywords.is_empty());
        assert!(result.summary.starts_with("Low match"));
    }

    #[test]
    fn test_match_is_whole_word_and_case_insensitive() {
        let result = compute_keyword_analysis(
            "Senior JAVA engineer, some JavaScript",
            "Java engineer wanted",
        );
        assert_eq!(result.found_keywords, set(&["Java", "engineer"]));
        assert_eq!(result.missing_keywords, set(&["wanted"]));
        assert_eq!(result.match_score, 67);

        let partial = compute_keyword_analysis("JavaScript only", "Java");
        assert!(partial.missing_keywords.contains("Java"));
    }

    #[test]
    fn test_empty_job_description_scores_zero() {
        let result = compute_keyword_analysis("John Doe", "   ");
        assert_eq!(result.match_score, 0);
        assert!(result.found_keywords.is_empty());
        assert!(result.missing_keywords.is_empty());
    }

    #[test]
    fn test_full_match_scores_100() {
        let result = compute_keyword_analysis("Rust and Kafka expert", "Rust, Kafka");
        assert_eq!(result.match_score, 100);
        assert!(result.summary.starts_with("Strong match"));
    }

    #[test]
    fn test_optimize_appends_missing_keywords() {
        let missing = set(&["Python", "engineer"]);
        let result = append_missing_keywords(&request("John Doe\n", &missing, None));
        assert_eq!(result.rewritten_text, "John Doe\n\nKeywords: Python, engineer");
    }

    #[test]
    fn test_optimize_drops_keywords_named_in_feedback() {
        let missing = set(&["Python", "engineer"]);
        let result =
            append_missing_keywords(&request("John Doe", &missing, Some("remove python")));
        assert!(!result.rewritten_text.contains("Python"));
        assert!(result.rewritten_text.ends_with("Keywords: engineer"));
    }

    #[test]
    fn test_optimize_without_keywords_keeps_text() {
        let missing = set(&["Python"]);
        let result = append_missing_keywords(&request("John Doe", &missing, Some("no Python")));
        assert_eq!(result.rewritten_text, "John Doe");
    }

    #[tokio::test]
    async fn test_backend_label_is_keyword() {
        let analyzer = KeywordAnalyzer;
        assert_eq!(analyzer.backend(), "keyword");
        let result = analyzer.analyze("Rust", "Rust").await.unwrap();
        assert_eq!(result.match_score, 100);
    }
}
