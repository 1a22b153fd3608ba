use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Company name sent with a refinement when the analysis could not identify one.
pub const DEFAULT_HIRING_COMPANY: &str = "the company";
/// Target country sent with a refinement when the analysis could not identify one.
pub const DEFAULT_TARGET_COUNTRY: &str = "International";

/// Keyword analysis of a résumé against a job description.
///
/// Produced once per analysis call and never mutated afterwards. `found_keywords`
/// and `missing_keywords` are disjoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub extracted_text: String,
    /// Integer percentage, 0 – 100.
    #[serde(deserialize_with = "deserialize_match_score")]
    pub match_score: u8,
    #[serde(default)]
    pub found_keywords: BTreeSet<String>,
    #[serde(default)]
    pub missing_keywords: BTreeSet<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub hiring_company_name: Option<String>,
    #[serde(default)]
    pub target_country: Option<String>,
}

impl AnalysisResult {
    pub fn hiring_company_or_default(&self) -> &str {
        self.hiring_company_name
            .as_deref()
            .unwrap_or(DEFAULT_HIRING_COMPANY)
    }

    pub fn target_country_or_default(&self) -> &str {
        self.target_country
            .as_deref()
            .unwrap_or(DEFAULT_TARGET_COUNTRY)
    }
}

/// A rewritten résumé. Each refinement produces a new one that replaces the last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub rewritten_text: String,
}

impl OptimizationResult {
    pub fn new(rewritten_text: impl Into<String>) -> Self {
        Self {
            rewritten_text: rewritten_text.into(),
        }
    }
}

/// Optimization as emitted by a rewriting model. Models may return the full
/// document, a snippet, or both; the full document wins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptimizationPayload {
    #[serde(default)]
    pub full_modified_text: Option<String>,
    #[serde(default)]
    pub rewritten_text: Option<String>,
}

impl OptimizationPayload {
    /// Collapses the payload into a single rewritten text. `None` when neither
    /// field carries any content.
    pub fn into_result(self) -> Option<OptimizationResult> {
        let non_blank = |text: Option<String>| text.filter(|t| !t.trim().is_empty());
        non_blank(self.full_modified_text)
            .or_else(|| non_blank(self.rewritten_text))
            .map(OptimizationResult::new)
    }
}

/// Response body of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub extracted_text: String,
    pub analysis: AnalysisResult,
    pub optimization: OptimizationResult,
}

/// Request body of `POST /refine`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefineRequest {
    pub original_text: String,
    #[serde(default)]
    pub missing_keywords: BTreeSet<String>,
    pub hiring_company_name: String,
    pub target_country: String,
    pub feedback: String,
}

/// Response body of `POST /refine`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefineResponse {
    pub optimization: OptimizationResult,
}

/// Accepts any JSON number, rounds it, and clamps it into 0 – 100.
pub fn deserialize_match_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Err(serde::de::Error::custom("match_score must be a finite number"));
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

/// Trims keywords, drops blanks and duplicates.
pub fn normalize_keywords<I, S>(keywords: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|k| k.as_ref().trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Blank values and "Unknown" placeholders become `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("unknown"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis_json(score: &str) -> String {
        format!(
            r#"{{
                "extracted_text": "John Doe",
                "match_score": {score},
                "found_keywords": ["Java"],
                "missing_keywords": ["Python", "Python"],
                "summary": "Partial match"
            }}"#
        )
    }

    #[test]
    fn test_match_score_accepts_integer() {
        let result: AnalysisResult = serde_json::from_str(&analysis_json("75")).unwrap();
        assert_eq!(result.match_score, 75);
        assert_eq!(result.missing_keywords.len(), 1);
        assert_eq!(result.hiring_company_name, None);
    }

    #[test]
    fn test_match_score_rounds_and_clamps() {
        let rounded: AnalysisResult = serde_json::from_str(&analysis_json("66.6")).unwrap();
        assert_eq!(rounded.match_score, 67);
        let high: AnalysisResult = serde_json::from_str(&analysis_json("140")).unwrap();
        assert_eq!(high.match_score, 100);
        let low: AnalysisResult = serde_json::from_str(&analysis_json("-5")).unwrap();
        assert_eq!(low.match_score, 0);
    }

    #[test]
    fn test_match_score_rejects_strings() {
        assert!(serde_json::from_str::<AnalysisResult>(&analysis_json("\"high\"")).is_err());
    }

    #[test]
    fn test_defaults_for_missing_company_and_country() {
        let result: AnalysisResult = serde_json::from_str(&analysis_json("10")).unwrap();
        assert_eq!(result.hiring_company_or_default(), DEFAULT_HIRING_COMPANY);
        assert_eq!(result.target_country_or_default(), DEFAULT_TARGET_COUNTRY);
    }

    #[test]
    fn test_payload_prefers_full_text() {
        let payload = OptimizationPayload {
            full_modified_text: Some("full".to_string()),
            rewritten_text: Some("snippet".to_string()),
        };
        assert_eq!(payload.into_result().unwrap().rewritten_text, "full");
    }

    #[test]
    fn test_payload_falls_back_to_snippet() {
        let payload: OptimizationPayload =
            serde_json::from_str(r#"{"full_modified_text": "  ", "rewritten_text": "snippet"}"#)
                .unwrap();
        assert_eq!(payload.into_result().unwrap().rewritten_text, "snippet");
    }

    #[test]
    fn test_empty_payload_has_no_result() {
        assert!(OptimizationPayload::default().into_result().is_none());
    }

    #[test]
    fn test_normalize_keywords() {
        let set = normalize_keywords([" AWS ", "", "Docker", "AWS"]);
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["AWS", "Docker"]);
    }

    #[test]
    fn test_normalize_optional_drops_unknown() {
        assert_eq!(normalize_optional(Some("Unknown".to_string())), None);
        assert_eq!(normalize_optional(Some("  ".to_string())), None);
        assert_eq!(
            normalize_optional(Some(" Nokia ".to_string())).as_deref(),
            Some("Nokia")
        );
    }
}
