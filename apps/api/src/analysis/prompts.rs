// LLM prompt constants for résumé analysis and rewriting.
// Placeholders in braces are substituted with `str::replace` before sending.

/// System prompt for keyword analysis. Sent followed by `JSON_ONLY_SYSTEM`.
pub const ANALYSIS_SYSTEM: &str = "You are an Applicant Tracking System (ATS) scanner. \
    You compare a résumé against a job description the way a keyword-based ATS would.";

/// Analysis prompt. Replace `{job_description}` and `{resume_text}`.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Compare the résumé below with the job description.

Steps:
1. Identify the hiring company from the job description. If it is not stated, infer it from context or use "Unknown".
2. Identify the target country of the role (e.g. "Finland", "USA", "Remote") from the location or language. If unclear, use "International".
3. Extract the 10 most important hard skills and keywords of the job description.
4. Check which of those keywords appear in the résumé, literally or as a clear synonym.
5. Compute a match score from 0 to 100.
6. Summarize the fit in one or two sentences.

Return a JSON object with this EXACT schema:
{
  "hiring_company_name": "Acme Oy",
  "target_country": "Finland",
  "match_score": 75,
  "found_keywords": ["Python", "SQL"],
  "missing_keywords": ["AWS", "Docker"],
  "summary": "Strong backend fit, missing cloud experience."
}

A keyword must appear in exactly one of found_keywords and missing_keywords.

JOB DESCRIPTION:
{job_description}

RÉSUMÉ:
{resume_text}"#;

/// System prompt for rewriting. Sent followed by `JSON_ONLY_SYSTEM`.
pub const OPTIMIZE_SYSTEM: &str = "You are a professional résumé writer who tailors résumés \
    to specific roles for Applicant Tracking Systems.";

/// Rewrite prompt. Replace `{truthfulness_instruction}`, `{hiring_company}`,
/// `{target_country}`, `{missing_keywords}`, `{feedback_block}` and `{resume_text}`.
pub const OPTIMIZE_PROMPT_TEMPLATE: &str = r#"{truthfulness_instruction}

Rewrite the résumé below for a role at {hiring_company} in {target_country}.

Keywords the résumé is missing: {missing_keywords}

Guidelines:
- Keep the original structure, section order, and contact details.
- Weave missing keywords into the Experience and Skills sections where the existing content supports them.
- Follow the résumé conventions of {target_country} (length, tone, personal details).
- Keep the original language of the résumé.
{feedback_block}
Return a JSON object with this EXACT schema:
{
  "full_modified_text": "the complete rewritten résumé as plain text"
}

RÉSUMÉ:
{resume_text}"#;

/// Inserted into the rewrite prompt when the user asked for changes.
/// Replace `{feedback}`.
pub const FEEDBACK_BLOCK_TEMPLATE: &str = r#"
USER FEEDBACK on the previous rewrite (takes priority over the guidelines above):
{feedback}
"#;
