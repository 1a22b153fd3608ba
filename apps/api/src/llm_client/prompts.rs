// Cross-cutting prompt fragments shared by every analyzer prompt.
// Task-specific prompts live in analysis/prompts.rs.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction appended to every rewriting prompt.
pub const TRUTHFULNESS_INSTRUCTION: &str = "\
    CRITICAL: Never invent employers, titles, dates, degrees, certifications, or metrics. \
    A keyword may only be introduced where the existing résumé content plausibly supports it. \
    If a keyword cannot be supported truthfully, leave it out.";
