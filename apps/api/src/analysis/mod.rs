// Backend analysis pipeline: document extraction, keyword analysis, résumé rewriting.
// LLM-backed work goes through llm_client; the keyword analyzer runs fully offline.

pub mod analyzer;
pub mod extract;
pub mod handlers;
pub mod keyword;
pub mod pipeline;
pub mod prompts;

pub use analyzer::{LlmAnalyzer, OptimizeRequest, ResumeAnalyzer};
pub use keyword::KeywordAnalyzer;
pub use pipeline::{run_analysis, run_refinement};
