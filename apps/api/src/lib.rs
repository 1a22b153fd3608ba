//! cvscan: résumé analysis against a job description, feedback-driven
//! rewriting, and the word-level diff used to show what changed.

pub mod analysis;
pub mod analysis_client;
pub mod config;
pub mod diff;
pub mod errors;
pub mod llm_client;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
