use std::fmt;

use uuid::Uuid;

use crate::analysis_client::ClientError;
use crate::models::{AnalysisResult, OptimizationResult};

/// The two requests a session can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Analyze,
    Refine,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Analyze => f.write_str("analyze"),
            Operation::Refine => f.write_str("refine"),
        }
    }
}

/// Lifecycle phase of a refinement session.
///
/// `Analyzed` covers both the first successful analysis and every successful
/// refinement after it; `SessionState::refinements` tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Analyzing,
    Analyzed,
    Refining,
    Failed { during: Operation },
}

impl Phase {
    /// The operation currently awaiting its collaborator, if any.
    pub fn in_flight(&self) -> Option<Operation> {
        match self {
            Phase::Analyzing => Some(Operation::Analyze),
            Phase::Refining => Some(Operation::Refine),
            _ => None,
        }
    }
}

/// Read-only snapshot of a session, handed to the host for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub session_id: Uuid,
    pub phase: Phase,
    pub original_text: Option<String>,
    pub analysis: Option<AnalysisResult>,
    pub optimization: Option<OptimizationResult>,
    pub last_error: Option<ClientError>,
    /// Successful refinements since the last analysis.
    pub refinements: u32,
}

impl SessionState {
    pub(crate) fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            phase: Phase::Idle,
            original_text: None,
            analysis: None,
            optimization: None,
            last_error: None,
            refinements: 0,
        }
    }

    /// Drops the result of any previous analysis.
    pub(crate) fn clear_result(&mut self) {
        self.original_text = None;
        self.analysis = None;
        self.optimization = None;
        self.refinements = 0;
    }

    /// Both texts the host needs for a before/after diff, once an
    /// optimization exists.
    pub fn diff_inputs(&self) -> Option<(&str, &str)> {
        let original = self.original_text.as_deref()?;
        let rewritten = self.optimization.as_ref()?.rewritten_text.as_str();
        Some((original, rewritten))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_phases() {
        assert_eq!(Phase::Analyzing.in_flight(), Some(Operation::Analyze));
        assert_eq!(Phase::Refining.in_flight(), Some(Operation::Refine));
        assert_eq!(Phase::Idle.in_flight(), None);
        assert_eq!(Phase::Analyzed.in_flight(), None);
        assert_eq!(
            Phase::Failed {
                during: Operation::Analyze
            }
            .in_flight(),
            None
        );
    }

    #[test]
    fn test_new_state_is_idle_and_empty() {
        let state = SessionState::new();
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.diff_inputs().is_none());
        assert_eq!(state.refinements, 0);
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        assert_ne!(SessionState::new().session_id, SessionState::new().session_id);
    }

    #[test]
    fn test_diff_inputs_require_optimization() {
        let mut state = SessionState::new();
        state.original_text = Some("original".to_string());
        assert!(state.diff_inputs().is_none());
        state.optimization = Some(OptimizationResult::new("rewritten"));
        assert_eq!(state.diff_inputs(), Some(("original", "rewritten")));
    }
}
