//! Refinement session: the client-side state machine for one document upload.
//!
//! ```text
//! Idle ──analyze──▶ Analyzing ──ok──▶ Analyzed ──refine──▶ Refining
//!  ▲                    │                ▲  ▲                 │
//!  │                    └─err─▶ Failed ──┘  └────ok / err─────┘
//!  └── analyze is also accepted from Failed and Analyzed
//! ```
//!
//! Rules:
//! - At most one collaborator call is in flight per session. Any call made
//!   while one is pending fails with `SessionError::Concurrency` and leaves
//!   the state untouched.
//! - Results are applied atomically, and only if the call that produced them
//!   is still the current one.
//! - A failed refinement keeps the last good optimization.
//! - The session performs no I/O of its own: no logging, retries, or timers.

mod state;

use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::analysis_client::{AnalysisClient, ClientError};
use crate::models::{Document, RefineRequest};

pub use state::{Operation, Phase, SessionState};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("precondition failed: {0}")]
    Precondition(&'static str),

    #[error("a {in_flight} request is already in flight")]
    Concurrency { in_flight: Operation },

    #[error("response discarded: the session moved on while the request was in flight")]
    Superseded,

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Receipt for a completed refinement. The host uses it to clear its
/// feedback input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refinement {
    /// 1 for the first refinement after an analysis, 2 for the next, …
    pub revision: u32,
}

struct Inner {
    state: SessionState,
    /// Identifies the call currently allowed to apply its result.
    ticket: u64,
}

impl Inner {
    fn ensure_available(&self) -> Result<(), SessionError> {
        match self.state.phase.in_flight() {
            Some(in_flight) => Err(SessionError::Concurrency { in_flight }),
            None => Ok(()),
        }
    }

    fn begin(&mut self, phase: Phase) -> u64 {
        self.ticket += 1;
        self.state.phase = phase;
        self.state.last_error = None;
        self.ticket
    }

    fn refine_request(&self, feedback: &str) -> Result<RefineRequest, SessionError> {
        let state = &self.state;
        let (Some(original_text), Some(analysis), Some(_)) =
            (&state.original_text, &state.analysis, &state.optimization)
        else {
            return Err(SessionError::Precondition(
                "there is no optimization to refine yet",
            ));
        };
        if feedback.trim().is_empty() {
            return Err(SessionError::Precondition("feedback is required"));
        }
        Ok(RefineRequest {
            original_text: original_text.clone(),
            missing_keywords: analysis.missing_keywords.clone(),
            hiring_company_name: analysis.hiring_company_or_default().to_string(),
            target_country: analysis.target_country_or_default().to_string(),
            feedback: feedback.trim().to_string(),
        })
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks a call as in flight. Dropping it unsettled (the host abandoned the
/// future) returns the session to `on_abandon` and invalidates the ticket.
struct InFlight<'a> {
    inner: &'a Mutex<Inner>,
    ticket: u64,
    on_abandon: Phase,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn new(inner: &'a Mutex<Inner>, ticket: u64, on_abandon: Phase) -> Self {
        Self {
            inner,
            ticket,
            on_abandon,
            settled: false,
        }
    }

    /// Re-acquires the state for applying a result, if this call is still current.
    fn settle(mut self) -> Result<MutexGuard<'a, Inner>, SessionError> {
        self.settled = true;
        let inner = lock(self.inner);
        if inner.ticket != self.ticket {
            return Err(SessionError::Superseded);
        }
        Ok(inner)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut inner = lock(self.inner);
        if inner.ticket == self.ticket {
            inner.ticket += 1;
            inner.state.phase = self.on_abandon;
        }
    }
}

/// One analysis session: an upload, its analysis, and any number of refinements.
pub struct RefinementSession<C> {
    client: C,
    inner: Mutex<Inner>,
}

impl<C: AnalysisClient> RefinementSession<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            inner: Mutex::new(Inner {
                state: SessionState::new(),
                ticket: 0,
            }),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn snapshot(&self) -> SessionState {
        lock(&self.inner).state.clone()
    }

    pub fn phase(&self) -> Phase {
        lock(&self.inner).state.phase
    }

    /// Analyzes `document` against `job_description`, replacing any previous result.
    ///
    /// On collaborator failure the session enters `Failed` with `last_error`
    /// set and no result; another `analyze` may be issued right away.
    pub async fn analyze(
        &self,
        document: Document,
        job_description: &str,
    ) -> Result<(), SessionError> {
        let ticket = {
            let mut inner = lock(&self.inner);
            inner.ensure_available()?;
            if document.is_empty() {
                return Err(SessionError::Precondition("a non-empty document is required"));
            }
            if job_description.trim().is_empty() {
                return Err(SessionError::Precondition("a job description is required"));
            }
            inner.state.clear_result();
            inner.begin(Phase::Analyzing)
        };

        let call = InFlight::new(&self.inner, ticket, Phase::Idle);
        let outcome = self.client.analyze(&document, job_description).await;
        let mut inner = call.settle()?;

        match outcome {
            Ok(response) => {
                let state = &mut inner.state;
                state.original_text = Some(response.extracted_text);
                state.analysis = Some(response.analysis);
                state.optimization = Some(response.optimization);
                state.refinements = 0;
                state.phase = Phase::Analyzed;
                Ok(())
            }
            Err(error) => {
                inner.state.last_error = Some(error.clone());
                inner.state.phase = Phase::Failed {
                    during: Operation::Analyze,
                };
                Err(SessionError::Client(error))
            }
        }
    }

    /// Asks the collaborator to rewrite the current optimization per `feedback`.
    ///
    /// The session returns to `Analyzed` either way; on failure the previous
    /// optimization is kept and `last_error` is set.
    pub async fn refine(&self, feedback: &str) -> Result<Refinement, SessionError> {
        let (ticket, request) = {
            let mut inner = lock(&self.inner);
            inner.ensure_available()?;
            let request = inner.refine_request(feedback)?;
            (inner.begin(Phase::Refining), request)
        };

        let call = InFlight::new(&self.inner, ticket, Phase::Analyzed);
        let outcome = self.client.refine(&request).await;
        let mut inner = call.settle()?;
        inner.state.phase = Phase::Analyzed;

        match outcome {
            Ok(response) => {
                let state = &mut inner.state;
                state.optimization = Some(response.optimization);
                state.refinements += 1;
                Ok(Refinement {
                    revision: state.refinements,
                })
            }
            Err(error) => {
                inner.state.last_error = Some(error.clone());
                Err(SessionError::Client(error))
            }
        }
    }
}
