//! Solve session — one problem's journey through parse, solve, feedback.

use quantix_core::types::{FeedbackRequest, ParseResponse, ProblemInput, Rating, SolveResponse};
use tracing::debug;

use crate::client::SolverClient;

/// Request-scoped state for a single problem.
///
/// Holds the parse and solve responses so feedback can pair them up, and
/// enforces the order: solve needs a stored parse, feedback needs both.
/// Request methods take `&mut self`, so a session has at most one request
/// in flight.
pub struct SolveSession {
    client: SolverClient,
    parsed: Option<ParseResponse>,
    solved: Option<SolveResponse>,
}

impl SolveSession {
    pub fn new(client: SolverClient) -> Self {
        Self {
            client,
            parsed: None,
            solved: None,
        }
    }

    /// Parse an input and store the result. Any previous solution is
    /// dropped so feedback can never pair a stale solution with a new
    /// problem.
    pub async fn parse(&mut self, input: &ProblemInput) -> Result<&ParseResponse, String> {
        let response = self.client.parse(input).await?;
        debug!(
            "session: parsed ({}, confidence {})",
            response.parsed_problem.topic, response.confidence
        );
        self.solved = None;
        Ok(self.parsed.insert(response))
    }

    /// Solve the stored parsed problem.
    pub async fn solve(&mut self) -> Result<&SolveResponse, String> {
        let parsed = self
            .parsed
            .as_ref()
            .ok_or("nothing parsed yet - parse a problem first")?;
        let response = self.client.solve(&parsed.parsed_problem).await?;
        debug!("session: solved {} problem(s)", response.total_problems);
        Ok(self.solved.insert(response))
    }

    /// Parse-then-solve shortcut, used by the dictation flow.
    pub async fn solve_input(&mut self, input: &ProblemInput) -> Result<&SolveResponse, String> {
        self.parse(input).await?;
        self.solve().await
    }

    /// Submit a rating for the stored problem/solution pair.
    pub async fn feedback(
        &mut self,
        rating: Rating,
        correction: Option<String>,
    ) -> Result<(), String> {
        let parsed = self
            .parsed
            .as_ref()
            .ok_or("nothing to rate - parse and solve a problem first")?;
        let solved = self
            .solved
            .as_ref()
            .ok_or("nothing to rate - solve the problem first")?;
        let request = FeedbackRequest {
            problem: parsed.parsed_problem.clone(),
            solution: solved.clone(),
            feedback: rating.as_wire().to_string(),
            correction,
        };
        self.client.feedback(&request).await
    }

    pub fn parsed(&self) -> Option<&ParseResponse> {
        self.parsed.as_ref()
    }

    pub fn solved(&self) -> Option<&SolveResponse> {
        self.solved.as_ref()
    }

    /// Forget the stored request state.
    pub fn reset(&mut self) {
        self.parsed = None;
        self.solved = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantix_core::types::ClientConfig;

    fn offline_session() -> SolveSession {
        // Unroutable port: guard errors must fire before any request.
        let client = SolverClient::new(ClientConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();
        SolveSession::new(client)
    }

    #[tokio::test]
    async fn solve_requires_a_parse() {
        let mut session = offline_session();
        let err = session.solve().await.unwrap_err();
        assert_eq!(err, "nothing parsed yet - parse a problem first");
    }

    #[tokio::test]
    async fn feedback_requires_parse_and_solution() {
        let mut session = offline_session();
        let err = session.feedback(Rating::Up, None).await.unwrap_err();
        assert_eq!(err, "nothing to rate - parse and solve a problem first");
    }

    #[tokio::test]
    async fn reset_clears_stored_state() {
        let mut session = offline_session();
        assert!(session.parsed().is_none());
        session.reset();
        assert!(session.parsed().is_none());
        assert!(session.solved().is_none());
    }
}
