use tokio_util::sync::CancellationToken;

use crate::utils::logging::LoggingState;

/// Network-facing state: where prompts go and which request is in flight.
pub struct SessionContext {
    pub endpoint: String,
    pub logging: LoggingState,
    pub request_cancel_token: Option<CancellationToken>,
    pub current_request_id: u64,
}

impl SessionContext {
    pub fn new(endpoint: String, logging: LoggingState) -> Self {
        Self {
            endpoint,
            logging,
            request_cancel_token: None,
            current_request_id: 0,
        }
    }

    /// Allocate the id and cancel token for a new request.
    pub fn begin_request(&mut self) -> (u64, CancellationToken) {
        self.current_request_id += 1;
        let token = CancellationToken::new();
        self.request_cancel_token = Some(token.clone());
        (self.current_request_id, token)
    }

    /// Cancel the in-flight request, if any, and invalidate its id.
    pub fn cancel_request(&mut self) -> bool {
        match self.request_cancel_token.take() {
            Some(token) => {
                token.cancel();
                self.current_request_id += 1;
                true
            }
            None => false,
        }
    }

    /// Whether a reply tagged `request_id` still belongs to the history.
    pub fn accepts(&self, request_id: u64) -> bool {
        self.request_cancel_token.is_some() && request_id == self.current_request_id
    }

    pub fn finish_request(&mut self) {
        self.request_cancel_token = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionContext {
        SessionContext::new(
            "http://localhost/ultron".into(),
            LoggingState::new(None).expect("logging"),
        )
    }

    #[test]
    fn begin_request_issues_increasing_ids() {
        let mut session = session();
        let (first, _) = session.begin_request();
        session.finish_request();
        let (second, _) = session.begin_request();
        assert!(second > first);
        assert!(session.accepts(second));
        assert!(!session.accepts(first));
    }

    #[test]
    fn cancel_invalidates_pending_reply() {
        let mut session = session();
        let (id, token) = session.begin_request();
        assert!(session.cancel_request());
        assert!(token.is_cancelled());
        assert!(!session.accepts(id));
        assert!(!session.cancel_request());
    }
}
