use doq_client_domain::{DoqError, QueryPhase};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation token plus optional deadline, threaded through every
/// suspending step of a query.
///
/// Cloning shares the token: cancelling any clone cancels them all.
#[derive(Debug, Clone)]
pub struct QueryContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl QueryContext {
    /// No deadline, fresh token.
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Derives a context that is cancelled with its parent and expires no
    /// later than the parent does.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(parent) => parent.min(candidate),
            None => candidate,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_done(&self) -> bool {
        self.err(QueryPhase::Start).is_some()
    }

    /// `Some` once the context is cancelled or past its deadline.
    /// Cancellation takes precedence.
    pub fn err(&self, phase: QueryPhase) -> Option<DoqError> {
        if self.token.is_cancelled() {
            return Some(DoqError::Canceled { phase });
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Some(DoqError::DeadlineExceeded { phase })
            }
            _ => None,
        }
    }

    /// Drives `fut` until it completes, the token fires or the deadline
    /// passes. A context that is already done never polls `fut`.
    pub async fn run<F>(&self, phase: QueryPhase, fut: F) -> Result<F::Output, DoqError>
    where
        F: Future,
    {
        if let Some(err) = self.err(phase) {
            return Err(err);
        }

        let expiry = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(DoqError::Canceled { phase }),
            _ = expiry => Err(DoqError::DeadlineExceeded { phase }),
            output = fut => Ok(output),
        }
    }
}

impl Default for QueryContext {
    fn default() -> Self {
        Self::background()
    }
}
