use tokio_util::sync::{CancellationToken, DropGuard};

/// The lifetime of whatever issued a request, typically one view.
///
/// Once cancelled, requests sent under the context resolve to
/// [`ClientError::Cancelled`](super::ClientError::Cancelled) and have no side
/// effects on the session. Child contexts are cancelled with their parent.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    token: CancellationToken,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that ends when `self` ends, or earlier if cancelled itself.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Cancel this context when the returned guard is dropped.
    pub fn drop_guard(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }
}
