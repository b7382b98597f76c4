use async_trait::async_trait;

/// Result of dispatching a split-payment invitation. Failures are surfaced
/// but never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteOutcome {
    Invited,
    Failed { reason: String },
}

/// External invitation dispatch collaborator, fire-and-forget from the
/// engine's perspective.
#[async_trait]
pub trait InviteDispatch: Send + Sync {
    async fn send_invite(&self, email: &str) -> InviteOutcome;
}
