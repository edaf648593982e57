pub use tokio_util::sync::CancellationToken;

/// Returned from a cancellation checkpoint once the host has cancelled the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation was cancelled")]
pub struct Cancelled;

/// Cancellation checkpoint.
///
/// Operations call this at every point where they are about to touch frontend data (parse
/// trees, symbols, other documents). There is no retry: the caller propagates the error.
pub fn check_cancelled(token: &CancellationToken) -> Result<(), Cancelled> {
    if token.is_cancelled() {
        tracing::debug!(target: "sable.core", "cancellation observed at checkpoint");
        return Err(Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_reports_cancellation() {
        let token = CancellationToken::new();
        assert_eq!(check_cancelled(&token), Ok(()));

        let child = token.child_token();
        token.cancel();
        assert_eq!(check_cancelled(&token), Err(Cancelled));
        assert_eq!(check_cancelled(&child), Err(Cancelled));
    }
}
