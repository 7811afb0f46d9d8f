// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Missed-data recovery hooks run after a successful reconnect.

use std::future::Future;

use async_trait::async_trait;
use classline_core::ClasslineError;

/// Refetches whatever the client may have missed while disconnected.
#[async_trait]
pub trait RecoveryHandler: Send + Sync {
    async fn recover(&self) -> Result<(), ClasslineError>;
}

/// Recovery for channels with nothing to refetch.
pub struct NoRecovery;

#[async_trait]
impl RecoveryHandler for NoRecovery {
    async fn recover(&self) -> Result<(), ClasslineError> {
        Ok(())
    }
}

/// Adapts an async closure into a [`RecoveryHandler`].
pub struct FnRecovery<F>(pub F);

#[async_trait]
impl<F, Fut> RecoveryHandler for FnRecovery<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ClasslineError>> + Send,
{
    async fn recover(&self) -> Result<(), ClasslineError> {
        (self.0)().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn closure_recovery_is_invoked() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler = FnRecovery(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });
        handler.recover().await.unwrap();
        handler.recover().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn no_recovery_succeeds() {
        assert!(NoRecovery.recover().await.is_ok());
    }
}
