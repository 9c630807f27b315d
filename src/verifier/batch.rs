use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::{Verifier, VerifyError};
use crate::types::PingResult;

impl Verifier {
    /// Verifies up to `max_batch_size` addresses concurrently.
    pub async fn ping_batch<S: AsRef<str>>(
        &self,
        emails: &[S],
    ) -> Result<Vec<PingResult>, VerifyError> {
        self.ping_batch_sized(emails, self.options().max_batch_size)
            .await
    }

    pub async fn ping_batch_sized<S: AsRef<str>>(
        &self,
        emails: &[S],
        batch_size: usize,
    ) -> Result<Vec<PingResult>, VerifyError> {
        self.ping_batch_with_cancel(emails, batch_size, &CancellationToken::new())
            .await
    }

    /// Addresses past `batch_size` are dropped. Output order follows input
    /// order. The first task that fails (panic, cancellation) fails the whole
    /// batch; the remaining tasks are aborted and no partial list is returned.
    pub async fn ping_batch_with_cancel<S: AsRef<str>>(
        &self,
        emails: &[S],
        batch_size: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<PingResult>, VerifyError> {
        let log = self.inner.logger.as_ref();
        let batch: Vec<String> = emails
            .iter()
            .take(batch_size)
            .map(|email| email.as_ref().to_string())
            .collect();
        if emails.len() > batch.len() {
            log.info(&format!(
                "Batch truncated to {} of {} addresses",
                batch.len(),
                emails.len()
            ));
        }

        let permits = Arc::new(Semaphore::new(self.options().max_concurrency));
        let mut tasks = JoinSet::new();
        for (index, email) in batch.iter().cloned().enumerate() {
            let verifier = self.clone();
            let permits = Arc::clone(&permits);
            let token = cancel.child_token();
            tasks.spawn(async move {
                let _permit = tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(VerifyError::Cancelled),
                    permit = permits.acquire_owned() => {
                        permit.map_err(|_| VerifyError::Cancelled)?
                    }
                };
                let result = verifier.ping_with_cancel(&email, &token).await?;
                Ok::<_, VerifyError>((index, result))
            });
        }

        let mut slots: Vec<Option<PingResult>> = vec![None; batch.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined.map_err(VerifyError::task)??;
            slots[index] = Some(result);
        }
        Ok(slots.into_iter().flatten().collect())
    }
}
