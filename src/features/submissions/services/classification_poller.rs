use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::config::PollConfig;
use crate::core::error::{AppError, Result};
use crate::features::submissions::models::Submission;
use crate::modules::api::{ClassificationStatus, MaintenanceApi};

/// Bounded, strictly sequential long-poll for a submission's classification
///
/// Each fetch is issued only after the previous one answered, with
/// `interval` between them. After `max_attempts` unsuccessful fetches the
/// poll gives up with `ClassificationTimeout`; there is never an extra
/// request past the budget.
pub struct ClassificationPoller {
    api: Arc<dyn MaintenanceApi>,
    config: PollConfig,
}

impl ClassificationPoller {
    pub fn new(api: Arc<dyn MaintenanceApi>, config: PollConfig) -> Self {
        Self { api, config }
    }

    pub async fn poll(&self, id: Uuid, cancel: &CancellationToken) -> Result<Submission> {
        tracing::info!(
            "Polling classification for {} (every {:?}, up to {} attempts)",
            id,
            self.config.interval,
            self.config.max_attempts
        );

        for attempt in 1..=self.config.max_attempts {
            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AppError::Cancelled),
                status = self.api.fetch_classification(id) => status?,
            };

            match status {
                ClassificationStatus::Ready(submission) => {
                    tracing::info!("Submission {} classified after {} attempts", id, attempt);
                    return Ok(*submission);
                }
                ClassificationStatus::Pending => {
                    tracing::debug!("Submission {} not classified yet (attempt {})", id, attempt);
                }
                ClassificationStatus::Retryable(reason) => {
                    tracing::warn!(
                        "Classification fetch for {} failed (attempt {}): {}",
                        id,
                        attempt,
                        reason
                    );
                }
            }

            if attempt == self.config.max_attempts {
                break;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AppError::Cancelled),
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }

        tracing::error!(
            "Submission polling timeout for {} after {} attempts",
            id,
            self.config.max_attempts
        );
        Err(AppError::ClassificationTimeout {
            attempts: self.config.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::FakeApi;
    use std::time::Duration;
    use tokio::time::Instant;

    fn poller(api: Arc<FakeApi>) -> ClassificationPoller {
        ClassificationPoller::new(api, PollConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_after_exactly_max_attempts() {
        let api = Arc::new(FakeApi::default());
        let id = Uuid::new_v4();
        let started = Instant::now();

        let err = poller(api.clone())
            .poll(id, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::ClassificationTimeout { attempts: 100 }
        ));
        assert_eq!(api.fetch_count(id), 100);
        // 99 gaps of 500ms between 100 attempts
        assert_eq!(started.elapsed(), Duration::from_millis(99 * 500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_are_spaced_by_interval() {
        let api = Arc::new(FakeApi::default());
        let id = Uuid::new_v4();
        let config = PollConfig {
            interval: Duration::from_millis(500),
            max_attempts: 4,
        };

        let _ = ClassificationPoller::new(api.clone(), config)
            .poll(id, &CancellationToken::new())
            .await;

        let times = api.fetch_times(id);
        assert_eq!(times.len(), 4);
        for pair in times.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::from_millis(500));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_submission_once_ready() {
        let api = Arc::new(FakeApi::default());
        let id = Uuid::new_v4();
        api.ready_after(id, 3, Submission::pending(id));

        let submission = poller(api.clone())
            .poll(id, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(submission.id, id);
        assert_eq!(api.fetch_count(id), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_errors_are_retried() {
        let api = Arc::new(FakeApi::default());
        let id = Uuid::new_v4();
        api.fail_transiently(id, 2);
        api.ready_after(id, 3, Submission::pending(id));

        let submission = poller(api.clone())
            .poll(id, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(submission.id, id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_error_stops_polling() {
        let api = Arc::new(FakeApi::default());
        let id = Uuid::new_v4();
        api.reject_classification(id, 403);

        let err = poller(api.clone())
            .poll(id, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::ClassificationUnavailable { status: 403 }
        ));
        assert_eq!(api.fetch_count(id), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_wait() {
        let api = Arc::new(FakeApi::default());
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1_250)).await;
            canceller.cancel();
        });

        let err = poller(api.clone()).poll(id, &cancel).await.unwrap_err();
        assert!(matches!(err, AppError::Cancelled));
        // Attempts at 0ms, 500ms and 1000ms; cancelled before the 1500ms one
        assert_eq!(api.fetch_count(id), 3);
    }
}
