use std::sync::{Arc, OnceLock};

use log::{info, warn};
use tokio::{
    task::JoinHandle,
    time::{self, Duration},
};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use uuid::Uuid;

use crate::config::ProgressConfig;

use super::progress::{ProgressEstimator, ProgressTracker};

/// How an attempt ended. Only the first settlement counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Completed,
    DeadlineElapsed,
    Aborted,
}

/// Lets another task cancel an in-flight upload on the operator's behalf.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    token: CancellationToken,
    outcome: Arc<OnceLock<Settlement>>,
}

impl AbortHandle {
    /// Returns `false` if the attempt had already settled.
    pub fn abort(&self) -> bool {
        let won = self.outcome.set(Settlement::Aborted).is_ok();
        self.token.cancel();
        won
    }
}

/// One bounded-deadline upload: a shared cancellation token raced by the deadline
/// timer, the operator's abort handle and the network call.
pub struct UploadAttempt {
    id: Uuid,
    deadline: Duration,
    token: CancellationToken,
    outcome: Arc<OnceLock<Settlement>>,
    timer: Option<JoinHandle<()>>,
    estimator: Option<ProgressEstimator>,
}

impl UploadAttempt {
    /// Arms the deadline timer immediately.
    pub fn begin(id: Uuid, deadline: Duration) -> Self {
        let token = CancellationToken::new();
        let outcome = Arc::new(OnceLock::new());

        let timer = tokio::spawn({
            let token = token.clone();
            let outcome = Arc::clone(&outcome);
            async move {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {}
                    _ = time::sleep(deadline) => {
                        if outcome.set(Settlement::DeadlineElapsed).is_ok() {
                            warn!("upload {id} hit its {} ms deadline", deadline.as_millis());
                        }
                        token.cancel();
                    }
                }
            }
        });

        info!("upload {id} started (deadline {} ms)", deadline.as_millis());

        Self {
            id,
            deadline,
            token,
            outcome,
            timer: Some(timer),
            estimator: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            token: self.token.clone(),
            outcome: Arc::clone(&self.outcome),
        }
    }

    pub fn start_estimator(&mut self, tracker: ProgressTracker, config: &ProgressConfig) {
        if self.estimator.is_none() && !self.token.is_cancelled() {
            self.estimator = Some(ProgressEstimator::spawn(
                tracker,
                config,
                self.token.child_token(),
            ));
        }
    }

    /// Resolves once the deadline fires, the operator aborts, or the attempt settles.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn settlement(&self) -> Option<Settlement> {
        self.outcome.get().copied()
    }

    /// Record `candidate` unless something settled first, cancel the token, and return
    /// whichever settlement won.
    pub fn settle(&self, candidate: Settlement) -> Settlement {
        let winner = *self.outcome.get_or_init(|| candidate);
        self.token.cancel();
        winner
    }

    pub fn is_torn_down(&self) -> bool {
        self.timer.is_none() && self.estimator.is_none()
    }

    /// Stop the deadline timer and the estimator and wait for both. Idempotent.
    pub async fn teardown(&mut self) {
        self.token.cancel();
        if let Some(timer) = self.timer.take() {
            if let Err(err) = timer.await {
                warn!("deadline timer for upload {} ended abnormally: {err}", self.id);
            }
        }
        if let Some(mut estimator) = self.estimator.take() {
            estimator.stop().await;
        }
    }
}

impl Drop for UploadAttempt {
    fn drop(&mut self) {
        self.token.cancel();
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn deadline_wins_when_nothing_else_settles() {
        let mut attempt = UploadAttempt::begin(Uuid::new_v4(), Duration::from_secs(120));
        attempt.cancelled().await;

        assert_eq!(attempt.settlement(), Some(Settlement::DeadlineElapsed));
        assert_eq!(attempt.settle(Settlement::Completed), Settlement::DeadlineElapsed);

        attempt.teardown().await;
        attempt.teardown().await;
        assert!(attempt.is_torn_down());
    }

    #[tokio::test(start_paused = true)]
    async fn first_settlement_suppresses_the_later_ones() {
        let mut attempt = UploadAttempt::begin(Uuid::new_v4(), Duration::from_secs(120));
        let abort = attempt.abort_handle();

        assert_eq!(attempt.settle(Settlement::Completed), Settlement::Completed);
        assert!(attempt.is_cancelled());
        assert!(!abort.abort());

        time::sleep(Duration::from_secs(300)).await;
        assert_eq!(attempt.settlement(), Some(Settlement::Completed));
        attempt.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn operator_abort_is_distinct_from_the_deadline() {
        let attempt = UploadAttempt::begin(Uuid::new_v4(), Duration::from_secs(120));
        let abort = attempt.abort_handle();

        time::sleep(Duration::from_secs(5)).await;
        assert!(abort.abort());
        attempt.cancelled().await;

        time::sleep(Duration::from_secs(300)).await;
        assert_eq!(attempt.settlement(), Some(Settlement::Aborted));
    }
}
