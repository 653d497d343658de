use std::{
    any::Any,
    panic::AssertUnwindSafe,
    sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError},
};

use bytes::Bytes;
use futures::FutureExt;
use serde::Serialize;
use tokio::{
    sync::{Mutex, watch},
    task::AbortHandle,
};
use utoipa::ToSchema;

use crate::domain::food_analysis::{
    entities::AnalysisResult,
    errors::{AnalysisError, AnalysisErrorKind},
    ports::FoodAnalysisService,
};

/// Lifecycle of the analysis shown to a user.
#[derive(Debug, Clone)]
pub enum SessionState {
    Idle,
    ImageSet,
    Analyzing,
    Succeeded(AnalysisResult),
    Failed(AnalysisFailure),
}

/// What the presentation layer shows for a failed analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AnalysisFailure {
    /// `None` when the analysis task died without producing a classified error.
    pub kind: Option<AnalysisErrorKind>,
    pub message: String,
}

impl From<&AnalysisError> for AnalysisFailure {
    fn from(error: &AnalysisError) -> Self {
        Self {
            kind: Some(error.kind()),
            message: error.user_message(),
        }
    }
}

impl AnalysisFailure {
    fn aborted() -> Self {
        Self {
            kind: None,
            message: "The analysis stopped unexpectedly. Please try again.".to_string(),
        }
    }
}

/// Observable fields derived from the current [`SessionState`].
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionSnapshot {
    pub has_image: bool,
    pub analyzing: bool,
    pub result: Option<AnalysisResult>,
    pub error: Option<AnalysisFailure>,
}

impl SessionSnapshot {
    fn from_state(has_image: bool, state: &SessionState) -> Self {
        let (analyzing, result, error) = match state {
            SessionState::Idle | SessionState::ImageSet => (false, None, None),
            SessionState::Analyzing => (true, None, None),
            SessionState::Succeeded(result) => (false, Some(result.clone()), None),
            SessionState::Failed(failure) => (false, None, Some(failure.clone())),
        };

        Self {
            has_image,
            analyzing,
            result,
            error,
        }
    }
}

struct SessionInner {
    image: Option<Bytes>,
    state: SessionState,
    /// Bumped whenever an outcome must no longer be published.
    generation: u64,
}

struct Shared<S> {
    service: S,
    inner: Mutex<SessionInner>,
    /// Kept outside `inner` so it can be reached synchronously from `Drop`.
    in_flight: StdMutex<Option<AbortHandle>>,
    publisher: watch::Sender<SessionSnapshot>,
}

impl<S> Shared<S> {
    fn in_flight(&self) -> MutexGuard<'_, Option<AbortHandle>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn abort_in_flight(&self) {
        if let Some(handle) = self.in_flight().take() {
            tracing::debug!("Cancelling in-flight analysis");
            handle.abort();
        }
    }

    fn publish(&self, inner: &SessionInner) -> SessionSnapshot {
        let snapshot = SessionSnapshot::from_state(inner.image.is_some(), &inner.state);
        self.publisher.send_replace(snapshot.clone());
        snapshot
    }

    async fn complete(
        &self,
        generation: u64,
        outcome: Result<Result<AnalysisResult, AnalysisError>, Box<dyn Any + Send>>,
    ) -> SessionSnapshot {
        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            tracing::debug!("Discarding outcome of superseded analysis");
            return self.publisher.borrow().clone();
        }

        self.in_flight().take();
        inner.state = match outcome {
            Ok(Ok(result)) => SessionState::Succeeded(result),
            Ok(Err(error)) => {
                tracing::warn!(kind = ?error.kind(), "Food analysis failed: {}", error);
                SessionState::Failed(AnalysisFailure::from(&error))
            }
            Err(_) => {
                tracing::error!("Food analysis task panicked");
                SessionState::Failed(AnalysisFailure::aborted())
            }
        };

        self.publish(&inner)
    }
}

/// Single-writer state machine between a UI and a [`FoodAnalysisService`].
///
/// Every transition is published on a watch channel. Replacing or clearing the
/// image aborts the in-flight call and guarantees its outcome is never shown.
pub struct AnalysisSession<S> {
    shared: Arc<Shared<S>>,
}

impl<S> AnalysisSession<S>
where
    S: FoodAnalysisService + 'static,
{
    pub fn new(service: S) -> Self {
        let inner = SessionInner {
            image: None,
            state: SessionState::Idle,
            generation: 0,
        };
        let (publisher, _) = watch::channel(SessionSnapshot::from_state(false, &inner.state));

        Self {
            shared: Arc::new(Shared {
                service,
                inner: Mutex::new(inner),
                in_flight: StdMutex::new(None),
                publisher,
            }),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.publisher.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.publisher.subscribe()
    }

    pub async fn state(&self) -> SessionState {
        self.shared.inner.lock().await.state.clone()
    }

    /// Replaces the active image (or clears it with `None`), dropping any
    /// previous result, error or in-flight analysis.
    pub async fn set_image(&self, image: Option<Bytes>) -> SessionSnapshot {
        let mut inner = self.shared.inner.lock().await;

        inner.generation += 1;
        self.shared.abort_in_flight();

        inner.state = if image.is_some() {
            SessionState::ImageSet
        } else {
            SessionState::Idle
        };
        inner.image = image;

        self.shared.publish(&inner)
    }

    /// Analyzes the current image and returns the snapshot visible once the
    /// call finishes. A call already in flight is left alone.
    pub async fn analyze(&self) -> SessionSnapshot {
        let task = {
            let mut inner = self.shared.inner.lock().await;

            if matches!(inner.state, SessionState::Analyzing) {
                return self.snapshot();
            }

            let Some(image) = inner.image.clone() else {
                inner.state = SessionState::Failed(AnalysisFailure::from(&AnalysisError::Input));
                return self.shared.publish(&inner);
            };

            inner.generation += 1;
            let generation = inner.generation;
            let shared = Arc::clone(&self.shared);

            // The task records its own outcome so the state settles even if
            // the caller stops awaiting.
            let task = tokio::spawn(async move {
                let outcome = AssertUnwindSafe(shared.service.analyze(image))
                    .catch_unwind()
                    .await;
                shared.complete(generation, outcome).await
            });

            *self.shared.in_flight() = Some(task.abort_handle());
            inner.state = SessionState::Analyzing;
            self.shared.publish(&inner);

            task
        };

        match task.await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                if !e.is_cancelled() {
                    tracing::error!("Analysis task failed: {}", e);
                }
                self.snapshot()
            }
        }
    }
}

impl<S> Drop for AnalysisSession<S> {
    fn drop(&mut self) {
        self.shared.abort_in_flight();
    }
}
