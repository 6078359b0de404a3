use std::future::Future;

use tracing::warn;

use crate::{HairscanError, Result};

/// Message shown to end users for every kind of failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again in a moment.";

/// Failed request as presented to the user.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Failure {
    /// User-facing text; identical for every error kind.
    pub message: &'static str,
    /// Diagnostic text for logs and support.
    pub detail: String,
}

impl From<&HairscanError> for Failure {
    fn from(err: &HairscanError) -> Self {
        Self {
            message: GENERIC_FAILURE_MESSAGE,
            detail: err.to_string(),
        }
    }
}

/// Lifecycle of one request as seen by a display layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestState<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed(Failure),
}

impl<T> RequestState<T> {
    /// Enters `Loading`, dropping any previous result.
    pub fn start(&mut self) {
        *self = Self::Loading;
    }

    /// Records the outcome of the request started by [`RequestState::start`].
    pub fn finish(&mut self, result: Result<T>) {
        *self = match result {
            Ok(value) => Self::Ready(value),
            Err(err) => {
                warn!(error = %err, "request failed");
                Self::Failed(Failure::from(&err))
            }
        };
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Runs `task`, moving `state` to `Loading` and then to its outcome.
pub async fn track<T, F>(state: &mut RequestState<T>, task: F)
where
    F: Future<Output = Result<T>>,
{
    state.start();
    let result = task.await;
    state.finish(result);
}

#[cfg(test)]
mod tests {
    use super::{track, RequestState, GENERIC_FAILURE_MESSAGE};
    use crate::HairscanError;

    #[test]
    fn starts_idle() {
        let state: RequestState<u8> = RequestState::default();
        assert_eq!(state, RequestState::Idle);
        assert!(state.value().is_none());
        assert!(state.failure().is_none());
    }

    #[tokio::test]
    async fn track_moves_to_ready() {
        let mut state = RequestState::Idle;
        track(&mut state, async { Ok(7u8) }).await;
        assert_eq!(state.value(), Some(&7));
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn every_error_kind_shows_the_same_message() {
        let errors = [
            HairscanError::Http {
                status: 404,
                body: "missing".to_owned(),
            },
            HairscanError::Http {
                status: 503,
                body: "down".to_owned(),
            },
            HairscanError::Decode("bad".to_owned()),
        ];

        for err in errors {
            let detail = err.to_string();
            let mut state: RequestState<u8> = RequestState::Idle;
            track(&mut state, async move { Err(err) }).await;

            let failure = state.failure().expect("state must be failed");
            assert_eq!(failure.message, GENERIC_FAILURE_MESSAGE);
            assert_eq!(failure.detail, detail);
        }
    }

    #[test]
    fn start_clears_previous_result() {
        let mut state = RequestState::Ready(1u8);
        state.start();
        assert!(state.is_loading());
        assert!(state.value().is_none());
    }
}
