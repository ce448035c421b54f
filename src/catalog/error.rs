//! Failure classification at the destination boundary.
//!
//! Every mutating destination call returns [`DestinationError`]; callers match on
//! [`ErrorClass`] to decide between "already done", "retry once", and "give up".

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use super::id_map::DestId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The entity already exists server-side.
    Conflict,
    /// Server-side failure; worth exactly one more attempt.
    Transient,
    /// Caller-side or unrecoverable failure.
    Permanent,
}

#[derive(Debug, Error)]
pub enum DestinationError {
    #[error("conflict: {message}")]
    Conflict {
        existing_id: Option<DestId>,
        message: String,
    },
    #[error("server error {status}: {body}")]
    Server { status: u16, body: String },
    #[error("request failed with status {status}: {body}")]
    Client { status: u16, body: String },
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("decode: {0}")]
    Decode(String),
}

impl DestinationError {
    pub fn class(&self) -> ErrorClass {
        match self {
            DestinationError::Conflict { .. } => ErrorClass::Conflict,
            DestinationError::Server { .. } => ErrorClass::Transient,
            // Transport failures are not retried.
            DestinationError::Client { .. }
            | DestinationError::Transport(_)
            | DestinationError::Decode(_) => ErrorClass::Permanent,
        }
    }

    /// Existing destination id carried by a conflict, if the server named one.
    pub fn existing_id(&self) -> Option<DestId> {
        match self {
            DestinationError::Conflict { existing_id, .. } => *existing_id,
            _ => None,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.class() == ErrorClass::Transient
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConflictBody {
    #[serde(default)]
    id: Option<DestId>,
}

/// Map a non-2xx response to its error. Returns `None` for success statuses.
/// Informational and redirect statuses that reach here are client errors.
pub fn classify_status(status: u16, body: &str) -> Option<DestinationError> {
    match status {
        200..=299 => None,
        409 => {
            let existing_id = serde_json::from_str::<ConflictBody>(body)
                .ok()
                .and_then(|b| b.id)
                .filter(|id| *id > 0);
            Some(DestinationError::Conflict {
                existing_id,
                message: body.to_string(),
            })
        }
        500..=599 => Some(DestinationError::Server {
            status,
            body: body.to_string(),
        }),
        _ => Some(DestinationError::Client {
            status,
            body: body.to_string(),
        }),
    }
}

/// Run `op`; on a transient failure wait `delay` and run it exactly once more.
/// The second outcome is returned as-is.
pub async fn with_single_retry<T, F, Fut>(
    delay: Duration,
    what: &str,
    mut op: F,
) -> Result<T, DestinationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DestinationError>>,
{
    match op().await {
        Err(err) if err.is_transient() => {
            warn!(
                error = %err,
                delay_ms = delay.as_millis() as u64,
                "{what}: transient failure; retrying once"
            );
            tokio::time::sleep(delay).await;
            op().await
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn success_statuses_are_not_errors() {
        assert!(classify_status(200, "").is_none());
        assert!(classify_status(201, "{}").is_none());
        assert!(classify_status(204, "").is_none());
    }

    #[test]
    fn conflict_carries_existing_id_hint() {
        let err = classify_status(409, r#"{"id": 42, "title": "dupe"}"#).unwrap();
        assert_eq!(err.class(), ErrorClass::Conflict);
        assert_eq!(err.existing_id(), Some(42));
    }

    #[test]
    fn conflict_without_usable_hint() {
        for body in ["already exists", r#"{"error": "dupe"}"#, r#"{"id": 0}"#] {
            let err = classify_status(409, body).unwrap();
            assert_eq!(err.class(), ErrorClass::Conflict);
            assert_eq!(err.existing_id(), None, "body: {body}");
        }
    }

    #[test]
    fn server_errors_are_transient() {
        for status in [500, 502, 503, 599] {
            assert_eq!(
                classify_status(status, "boom").unwrap().class(),
                ErrorClass::Transient
            );
        }
    }

    #[test]
    fn other_statuses_are_permanent() {
        for status in [101, 302, 304, 400, 401, 404, 422] {
            assert_eq!(
                classify_status(status, "nope").unwrap().class(),
                ErrorClass::Permanent
            );
        }
        assert_eq!(
            DestinationError::Decode("bad json".into()).class(),
            ErrorClass::Permanent
        );
    }

    #[tokio::test]
    async fn transient_failure_is_retried_exactly_once() {
        let calls = AtomicUsize::new(0);
        let out: Result<u64, _> = with_single_retry(Duration::ZERO, "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(DestinationError::Server {
                        status: 503,
                        body: String::new(),
                    })
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(out.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn second_transient_failure_propagates() {
        let calls = AtomicUsize::new(0);
        let out: Result<u64, _> = with_single_retry(Duration::ZERO, "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(DestinationError::Server {
                    status: 500,
                    body: "down".into(),
                })
            }
        })
        .await;
        assert!(matches!(out, Err(DestinationError::Server { status: 500, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn permanent_and_conflict_are_not_retried() {
        for err in [
            DestinationError::Client {
                status: 400,
                body: String::new(),
            },
            DestinationError::Conflict {
                existing_id: Some(3),
                message: String::new(),
            },
        ] {
            let calls = AtomicUsize::new(0);
            let mut slot = Some(err);
            let out: Result<u64, _> = with_single_retry(Duration::ZERO, "test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                let next = slot.take();
                async move { Err(next.unwrap()) }
            })
            .await;
            assert!(out.is_err());
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }
}
