//! Bounded retry combinator for quality-gated productions.

use std::future::Future;

use thiserror::Error;
use tracing::debug;

/// Why a bounded retry gave up.
#[derive(Debug, Error)]
pub enum RetryError<E: std::error::Error> {
    /// Every attempt succeeded but none passed the acceptance predicate.
    #[error("no acceptable result after {attempts} attempts")]
    Exhausted { attempts: u32 },

    /// The action itself failed; retrying is not attempted.
    #[error(transparent)]
    Inner(E),
}

/// Runs `action` up to `max_attempts` times until `accept` approves a
/// result.
///
/// The attempt number (starting at 1) is passed to the action. An `Err`
/// from the action aborts immediately; rejection by the predicate retries
/// until the budget runs out, which yields [`RetryError::Exhausted`].
pub async fn retry_until<T, E, F, Fut, A>(
    max_attempts: u32,
    mut action: F,
    accept: A,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    A: Fn(&T) -> bool,
    E: std::error::Error,
{
    for attempt in 1..=max_attempts {
        let value = action(attempt).await.map_err(RetryError::Inner)?;
        if accept(&value) {
            return Ok(value);
        }
        debug!(attempt, max_attempts, "result rejected by acceptance predicate");
    }
    Err(RetryError::Exhausted {
        attempts: max_attempts,
    })
}
