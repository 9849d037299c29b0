//! Bounded loop of independent extraction attempts.
//!
//! Every attempt is a fresh call to `operation`, which owns whatever
//! session it opens for the duration of that call only. Nothing carries
//! over from one attempt to the next except the attempt number.

use std::future::Future;
use std::time::Duration;

use crate::error::ExtractionError;

/// Upper bound on the pause between two attempts.
const MAX_DELAY_MS: u64 = 30_000;

/// Runs `operation` up to `max_attempts` times.
///
/// `operation` receives the 1-based attempt number. After a failure the
/// error is passed to `should_retry`; if it returns `false`, or the attempts
/// are used up, that error is returned. Otherwise the loop sleeps for
/// `delay_ms` ± 25 % jitter, capped at 30 s, and tries again.
///
/// A `max_attempts` of zero is treated as one.
pub(crate) async fn run_attempts<T, F, Fut, R>(
    max_attempts: u32,
    delay_ms: u64,
    should_retry: R,
    mut operation: F,
) -> Result<T, ExtractionError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ExtractionError>>,
    R: Fn(&ExtractionError) -> bool,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= max_attempts || !should_retry(&err) {
                    return Err(err);
                }

                let capped = delay_ms.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let pause_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_attempts,
                    pause_ms,
                    error = %err,
                    "extraction attempt failed; retrying with a fresh session"
                );
                if pause_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(pause_ms)).await;
                }
                attempt += 1;
            }
        }
    }
}
