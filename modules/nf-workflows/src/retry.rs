//! Activity retry policy: exponential backoff with a caller-chosen cap on
//! attempts. Every `ctx.run(...)` in this crate that wraps a retryable
//! external call attaches `phase_retry_policy()`.

use restate_sdk::prelude::RunRetryPolicy;
use std::time::Duration;

/// Initial 2s backoff, doubling up to 30s, capped at 3 attempts — the
/// activity-level retry budget for research/narrative/media phases. Each
/// phase's own `start_to_close` timeout still governs the outer bound; this
/// governs the exponential-backoff shape within that timeout.
pub fn phase_retry_policy() -> RunRetryPolicy {
    RunRetryPolicy::new()
        .initial_delay(Duration::from_secs(2))
        .exponentiation_factor(2.0)
        .max_attempts(3)
        .max_delay(Duration::from_secs(30))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_retry_policy_builds_without_panicking() {
        let _ = phase_retry_policy();
    }
}
