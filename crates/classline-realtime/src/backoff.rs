// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exponential backoff with additive jitter.
//!
//! `delay = min(base * 2^attempt, 30s) + uniform[0, 1000) ms`

use std::time::Duration;

use rand::Rng;

/// Upper bound on the exponential part of the delay.
pub const BACKOFF_CAP_MS: u64 = 30_000;

/// Exclusive upper bound of the random jitter added to every delay.
pub const JITTER_MAX_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    base_delay_ms: u64,
}

impl BackoffPolicy {
    pub fn new(base_delay_ms: u64) -> Self {
        Self { base_delay_ms }
    }

    /// The capped exponential delay for `attempt`, without jitter.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let ms = 2u64
            .checked_pow(attempt)
            .and_then(|factor| self.base_delay_ms.checked_mul(factor))
            .unwrap_or(u64::MAX)
            .min(BACKOFF_CAP_MS);
        Duration::from_millis(ms)
    }

    /// The delay for `attempt` with an explicit jitter, clamped below [`JITTER_MAX_MS`].
    pub fn delay_with_jitter(&self, attempt: u32, jitter_ms: u64) -> Duration {
        self.base_delay(attempt) + Duration::from_millis(jitter_ms.min(JITTER_MAX_MS - 1))
    }

    /// The delay for `attempt` with jitter drawn from `rng`.
    pub fn delay<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        self.delay_with_jitter(attempt, rng.gen_range(0..JITTER_MAX_MS))
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(1_000)
    }
}
