// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polling schedule.

use std::time::Duration;

use rand::Rng;

/// How often a [`Coordinator`](super::Coordinator) refreshes its radiator.
///
/// Each sleep lasts `interval` plus a random jitter up to `max_jitter`, so
/// several radiators added together drift apart instead of competing for
/// the adapter at the same instant.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use terma_ble::coordinator::PollConfig;
///
/// let config = PollConfig::new()
///     .with_interval(Duration::from_secs(60))
///     .without_jitter();
///
/// assert_eq!(config.next_delay(), Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Base pause between refreshes.
    pub interval: Duration,
    /// Upper bound of the random extra pause.
    pub max_jitter: Duration,
}

impl PollConfig {
    /// Creates a schedule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base interval.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the jitter bound.
    #[must_use]
    pub fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Disables jitter.
    #[must_use]
    pub fn without_jitter(self) -> Self {
        self.with_max_jitter(Duration::ZERO)
    }

    /// Draws the pause before the next refresh.
    #[must_use]
    pub fn next_delay(&self) -> Duration {
        if self.max_jitter.is_zero() {
            return self.interval;
        }
        let max_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        let jitter = rand::thread_rng().gen_range(0..=max_ms);
        self.interval + Duration::from_millis(jitter)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            max_jitter: Duration::from_secs(30),
        }
    }
}
