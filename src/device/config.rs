// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Driver configuration.

use std::time::Duration;

use crate::command::WriteEncoding;

/// Connection retry policy.
///
/// Each attempt opens a fresh link. Failed attempts are separated by a
/// constant `backoff`; there is no sleep after the last one.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use terma_ble::RetryPolicy;
///
/// let policy = RetryPolicy::new()
///     .with_max_attempts(3)
///     .with_backoff(Duration::from_secs(1));
///
/// assert_eq!(policy.attempts(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of connection attempts. Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Budget for one connect call.
    pub connect_timeout: Duration,
    /// Pause between failed attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Creates a retry policy with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a policy that makes a single attempt.
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Sets the number of attempts.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the pause between attempts.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Effective number of attempts, never zero.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Upper bound on the time one operation can spend connecting and
    /// backing off.
    #[must_use]
    pub fn worst_case(&self) -> Duration {
        let attempts = self.attempts();
        self.connect_timeout * attempts + self.backoff * (attempts - 1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            connect_timeout: Duration::from_secs(20),
            backoff: Duration::from_secs(3),
        }
    }
}

/// Configuration of a [`Device`](super::Device).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Connection retry policy.
    pub retry: RetryPolicy,
    /// Pause after a temperature write before the link is used again.
    pub settle_delay: Duration,
    /// Layout of temperature setpoint writes.
    pub write_encoding: WriteEncoding,
}

impl DriverConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the settle delay after temperature writes.
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Sets the setpoint write layout.
    #[must_use]
    pub fn with_write_encoding(mut self, encoding: WriteEncoding) -> Self {
        self.write_encoding = encoding;
        self
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            settle_delay: Duration::from_millis(100),
            write_encoding: WriteEncoding::ZeroPrefix,
        }
    }
}
