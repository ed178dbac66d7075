// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device configuration for the manager.

use std::time::Duration;

use crate::coordinator::PollConfig;
use crate::device::{DriverConfig, RetryPolicy};

/// Settings for one radiator added to a [`DeviceManager`](super::DeviceManager).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use terma_ble::manager::DeviceConfig;
///
/// let config = DeviceConfig::new()
///     .with_friendly_name("Bathroom")
///     .with_poll_interval(Duration::from_secs(120));
///
/// assert_eq!(config.friendly_name.as_deref(), Some("Bathroom"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Display name overriding the advertised one.
    pub friendly_name: Option<String>,
    /// Driver settings.
    pub driver: DriverConfig,
    /// Polling schedule.
    pub poll: PollConfig,
}

impl DeviceConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a friendly name for the device.
    #[must_use]
    pub fn with_friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    /// Sets the driver configuration.
    #[must_use]
    pub fn with_driver(mut self, driver: DriverConfig) -> Self {
        self.driver = driver;
        self
    }

    /// Sets the connection retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.driver.retry = retry;
        self
    }

    /// Sets the polling schedule.
    #[must_use]
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Sets the base polling interval, keeping the jitter bound.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll.interval = interval;
        self
    }
}
