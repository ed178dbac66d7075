// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast channel shared by the manager and its radiators.

use tokio::sync::broadcast;

use super::DeviceEvent;

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Fan-out of [`DeviceEvent`]s to any number of listeners.
///
/// Cloning the bus yields another handle on the same channel, which is how
/// each managed radiator gets to publish its own state changes. A listener
/// that falls more than `capacity` events behind sees `RecvError::Lagged`
/// and resumes from the oldest event still buffered.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DeviceEvent>,
}

impl EventBus {
    /// Bus buffering 256 events per listener.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus buffering `capacity` events per listener.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero, like [`broadcast::channel`].
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receiver for events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.sender.subscribe()
    }

    /// Number of live receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Sends `event` to every live receiver.
    ///
    /// Events published while nobody listens are discarded.
    pub fn publish(&self, event: DeviceEvent) {
        let device_id = event.device_id();
        match self.sender.send(event) {
            Ok(listeners) => tracing::trace!(%device_id, listeners, "event published"),
            Err(_) => tracing::trace!(%device_id, "event dropped, no listeners"),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
