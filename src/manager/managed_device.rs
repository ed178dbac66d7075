// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Internal device wrapper for the device manager.

use std::sync::{Arc, Weak};

use tokio::task::JoinHandle;

use crate::coordinator::Coordinator;
use crate::device::Device;
use crate::event::{DeviceEvent, DeviceId, EventBus};
use crate::subscription::{Subscribable, SubscriptionId};
use crate::transport::BleTransport;

use super::device_config::DeviceConfig;

/// A radiator registered with the manager.
///
/// Dropping it stops polling and detaches it from the event bus.
pub(crate) struct ManagedDevice<T: BleTransport> {
    pub id: DeviceId,
    pub config: DeviceConfig,
    pub coordinator: Arc<Coordinator<T>>,
    subscription: SubscriptionId,
    failure_forwarder: JoinHandle<()>,
}

impl<T: BleTransport> ManagedDevice<T> {
    /// Wires a running coordinator to the event bus.
    pub fn new(
        id: DeviceId,
        config: DeviceConfig,
        coordinator: Coordinator<T>,
        event_bus: &EventBus,
    ) -> Self {
        let subscription = forward_state_changes(id, coordinator.device(), event_bus.clone());
        let failure_forwarder = forward_failures(id, &coordinator, event_bus.clone());

        Self {
            id,
            config,
            coordinator: Arc::new(coordinator),
            subscription,
            failure_forwarder,
        }
    }

    pub fn device(&self) -> &Arc<Device<T>> {
        self.coordinator.device()
    }

    /// Returns the friendly name if set, otherwise the device name.
    pub fn display_name(&self) -> String {
        self.config
            .friendly_name
            .clone()
            .unwrap_or_else(|| self.device().name())
    }
}

impl<T: BleTransport> Drop for ManagedDevice<T> {
    fn drop(&mut self) {
        self.coordinator.shutdown();
        self.device().unsubscribe(self.subscription);
        self.failure_forwarder.abort();
    }
}

impl<T: BleTransport> std::fmt::Debug for ManagedDevice<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedDevice")
            .field("id", &self.id)
            .field("display_name", &self.display_name())
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

/// Publishes every committed change. The callback holds the device weakly,
/// since the device owns the callback.
fn forward_state_changes<T: BleTransport>(
    id: DeviceId,
    device: &Arc<Device<T>>,
    event_bus: EventBus,
) -> SubscriptionId {
    let weak: Weak<Device<T>> = Arc::downgrade(device);
    device.on_state_changed(move |change| {
        if let Some(device) = weak.upgrade() {
            event_bus.publish(DeviceEvent::state_changed(
                id,
                change.clone(),
                device.state(),
            ));
        }
    })
}

/// Publishes `UpdateFailed` each time the radiator goes from reachable to
/// stale.
///
/// The poll task is already running when this subscribes, so the snapshot
/// current at that point is inspected before waiting for the next one.
fn forward_failures<T: BleTransport>(
    id: DeviceId,
    coordinator: &Coordinator<T>,
    event_bus: EventBus,
) -> JoinHandle<()> {
    let mut snapshots = coordinator.subscribe();

    tokio::spawn(async move {
        let mut failing = false;
        loop {
            let error = {
                let snapshot = snapshots.borrow_and_update();
                if snapshot.last_update_success {
                    None
                } else {
                    snapshot.last_error.clone()
                }
            };

            match error {
                Some(error) if !failing => {
                    failing = true;
                    event_bus.publish(DeviceEvent::update_failed(id, error));
                }
                Some(_) => {}
                None => failing = false,
            }

            if snapshots.changed().await.is_err() {
                break;
            }
        }
    })
}
