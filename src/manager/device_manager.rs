// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of radiators owned by a host.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use tracing::info;

use crate::climate::Climate;
use crate::coordinator::{Coordinator, Snapshot};
use crate::device::Device;
use crate::error::{Error, Result};
use crate::event::{DeviceEvent, DeviceId, EventBus};
use crate::transport::BleTransport;
use crate::types::TemperatureZone;

use super::device_config::DeviceConfig;
use super::managed_device::ManagedDevice;

/// Explicit registry of radiators, each with its own driver and poller.
///
/// There is no global table: whoever owns the manager owns the devices, and
/// removing a device stops its polling and drops its driver.
///
/// # Examples
///
/// ```ignore
/// use terma_ble::manager::{DeviceConfig, DeviceManager};
///
/// let manager = DeviceManager::new();
/// let mut events = manager.subscribe();
///
/// // Fails if the radiator does not answer the first refresh
/// let id = manager.add_device(transport, DeviceConfig::new()).await?;
///
/// let coordinator = manager.coordinator(id).await.unwrap();
/// coordinator.set_room_temperature(21.0).await?;
///
/// manager.remove_device(id).await;
/// ```
pub struct DeviceManager<T: BleTransport> {
    devices: Arc<RwLock<HashMap<DeviceId, ManagedDevice<T>>>>,
    event_bus: EventBus,
}

impl<T: BleTransport> DeviceManager<T> {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::with_event_bus(EventBus::new())
    }

    /// Creates an empty manager with a custom event bus capacity.
    #[must_use]
    pub fn with_capacity(event_capacity: usize) -> Self {
        Self::with_event_bus(EventBus::with_capacity(event_capacity))
    }

    fn with_event_bus(event_bus: EventBus) -> Self {
        Self {
            devices: Arc::new(RwLock::new(HashMap::new())),
            event_bus,
        }
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribes to events for all managed devices.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.event_bus.subscribe()
    }

    /// Returns the number of active event subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.event_bus.subscriber_count()
    }

    // =========================================================================
    // Device Management
    // =========================================================================

    /// Sets up a radiator.
    ///
    /// The first refresh runs before the device is registered, so an
    /// unreachable radiator is never added.
    ///
    /// # Errors
    ///
    /// Returns the first refresh error.
    pub async fn add_device(&self, transport: T, config: DeviceConfig) -> Result<DeviceId> {
        let device = Arc::new(Device::with_config(transport, config.driver.clone()));
        let coordinator = Coordinator::start(device, config.poll.clone()).await?;
        Ok(self.insert(coordinator, config).await)
    }

    /// Registers a radiator without waiting for it to answer.
    ///
    /// Polling starts in the background with an immediate refresh.
    pub async fn register_device(&self, transport: T, config: DeviceConfig) -> DeviceId {
        let device = Arc::new(Device::with_config(transport, config.driver.clone()));
        let coordinator = Coordinator::spawn(device, config.poll.clone());
        self.insert(coordinator, config).await
    }

    async fn insert(&self, coordinator: Coordinator<T>, config: DeviceConfig) -> DeviceId {
        let device_id = DeviceId::new();
        let managed = ManagedDevice::new(device_id, config, coordinator, &self.event_bus);
        info!(%device_id, name = %managed.display_name(), "Device added");

        self.devices.write().await.insert(device_id, managed);
        self.event_bus.publish(DeviceEvent::device_added(device_id));
        device_id
    }

    /// Removes a device, stopping its polling.
    ///
    /// Returns `true` if the device was found and removed.
    pub async fn remove_device(&self, device_id: DeviceId) -> bool {
        let removed = self.devices.write().await.remove(&device_id);

        match removed {
            Some(managed) => {
                drop(managed);
                info!(%device_id, "Device removed");
                self.event_bus
                    .publish(DeviceEvent::device_removed(device_id));
                true
            }
            None => false,
        }
    }

    /// Returns a list of all device IDs.
    pub async fn device_ids(&self) -> Vec<DeviceId> {
        self.devices.read().await.keys().copied().collect()
    }

    /// Returns the number of managed devices.
    pub async fn device_count(&self) -> usize {
        self.devices.read().await.len()
    }

    /// Finds a device by Bluetooth address (case-insensitive).
    pub async fn find_by_address(&self, address: &str) -> Option<DeviceId> {
        self.devices
            .read()
            .await
            .values()
            .find(|d| d.device().address().eq_ignore_ascii_case(address))
            .map(|d| d.id)
    }

    /// Returns the driver of a device.
    pub async fn device(&self, device_id: DeviceId) -> Option<Arc<Device<T>>> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(|d| Arc::clone(d.device()))
    }

    /// Returns the coordinator of a device.
    pub async fn coordinator(&self, device_id: DeviceId) -> Option<Arc<Coordinator<T>>> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(|d| Arc::clone(&d.coordinator))
    }

    /// Returns the climate view of one zone of a device.
    pub async fn climate(&self, device_id: DeviceId, zone: TemperatureZone) -> Option<Climate<T>> {
        self.coordinator(device_id)
            .await
            .map(|coordinator| Climate::new(coordinator, zone))
    }

    /// Returns the latest snapshot of a device.
    pub async fn snapshot(&self, device_id: DeviceId) -> Option<Snapshot> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(|d| d.coordinator.snapshot())
    }

    /// Returns the friendly name, falling back to the device name.
    pub async fn friendly_name(&self, device_id: DeviceId) -> Option<String> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(ManagedDevice::display_name)
    }

    /// Refreshes a device now and waits for the result.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` for unknown IDs, otherwise the
    /// refresh error.
    pub async fn refresh(&self, device_id: DeviceId) -> Result<()> {
        let coordinator = self
            .coordinator(device_id)
            .await
            .ok_or(Error::DeviceNotFound)?;
        coordinator.refresh_now().await
    }
}

impl<T: BleTransport> Default for DeviceManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: BleTransport> Clone for DeviceManager<T> {
    fn clone(&self) -> Self {
        Self {
            devices: Arc::clone(&self.devices),
            event_bus: self.event_bus.clone(),
        }
    }
}

impl<T: BleTransport> std::fmt::Debug for DeviceManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceManager")
            .field("event_bus", &self.event_bus)
            .finish_non_exhaustive()
    }
}
