// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-side registry of radiators.
//!
//! The [`DeviceManager`] pairs each radiator with a driver and a
//! [`Coordinator`](crate::coordinator::Coordinator), and publishes
//! [`DeviceEvent`](crate::event::DeviceEvent)s for everything that happens
//! to them.
//!
//! Listening to the whole fleet:
//!
//! ```
//! use terma_ble::DeviceManager;
//! use terma_ble::event::DeviceEvent;
//! use terma_ble::transport::BleTransport;
//!
//! async fn report<T: BleTransport>(manager: &DeviceManager<T>) {
//!     let mut events = manager.subscribe();
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             DeviceEvent::StateChanged { device_id, change, .. } => {
//!                 println!("{device_id}: {change:?}");
//!             }
//!             DeviceEvent::UpdateFailed { device_id, error } => {
//!                 println!("{device_id} unavailable: {error}");
//!             }
//!             DeviceEvent::DeviceAdded { .. } | DeviceEvent::DeviceRemoved { .. } => {}
//!         }
//!     }
//! }
//! ```

mod device_config;
mod device_manager;
mod managed_device;

pub use device_config::DeviceConfig;
pub use device_manager::DeviceManager;
