// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fleet-wide notifications.
//!
//! A [`DeviceManager`](crate::manager::DeviceManager) owns one [`EventBus`]
//! and publishes a [`DeviceEvent`] whenever a radiator is added, removed,
//! refreshed with new values or found unreachable. Each radiator is named
//! by the [`DeviceId`] the manager assigned to it.
//!
//! ```
//! use terma_ble::event::{DeviceEvent, DeviceId, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! let radiator = DeviceId::new();
//! bus.publish(DeviceEvent::update_failed(radiator, "connect timed out"));
//!
//! match rx.try_recv().unwrap() {
//!     DeviceEvent::UpdateFailed { device_id, error } => {
//!         assert_eq!(device_id, radiator);
//!         assert_eq!(error, "connect timed out");
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

mod device_event;
mod device_id;
mod event_bus;

pub use device_event::DeviceEvent;
pub use device_id::DeviceId;
pub use event_bus::EventBus;
