// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process listeners on a single radiator.
//!
//! [`Device`](crate::Device) implements [`Subscribable`]. Listeners are told
//! about changes only once a refresh or write has been committed to the
//! cache, never about values from an operation that later failed. For
//! changes across several radiators, subscribe to the manager's
//! [`EventBus`](crate::event::EventBus) instead.
//!
//! ```
//! use terma_ble::subscription::Subscribable;
//! use terma_ble::types::TemperatureZone;
//!
//! fn log_room(radiator: &impl Subscribable) {
//!     let id = radiator.on_temperature_changed(|update| {
//!         if update.zone == TemperatureZone::Room {
//!             println!("room setpoint {}", update.target);
//!         }
//!     });
//!     radiator.unsubscribe(id);
//! }
//! ```

mod callback;
mod subscribable;

pub use callback::{CallbackRegistry, SubscriptionId, TemperatureUpdate};
pub use subscribable::Subscribable;
