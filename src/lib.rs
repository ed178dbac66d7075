// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `terma_ble` - A Rust library to control Terma MOA Blue radiators over
//! Bluetooth Low Energy.
//!
//! The radiator exposes three GATT characteristics: room temperature,
//! element temperature and operating mode. This library reads and writes
//! them through short-lived connections, with retries, and keeps a cached
//! copy of the last known state.
//!
//! # Layers
//!
//! - [`Device`]: the driver. Serializes operations per radiator, retries
//!   failed connections and commits state only after success.
//! - [`coordinator::Coordinator`]: polls a device every five minutes (with
//!   jitter) and refreshes early after writes.
//! - [`climate::Climate`]: one temperature zone presented as a thermostat.
//! - [`manager::DeviceManager`]: registry of radiators that publishes
//!   [`event::DeviceEvent`]s.
//!
//! The Bluetooth stack is abstracted behind [`transport::BleTransport`].
//! Enable the `btleplug` feature for a ready-made implementation.
//!
//! # Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "btleplug")]
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use btleplug::api::Manager as _;
//! use btleplug::platform::Manager;
//! use terma_ble::Device;
//! use terma_ble::transport::BtleplugTransport;
//!
//! let manager = Manager::new().await?;
//! let adapter = manager.adapters().await?.remove(0);
//!
//! let transport = BtleplugTransport::find(&adapter, "AA:BB:CC:DD:EE:FF")
//!     .await?
//!     .ok_or(terma_ble::Error::DeviceNotFound)?;
//! let device = Device::new(transport);
//!
//! device.refresh().await?;
//! println!("room: {:?}", device.current_room_temp());
//!
//! device.set_room_temperature(21.5).await?;
//! device.turn_on(true).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Callbacks
//!
//! ```ignore
//! use terma_ble::subscription::Subscribable;
//!
//! device.on_temperature_changed(|update| {
//!     println!("{} is now {:?} (target {})", update.zone, update.current, update.target);
//! });
//! device.on_mode_changed(|mode| println!("mode: {mode:?}"));
//! ```

pub mod climate;
pub mod command;
pub mod coordinator;
mod device;
pub mod error;
pub mod event;
pub mod manager;
pub mod protocol;
pub mod state;
pub mod subscription;
pub mod transport;
pub mod types;

pub use climate::{Climate, HvacAction, HvacMode};
pub use command::{Command, WriteEncoding};
pub use coordinator::{Coordinator, PollConfig, Snapshot};
pub use device::{Device, DriverConfig, RetryPolicy};
pub use error::{Error, ProtocolError, Result, TransportError, ValueError};
pub use event::{DeviceEvent, DeviceId, EventBus};
pub use manager::{DeviceConfig, DeviceManager};
pub use state::{DeviceState, StateChange};
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId, TemperatureUpdate};
pub use types::{OperatingMode, Temperature, TemperatureRange, TemperatureZone};
