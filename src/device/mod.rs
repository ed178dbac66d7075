// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Radiator driver.
//!
//! A [`Device`] owns the cached [`DeviceState`] of one radiator and runs every
//! operation through the same steps:
//!
//! 1. arguments are validated before any I/O;
//! 2. the device's operation gate is acquired, so at most one BLE session is
//!    in flight per radiator. A cancelled operation keeps the gate until its
//!    link has been disconnected;
//! 3. the action runs inside the connection retry loop, each attempt on a
//!    fresh link that is always closed afterwards;
//! 4. on success the collected changes are committed and dispatched to
//!    subscribers. On failure the state is left untouched.
//!
//! ```no_run
//! # #[cfg(feature = "btleplug")]
//! # async fn example(adapter: btleplug::platform::Adapter) -> terma_ble::Result<()> {
//! use terma_ble::Device;
//! use terma_ble::transport::BtleplugTransport;
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
//! # Ok(())
//! # }
//! ```

mod config;
mod session;

pub use config::{DriverConfig, RetryPolicy};

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::command::Command;
use crate::error::{Error, Result};
use crate::protocol::{Characteristic, decode_mode, decode_temperature};
use crate::state::{DeviceState, StateChange};
use crate::subscription::{CallbackRegistry, Subscribable, SubscriptionId, TemperatureUpdate};
use crate::transport::BleTransport;
use crate::types::{OperatingMode, Temperature, TemperatureZone};

use session::{Permit, Session};

/// What one gated session does once connected.
#[derive(Debug, Clone, Copy)]
enum Operation {
    Refresh,
    Write(Command),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refresh => f.write_str("refresh"),
            Self::Write(command) => command.fmt(f),
        }
    }
}

/// A Terma radiator reachable through a BLE transport.
///
/// Share it as `Arc<Device<T>>`: every method takes `&self`, and concurrent
/// calls queue on the operation gate in arrival order.
pub struct Device<T: BleTransport> {
    transport: T,
    config: DriverConfig,
    state: RwLock<DeviceState>,
    gate: Arc<Mutex<()>>,
    callbacks: CallbackRegistry,
}

impl<T: BleTransport> Device<T> {
    /// Creates a driver with the default configuration.
    ///
    /// No connection is made until the first operation.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, DriverConfig::default())
    }

    /// Creates a driver with an explicit configuration.
    #[must_use]
    pub fn with_config(transport: T, config: DriverConfig) -> Self {
        Self {
            transport,
            config,
            state: RwLock::new(DeviceState::new()),
            gate: Arc::new(Mutex::new(())),
            callbacks: CallbackRegistry::new(),
        }
    }

    // ========== Accessors ==========

    /// Bluetooth address of the radiator.
    #[must_use]
    pub fn address(&self) -> &str {
        self.transport.address()
    }

    /// Advertised name, or `"Terma (<address>)"` when there is none.
    #[must_use]
    pub fn name(&self) -> String {
        self.transport
            .name()
            .map_or_else(|| format!("Terma ({})", self.address()), str::to_string)
    }

    /// Returns a snapshot of the cached state.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.state.read().clone()
    }

    /// Last measured room temperature.
    #[must_use]
    pub fn current_room_temp(&self) -> Option<Temperature> {
        self.state.read().current_room_temp()
    }

    /// Last known room setpoint.
    #[must_use]
    pub fn target_room_temp(&self) -> Option<Temperature> {
        self.state.read().target_room_temp()
    }

    /// Last measured element temperature.
    #[must_use]
    pub fn current_element_temp(&self) -> Option<Temperature> {
        self.state.read().current_element_temp()
    }

    /// Last known element setpoint.
    #[must_use]
    pub fn target_element_temp(&self) -> Option<Temperature> {
        self.state.read().target_element_temp()
    }

    /// Last known operating mode.
    #[must_use]
    pub fn mode(&self) -> Option<OperatingMode> {
        self.state.read().mode()
    }

    /// Returns the driver configuration.
    #[must_use]
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    // ========== Operations ==========

    /// Reads room temperature, element temperature and mode over one
    /// connection.
    ///
    /// Payloads too short to decode are skipped and leave the cached values
    /// as they were. An unknown mode code clears the cached mode.
    ///
    /// # Errors
    ///
    /// Returns `Error::RetryExhausted` if no attempt succeeded.
    pub async fn refresh(&self) -> Result<()> {
        self.execute(Operation::Refresh).await
    }

    /// Sets the room setpoint.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` if `celsius` cannot be encoded, or
    /// `Error::RetryExhausted` if no attempt succeeded.
    pub async fn set_room_temperature(&self, celsius: f32) -> Result<()> {
        self.set_temperature(TemperatureZone::Room, celsius).await
    }

    /// Sets the element setpoint.
    ///
    /// The value is read back after the write and logged; a mismatch is
    /// reported as a warning only.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` if `celsius` cannot be encoded, or
    /// `Error::RetryExhausted` if no attempt succeeded.
    pub async fn set_element_temperature(&self, celsius: f32) -> Result<()> {
        self.set_temperature(TemperatureZone::Element, celsius).await
    }

    /// Sets the setpoint of a zone.
    ///
    /// # Errors
    ///
    /// See [`set_room_temperature`](Self::set_room_temperature).
    pub async fn set_temperature(&self, zone: TemperatureZone, celsius: f32) -> Result<()> {
        let command = Command::set_temperature(zone, celsius)?;
        self.execute(Operation::Write(command)).await
    }

    /// Writes an operating mode.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` for legacy modes, which are never written, or
    /// `Error::RetryExhausted` if no attempt succeeded.
    pub async fn set_mode(&self, mode: OperatingMode) -> Result<()> {
        let command = Command::set_mode(mode)?;
        self.execute(Operation::Write(command)).await
    }

    /// Switches the radiator on.
    ///
    /// `use_room_temp` records which climate entity asked; the same `On`
    /// code is written either way.
    ///
    /// # Errors
    ///
    /// Returns `Error::RetryExhausted` if no attempt succeeded.
    pub async fn turn_on(&self, use_room_temp: bool) -> Result<()> {
        let zone = if use_room_temp {
            TemperatureZone::Room
        } else {
            TemperatureZone::Element
        };
        info!(address = %self.address(), requested_by = %zone, "Turning on");
        self.set_mode(OperatingMode::On).await
    }

    /// Switches the radiator off.
    ///
    /// # Errors
    ///
    /// Returns `Error::RetryExhausted` if no attempt succeeded.
    pub async fn turn_off(&self) -> Result<()> {
        info!(address = %self.address(), "Turning off");
        self.set_mode(OperatingMode::Off).await
    }

    // ========== Session handling ==========

    async fn execute(&self, operation: Operation) -> Result<()> {
        let mut permit = Some(Arc::clone(&self.gate).lock_owned().await);
        debug!(address = %self.address(), %operation, "Starting operation");

        let change = self.with_retry(operation, &mut permit).await?;
        self.commit(&change);
        Ok(())
    }

    /// Applies every change under one lock, then notifies subscribers of
    /// the ones that actually changed something.
    fn commit(&self, change: &StateChange) {
        let mut changed = Vec::new();
        {
            let mut state = self.state.write();
            apply_flattened(&mut state, change, &mut changed);
        }
        for change in changed {
            self.callbacks.dispatch(change);
        }
    }

    async fn with_retry(&self, operation: Operation, permit: &mut Permit) -> Result<StateChange> {
        let policy = &self.config.retry;
        let max_attempts = policy.attempts();
        let mut attempt = 1;

        loop {
            let err = match self.attempt(operation, permit).await {
                Ok(change) => return Ok(change),
                Err(e) => e,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            warn!(
                address = %self.address(),
                attempt,
                max_attempts,
                error = %err,
                "Connection attempt failed"
            );

            if attempt >= max_attempts {
                error!(
                    address = %self.address(),
                    %operation,
                    attempts = attempt,
                    "Giving up"
                );
                return Err(Error::RetryExhausted {
                    attempts: attempt,
                    source: Box::new(err),
                });
            }

            tokio::time::sleep(policy.backoff).await;
            attempt += 1;
        }
    }

    async fn attempt(&self, operation: Operation, permit: &mut Permit) -> Result<StateChange> {
        let mut session = Session::new(self.transport.open_link(), self.address(), permit);

        let result = match session.establish(self.config.retry.connect_timeout).await {
            Ok(()) => match operation {
                Operation::Refresh => self.read_all(&mut session).await,
                Operation::Write(command) => self.write(&mut session, command).await,
            },
            Err(e) => Err(e),
        };

        if session.close().await {
            self.callbacks.dispatch_disconnected();
        }
        result
    }

    // ========== Read path ==========

    async fn read_all(&self, session: &mut Session<'_, T::Link>) -> Result<StateChange> {
        let mut changes = Vec::with_capacity(3);

        for zone in [TemperatureZone::Room, TemperatureZone::Element] {
            let characteristic = Characteristic::temperature(zone);
            let payload = session.read(characteristic).await?;
            match decode_temperature(characteristic, &payload) {
                Ok(reading) => {
                    changes.push(StateChange::temperature(zone, reading.current, reading.target));
                }
                Err(e) => debug!(address = %self.address(), error = %e, "Skipping payload"),
            }
        }

        let payload = session.read(Characteristic::Mode).await?;
        match decode_mode(&payload) {
            Ok(Some(mode)) => changes.push(StateChange::mode(mode)),
            Ok(None) => {
                warn!(
                    address = %self.address(),
                    code = ?payload.first(),
                    "Unknown operating mode"
                );
                changes.push(StateChange::Mode(None));
            }
            Err(e) => debug!(address = %self.address(), error = %e, "Skipping payload"),
        }

        Ok(StateChange::batch(changes))
    }

    // ========== Write path ==========

    async fn write(
        &self,
        session: &mut Session<'_, T::Link>,
        command: Command,
    ) -> Result<StateChange> {
        let characteristic = command.characteristic();
        let encoding = self.config.write_encoding;

        let previous = if command.is_temperature() && encoding.needs_previous() {
            Some(session.read(characteristic).await?)
        } else {
            None
        };
        let payload = command.payload(encoding, previous.as_deref())?;

        info!(
            address = %self.address(),
            %characteristic,
            payload = %format!("{payload:02x?}"),
            "{command}"
        );
        session.write(characteristic, &payload).await?;

        if let Command::SetTemperature { zone, target } = command {
            tokio::time::sleep(self.config.settle_delay).await;
            if zone == TemperatureZone::Element {
                self.read_back(session, characteristic, target).await?;
            }
        }

        Ok(command.optimistic_change())
    }

    /// Reads a setpoint back for diagnostics. The cached state never takes
    /// this value.
    async fn read_back(
        &self,
        session: &mut Session<'_, T::Link>,
        characteristic: Characteristic,
        target: Temperature,
    ) -> Result<()> {
        let payload = session.read(characteristic).await?;
        info!(
            address = %self.address(),
            %characteristic,
            payload = %format!("{payload:02x?}"),
            "Read back after write"
        );

        match decode_temperature(characteristic, &payload) {
            Ok(reading) if reading.target != target => warn!(
                address = %self.address(),
                expected = %target,
                reported = %reading.target,
                "Device reports a different setpoint"
            ),
            Ok(_) => {}
            Err(e) => debug!(address = %self.address(), error = %e, "Read-back not decodable"),
        }
        Ok(())
    }
}

fn apply_flattened<'a>(
    state: &mut DeviceState,
    change: &'a StateChange,
    changed: &mut Vec<&'a StateChange>,
) {
    if let StateChange::Batch(changes) = change {
        for nested in changes {
            apply_flattened(state, nested, changed);
        }
    } else if state.apply(change) {
        changed.push(change);
    }
}

impl<T: BleTransport> Subscribable for Device<T> {
    fn on_mode_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Option<OperatingMode>) + Send + Sync + 'static,
    {
        self.callbacks.on_mode_changed(callback)
    }

    fn on_temperature_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(TemperatureUpdate) + Send + Sync + 'static,
    {
        self.callbacks.on_temperature_changed(callback)
    }

    fn on_disconnected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.on_disconnected(callback)
    }

    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        self.callbacks.on_state_changed(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks.unsubscribe(id)
    }
}

impl<T: BleTransport> fmt::Debug for Device<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("address", &self.address())
            .field("config", &self.config)
            .field("state", &*self.state.read())
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}
