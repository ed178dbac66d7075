// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! A device session never writes to [`DeviceState`](super::DeviceState)
//! directly. It collects `StateChange`s, and the driver applies them once
//! the whole operation has succeeded.
//!
//! # Change Types
//!
//! - [`StateChange::Temperature`] - A decoded reading (current and target)
//! - [`StateChange::TargetTemperature`] - A setpoint that was written
//! - [`StateChange::Mode`] - A decoded or written operating mode
//! - [`StateChange::Batch`] - Multiple changes grouped together
//!
//! # Examples
//!
//! ```
//! use terma_ble::state::{DeviceState, StateChange};
//! use terma_ble::types::OperatingMode;
//!
//! let mut state = DeviceState::new();
//!
//! // Apply returns true if state actually changed
//! assert!(state.apply(&StateChange::mode(OperatingMode::On)));
//! assert!(!state.apply(&StateChange::mode(OperatingMode::On)));
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{OperatingMode, Temperature, TemperatureZone};

/// Represents a change in device state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateChange {
    /// Both values read from a temperature characteristic.
    Temperature {
        /// The circuit the values belong to.
        zone: TemperatureZone,
        /// Measured temperature.
        current: Temperature,
        /// Setpoint.
        target: Temperature,
    },

    /// A setpoint written to the device.
    TargetTemperature {
        /// The circuit the setpoint belongs to.
        zone: TemperatureZone,
        /// The commanded setpoint.
        target: Temperature,
    },

    /// Operating mode changed.
    ///
    /// `None` means the device reported a code this library does not know.
    Mode(Option<OperatingMode>),

    /// Multiple changes at once.
    ///
    /// Used when a refresh reads several characteristics.
    Batch(Vec<StateChange>),
}

impl StateChange {
    /// Creates a temperature reading change.
    #[must_use]
    pub fn temperature(zone: TemperatureZone, current: Temperature, target: Temperature) -> Self {
        Self::Temperature {
            zone,
            current,
            target,
        }
    }

    /// Creates a setpoint change.
    #[must_use]
    pub fn target_temperature(zone: TemperatureZone, target: Temperature) -> Self {
        Self::TargetTemperature { zone, target }
    }

    /// Creates a known mode change.
    #[must_use]
    pub fn mode(mode: OperatingMode) -> Self {
        Self::Mode(Some(mode))
    }

    /// Creates a batch of changes.
    #[must_use]
    pub fn batch(changes: Vec<StateChange>) -> Self {
        Self::Batch(changes)
    }

    /// Returns `true` if this change or any nested change touches `zone`.
    #[must_use]
    pub fn affects_zone(&self, zone: TemperatureZone) -> bool {
        match self {
            Self::Temperature { zone: z, .. } | Self::TargetTemperature { zone: z, .. } => {
                *z == zone
            }
            Self::Mode(_) => false,
            Self::Batch(changes) => changes.iter().any(|c| c.affects_zone(zone)),
        }
    }

    /// Returns `true` if the batch holds no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Batch(changes) => changes.iter().all(Self::is_empty),
            _ => false,
        }
    }
}
