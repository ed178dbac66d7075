// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Radiator write commands.
//!
//! A [`Command`] is a validated request to change something on the device.
//! It knows which characteristic it targets, how to render its payload, and
//! which [`StateChange`] to apply optimistically once the write went through.
//!
//! | Command | Characteristic | Payload |
//! |---------|----------------|---------|
//! | [`Command::SetTemperature`] (room) | room temperature | `[0, 0, lo, hi]` |
//! | [`Command::SetTemperature`] (element) | element temperature | `[0, 0, lo, hi]` |
//! | [`Command::SetMode`] | mode | `[code, 0, 0, 0]` |
//!
//! # Examples
//!
//! ```
//! use terma_ble::command::{Command, WriteEncoding};
//! use terma_ble::types::TemperatureZone;
//!
//! let cmd = Command::set_temperature(TemperatureZone::Room, 21.5).unwrap();
//! let payload = cmd.payload(WriteEncoding::ZeroPrefix, None).unwrap();
//! assert_eq!(payload, [0x00, 0x00, 0xD7, 0x00]);
//! ```

use std::fmt;

use crate::error::{ProtocolError, ValueError};
use crate::protocol::{
    Characteristic, encode_mode, encode_temperature_target, splice_temperature_target,
};
use crate::state::StateChange;
use crate::types::{OperatingMode, Temperature, TemperatureZone};

/// How a temperature setpoint is laid out on write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WriteEncoding {
    /// `[0, 0, lo, hi]`, the layout the vendor app sends.
    #[default]
    ZeroPrefix,
    /// Read the characteristic, keep its first two bytes and splice the
    /// target into the last two.
    ReadModifyWrite,
}

impl WriteEncoding {
    /// Returns `true` if a read must precede the write.
    #[must_use]
    pub fn needs_previous(self) -> bool {
        matches!(self, Self::ReadModifyWrite)
    }
}

/// A command that can be written to the radiator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Change a zone setpoint.
    SetTemperature {
        /// Zone to change.
        zone: TemperatureZone,
        /// New setpoint.
        target: Temperature,
    },
    /// Change the operating mode.
    SetMode(OperatingMode),
}

impl Command {
    /// Creates a setpoint command.
    ///
    /// Only wire encodability is checked here; the range offered to users is
    /// enforced by [`Climate`](crate::climate::Climate).
    ///
    /// # Errors
    ///
    /// Returns `ValueError::TemperatureNotEncodable` for NaN, infinite,
    /// negative or oversized values.
    pub fn set_temperature(zone: TemperatureZone, celsius: f32) -> Result<Self, ValueError> {
        let target = Temperature::from_celsius(celsius)?;
        Ok(Self::SetTemperature { zone, target })
    }

    /// Creates a mode command.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::ModeNotWritable` for legacy modes.
    pub fn set_mode(mode: OperatingMode) -> Result<Self, ValueError> {
        if mode.is_legacy() {
            return Err(ValueError::ModeNotWritable(mode.name()));
        }
        Ok(Self::SetMode(mode))
    }

    /// Returns the characteristic this command writes.
    #[must_use]
    pub fn characteristic(&self) -> Characteristic {
        match self {
            Self::SetTemperature { zone, .. } => Characteristic::temperature(*zone),
            Self::SetMode(_) => Characteristic::Mode,
        }
    }

    /// Returns `true` for setpoint writes.
    #[must_use]
    pub fn is_temperature(&self) -> bool {
        matches!(self, Self::SetTemperature { .. })
    }

    /// Renders the bytes to write.
    ///
    /// `previous` is the last payload read from the same characteristic. It
    /// is only consulted for setpoints under [`WriteEncoding::ReadModifyWrite`].
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::PayloadTooShort` if read-modify-write is
    /// selected and `previous` is missing or shorter than 4 bytes.
    pub fn payload(
        &self,
        encoding: WriteEncoding,
        previous: Option<&[u8]>,
    ) -> Result<[u8; 4], ProtocolError> {
        match (self, encoding) {
            (Self::SetMode(mode), _) => Ok(encode_mode(*mode)),
            (Self::SetTemperature { target, .. }, WriteEncoding::ZeroPrefix) => {
                Ok(encode_temperature_target(*target))
            }
            (Self::SetTemperature { target, .. }, WriteEncoding::ReadModifyWrite) => {
                splice_temperature_target(self.characteristic(), previous.unwrap_or(&[]), *target)
            }
        }
    }

    /// The change to commit once the write succeeded.
    #[must_use]
    pub fn optimistic_change(&self) -> StateChange {
        match self {
            Self::SetTemperature { zone, target } => StateChange::target_temperature(*zone, *target),
            Self::SetMode(mode) => StateChange::mode(*mode),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetTemperature { zone, target } => write!(f, "set {zone} target to {target}"),
            Self::SetMode(mode) => write!(f, "set mode to {mode}"),
        }
    }
}
