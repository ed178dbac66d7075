// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operating mode of the radiator.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Coarse firmware state, stored as a single byte on the mode characteristic.
///
/// Current firmware and the vendor app only use [`Off`](Self::Off) (`0x20`)
/// and [`On`](Self::On) (`0x21`). The remaining codes come from older
/// firmware; they are still decoded but never written.
///
/// # Examples
///
/// ```
/// use terma_ble::types::OperatingMode;
///
/// assert_eq!(OperatingMode::from_code(0x21), Some(OperatingMode::On));
/// assert_eq!(OperatingMode::from_code(0x99), None);
///
/// // "Off" is 0x20, not zero
/// assert_eq!(OperatingMode::Off.code(), 0x20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OperatingMode {
    /// Switched off on the device itself.
    OffManual = 0x00,
    /// Legacy manual mode.
    Manual = 0x01,
    /// Legacy manual room-temperature regulation.
    RoomTempManual = 0x05,
    /// Legacy manual element-temperature regulation.
    ElementTempManual = 0x06,
    /// Legacy scheduled room-temperature regulation.
    RoomTempSchedule = 0x07,
    /// Legacy scheduled element-temperature regulation.
    ElementTempSchedule = 0x08,
    /// Switched off remotely.
    Off = 0x20,
    /// Switched on and heating.
    On = 0x21,
}

impl OperatingMode {
    /// Looks up a mode by its raw code.
    ///
    /// Returns `None` for codes the firmware does not define.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(Self::OffManual),
            0x01 => Some(Self::Manual),
            0x05 => Some(Self::RoomTempManual),
            0x06 => Some(Self::ElementTempManual),
            0x07 => Some(Self::RoomTempSchedule),
            0x08 => Some(Self::ElementTempSchedule),
            0x20 => Some(Self::Off),
            0x21 => Some(Self::On),
            _ => None,
        }
    }

    /// Returns the raw code.
    #[must_use]
    pub const fn code(&self) -> u8 {
        *self as u8
    }

    /// Returns `true` for codes only older firmware reports.
    #[must_use]
    pub const fn is_legacy(&self) -> bool {
        !matches!(self, Self::Off | Self::On)
    }

    /// Returns the upper-case name used in host sensors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OffManual => "OFF_MANUAL",
            Self::Manual => "MANUAL",
            Self::RoomTempManual => "ROOM_TEMP_MANUAL",
            Self::ElementTempManual => "ELEMENT_TEMP_MANUAL",
            Self::RoomTempSchedule => "ROOM_TEMP_SCHEDULE",
            Self::ElementTempSchedule => "ELEMENT_TEMP_SCHEDULE",
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for OperatingMode {
    type Error = ValueError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(ValueError::UnknownMode(code))
    }
}

impl From<OperatingMode> for u8 {
    fn from(mode: OperatingMode) -> Self {
        mode.code()
    }
}

impl From<bool> for OperatingMode {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}
