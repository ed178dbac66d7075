// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GATT layout and wire encoding of the radiator.
//!
//! The radiator exposes one private service with three characteristics:
//!
//! | Characteristic | Read | Write |
//! |---|---|---|
//! | [`ROOM_TEMPERATURE`] | `[curLo, curHi, tgtLo, tgtHi]` | `[0, 0, tgtLo, tgtHi]` |
//! | [`ELEMENT_TEMPERATURE`] | same as room | same as room |
//! | [`MODE`] | `[mode, ..]` | `[mode, 0, 0, 0]` |
//!
//! Temperatures are little-endian `u16` tenths of a degree Celsius.

mod codec;

pub use codec::{
    MODE_PAYLOAD_LEN, TEMPERATURE_PAYLOAD_LEN, TemperatureReading, decode_mode,
    decode_temperature, encode_mode, encode_temperature_target, splice_temperature_target,
};

use std::fmt;

use uuid::{Uuid, uuid};

use crate::types::TemperatureZone;

/// The radiator's private GATT service.
pub const SERVICE: Uuid = uuid!("d97352b0-d19e-11e2-9e96-0800200c9a66");

/// Room temperature characteristic (current and target).
pub const ROOM_TEMPERATURE: Uuid = uuid!("d97352b1-d19e-11e2-9e96-0800200c9a66");

/// Element temperature characteristic (current and target).
pub const ELEMENT_TEMPERATURE: Uuid = uuid!("d97352b2-d19e-11e2-9e96-0800200c9a66");

/// Operating mode characteristic.
pub const MODE: Uuid = uuid!("d97352b3-d19e-11e2-9e96-0800200c9a66");

/// Pairing code printed on the device, for stacks that prompt for one.
pub const DEFAULT_PAIRING_CODE: &str = "123456";

/// Manufacturer reported to hosts.
pub const MANUFACTURER: &str = "Terma";

/// Model reported to hosts.
pub const MODEL: &str = "MOA Blue";

/// One of the radiator's characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    /// Room temperature.
    RoomTemperature,
    /// Element temperature.
    ElementTemperature,
    /// Operating mode.
    Mode,
}

impl Characteristic {
    /// Returns the characteristic holding a zone's temperatures.
    #[must_use]
    pub const fn temperature(zone: TemperatureZone) -> Self {
        match zone {
            TemperatureZone::Room => Self::RoomTemperature,
            TemperatureZone::Element => Self::ElementTemperature,
        }
    }

    /// Returns the 128-bit UUID.
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        match self {
            Self::RoomTemperature => ROOM_TEMPERATURE,
            Self::ElementTemperature => ELEMENT_TEMPERATURE,
            Self::Mode => MODE,
        }
    }

    /// Returns the minimum payload length needed to decode a read.
    #[must_use]
    pub const fn min_read_len(&self) -> usize {
        match self {
            Self::RoomTemperature | Self::ElementTemperature => TEMPERATURE_PAYLOAD_LEN,
            Self::Mode => MODE_PAYLOAD_LEN,
        }
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RoomTemperature => "room temperature",
            Self::ElementTemperature => "element temperature",
            Self::Mode => "mode",
        };
        f.write_str(name)
    }
}
