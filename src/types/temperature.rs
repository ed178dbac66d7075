// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature values as the radiator stores them.
//!
//! The firmware represents every temperature as an unsigned count of tenths
//! of a degree Celsius. [`Temperature`] keeps that representation so values
//! read from the device compare exactly with values written to it.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// A temperature with 0.1 °C resolution.
///
/// # Examples
///
/// ```
/// use terma_ble::types::Temperature;
///
/// let t = Temperature::from_celsius(21.5).unwrap();
/// assert_eq!(t.raw(), 215);
/// assert_eq!(t.to_le_bytes(), [0xD7, 0x00]);
///
/// // Out of wire range
/// assert!(Temperature::from_celsius(-1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "f32", try_from = "f32")]
pub struct Temperature(u16);

impl Temperature {
    /// 0.0 °C, a valid device reading.
    pub const ZERO: Self = Self(0);

    /// Creates a temperature from tenths of a degree.
    #[must_use]
    pub const fn from_raw(tenths: u16) -> Self {
        Self(tenths)
    }

    /// Creates a temperature from degrees Celsius, rounded to 0.1 °C.
    ///
    /// No plausibility range is applied: any value the wire format can
    /// carry is accepted and left for the firmware to judge.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::TemperatureNotEncodable` for NaN, infinite,
    /// negative, or values above 6553.5 °C.
    pub fn from_celsius(celsius: f32) -> Result<Self, ValueError> {
        let tenths = (celsius * 10.0).round();
        if !tenths.is_finite() || tenths < 0.0 || tenths > f32::from(u16::MAX) {
            return Err(ValueError::TemperatureNotEncodable(celsius));
        }
        // Range checked above
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Self(tenths as u16))
    }

    /// Decodes a little-endian tenths value.
    #[must_use]
    pub const fn from_le_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_le_bytes(bytes))
    }

    /// Returns the value in tenths of a degree.
    #[must_use]
    pub const fn raw(&self) -> u16 {
        self.0
    }

    /// Returns the value in degrees Celsius.
    #[must_use]
    pub fn celsius(&self) -> f32 {
        f32::from(self.0) / 10.0
    }

    /// Encodes the tenths value little-endian, as the firmware expects.
    #[must_use]
    pub const fn to_le_bytes(&self) -> [u8; 2] {
        self.0.to_le_bytes()
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°C", self.celsius())
    }
}

impl From<Temperature> for f32 {
    fn from(value: Temperature) -> Self {
        value.celsius()
    }
}

impl TryFrom<f32> for Temperature {
    type Error = ValueError;

    fn try_from(celsius: f32) -> Result<Self, Self::Error> {
        Self::from_celsius(celsius)
    }
}

/// The two temperature circuits the radiator regulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperatureZone {
    /// Ambient room temperature.
    Room,
    /// Heating element temperature.
    Element,
}

impl TemperatureZone {
    /// Returns the setpoint range offered to users for this zone.
    #[must_use]
    pub const fn range(&self) -> TemperatureRange {
        match self {
            Self::Room => TemperatureRange::ROOM,
            Self::Element => TemperatureRange::ELEMENT,
        }
    }

    /// Returns a lowercase identifier for the zone.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Room => "room",
            Self::Element => "element",
        }
    }
}

impl fmt::Display for TemperatureZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive setpoint bounds in whole degrees Celsius.
///
/// These are the limits a host presents to users. The driver itself sends
/// any encodable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureRange {
    min: u8,
    max: u8,
}

impl TemperatureRange {
    /// Room setpoints, 15–30 °C.
    pub const ROOM: Self = Self { min: 15, max: 30 };

    /// Element setpoints, 30–60 °C.
    pub const ELEMENT: Self = Self { min: 30, max: 60 };

    /// Lower bound in °C.
    #[must_use]
    pub fn min(&self) -> f32 {
        f32::from(self.min)
    }

    /// Upper bound in °C.
    #[must_use]
    pub fn max(&self) -> f32 {
        f32::from(self.max)
    }

    /// Returns `true` if `celsius` lies within the bounds.
    #[must_use]
    pub fn contains(&self, celsius: f32) -> bool {
        self.as_range().contains(&celsius)
    }

    fn as_range(&self) -> RangeInclusive<f32> {
        self.min()..=self.max()
    }
}

impl fmt::Display for TemperatureRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}] °C", self.min, self.max)
    }
}
