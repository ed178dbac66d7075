// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for radiator control.
//!
//! # Types
//!
//! - [`Temperature`] - Temperature in tenths of a degree Celsius
//! - [`TemperatureZone`] - Room or element circuit
//! - [`TemperatureRange`] - Setpoint bounds offered to users
//! - [`OperatingMode`] - Raw firmware mode codes

mod mode;
mod temperature;

pub use mode::OperatingMode;
pub use temperature::{Temperature, TemperatureRange, TemperatureZone};
