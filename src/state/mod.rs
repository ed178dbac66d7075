// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cached radiator values.
//!
//! A [`Device`](crate::Device) keeps one [`DeviceState`] and only changes it
//! by applying [`StateChange`]s once an operation has fully succeeded.
//! Fields the radiator has not reported yet stay `None`.
//!
//! ```
//! use terma_ble::state::{DeviceState, StateChange};
//! use terma_ble::types::{Temperature, TemperatureZone};
//!
//! let mut state = DeviceState::new();
//! let written = StateChange::target_temperature(TemperatureZone::Element, Temperature::from_raw(450));
//!
//! assert!(state.apply(&written));
//! assert_eq!(state.target_element_temp(), Some(Temperature::from_raw(450)));
//! assert!(state.current_element_temp().is_none());
//! ```

mod device_state;
mod state_change;

pub use device_state::DeviceState;
pub use state_change::StateChange;
