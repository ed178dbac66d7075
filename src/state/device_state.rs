// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.

use serde::{Deserialize, Serialize};

use crate::types::{OperatingMode, Temperature, TemperatureZone};

use super::StateChange;

/// Cached state of one radiator.
///
/// Every field starts out unknown and stays `None` until the device reports
/// it. A reading of 0.0 °C is a real value, distinct from `None`.
///
/// # Examples
///
/// ```
/// use terma_ble::state::{DeviceState, StateChange};
/// use terma_ble::types::{Temperature, TemperatureZone};
///
/// let mut state = DeviceState::new();
/// assert!(state.current_room_temp().is_none());
///
/// state.apply(&StateChange::temperature(
///     TemperatureZone::Room,
///     Temperature::from_raw(0),
///     Temperature::from_raw(200),
/// ));
/// assert_eq!(state.current_room_temp(), Some(Temperature::ZERO));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceState {
    current_room_temp: Option<Temperature>,
    target_room_temp: Option<Temperature>,
    current_element_temp: Option<Temperature>,
    target_element_temp: Option<Temperature>,
    mode: Option<OperatingMode>,
}

impl DeviceState {
    /// Creates a new empty device state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last measured room temperature.
    #[must_use]
    pub fn current_room_temp(&self) -> Option<Temperature> {
        self.current_room_temp
    }

    /// Last known room setpoint.
    #[must_use]
    pub fn target_room_temp(&self) -> Option<Temperature> {
        self.target_room_temp
    }

    /// Last measured element temperature.
    #[must_use]
    pub fn current_element_temp(&self) -> Option<Temperature> {
        self.current_element_temp
    }

    /// Last known element setpoint.
    #[must_use]
    pub fn target_element_temp(&self) -> Option<Temperature> {
        self.target_element_temp
    }

    /// Last known operating mode.
    #[must_use]
    pub fn mode(&self) -> Option<OperatingMode> {
        self.mode
    }

    /// Measured temperature of a zone.
    #[must_use]
    pub fn current_temp(&self, zone: TemperatureZone) -> Option<Temperature> {
        match zone {
            TemperatureZone::Room => self.current_room_temp,
            TemperatureZone::Element => self.current_element_temp,
        }
    }

    /// Setpoint of a zone.
    #[must_use]
    pub fn target_temp(&self, zone: TemperatureZone) -> Option<Temperature> {
        match zone {
            TemperatureZone::Room => self.target_room_temp,
            TemperatureZone::Element => self.target_element_temp,
        }
    }

    /// Returns `true` until some value has been read or written.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        *self == Self::default()
    }

    fn slots_mut(
        &mut self,
        zone: TemperatureZone,
    ) -> (&mut Option<Temperature>, &mut Option<Temperature>) {
        match zone {
            TemperatureZone::Room => (&mut self.current_room_temp, &mut self.target_room_temp),
            TemperatureZone::Element => {
                (&mut self.current_element_temp, &mut self.target_element_temp)
            }
        }
    }

    // ========== State Changes ==========

    /// Applies a state change and returns whether the state actually changed.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        match change {
            StateChange::Temperature {
                zone,
                current,
                target,
            } => {
                let (current_slot, target_slot) = self.slots_mut(*zone);
                let changed = *current_slot != Some(*current) || *target_slot != Some(*target);
                *current_slot = Some(*current);
                *target_slot = Some(*target);
                changed
            }
            StateChange::TargetTemperature { zone, target } => {
                let (_, target_slot) = self.slots_mut(*zone);
                if *target_slot == Some(*target) {
                    false
                } else {
                    *target_slot = Some(*target);
                    true
                }
            }
            StateChange::Mode(mode) => {
                if self.mode == *mode {
                    false
                } else {
                    self.mode = *mode;
                    true
                }
            }
            StateChange::Batch(changes) => {
                let mut any_changed = false;
                for c in changes {
                    if self.apply(c) {
                        any_changed = true;
                    }
                }
                any_changed
            }
        }
    }

    /// Clears all state, resetting to unknown.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
