// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Thermostat view of one temperature zone.
//!
//! Home-automation hosts model a radiator as two thermostats, one per
//! [`TemperatureZone`]. A [`Climate`] reads from its coordinator's latest
//! snapshot and routes writes back through the coordinator, so every change
//! is followed by an early refresh.
//!
//! | Zone | Name | Setpoint range |
//! |------|------|----------------|
//! | Room | `Room Temperature` | 15–30 °C |
//! | Element | `Element Temperature` | 30–60 °C |

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::coordinator::Coordinator;
use crate::error::{Error, Result};
use crate::transport::BleTransport;
use crate::types::{OperatingMode, Temperature, TemperatureZone};

/// Distance below the setpoint at which a zone counts as heating.
const HEATING_HYSTERESIS: f32 = 0.5;

/// User-selectable thermostat mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HvacMode {
    /// Not heating.
    Off,
    /// Regulating towards the setpoint.
    Heat,
}

/// What the zone is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HvacAction {
    /// Switched off.
    Off,
    /// On, at or near the setpoint.
    Idle,
    /// On and below the setpoint.
    Heating,
}

/// One zone of a radiator, presented as a thermostat.
pub struct Climate<T: BleTransport> {
    coordinator: Arc<Coordinator<T>>,
    zone: TemperatureZone,
}

impl<T: BleTransport> Climate<T> {
    /// Creates the view of `zone`.
    #[must_use]
    pub fn new(coordinator: Arc<Coordinator<T>>, zone: TemperatureZone) -> Self {
        Self { coordinator, zone }
    }

    /// The zone this view controls.
    #[must_use]
    pub fn zone(&self) -> TemperatureZone {
        self.zone
    }

    /// Display name of the entity.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.zone {
            TemperatureZone::Room => "Room Temperature",
            TemperatureZone::Element => "Element Temperature",
        }
    }

    /// Stable identifier, e.g. `AA:BB:CC:DD:EE:FF_room_climate`.
    #[must_use]
    pub fn unique_id(&self) -> String {
        format!(
            "{}_{}_climate",
            self.coordinator.device().address(),
            self.zone
        )
    }

    /// Lowest setpoint offered.
    #[must_use]
    pub fn min_temp(&self) -> f32 {
        self.zone.range().min()
    }

    /// Highest setpoint offered.
    #[must_use]
    pub fn max_temp(&self) -> f32 {
        self.zone.range().max()
    }

    /// Setpoint step in °C.
    #[must_use]
    pub fn target_temperature_step(&self) -> f32 {
        0.1
    }

    /// Returns `false` while the last refresh failed.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.coordinator.snapshot().is_available()
    }

    /// Measured temperature in °C.
    #[must_use]
    pub fn current_temperature(&self) -> Option<f32> {
        self.current().map(|t| t.celsius())
    }

    /// Setpoint in °C.
    #[must_use]
    pub fn target_temperature(&self) -> Option<f32> {
        self.target().map(|t| t.celsius())
    }

    fn current(&self) -> Option<Temperature> {
        self.coordinator.snapshot().state.current_temp(self.zone)
    }

    fn target(&self) -> Option<Temperature> {
        self.coordinator.snapshot().state.target_temp(self.zone)
    }

    /// Current thermostat mode, derived from the device mode.
    #[must_use]
    pub fn hvac_mode(&self) -> HvacMode {
        hvac_mode_for(self.zone, self.coordinator.snapshot().state.mode())
    }

    /// Current heating activity.
    ///
    /// A zone heats while it sits more than half a degree below its setpoint.
    #[must_use]
    pub fn hvac_action(&self) -> HvacAction {
        let state = self.coordinator.snapshot().state;
        if hvac_mode_for(self.zone, state.mode()) == HvacMode::Off {
            return HvacAction::Off;
        }
        match (state.current_temp(self.zone), state.target_temp(self.zone)) {
            (Some(current), Some(target))
                if current.celsius() < target.celsius() - HEATING_HYSTERESIS =>
            {
                HvacAction::Heating
            }
            _ => HvacAction::Idle,
        }
    }

    /// Changes the setpoint.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfBounds` without any I/O if `celsius` lies
    /// outside the zone range, otherwise the write error.
    pub async fn set_temperature(&self, celsius: f32) -> Result<()> {
        let range = self.zone.range();
        if !range.contains(celsius) {
            return Err(Error::OutOfBounds { celsius, range });
        }
        self.coordinator.set_temperature(self.zone, celsius).await
    }

    /// Switches heating on or off.
    ///
    /// Turning the room zone on selects room regulation; the element zone
    /// selects element regulation. Both write the same mode byte.
    ///
    /// # Errors
    ///
    /// Returns the write error.
    pub async fn set_hvac_mode(&self, mode: HvacMode) -> Result<()> {
        match mode {
            HvacMode::Heat => {
                self.coordinator
                    .turn_on(self.zone == TemperatureZone::Room)
                    .await
            }
            HvacMode::Off => self.coordinator.turn_off().await,
        }
    }
}

fn hvac_mode_for(zone: TemperatureZone, mode: Option<OperatingMode>) -> HvacMode {
    let heating = match (zone, mode) {
        (_, Some(OperatingMode::On)) => true,
        (
            TemperatureZone::Room,
            Some(OperatingMode::RoomTempManual | OperatingMode::RoomTempSchedule),
        ) => true,
        (
            TemperatureZone::Element,
            Some(
                OperatingMode::ElementTempManual
                | OperatingMode::ElementTempSchedule
                | OperatingMode::Manual,
            ),
        ) => true,
        _ => false,
    };
    if heating { HvacMode::Heat } else { HvacMode::Off }
}

impl<T: BleTransport> fmt::Debug for Climate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Climate")
            .field("address", &self.coordinator.device().address())
            .field("zone", &self.zone)
            .finish_non_exhaustive()
    }
}
