// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! What the manager tells its listeners.

use serde::{Deserialize, Serialize};

use crate::state::{DeviceState, StateChange};

use super::DeviceId;

/// Something happened to one managed radiator.
///
/// Lifecycle events come from [`DeviceManager`](crate::DeviceManager)
/// itself. `StateChanged` and `UpdateFailed` are forwarded from the
/// radiator's coordinator, one `StateChanged` per committed leaf change.
///
/// # Examples
///
/// ```
/// use terma_ble::event::{DeviceEvent, DeviceId};
/// use terma_ble::state::{DeviceState, StateChange};
/// use terma_ble::types::OperatingMode;
///
/// let event = DeviceEvent::state_changed(
///     DeviceId::new(),
///     StateChange::mode(OperatingMode::On),
///     DeviceState::new(),
/// );
/// assert!(event.is_state_change());
/// assert!(!event.is_lifecycle());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DeviceEvent {
    /// The radiator joined the manager.
    DeviceAdded {
        device_id: DeviceId,
    },

    /// The radiator left the manager and is no longer polled.
    DeviceRemoved {
        device_id: DeviceId,
    },

    /// A refresh or write was committed to the cached state.
    StateChanged {
        device_id: DeviceId,
        /// What was committed.
        change: StateChange,
        /// Cached state right after the commit.
        new_state: DeviceState,
    },

    /// The radiator stopped answering. Cached values are kept but stale
    /// until the next successful refresh.
    UpdateFailed {
        device_id: DeviceId,
        /// Rendered error of the failed refresh.
        error: String,
    },
}

impl DeviceEvent {
    /// Radiator the event is about.
    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        match self {
            Self::DeviceAdded { device_id }
            | Self::DeviceRemoved { device_id }
            | Self::StateChanged { device_id, .. }
            | Self::UpdateFailed { device_id, .. } => *device_id,
        }
    }

    /// `true` for `DeviceAdded` and `DeviceRemoved`.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::DeviceAdded { .. } | Self::DeviceRemoved { .. })
    }

    #[must_use]
    pub fn is_state_change(&self) -> bool {
        matches!(self, Self::StateChanged { .. })
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::UpdateFailed { .. })
    }

    #[must_use]
    pub fn device_added(device_id: DeviceId) -> Self {
        Self::DeviceAdded { device_id }
    }

    #[must_use]
    pub fn device_removed(device_id: DeviceId) -> Self {
        Self::DeviceRemoved { device_id }
    }

    #[must_use]
    pub fn state_changed(device_id: DeviceId, change: StateChange, new_state: DeviceState) -> Self {
        Self::StateChanged {
            device_id,
            change,
            new_state,
        }
    }

    /// `error` is usually a rendered [`Error`](crate::Error).
    #[must_use]
    pub fn update_failed(device_id: DeviceId, error: impl Into<String>) -> Self {
        Self::UpdateFailed {
            device_id,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OperatingMode, Temperature, TemperatureZone};

    #[test]
    fn every_variant_names_its_radiator() {
        let id = DeviceId::new();
        let events = [
            DeviceEvent::device_added(id),
            DeviceEvent::device_removed(id),
            DeviceEvent::state_changed(id, StateChange::Mode(None), DeviceState::new()),
            DeviceEvent::update_failed(id, "timed out"),
        ];
        assert!(events.iter().all(|e| e.device_id() == id));
        assert_eq!(events.iter().filter(|e| e.is_lifecycle()).count(), 2);
        assert!(events[3].is_failure());
    }

    #[test]
    fn state_changed_carries_committed_snapshot() {
        let change = StateChange::target_temperature(TemperatureZone::Room, Temperature::from_raw(215));
        let mut state = DeviceState::new();
        state.apply(&change);

        let event = DeviceEvent::state_changed(DeviceId::new(), change.clone(), state);
        let DeviceEvent::StateChanged { change: got, new_state, .. } = event else {
            panic!("expected StateChanged");
        };
        assert_eq!(got, change);
        assert_eq!(new_state.target_room_temp(), Some(Temperature::from_raw(215)));
        assert!(new_state.mode().is_none());
    }

    #[test]
    fn serializes_with_variant_tag() {
        let event = DeviceEvent::state_changed(
            DeviceId::new(),
            StateChange::mode(OperatingMode::Off),
            DeviceState::new(),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("StateChanged").is_some());
    }
}
