// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::state::StateChange;
use crate::subscription::{SubscriptionId, TemperatureUpdate};
use crate::types::OperatingMode;

/// Registration surface for radiator listeners.
///
/// Every method returns a [`SubscriptionId`] that stays valid until passed
/// to [`unsubscribe`](Self::unsubscribe).
pub trait Subscribable {
    /// Mode read back from the radiator or successfully written.
    fn on_mode_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Option<OperatingMode>) + Send + Sync + 'static;

    /// Temperature readings from a refresh and setpoint writes.
    fn on_temperature_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(TemperatureUpdate) + Send + Sync + 'static;

    /// Fires after each connection to the radiator is closed cleanly.
    fn on_disconnected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static;

    /// Every committed [`StateChange`].
    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static;

    /// Returns `false` if the listener was already gone.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
