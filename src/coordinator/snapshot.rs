// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Published view of a polled radiator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::DeviceState;

/// What a coordinator last learned about its radiator.
///
/// A failed refresh keeps the previous `state` and `last_updated` and only
/// flips `last_update_success`, so consumers can show the values as stale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Cached device state.
    pub state: DeviceState,
    /// Outcome of the most recent refresh.
    pub last_update_success: bool,
    /// Time of the most recent successful refresh.
    pub last_updated: Option<DateTime<Utc>>,
    /// Error of the most recent refresh, cleared on success.
    pub last_error: Option<String>,
}

impl Snapshot {
    /// Returns `true` once a refresh has succeeded and the latest one did not
    /// fail.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.last_update_success && self.last_updated.is_some()
    }

    pub(super) fn record_success(&mut self, state: DeviceState) {
        self.state = state;
        self.last_update_success = true;
        self.last_updated = Some(Utc::now());
        self.last_error = None;
    }

    pub(super) fn record_failure(&mut self, error: String) {
        self.last_update_success = false;
        self.last_error = Some(error);
    }
}
