// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory radiator for unit tests.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::TransportError;
use crate::protocol::{ELEMENT_TEMPERATURE, MODE, ROOM_TEMPERATURE};

use super::{BleLink, BleTransport};

/// A radiator that answers from a characteristic table.
///
/// Writes land in the table with the current-value half preserved, the
/// way the real firmware reports them back.
#[derive(Debug, Clone)]
pub(crate) struct FakeTransport {
    address: String,
    reachable: bool,
    values: Arc<Mutex<HashMap<Uuid, Vec<u8>>>>,
}

impl FakeTransport {
    /// Room 19.5/20.0 °C, element 41.2/45.0 °C, mode on.
    pub fn new(address: &str) -> Self {
        let values = HashMap::from([
            (ROOM_TEMPERATURE, vec![0xC3, 0x00, 0xC8, 0x00]),
            (ELEMENT_TEMPERATURE, vec![0x9C, 0x01, 0xC2, 0x01]),
            (MODE, vec![0x21, 0x00, 0x00, 0x00]),
        ]);
        Self {
            address: address.to_string(),
            reachable: true,
            values: Arc::new(Mutex::new(values)),
        }
    }

    /// A radiator whose every connect fails.
    pub fn unreachable(address: &str) -> Self {
        Self {
            reachable: false,
            ..Self::new(address)
        }
    }

    /// Overwrites one characteristic.
    pub fn set_value(&self, characteristic: Uuid, payload: &[u8]) {
        self.values.lock().insert(characteristic, payload.to_vec());
    }
}

impl BleTransport for FakeTransport {
    type Link = FakeLink;

    fn address(&self) -> &str {
        &self.address
    }

    fn name(&self) -> Option<&str> {
        None
    }

    fn open_link(&self) -> FakeLink {
        FakeLink {
            reachable: self.reachable,
            connected: false,
            values: Arc::clone(&self.values),
        }
    }
}

#[derive(Debug)]
pub(crate) struct FakeLink {
    reachable: bool,
    connected: bool,
    values: Arc<Mutex<HashMap<Uuid, Vec<u8>>>>,
}

impl BleLink for FakeLink {
    async fn connect(&mut self) -> Result<(), TransportError> {
        if !self.reachable {
            return Err(TransportError::ConnectFailed("out of range".into()));
        }
        self.connected = true;
        Ok(())
    }

    async fn pair(&mut self) -> Result<(), TransportError> {
        Err(TransportError::PairingUnsupported)
    }

    async fn is_connected(&self) -> bool {
        self.connected
    }

    async fn read(&mut self, characteristic: Uuid) -> Result<Vec<u8>, TransportError> {
        self.values
            .lock()
            .get(&characteristic)
            .cloned()
            .ok_or(TransportError::CharacteristicNotFound(characteristic))
    }

    async fn write(&mut self, characteristic: Uuid, payload: &[u8]) -> Result<(), TransportError> {
        let mut values = self.values.lock();
        let stored = values
            .get_mut(&characteristic)
            .ok_or(TransportError::CharacteristicNotFound(characteristic))?;
        if characteristic == MODE {
            *stored = payload.to_vec();
        } else if let (Some(slot), Some(target)) = (stored.get_mut(2..4), payload.get(2..4)) {
            slot.copy_from_slice(target);
        }
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        self.connected = false;
        Ok(())
    }
}
