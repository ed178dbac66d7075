// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport backed by the `btleplug` crate.
//!
//! Scanning is left to the host: a transport is built from a peripheral the
//! adapter has already discovered.

use std::time::Duration;

use btleplug::api::{Central, Characteristic, Peripheral as _, WriteType};
use btleplug::platform::{Adapter, Peripheral};
use tokio::time::timeout;
use uuid::Uuid;

use crate::error::TransportError;

use super::{BleLink, BleTransport};

/// Bound on a single characteristic read or write.
const IO_TIMEOUT: Duration = Duration::from_secs(10);

/// A radiator reachable through a `btleplug` adapter.
#[derive(Debug, Clone)]
pub struct BtleplugTransport {
    peripheral: Peripheral,
    address: String,
    name: Option<String>,
}

impl BtleplugTransport {
    /// Wraps an already discovered peripheral.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Bluetooth` if the peripheral properties
    /// cannot be read.
    pub async fn from_peripheral(peripheral: Peripheral) -> Result<Self, TransportError> {
        let properties = peripheral.properties().await?;
        let name = properties.as_ref().and_then(|p| p.local_name.clone());
        let address = peripheral.address().to_string();

        Ok(Self {
            peripheral,
            address,
            name,
        })
    }

    /// Looks up a discovered peripheral by address (case-insensitive).
    ///
    /// Returns `Ok(None)` if the adapter has not seen the device.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Bluetooth` if the adapter cannot list its
    /// peripherals.
    pub async fn find(adapter: &Adapter, address: &str) -> Result<Option<Self>, TransportError> {
        for peripheral in adapter.peripherals().await? {
            if peripheral.address().to_string().eq_ignore_ascii_case(address) {
                return Self::from_peripheral(peripheral).await.map(Some);
            }
        }
        Ok(None)
    }
}

impl BleTransport for BtleplugTransport {
    type Link = BtleplugLink;

    fn address(&self) -> &str {
        &self.address
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn open_link(&self) -> Self::Link {
        BtleplugLink {
            peripheral: self.peripheral.clone(),
        }
    }
}

/// One connection opened through [`BtleplugTransport`].
#[derive(Debug)]
pub struct BtleplugLink {
    peripheral: Peripheral,
}

impl BtleplugLink {
    fn find_characteristic(&self, uuid: Uuid) -> Result<Characteristic, TransportError> {
        self.peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == uuid)
            .ok_or(TransportError::CharacteristicNotFound(uuid))
    }
}

impl BleLink for BtleplugLink {
    async fn connect(&mut self) -> Result<(), TransportError> {
        self.peripheral
            .connect()
            .await
            .map_err(|e| TransportError::ConnectFailed(e.to_string()))?;
        self.peripheral.discover_services().await?;
        Ok(())
    }

    async fn pair(&mut self) -> Result<(), TransportError> {
        Err(TransportError::PairingUnsupported)
    }

    async fn is_connected(&self) -> bool {
        self.peripheral.is_connected().await.unwrap_or(false)
    }

    async fn read(&mut self, characteristic: Uuid) -> Result<Vec<u8>, TransportError> {
        let target = self.find_characteristic(characteristic)?;
        timeout(IO_TIMEOUT, self.peripheral.read(&target))
            .await
            .map_err(|_| TransportError::Io(format!("read of {characteristic}")))?
            .map_err(|e| TransportError::Read {
                characteristic,
                message: e.to_string(),
            })
    }

    async fn write(&mut self, characteristic: Uuid, payload: &[u8]) -> Result<(), TransportError> {
        let target = self.find_characteristic(characteristic)?;
        timeout(
            IO_TIMEOUT,
            self.peripheral
                .write(&target, payload, WriteType::WithResponse),
        )
        .await
        .map_err(|_| TransportError::Io(format!("write of {characteristic}")))?
        .map_err(|e| TransportError::Write {
            characteristic,
            message: e.to_string(),
        })
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        self.peripheral
            .disconnect()
            .await
            .map_err(|e| TransportError::Disconnect(e.to_string()))
    }
}
