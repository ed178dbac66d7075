// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scriptable in-memory radiator shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use terma_ble::TransportError;
use terma_ble::protocol::{ELEMENT_TEMPERATURE, MODE, ROOM_TEMPERATURE};
use terma_ble::transport::{BleLink, BleTransport};
use uuid::Uuid;

/// Something a link did, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Connect,
    Pair,
    Read(Uuid),
    Write(Uuid, Vec<u8>),
    Disconnect,
}

#[derive(Debug, Default)]
struct Script {
    values: HashMap<Uuid, Vec<u8>>,
    connect_failures: u32,
    connect_delay: Option<Duration>,
    hollow_connects: u32,
    read_delay: Option<Duration>,
    disconnect_delay: Option<Duration>,
    read_failures: HashMap<Uuid, u32>,
    fail_disconnect: bool,
    events: Vec<LinkEvent>,
    connects: u32,
    open_links: u32,
    max_open_links: u32,
}

/// A radiator driven by a script.
///
/// Clones share the same script, so a test keeps one handle to inspect
/// while the driver owns another.
#[derive(Debug, Clone)]
pub struct MockTransport {
    address: String,
    name: Option<String>,
    script: Arc<Mutex<Script>>,
}

impl MockTransport {
    /// Room 19.5/20.0 °C, element 41.2/45.0 °C, mode on.
    pub fn new() -> Self {
        let script = Script {
            values: HashMap::from([
                (ROOM_TEMPERATURE, vec![0xC3, 0x00, 0xC8, 0x00]),
                (ELEMENT_TEMPERATURE, vec![0x9C, 0x01, 0xC2, 0x01]),
                (MODE, vec![0x21, 0x00, 0x00, 0x00]),
            ]),
            ..Script::default()
        };
        Self {
            address: "AA:BB:CC:DD:EE:FF".to_string(),
            name: None,
            script: Arc::new(Mutex::new(script)),
        }
    }

    pub fn with_address(mut self, address: &str) -> Self {
        self.address = address.to_string();
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Replaces the payload returned for a characteristic.
    pub fn set_value(&self, characteristic: Uuid, payload: &[u8]) {
        self.script
            .lock()
            .values
            .insert(characteristic, payload.to_vec());
    }

    pub fn value(&self, characteristic: Uuid) -> Option<Vec<u8>> {
        self.script.lock().values.get(&characteristic).cloned()
    }

    /// Makes the next `n` connects fail.
    pub fn fail_connects(&self, n: u32) {
        self.script.lock().connect_failures = n;
    }

    /// Makes every connect hang for `delay` before succeeding.
    pub fn delay_connects(&self, delay: Duration) {
        self.script.lock().connect_delay = Some(delay);
    }

    /// Makes the next `n` connects report success without bringing the
    /// link up.
    pub fn connect_without_link(&self, n: u32) {
        self.script.lock().hollow_connects = n;
    }

    /// Makes every read take `delay`. `None` restores instant reads.
    pub fn delay_reads(&self, delay: Option<Duration>) {
        self.script.lock().read_delay = delay;
    }

    /// Makes every disconnect take `delay` before the link goes down.
    pub fn delay_disconnects(&self, delay: Duration) {
        self.script.lock().disconnect_delay = Some(delay);
    }

    /// Makes the next `n` reads of a characteristic fail.
    pub fn fail_reads(&self, characteristic: Uuid, n: u32) {
        self.script.lock().read_failures.insert(characteristic, n);
    }

    pub fn fail_disconnects(&self) {
        self.script.lock().fail_disconnect = true;
    }

    pub fn events(&self) -> Vec<LinkEvent> {
        self.script.lock().events.clone()
    }

    pub fn clear_events(&self) {
        self.script.lock().events.clear();
    }

    pub fn writes(&self) -> Vec<(Uuid, Vec<u8>)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                LinkEvent::Write(uuid, payload) => Some((uuid, payload)),
                _ => None,
            })
            .collect()
    }

    pub fn reads(&self) -> Vec<Uuid> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                LinkEvent::Read(uuid) => Some(uuid),
                _ => None,
            })
            .collect()
    }

    /// Number of connect calls, failed ones included.
    pub fn connect_count(&self) -> u32 {
        self.script.lock().connects
    }

    /// Highest number of links connected at the same time.
    pub fn max_open_links(&self) -> u32 {
        self.script.lock().max_open_links
    }
}

impl BleTransport for MockTransport {
    type Link = MockLink;

    fn address(&self) -> &str {
        &self.address
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn open_link(&self) -> MockLink {
        MockLink {
            script: Arc::clone(&self.script),
            connected: false,
        }
    }
}

pub struct MockLink {
    script: Arc<Mutex<Script>>,
    connected: bool,
}

impl MockLink {
    fn record(&self, event: LinkEvent) {
        self.script.lock().events.push(event);
    }
}

impl BleLink for MockLink {
    async fn connect(&mut self) -> Result<(), TransportError> {
        let delay = {
            let mut script = self.script.lock();
            script.connects += 1;
            script.events.push(LinkEvent::Connect);
            if script.connect_failures > 0 {
                script.connect_failures -= 1;
                return Err(TransportError::ConnectFailed("device busy".into()));
            }
            if script.hollow_connects > 0 {
                script.hollow_connects -= 1;
                return Ok(());
            }
            script.connect_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut script = self.script.lock();
        script.open_links += 1;
        script.max_open_links = script.max_open_links.max(script.open_links);
        self.connected = true;
        Ok(())
    }

    async fn pair(&mut self) -> Result<(), TransportError> {
        self.record(LinkEvent::Pair);
        Err(TransportError::Pairing("already paired".into()))
    }

    async fn is_connected(&self) -> bool {
        self.connected
    }

    async fn read(&mut self, characteristic: Uuid) -> Result<Vec<u8>, TransportError> {
        let delay = self.script.lock().read_delay;
        match delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
        let mut script = self.script.lock();
        script.events.push(LinkEvent::Read(characteristic));
        if let Some(n) = script.read_failures.get_mut(&characteristic)
            && *n > 0
        {
            *n -= 1;
            return Err(TransportError::Read {
                characteristic,
                message: "GATT error".into(),
            });
        }
        script
            .values
            .get(&characteristic)
            .cloned()
            .ok_or(TransportError::CharacteristicNotFound(characteristic))
    }

    async fn write(&mut self, characteristic: Uuid, payload: &[u8]) -> Result<(), TransportError> {
        tokio::task::yield_now().await;
        let mut script = self.script.lock();
        script
            .events
            .push(LinkEvent::Write(characteristic, payload.to_vec()));

        let stored = script.values.entry(characteristic).or_default();
        if characteristic == MODE {
            *stored = payload.to_vec();
        } else if let (Some(slot), Some(target)) = (stored.get_mut(2..4), payload.get(2..4)) {
            slot.copy_from_slice(target);
        }
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        let delay = self.script.lock().disconnect_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut script = self.script.lock();
        script.events.push(LinkEvent::Disconnect);
        if self.connected {
            self.connected = false;
            script.open_links -= 1;
        }
        if script.fail_disconnect {
            return Err(TransportError::Disconnect("link lost".into()));
        }
        Ok(())
    }
}

/// Collects values passed to callbacks.
pub fn recorder<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(T) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |value| sink.lock().push(value))
}
