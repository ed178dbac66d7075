// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BLE transport abstraction.
//!
//! The driver never talks to a Bluetooth stack directly. It goes through two
//! traits:
//!
//! - [`BleTransport`] - a handle on one radiator, able to open links
//! - [`BleLink`] - one transient connection, used for a single attempt
//!
//! Every connection attempt opens a fresh link and always ends by closing
//! it, so a link never outlives the operation that opened it.
//!
//! With the `btleplug` feature enabled, [`BtleplugTransport`] implements both
//! traits on top of the `btleplug` crate. Tests and hosts with their own
//! stack provide their own implementations.

use std::future::Future;

use uuid::Uuid;

use crate::error::TransportError;

#[cfg(feature = "btleplug")]
mod btleplug_backend;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(feature = "btleplug")]
pub use btleplug_backend::{BtleplugLink, BtleplugTransport};

/// A handle on one BLE peripheral.
///
/// # Examples
///
/// ```ignore
/// use terma_ble::transport::{BleLink, BleTransport};
///
/// struct MyTransport { address: String }
///
/// impl BleTransport for MyTransport {
///     type Link = MyLink;
///
///     fn address(&self) -> &str { &self.address }
///     fn name(&self) -> Option<&str> { None }
///     fn open_link(&self) -> MyLink { MyLink::new(&self.address) }
/// }
/// ```
pub trait BleTransport: Send + Sync + 'static {
    /// Connection type produced by [`open_link`](Self::open_link).
    type Link: BleLink;

    /// Bluetooth address of the peripheral.
    fn address(&self) -> &str;

    /// Advertised local name, if known.
    fn name(&self) -> Option<&str>;

    /// Creates a new, not yet connected link.
    fn open_link(&self) -> Self::Link;
}

/// One connection to a peripheral.
///
/// Futures returned by these methods are `Send`, so driver operations can be
/// spawned on a multi-threaded runtime. Implementations may use `async fn`.
pub trait BleLink: Send + Sync + 'static {
    /// Establishes the connection.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the stack cannot connect.
    fn connect(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Requests pairing.
    ///
    /// Callers treat failures as non-fatal: a device that is already paired
    /// reports an error here.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if pairing is rejected or unsupported.
    fn pair(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Returns `true` while the link is connected.
    fn is_connected(&self) -> impl Future<Output = bool> + Send;

    /// Reads a characteristic.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the characteristic is missing or the
    /// read fails.
    fn read(
        &mut self,
        characteristic: Uuid,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;

    /// Writes a characteristic with response.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the characteristic is missing or the
    /// write fails.
    fn write(
        &mut self,
        characteristic: Uuid,
        payload: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the stack reports a failure.
    fn disconnect(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send;
}
