// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One connection attempt to a radiator.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::OwnedMutexGuard;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{Error, Result, TransportError};
use crate::protocol::Characteristic;
use crate::transport::BleLink;

/// Holder of the device's operation gate for one operation.
pub(super) type Permit = Option<OwnedMutexGuard<()>>;

/// Owns a link for the duration of one attempt.
///
/// [`close`](Self::close) must be awaited on every normal exit path. If the
/// attempt is cancelled instead, dropping the session schedules the
/// disconnect on the current runtime and hands it the operation's permit,
/// so the next operation cannot connect before that disconnect is done.
pub(super) struct Session<'a, L: BleLink> {
    link: Option<L>,
    address: &'a str,
    permit: &'a mut Permit,
}

impl<'a, L: BleLink> Session<'a, L> {
    pub(super) fn new(link: L, address: &'a str, permit: &'a mut Permit) -> Self {
        Self {
            link: Some(link),
            address,
            permit,
        }
    }

    fn link(&mut self) -> Result<&mut L> {
        self.link
            .as_mut()
            .ok_or(Error::Transport(TransportError::NotEstablished))
    }

    /// Connects, pairs and verifies the connection.
    ///
    /// Pairing errors are ignored: an already paired radiator rejects the
    /// request.
    pub(super) async fn establish(&mut self, connect_timeout: Duration) -> Result<()> {
        let address = self.address;
        let link = self.link()?;

        timeout(connect_timeout, link.connect())
            .await
            .map_err(|_| Error::Timeout(connect_timeout))??;

        if let Err(e) = link.pair().await {
            debug!(%address, error = %e, "Pairing skipped");
        }

        if !link.is_connected().await {
            return Err(TransportError::NotEstablished.into());
        }

        debug!(%address, "Connected");
        Ok(())
    }

    pub(super) async fn read(&mut self, characteristic: Characteristic) -> Result<Vec<u8>> {
        let payload = self.link()?.read(characteristic.uuid()).await?;
        Ok(payload)
    }

    pub(super) async fn write(
        &mut self,
        characteristic: Characteristic,
        payload: &[u8],
    ) -> Result<()> {
        self.link()?.write(characteristic.uuid(), payload).await?;
        Ok(())
    }

    /// Disconnects if the link is still up.
    ///
    /// Returns `true` if a disconnect completed. Disconnect errors are logged
    /// and otherwise ignored. The link is only released once this returns,
    /// so a close cancelled halfway is finished by `Drop`.
    pub(super) async fn close(&mut self) -> bool {
        let Some(link) = self.link.as_mut() else {
            return false;
        };

        let disconnected = if !link.is_connected().await {
            false
        } else {
            match link.disconnect().await {
                Ok(()) => {
                    debug!(address = %self.address, "Disconnected");
                    true
                }
                Err(e) => {
                    debug!(address = %self.address, error = %e, "Ignoring disconnect error");
                    false
                }
            }
        };

        self.link = None;
        disconnected
    }
}

impl<L: BleLink> Drop for Session<'_, L> {
    fn drop(&mut self) {
        let Some(mut link) = self.link.take() else {
            return;
        };
        let Ok(handle) = Handle::try_current() else {
            return;
        };

        let permit = self.permit.take();
        let address = self.address.to_string();
        debug!(%address, "Attempt cancelled, disconnecting in background");
        handle.spawn(async move {
            if let Err(e) = link.disconnect().await {
                debug!(%address, error = %e, "Ignoring disconnect error");
            }
            drop(permit);
        });
    }
}
