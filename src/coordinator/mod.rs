// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic polling of one radiator.
//!
//! A [`Coordinator`] owns a background task that refreshes its [`Device`]
//! after every [`PollConfig::next_delay`]. [`Coordinator::spawn`] refreshes
//! right away in the background; [`Coordinator::start`] awaits that first
//! refresh and fails if the radiator is unreachable. Results are
//! published as a [`Snapshot`] on a `watch` channel. Failed refreshes mark
//! the snapshot stale and polling continues.
//!
//! Writes issued through the coordinator are forwarded to the device and,
//! when they succeed, trigger an early refresh.
//!
//! ```ignore
//! let coordinator = Coordinator::spawn(Arc::new(device), PollConfig::default());
//! let mut updates = coordinator.subscribe();
//!
//! coordinator.set_room_temperature(21.0).await?;
//! updates.changed().await?;
//! println!("{:?}", updates.borrow().state);
//! ```

mod poll_config;
mod snapshot;

pub use poll_config::PollConfig;
pub use snapshot::Snapshot;

use std::fmt;
use std::sync::Arc;

use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::device::Device;
use crate::error::Result;
use crate::transport::BleTransport;
use crate::types::{OperatingMode, TemperatureZone};

/// Background poller for one radiator.
///
/// Dropping the coordinator aborts its task.
pub struct Coordinator<T: BleTransport> {
    device: Arc<Device<T>>,
    config: PollConfig,
    snapshot: Arc<watch::Sender<Snapshot>>,
    wake: Arc<Notify>,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl<T: BleTransport> Coordinator<T> {
    /// Starts polling `device`, beginning with an immediate refresh in the
    /// background.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(device: Arc<Device<T>>, config: PollConfig) -> Self {
        let snapshot = Snapshot {
            state: device.state(),
            ..Snapshot::default()
        };
        Self::launch(device, config, snapshot, true)
    }

    /// Refreshes `device` once, then starts polling on the regular schedule.
    ///
    /// # Errors
    ///
    /// Returns the first refresh error; no task is started in that case.
    pub async fn start(device: Arc<Device<T>>, config: PollConfig) -> Result<Self> {
        let snapshot = watch::Sender::new(Snapshot::default());
        poll_once(&device, &snapshot).await?;
        let first = snapshot.borrow().clone();
        Ok(Self::launch(device, config, first, false))
    }

    fn launch(
        device: Arc<Device<T>>,
        config: PollConfig,
        initial: Snapshot,
        refresh_first: bool,
    ) -> Self {
        let snapshot = Arc::new(watch::Sender::new(initial));
        let wake = Arc::new(Notify::new());
        let (stop, stop_rx) = watch::channel(false);

        let task = tokio::spawn(poll_loop(
            Arc::clone(&device),
            config.clone(),
            Arc::clone(&snapshot),
            Arc::clone(&wake),
            stop_rx,
            refresh_first,
        ));

        Self {
            device,
            config,
            snapshot,
            wake,
            stop,
            task,
        }
    }

    /// Returns the polled device.
    #[must_use]
    pub fn device(&self) -> &Arc<Device<T>> {
        &self.device
    }

    /// Returns the polling schedule.
    #[must_use]
    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Returns the latest snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    /// Subscribes to snapshot updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.subscribe()
    }

    /// Wakes the poll loop for an early refresh.
    ///
    /// Requests made while a refresh is running collapse into one follow-up
    /// refresh.
    pub fn request_refresh(&self) {
        self.wake.notify_one();
    }

    /// Refreshes now and waits for the result.
    ///
    /// The snapshot is updated either way.
    ///
    /// # Errors
    ///
    /// Returns the refresh error.
    pub async fn refresh_now(&self) -> Result<()> {
        poll_once(&self.device, &self.snapshot).await
    }

    /// Stops the poll loop after the refresh in progress, if any.
    pub fn shutdown(&self) {
        let _ = self.stop.send(true);
    }

    /// Returns `true` while the poll loop is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    // ========== Writes ==========

    /// Sets the setpoint of a zone, then schedules a refresh.
    ///
    /// # Errors
    ///
    /// Returns the write error unchanged.
    pub async fn set_temperature(&self, zone: TemperatureZone, celsius: f32) -> Result<()> {
        self.device.set_temperature(zone, celsius).await?;
        self.after_write();
        Ok(())
    }

    /// Sets the room setpoint, then schedules a refresh.
    ///
    /// # Errors
    ///
    /// Returns the write error unchanged.
    pub async fn set_room_temperature(&self, celsius: f32) -> Result<()> {
        self.set_temperature(TemperatureZone::Room, celsius).await
    }

    /// Sets the element setpoint, then schedules a refresh.
    ///
    /// # Errors
    ///
    /// Returns the write error unchanged.
    pub async fn set_element_temperature(&self, celsius: f32) -> Result<()> {
        self.set_temperature(TemperatureZone::Element, celsius).await
    }

    /// Writes an operating mode, then schedules a refresh.
    ///
    /// # Errors
    ///
    /// Returns the write error unchanged.
    pub async fn set_mode(&self, mode: OperatingMode) -> Result<()> {
        self.device.set_mode(mode).await?;
        self.after_write();
        Ok(())
    }

    /// Switches the radiator on, then schedules a refresh.
    ///
    /// # Errors
    ///
    /// Returns the write error unchanged.
    pub async fn turn_on(&self, use_room_temp: bool) -> Result<()> {
        self.device.turn_on(use_room_temp).await?;
        self.after_write();
        Ok(())
    }

    /// Switches the radiator off, then schedules a refresh.
    ///
    /// # Errors
    ///
    /// Returns the write error unchanged.
    pub async fn turn_off(&self) -> Result<()> {
        self.device.turn_off().await?;
        self.after_write();
        Ok(())
    }

    fn after_write(&self) {
        let state = self.device.state();
        self.snapshot.send_modify(|snapshot| snapshot.state = state);
        self.request_refresh();
    }
}

impl<T: BleTransport> Drop for Coordinator<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl<T: BleTransport> fmt::Debug for Coordinator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("address", &self.device.address())
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

async fn poll_once<T: BleTransport>(
    device: &Device<T>,
    snapshot: &watch::Sender<Snapshot>,
) -> Result<()> {
    match device.refresh().await {
        Ok(()) => {
            let state = device.state();
            snapshot.send_modify(|s| s.record_success(state));
            Ok(())
        }
        Err(e) => {
            warn!(address = %device.address(), error = %e, "Refresh failed, values are stale");
            let message = e.to_string();
            snapshot.send_modify(|s| s.record_failure(message));
            Err(e)
        }
    }
}

async fn poll_loop<T: BleTransport>(
    device: Arc<Device<T>>,
    config: PollConfig,
    snapshot: Arc<watch::Sender<Snapshot>>,
    wake: Arc<Notify>,
    mut stop: watch::Receiver<bool>,
    mut refresh: bool,
) {
    debug!(address = %device.address(), "Starting poll loop");

    loop {
        if refresh {
            let _ = poll_once(&device, &snapshot).await;
            if *stop.borrow() {
                break;
            }
        }
        refresh = true;

        let delay = config.next_delay();
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = wake.notified() => {
                debug!(address = %device.address(), "Refresh requested");
            }
            _ = stop.changed() => break,
        }
    }

    debug!(address = %device.address(), "Poll loop stopped");
}
