// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for periodic polling and the climate view.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::MockTransport;
use terma_ble::protocol::ROOM_TEMPERATURE;
use terma_ble::{
    Climate, Coordinator, Device, DriverConfig, Error, HvacAction, HvacMode, OperatingMode,
    PollConfig, RetryPolicy, Temperature, TemperatureZone,
};
use tokio::time::sleep;

fn device(transport: &MockTransport) -> Arc<Device<MockTransport>> {
    let config = DriverConfig::new().with_retry(RetryPolicy::no_retry());
    Arc::new(Device::with_config(transport.clone(), config))
}

fn every_five_minutes() -> PollConfig {
    PollConfig::new()
        .with_interval(Duration::from_secs(300))
        .without_jitter()
}

// ============================================================================
// Scheduling
// ============================================================================

mod scheduling {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn spawn_refreshes_in_background() {
        let transport = MockTransport::new();
        let coordinator = Coordinator::spawn(device(&transport), every_five_minutes());
        assert!(!coordinator.snapshot().is_available());

        let mut updates = coordinator.subscribe();
        updates.changed().await.unwrap();

        let snapshot = coordinator.snapshot();
        assert!(snapshot.is_available());
        assert!(snapshot.last_updated.is_some());
        assert_eq!(snapshot.state.mode(), Some(OperatingMode::On));
    }

    #[tokio::test(start_paused = true)]
    async fn start_refreshes_once_before_returning() {
        let transport = MockTransport::new();
        let coordinator = Coordinator::start(device(&transport), every_five_minutes())
            .await
            .unwrap();

        assert!(coordinator.snapshot().is_available());
        assert!(coordinator.is_running());

        sleep(Duration::from_secs(1)).await;
        assert_eq!(transport.connect_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn start_fails_for_unreachable_device() {
        let transport = MockTransport::new();
        transport.fail_connects(u32::MAX);

        let result = Coordinator::start(device(&transport), every_five_minutes()).await;

        assert!(matches!(result, Err(Error::RetryExhausted { attempts: 1, .. })));
        sleep(Duration::from_secs(600)).await;
        assert_eq!(transport.connect_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn polls_on_interval() {
        let transport = MockTransport::new();
        let _coordinator = Coordinator::start(device(&transport), every_five_minutes())
            .await
            .unwrap();

        sleep(Duration::from_secs(299)).await;
        assert_eq!(transport.connect_count(), 1);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(transport.connect_count(), 2);

        sleep(Duration::from_secs(300)).await;
        assert_eq!(transport.connect_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn jitter_stays_within_bound() {
        let transport = MockTransport::new();
        let config = PollConfig::new()
            .with_interval(Duration::from_secs(10))
            .with_max_jitter(Duration::from_secs(5));
        let _coordinator = Coordinator::start(device(&transport), config)
            .await
            .unwrap();

        sleep(Duration::from_millis(9_900)).await;
        assert_eq!(transport.connect_count(), 1);

        sleep(Duration::from_millis(6_000)).await;
        assert_eq!(transport.connect_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_requests_collapses() {
        let transport = MockTransport::new();
        let coordinator = Coordinator::start(device(&transport), every_five_minutes())
            .await
            .unwrap();

        coordinator.request_refresh();
        coordinator.request_refresh();
        coordinator.request_refresh();
        sleep(Duration::from_secs(1)).await;

        // One wake-up plus one stored follow-up
        assert_eq!(transport.connect_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_polling() {
        let transport = MockTransport::new();
        let coordinator = Coordinator::start(device(&transport), every_five_minutes())
            .await
            .unwrap();

        coordinator.shutdown();
        sleep(Duration::from_secs(900)).await;

        assert!(!coordinator.is_running());
        assert_eq!(transport.connect_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_aborts_polling() {
        let transport = MockTransport::new();
        let device = device(&transport);
        let coordinator = Coordinator::start(Arc::clone(&device), every_five_minutes())
            .await
            .unwrap();

        drop(coordinator);
        sleep(Duration::from_secs(900)).await;

        assert_eq!(transport.connect_count(), 1);
        assert_eq!(Arc::strong_count(&device), 1);
    }
}

// ============================================================================
// Availability
// ============================================================================

mod availability {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_marks_stale_and_keeps_values() {
        let transport = MockTransport::new();
        let coordinator = Coordinator::start(device(&transport), every_five_minutes())
            .await
            .unwrap();
        let before = coordinator.snapshot();

        transport.fail_connects(1);
        assert!(coordinator.refresh_now().await.is_err());

        let after = coordinator.snapshot();
        assert!(!after.is_available());
        assert!(after.last_error.is_some());
        assert_eq!(after.state, before.state);
        assert_eq!(after.last_updated, before.last_updated);
        assert!(coordinator.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn next_success_recovers() {
        let transport = MockTransport::new();
        let coordinator = Coordinator::start(device(&transport), every_five_minutes())
            .await
            .unwrap();

        transport.fail_connects(1);
        let _ = coordinator.refresh_now().await;
        transport.set_value(ROOM_TEMPERATURE, &[0xD2, 0x00, 0xC8, 0x00]);

        // The scheduled poll picks up the new value
        sleep(Duration::from_secs(301)).await;

        let snapshot = coordinator.snapshot();
        assert!(snapshot.is_available());
        assert!(snapshot.last_error.is_none());
        assert_eq!(
            snapshot.state.current_room_temp(),
            Some(Temperature::from_raw(210))
        );
    }
}

// ============================================================================
// Writes through the coordinator
// ============================================================================

mod writes {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn write_updates_snapshot_and_refreshes_early() {
        let transport = MockTransport::new();
        let coordinator = Coordinator::start(device(&transport), every_five_minutes())
            .await
            .unwrap();

        coordinator.set_room_temperature(22.0).await.unwrap();
        assert_eq!(
            coordinator.snapshot().state.target_room_temp(),
            Some(Temperature::from_raw(220))
        );
        assert_eq!(transport.connect_count(), 2);

        sleep(Duration::from_secs(1)).await;
        assert_eq!(transport.connect_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_write_does_not_refresh() {
        let transport = MockTransport::new();
        let coordinator = Coordinator::start(device(&transport), every_five_minutes())
            .await
            .unwrap();

        transport.fail_connects(1);
        assert!(coordinator.turn_off().await.is_err());
        sleep(Duration::from_secs(1)).await;

        assert_eq!(transport.connect_count(), 2);
        assert_eq!(coordinator.snapshot().state.mode(), Some(OperatingMode::On));
    }
}

// ============================================================================
// Climate
// ============================================================================

mod climate {
    use super::*;

    async fn climate(transport: &MockTransport, zone: TemperatureZone) -> Climate<MockTransport> {
        let coordinator = Coordinator::start(device(transport), every_five_minutes())
            .await
            .unwrap();
        Climate::new(Arc::new(coordinator), zone)
    }

    #[tokio::test(start_paused = true)]
    async fn room_zone_heats_below_setpoint() {
        let transport = MockTransport::new();
        let climate = climate(&transport, TemperatureZone::Room).await;

        assert_eq!(climate.hvac_mode(), HvacMode::Heat);
        // 19.5 °C measured against 20.0 °C is within hysteresis
        assert_eq!(climate.hvac_action(), HvacAction::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_bounds_setpoint_performs_no_io() {
        let transport = MockTransport::new();
        let climate = climate(&transport, TemperatureZone::Element).await;

        let err = climate.set_temperature(29.9).await.unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { .. }));
        assert_eq!(transport.connect_count(), 1);

        climate.set_temperature(60.0).await.unwrap();
        assert_eq!(transport.connect_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn hvac_off_writes_off_code() {
        let transport = MockTransport::new();
        let climate = climate(&transport, TemperatureZone::Room).await;

        climate.set_hvac_mode(HvacMode::Off).await.unwrap();

        assert_eq!(
            transport.writes().last().map(|(_, payload)| payload.clone()),
            Some(vec![0x20, 0x00, 0x00, 0x00])
        );
        assert_eq!(climate.hvac_action(), HvacAction::Off);
    }
}
