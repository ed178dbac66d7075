// SPDX-License-Identifier: MPL-2.0

//! Control a Terma MOA Blue radiator from the command line.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example radiator --features btleplug -- <address> [command]
//! ```
//!
//! Commands: `status` (default), `on`, `off`, `room <°C>`, `element <°C>`,
//! `watch`.
//!
//! # Example
//!
//! ```bash
//! RUST_LOG=terma_ble=debug cargo run --example radiator --features btleplug -- \
//!     AA:BB:CC:DD:EE:FF room 21.5
//! ```

use std::env;
use std::time::Duration;

use btleplug::api::{Central, Manager as _, ScanFilter};
use btleplug::platform::{Adapter, Manager};
use terma_ble::protocol::SERVICE;
use terma_ble::transport::BtleplugTransport;
use terma_ble::{
    Device, DeviceConfig, DeviceEvent, DeviceManager, Error, PollConfig, TemperatureZone,
};
use tracing_subscriber::EnvFilter;

const SCAN_TIME: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <address> [status|on|off|room <°C>|element <°C>|watch]", args[0]);
        std::process::exit(1);
    }
    let address = &args[1];
    let command = args.get(2).map_or("status", String::as_str);

    let adapter = first_adapter().await?;
    println!("Scanning for {address}...");
    let transport = scan_for(&adapter, address).await?;

    if command == "watch" {
        return watch(transport).await;
    }

    let device = Device::new(transport);
    match command {
        "status" => {}
        "on" => device.turn_on(true).await?,
        "off" => device.turn_off().await?,
        "room" | "element" => {
            let celsius: f32 = args
                .get(3)
                .ok_or("missing temperature")?
                .parse()?;
            let zone = if command == "room" {
                TemperatureZone::Room
            } else {
                TemperatureZone::Element
            };
            let range = zone.range();
            if !range.contains(celsius) {
                return Err(Error::OutOfBounds { celsius, range }.into());
            }
            device.set_temperature(zone, celsius).await?;
        }
        other => {
            eprintln!("Unknown command: {other}");
            std::process::exit(1);
        }
    }

    device.refresh().await?;
    print_state(&device);
    Ok(())
}

async fn first_adapter() -> Result<Adapter, Box<dyn std::error::Error>> {
    let manager = Manager::new().await?;
    let adapter = manager
        .adapters()
        .await?
        .into_iter()
        .next()
        .ok_or("no Bluetooth adapter found")?;
    Ok(adapter)
}

async fn scan_for(
    adapter: &Adapter,
    address: &str,
) -> Result<BtleplugTransport, Box<dyn std::error::Error>> {
    adapter
        .start_scan(ScanFilter {
            services: vec![SERVICE],
        })
        .await?;

    let deadline = tokio::time::Instant::now() + SCAN_TIME;
    let found = loop {
        if let Some(transport) = BtleplugTransport::find(adapter, address).await? {
            break Some(transport);
        }
        if tokio::time::Instant::now() >= deadline {
            break None;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    };

    adapter.stop_scan().await?;
    found.ok_or_else(|| Error::DeviceNotFound.into())
}

fn print_state(device: &Device<BtleplugTransport>) {
    let fmt = |t: Option<terma_ble::Temperature>| t.map_or_else(|| "?".to_string(), |t| t.to_string());

    println!("{}", device.name());
    println!(
        "  room:    {} (target {})",
        fmt(device.current_room_temp()),
        fmt(device.target_room_temp())
    );
    println!(
        "  element: {} (target {})",
        fmt(device.current_element_temp()),
        fmt(device.target_element_temp())
    );
    match device.mode() {
        Some(mode) => println!("  mode:    {mode}"),
        None => println!("  mode:    unknown"),
    }
}

async fn watch(transport: BtleplugTransport) -> Result<(), Box<dyn std::error::Error>> {
    let manager = DeviceManager::new();
    let mut events = manager.subscribe();

    let config = DeviceConfig::new().with_poll(PollConfig::new().with_interval(Duration::from_secs(60)));
    let id = manager.add_device(transport, config).await?;
    println!("Watching {id}, press Ctrl+C to stop");

    loop {
        tokio::select! {
            event = events.recv() => match event? {
                DeviceEvent::StateChanged { change, new_state, .. } => {
                    println!("{change:?}");
                    println!("  now: {new_state:?}");
                }
                DeviceEvent::UpdateFailed { error, .. } => println!("unavailable: {error}"),
                _ => {}
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    manager.remove_device(id).await;
    Ok(())
}
