// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Payload encoding and decoding.

use crate::error::ProtocolError;
use crate::types::{OperatingMode, Temperature};

use super::Characteristic;

/// Length of a temperature characteristic payload.
pub const TEMPERATURE_PAYLOAD_LEN: usize = 4;

/// Minimum length of a mode payload on read.
pub const MODE_PAYLOAD_LEN: usize = 1;

/// Current and target values decoded from a temperature characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureReading {
    /// Measured temperature.
    pub current: Temperature,
    /// Setpoint.
    pub target: Temperature,
}

fn ensure_len(
    characteristic: Characteristic,
    payload: &[u8],
    expected: usize,
) -> Result<(), ProtocolError> {
    if payload.len() < expected {
        return Err(ProtocolError::PayloadTooShort {
            characteristic: characteristic.uuid(),
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}

/// Decodes `[curLo, curHi, tgtLo, tgtHi]`.
///
/// Bytes past the fourth are ignored.
///
/// # Errors
///
/// Returns `ProtocolError::PayloadTooShort` for payloads under 4 bytes.
///
/// # Examples
///
/// ```
/// use terma_ble::protocol::{decode_temperature, Characteristic};
///
/// let reading = decode_temperature(Characteristic::RoomTemperature, &[0x0A, 0x00, 0xC8, 0x00]).unwrap();
/// assert_eq!(reading.current.raw(), 10);
/// assert_eq!(reading.target.raw(), 200);
/// ```
pub fn decode_temperature(
    characteristic: Characteristic,
    payload: &[u8],
) -> Result<TemperatureReading, ProtocolError> {
    ensure_len(characteristic, payload, TEMPERATURE_PAYLOAD_LEN)?;
    Ok(TemperatureReading {
        current: Temperature::from_le_bytes([payload[0], payload[1]]),
        target: Temperature::from_le_bytes([payload[2], payload[3]]),
    })
}

/// Encodes a setpoint write the way the vendor app does: the current-value
/// half is always zero.
#[must_use]
pub fn encode_temperature_target(target: Temperature) -> [u8; TEMPERATURE_PAYLOAD_LEN] {
    let [lo, hi] = target.to_le_bytes();
    [0x00, 0x00, lo, hi]
}

/// Encodes a setpoint write that keeps the current-value half of a previous
/// read, as older firmware builds expected.
///
/// # Errors
///
/// Returns `ProtocolError::PayloadTooShort` if `previous` is under 4 bytes.
pub fn splice_temperature_target(
    characteristic: Characteristic,
    previous: &[u8],
    target: Temperature,
) -> Result<[u8; TEMPERATURE_PAYLOAD_LEN], ProtocolError> {
    ensure_len(characteristic, previous, TEMPERATURE_PAYLOAD_LEN)?;
    let [lo, hi] = target.to_le_bytes();
    Ok([previous[0], previous[1], lo, hi])
}

/// Decodes the first byte of a mode payload.
///
/// `Ok(None)` means the byte is not a known mode; that is not an error.
///
/// # Errors
///
/// Returns `ProtocolError::PayloadTooShort` for an empty payload.
pub fn decode_mode(payload: &[u8]) -> Result<Option<OperatingMode>, ProtocolError> {
    ensure_len(Characteristic::Mode, payload, MODE_PAYLOAD_LEN)?;
    Ok(OperatingMode::from_code(payload[0]))
}

/// Encodes `[mode, 0, 0, 0]`.
#[must_use]
pub fn encode_mode(mode: OperatingMode) -> [u8; 4] {
    [mode.code(), 0x00, 0x00, 0x00]
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: Characteristic = Characteristic::RoomTemperature;

    #[test]
    fn decode_room_reading() {
        let reading = decode_temperature(ROOM, &[0x0A, 0x00, 0xC8, 0x00]).unwrap();
        assert!((reading.current.celsius() - 1.0).abs() < f32::EPSILON);
        assert!((reading.target.celsius() - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn decode_ignores_trailing_bytes() {
        let reading = decode_temperature(ROOM, &[0xD7, 0x00, 0x2C, 0x01, 0xFF]).unwrap();
        assert_eq!(reading.current.raw(), 215);
        assert_eq!(reading.target.raw(), 300);
    }

    #[test]
    fn decode_rejects_short_payloads() {
        for len in 0..TEMPERATURE_PAYLOAD_LEN {
            let payload = vec![0x01; len];
            let err = decode_temperature(ROOM, &payload).unwrap_err();
            assert_eq!(
                err,
                ProtocolError::PayloadTooShort {
                    characteristic: ROOM.uuid(),
                    expected: 4,
                    actual: len,
                }
            );
        }
    }

    #[test]
    fn encode_target_zero_prefix() {
        let target = Temperature::from_celsius(21.5).unwrap();
        assert_eq!(encode_temperature_target(target), [0x00, 0x00, 0xD7, 0x00]);
    }

    #[test]
    fn encode_target_high_byte() {
        let target = Temperature::from_celsius(60.0).unwrap();
        assert_eq!(encode_temperature_target(target), [0x00, 0x00, 0x58, 0x02]);
    }

    #[test]
    fn splice_keeps_current_half() {
        let target = Temperature::from_celsius(22.0).unwrap();
        let spliced = splice_temperature_target(ROOM, &[0xC3, 0x00, 0xC8, 0x00], target).unwrap();
        assert_eq!(spliced, [0xC3, 0x00, 0xDC, 0x00]);
    }

    #[test]
    fn splice_requires_full_previous_payload() {
        let target = Temperature::from_celsius(22.0).unwrap();
        assert!(splice_temperature_target(ROOM, &[0xC3, 0x00], target).is_err());
    }

    #[test]
    fn decode_modes() {
        assert_eq!(decode_mode(&[0x20]).unwrap(), Some(OperatingMode::Off));
        assert_eq!(
            decode_mode(&[0x21, 0x00, 0x00, 0x00]).unwrap(),
            Some(OperatingMode::On)
        );
        assert_eq!(decode_mode(&[0x99]).unwrap(), None);
        assert!(decode_mode(&[]).is_err());
    }

    #[test]
    fn encode_modes() {
        assert_eq!(encode_mode(OperatingMode::On), [0x21, 0, 0, 0]);
        assert_eq!(encode_mode(OperatingMode::Off), [0x20, 0, 0, 0]);
    }
}
