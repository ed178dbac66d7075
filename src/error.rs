// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `terma_ble` library.
//!
//! Failures fall into four groups: argument validation ([`ValueError`]),
//! BLE stack failures ([`TransportError`]), malformed payloads
//! ([`ProtocolError`]) and the aggregated failure returned once every
//! connection attempt has been used up ([`Error::RetryExhausted`]).

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::types::TemperatureRange;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// An argument could not be turned into a device command.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The BLE stack reported a failure.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Connecting to the device took longer than the configured budget.
    #[error("connect timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    /// A payload read from the device could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Every connection attempt failed.
    ///
    /// Wraps the error of the final attempt.
    #[error("failed to communicate with device after {attempts} attempts: {source}")]
    RetryExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The error of the last attempt.
        source: Box<Error>,
    },

    /// Device was not found in the manager.
    #[error("device not found")]
    DeviceNotFound,

    /// A requested setpoint lies outside the range offered to users.
    #[error("{celsius} °C is outside the allowed range {range}")]
    OutOfBounds {
        /// The requested temperature.
        celsius: f32,
        /// The allowed range.
        range: TemperatureRange,
    },
}

impl Error {
    /// Returns `true` if another connection attempt may succeed.
    ///
    /// Argument and payload errors are deterministic; retrying them would
    /// only repeat the same failure.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::Value(_) | Self::Protocol(_) | Self::OutOfBounds { .. } | Self::DeviceNotFound
        )
    }

    /// Returns the number of attempts if this is an aggregated retry failure.
    #[must_use]
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::RetryExhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}

/// Errors related to value validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// The temperature cannot be represented as tenths of a degree in a `u16`.
    #[error("temperature {0} °C cannot be encoded")]
    TemperatureNotEncodable(f32),

    /// A mode byte that the firmware does not define.
    #[error("unknown operating mode code 0x{0:02x}")]
    UnknownMode(u8),

    /// A legacy mode that is decoded for compatibility but never written.
    #[error("operating mode {0} cannot be written to the device")]
    ModeNotWritable(&'static str),
}

/// Errors reported by a BLE transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Opening the link failed.
    #[error("connection failed: {0}")]
    ConnectFailed(String),

    /// The link claimed success but is not connected.
    #[error("failed to establish connection")]
    NotEstablished,

    /// The backend has no pairing support.
    #[error("pairing is not supported by this transport")]
    PairingUnsupported,

    /// Pairing was rejected (often because the device is already paired).
    #[error("pairing failed: {0}")]
    Pairing(String),

    /// The characteristic is not exposed by the connected device.
    #[error("characteristic {0} not found")]
    CharacteristicNotFound(Uuid),

    /// Reading a characteristic failed.
    #[error("read of {characteristic} failed: {message}")]
    Read {
        /// The characteristic that was read.
        characteristic: Uuid,
        /// Description of the failure.
        message: String,
    },

    /// Writing a characteristic failed.
    #[error("write of {characteristic} failed: {message}")]
    Write {
        /// The characteristic that was written.
        characteristic: Uuid,
        /// Description of the failure.
        message: String,
    },

    /// Closing the link failed.
    #[error("disconnect failed: {0}")]
    Disconnect(String),

    /// A characteristic operation did not complete in time.
    #[error("I/O timed out: {0}")]
    Io(String),

    /// Error from the btleplug backend.
    #[cfg(feature = "btleplug")]
    #[error("bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),
}

/// Errors related to decoding device payloads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The payload is shorter than the characteristic layout requires.
    #[error("payload for {characteristic} too short: expected {expected} bytes, got {actual}")]
    PayloadTooShort {
        /// The characteristic the payload came from.
        characteristic: Uuid,
        /// Minimum number of bytes.
        expected: usize,
        /// Number of bytes received.
        actual: usize,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
