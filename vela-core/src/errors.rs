// Vela
// Copyright (c) 2025 The Project Vela Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type.

use std::error::Error as StdError;
use std::fmt;
use std::result;

/// `VelaError` provides an enumeration of all possible errors reported by Vela.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VelaError {
    /// The supplied configuration failed validation. The per-check error bits are deposited in
    /// the caller's result record.
    InvalidConfig(&'static str),
    /// The output buffer is too small to hold the produced bitstream.
    SmallBuffer,
    /// The bitstream ended before the requested number of bits could be read.
    EndOfStream,
    /// The bitstream contained malformed data and could not be decoded.
    DecodeError(&'static str),
    /// An internal limit or invariant was violated. Treated as fatal.
    Internal(&'static str),
}

impl fmt::Display for VelaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            VelaError::InvalidConfig(msg) => {
                write!(f, "invalid configuration: {}", msg)
            }
            VelaError::SmallBuffer => {
                write!(f, "output buffer is too small")
            }
            VelaError::EndOfStream => {
                write!(f, "unexpected end of bitstream")
            }
            VelaError::DecodeError(msg) => {
                write!(f, "malformed bitstream: {}", msg)
            }
            VelaError::Internal(msg) => {
                write!(f, "internal error: {}", msg)
            }
        }
    }
}

impl StdError for VelaError {}

pub type Result<T> = result::Result<T, VelaError>;

/// Convenience function to create an invalid configuration error.
pub fn invalid_config_error<T>(msg: &'static str) -> Result<T> {
    Err(VelaError::InvalidConfig(msg))
}

/// Convenience function to create a small buffer error.
pub fn small_buffer_error<T>() -> Result<T> {
    Err(VelaError::SmallBuffer)
}

/// Convenience function to create an end-of-stream error.
pub fn end_of_stream_error<T>() -> Result<T> {
    Err(VelaError::EndOfStream)
}

/// Convenience function to create a decode error.
pub fn decode_error<T>(msg: &'static str) -> Result<T> {
    Err(VelaError::DecodeError(msg))
}

/// Convenience function to create an internal error.
pub fn internal_error<T>(msg: &'static str) -> Result<T> {
    Err(VelaError::Internal(msg))
}
