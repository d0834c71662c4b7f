// Vela
// Copyright (c) 2025 The Project Vela Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `io` module implements bitstream reading and writing over 32-bit big-endian word
//! streams.

pub mod bit;

pub use bit::{stream_bytes, BitReader32, BitWriter32};
