// Vela
// Copyright (c) 2025 The Project Vela Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `chunk` module provides the compressed-size bound for a chunk of concatenated
//! collections. Chunk framing itself (collection headers, entity headers, timestamps) is the
//! caller's business; the codec only promises that a compressed chunk never outgrows this
//! bound.

/// The size in bytes of a non-imagette compression entity header.
pub const NON_IMAGETTE_HEADER_SIZE: u32 = 40;

/// The size in bytes of a collection header.
pub const COLLECTION_HDR_SIZE: u32 = 12;

/// The largest size in bytes a compression entity can describe.
pub const CMP_ENTITY_MAX_SIZE: u32 = 0x7f_ffff;

#[inline(always)]
fn round_up_4(size: u64) -> u64 {
    (size + 3) & !3
}

/// Returns an upper bound in bytes for the compressed size of a chunk of `num_col`
/// concatenated collections occupying `chunk_size` bytes.
///
/// Returns 0 when a precondition is violated: no collections, a chunk smaller than a single
/// collection header, or a bound that would exceed [`CMP_ENTITY_MAX_SIZE`].
pub fn compress_chunk_cmp_size_bound(chunk_size: u32, num_col: u32) -> u32 {
    if num_col == 0 {
        return 0;
    }

    if chunk_size < COLLECTION_HDR_SIZE {
        return 0;
    }

    let bound = round_up_4(
        u64::from(NON_IMAGETTE_HEADER_SIZE)
            + u64::from(num_col) * u64::from(COLLECTION_HDR_SIZE)
            + u64::from(chunk_size),
    );

    if bound > u64::from(CMP_ENTITY_MAX_SIZE) {
        return 0;
    }

    bound as u32
}
