// Vela
// Copyright (c) 2025 The Project Vela Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Compressor and decompressor for on-board science telemetry: 16 and 32-bit imagettes and the
//! structured flux / center-of-brightness science products.
//!
//! The codec is a straight-line pipeline over a caller-provided sample array: a validator, an
//! in-place pre-processor (lossy rounding followed by 1-d differencing or model prediction), a
//! sign fold of the residuals, and a Rice/Golomb entropy coder with two escape mechanisms for
//! outliers, packed into a stream of big-endian 32-bit words. Decompression mirrors the
//! pipeline exactly and reconstructs the rounded input.
//!
//! The codec allocates nothing, keeps no state between calls, and produces bit-identical
//! streams on every host.
//!
//! ```
//! use vela_codec_icu::{compress, decompress, CmpConfig, CmpInfo, CmpMode};
//!
//! let mut samples: [u16; 4] = [10, 12, 9, 9];
//! let mut stream = [0u32; 2];
//! let mut info = CmpInfo::default();
//!
//! let mut cfg = CmpConfig::new(CmpMode::DiffZero, 4, 4);
//! cfg.golomb_par = 4;
//! cfg.spill = 8;
//!
//! let cmp_size = compress(&cfg, &mut samples, None, &mut stream, &mut info)?;
//! assert!(cmp_size > 0);
//!
//! let mut restored: [u16; 4] = [0; 4];
//! decompress(&cfg, &stream, None, &mut restored)?;
//! assert_eq!(restored, [10, 12, 9, 9]);
//! # vela_core::errors::Result::Ok(())
//! ```

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]
// The following lints are allowed in all Vela crates. Please see the root manifest for their
// justification.
#![allow(clippy::comparison_chain)]
#![allow(clippy::identity_op)]
#![allow(clippy::manual_range_contains)]

mod chunk;
mod config;
mod decoder;
mod encoder;
mod golomb;
mod map;
mod mode;
mod preprocess;
mod sample;

pub use chunk::{
    compress_chunk_cmp_size_bound, CMP_ENTITY_MAX_SIZE, COLLECTION_HDR_SIZE,
    NON_IMAGETTE_HEADER_SIZE,
};
pub use config::{
    max_spill, AdaptivePars, CmpConfig, CmpError, CmpInfo, ModelUpdate,
    GOLOMB_PAR_EXPOSURE_FLAGS, MAX_ICU_GOLOMB_PAR, MAX_ICU_ROUND, MAX_MODEL_VALUE,
    MIN_ICU_GOLOMB_PAR, MIN_ICU_SPILL, SPILL_EXPOSURE_FLAGS,
};
pub use decoder::decompress;
pub use encoder::compress;
pub use map::{map_from_pos, map_to_pos};
pub use mode::{CmpMode, EscapeMechanism, ModeDescriptor, Preprocessing, SampleKind};
pub use sample::{FFx, FieldDesc, FieldKind, SFx, SFxEfx, SFxEfxNcobEcob, SFxNcob, Sample};
