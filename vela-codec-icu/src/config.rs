// Vela
// Copyright (c) 2025 The Project Vela Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `config` module defines the compression configuration record, its validation, and the
//! execution result record.

use bitflags::bitflags;
use log::warn;

use crate::mode::{CmpMode, EscapeMechanism, Preprocessing};
use crate::sample::Sample;

/// The smallest accepted Golomb parameter.
pub const MIN_ICU_GOLOMB_PAR: u32 = 1;

/// The largest accepted Golomb parameter.
pub const MAX_ICU_GOLOMB_PAR: u32 = 0xffff;

/// The smallest accepted spillover threshold.
pub const MIN_ICU_SPILL: u32 = 2;

/// The largest accepted model weight. A weight of `MAX_MODEL_VALUE` freezes the model; a weight
/// of 0 replaces it with the observation after every sample.
pub const MAX_MODEL_VALUE: u32 = 16;

/// The largest accepted lossy rounding bit count.
pub const MAX_ICU_ROUND: u32 = 3;

/// The fixed Golomb parameter used for the exposure-flags field of the structured shapes,
/// independent of the configured parameter.
pub const GOLOMB_PAR_EXPOSURE_FLAGS: u32 = 1;

/// The fixed spillover threshold used for the exposure-flags field.
pub const SPILL_EXPOSURE_FLAGS: u32 = 8;

/// Returns the largest legal spillover threshold for a Golomb parameter and mode pair.
///
/// The limit guarantees that every symbol the escape mechanism can emit, including the longest
/// escape marker, still fits the 32-bit codeword budget of the entropy coder. Encoder and
/// decoder derive the limit from this one function. Returns 0 if `golomb_par` is out of range
/// or `mode` performs no entropy coding.
pub fn max_spill(golomb_par: u32, mode: CmpMode) -> u32 {
    let Some(escape) = mode.descriptor().escape else {
        return 0;
    };

    if golomb_par < MIN_ICU_GOLOMB_PAR || golomb_par > MAX_ICU_GOLOMB_PAR {
        return 0;
    }

    let log2_m = golomb_par.ilog2();
    let cutoff = (2 << log2_m) - golomb_par;

    // The largest value whose codeword length does not exceed 32 bits.
    let max_codeword_value = cutoff + (31 - log2_m) * golomb_par - 1;

    match escape {
        EscapeMechanism::Zero => max_codeword_value,
        // The multi escape mechanism reserves the 16 symbols above the threshold as escape
        // markers.
        EscapeMechanism::Multi => max_codeword_value - 15,
    }
}

/// An adaptive (golomb_par, spill) parameter pair carried alongside the primary parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AdaptivePars {
    pub golomb_par: u32,
    pub spill: u32,
}

/// `CmpConfig` bundles every parameter of a compression or decompression call.
///
/// The sample buffers are not part of the record; they are borrowed by the call itself so that
/// the aliasing rules (input, output, and model storage are pairwise disjoint) hold by
/// construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CmpConfig {
    /// The compression mode.
    pub mode: CmpMode,
    /// The Golomb parameter (codeword divisor) for scalar data fields.
    pub golomb_par: u32,
    /// The spillover threshold above which values take the escape path.
    pub spill: u32,
    /// The model weight used by model modes.
    pub model_value: u32,
    /// Number of bits rounded away by the lossy pre-processing step.
    pub round: u32,
    /// Number of samples to process.
    pub samples: u32,
    /// Output capacity in 16-bit half-words.
    pub buffer_length: u32,
    /// First adaptive parameter pair, if configured.
    pub ap1: Option<AdaptivePars>,
    /// Second adaptive parameter pair, if configured.
    pub ap2: Option<AdaptivePars>,
}

impl CmpConfig {
    /// A configuration with the given mode and sample count, no lossy rounding, no adaptive
    /// pairs, and neutral entropy parameters.
    pub fn new(mode: CmpMode, samples: u32, buffer_length: u32) -> Self {
        CmpConfig {
            mode,
            golomb_par: MIN_ICU_GOLOMB_PAR,
            spill: MIN_ICU_SPILL,
            model_value: MAX_MODEL_VALUE / 2,
            round: 0,
            samples,
            buffer_length,
            ap1: None,
            ap2: None,
        }
    }
}

bitflags! {
    /// The per-check error bits deposited in [`CmpInfo::cmp_err`]. Bits are independent;
    /// several may be set by a single call.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct CmpError: u16 {
        /// The mode does not match the sample shape, or a required model buffer is missing.
        const MODE = 1 << 0;
        /// The model weight is out of range.
        const MODEL_VALUE = 1 << 1;
        /// A primary compression parameter is out of range or inconsistent.
        const PAR = 1 << 2;
        /// The first adaptive parameter pair is out of range.
        const AP1_PAR = 1 << 3;
        /// The second adaptive parameter pair is out of range.
        const AP2_PAR = 1 << 4;
        /// The output buffer cannot hold the produced bitstream.
        const SMALL_BUFFER = 1 << 5;
    }
}

/// `CmpInfo` is the execution result record: the error bitset, the produced bitstream size, and
/// the parameters the call actually used, mirrored back for the caller's bookkeeping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CmpInfo {
    /// The mode used.
    pub cmp_mode_used: Option<CmpMode>,
    /// The Golomb parameter used.
    pub golomb_par_used: u32,
    /// The spillover threshold used.
    pub spill_used: u32,
    /// The model weight used.
    pub model_value_used: u32,
    /// The lossy rounding bit count used.
    pub round_used: u32,
    /// The number of samples processed.
    pub samples_used: u32,
    /// The first adaptive parameter pair used.
    pub ap1_used: Option<AdaptivePars>,
    /// The second adaptive parameter pair used.
    pub ap2_used: Option<AdaptivePars>,
    /// The size of the produced bitstream in bits, excluding tail padding.
    pub cmp_size: u32,
    /// The accumulated error bits.
    pub cmp_err: CmpError,
}

impl CmpInfo {
    pub(crate) fn mirror(&mut self, cfg: &CmpConfig) {
        self.cmp_mode_used = Some(cfg.mode);
        self.golomb_par_used = cfg.golomb_par;
        self.spill_used = cfg.spill;
        self.model_value_used = cfg.model_value;
        self.round_used = cfg.round;
        self.samples_used = cfg.samples;
        self.ap1_used = cfg.ap1;
        self.ap2_used = cfg.ap2;
        self.cmp_size = 0;
        self.cmp_err = CmpError::empty();
    }
}

/// The model storage of a model-mode call.
///
/// The updated model is either written back over the prior model in place, or into its own
/// buffer, leaving the prior model untouched. Expressing the two cases as an enum of borrows
/// makes the aliasing contract a compile-time property: the updated model can never overlap the
/// input or the output, and overlaps the prior model exactly in the `InPlace` case.
#[derive(Debug)]
pub enum ModelUpdate<'a, S: Sample> {
    /// Update the model in place.
    InPlace(&'a mut [S]),
    /// Read the prior model from `model` and write the updated model to `updated`.
    Into { model: &'a [S], updated: &'a mut [S] },
}

impl<'a, S: Sample> ModelUpdate<'a, S> {
    pub(crate) fn model_len(&self) -> usize {
        match self {
            ModelUpdate::InPlace(model) => model.len(),
            ModelUpdate::Into { model, .. } => model.len(),
        }
    }

    pub(crate) fn updated_len(&self) -> usize {
        match self {
            ModelUpdate::InPlace(model) => model.len(),
            ModelUpdate::Into { updated, .. } => updated.len(),
        }
    }
}

/// Validates a candidate configuration against the supplied buffer dimensions.
///
/// Every check is applied; the returned bitset carries one bit per detected problem class and
/// is empty for a valid configuration. Only the raw modes short-circuit: their entropy coding
/// parameters are never consulted and therefore not checked.
pub(crate) fn validate<S: Sample>(
    cfg: &CmpConfig,
    input_len: usize,
    model: Option<(usize, usize)>,
    output_words: usize,
) -> CmpError {
    let mut err = CmpError::empty();

    let desc = cfg.mode.descriptor();

    if desc.shape != S::KIND {
        warn!("compression mode {:?} does not operate on {:?} samples", cfg.mode, S::KIND);
        err |= CmpError::MODE;
    }

    if cfg.samples > 0 && cfg.buffer_length == 0 {
        err |= CmpError::PAR;
    }

    if input_len < cfg.samples as usize {
        err |= CmpError::PAR;
    }

    // The capacity claimed by the configuration must be backed by the output slice.
    if (output_words as u64) < (u64::from(cfg.buffer_length) + 1) / 2 {
        err |= CmpError::PAR;
    }

    let sample_bytes = S::BITS as u64 / 8;

    // Kept as a warning: the comparison mixes bytes and half-words, but flagging generously
    // sized buffers was its only purpose.
    if u64::from(cfg.samples) * sample_bytes < u64::from(cfg.buffer_length) * 2 / 3 {
        warn!(
            "output buffer ({} half-words) is generously sized for {} input samples",
            cfg.buffer_length, cfg.samples
        );
    }

    match desc.preprocessing {
        Preprocessing::Model => match model {
            None => {
                warn!("mode {:?} requires a model buffer", cfg.mode);
                err |= CmpError::MODE;
            }
            Some((model_len, updated_len)) => {
                if model_len < cfg.samples as usize || updated_len < cfg.samples as usize {
                    err |= CmpError::PAR;
                }
            }
        },
        _ => {
            if model.is_some() {
                warn!("mode {:?} does not use a model buffer; ignoring it", cfg.mode);
            }
        }
    }

    if desc.preprocessing == Preprocessing::Raw {
        // The raw copy must fit the claimed capacity.
        if u64::from(cfg.samples) * sample_bytes > u64::from(cfg.buffer_length) * 2 {
            err |= CmpError::SMALL_BUFFER;
        }
        // Raw modes use none of the remaining parameters.
        return err;
    }

    err | entropy_par_errors(cfg)
}

/// Checks the entropy coding and pre-processing parameter ranges. Shared between compression
/// and decompression so both sides accept exactly the same configurations.
pub(crate) fn entropy_par_errors(cfg: &CmpConfig) -> CmpError {
    let mut err = CmpError::empty();

    if cfg.mode.is_model() && cfg.model_value > MAX_MODEL_VALUE {
        err |= CmpError::MODEL_VALUE;
    }

    if cfg.golomb_par < MIN_ICU_GOLOMB_PAR || cfg.golomb_par > MAX_ICU_GOLOMB_PAR {
        err |= CmpError::PAR;
    }

    if cfg.spill < MIN_ICU_SPILL || cfg.spill > max_spill(cfg.golomb_par, cfg.mode) {
        err |= CmpError::PAR;
    }

    if cfg.round > MAX_ICU_ROUND {
        err |= CmpError::PAR;
    }

    if let Some(ap) = cfg.ap1 {
        if !adaptive_pair_is_valid(&ap, cfg.mode) {
            err |= CmpError::AP1_PAR;
        }
    }

    if let Some(ap) = cfg.ap2 {
        if !adaptive_pair_is_valid(&ap, cfg.mode) {
            err |= CmpError::AP2_PAR;
        }
    }

    err
}

fn adaptive_pair_is_valid(ap: &AdaptivePars, mode: CmpMode) -> bool {
    ap.golomb_par >= MIN_ICU_GOLOMB_PAR
        && ap.golomb_par <= MAX_ICU_GOLOMB_PAR
        && ap.spill >= MIN_ICU_SPILL
        && ap.spill <= max_spill(ap.golomb_par, mode)
}
