// Vela
// Copyright (c) 2025 The Project Vela Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `encoder` module drives the compression pipeline: validation, pre-processing, mapping,
//! and entropy coding into the output word stream.

use log::warn;

use vela_core::errors::{internal_error, invalid_config_error, Result, VelaError};
use vela_core::io::BitWriter32;
use vela_core::util::bits::bit_length;

use crate::config::{
    validate, CmpConfig, CmpError, CmpInfo, ModelUpdate, GOLOMB_PAR_EXPOSURE_FLAGS,
    SPILL_EXPOSURE_FLAGS,
};
use crate::golomb::CodeParams;
use crate::map::map_samples;
use crate::mode::{EscapeMechanism, Preprocessing};
use crate::preprocess;
use crate::sample::{FieldKind, Sample};

/// Returns the escape symbol offset for a multi-escape outlier distance: the index of the
/// magnitude class holding `d`, i.e. ceil(log4(d + 1)) over the 16 classes.
#[inline(always)]
fn multi_escape_offset(d: u32) -> u32 {
    if d == 0 {
        0
    }
    else {
        (bit_length(d) - 1) >> 1
    }
}

/// One entropy coder state: the codeword parameters, the spillover threshold, and the escape
/// mechanism. A compression call keeps one state for scalar data fields and, for the structured
/// shapes, a second fixed-parameter state for the exposure-flags field. Both share the same bit
/// cursor.
struct EncoderSetup {
    params: CodeParams,
    spill: u32,
    escape: EscapeMechanism,
}

impl EncoderSetup {
    fn new(golomb_par: u32, spill: u32, escape: EscapeMechanism) -> Self {
        EncoderSetup { params: CodeParams::new(golomb_par), spill, escape }
    }

    /// Emits the mapped value `value` of a `bits`-wide field.
    fn encode_value(&self, value: u32, bits: u32, bw: &mut BitWriter32<'_>) -> Result<()> {
        match self.escape {
            EscapeMechanism::Zero => {
                // The codeword of 0 is the escape symbol: a mapped 0 and every value at or
                // above the threshold take the escape path and follow unencoded.
                if value == 0 || value >= self.spill {
                    self.params.encode(0, bw)?;
                    bw.write_bits(value, bits)?;
                }
                else {
                    self.params.encode(value, bw)?;
                }
            }
            EscapeMechanism::Multi => {
                if value < self.spill {
                    self.params.encode(value, bw)?;
                }
                else {
                    // The escape symbol tags the magnitude class of the outlier distance; the
                    // distance follows unencoded in two bits per class step.
                    let d = value - self.spill;
                    let offset = multi_escape_offset(d);

                    self.params.encode(self.spill + offset, bw)?;
                    bw.write_bits(d, (offset + 1) * 2)?;
                }
            }
        }

        Ok(())
    }
}

fn write_raw<S: Sample>(data: &[S], bw: &mut BitWriter32<'_>) -> Result<()> {
    for sample in data {
        for (f, desc) in S::FIELDS.iter().enumerate() {
            bw.write_bits(sample.field(f), desc.bits)?;
        }
    }

    Ok(())
}

fn encode_samples<S: Sample>(
    cfg: &CmpConfig,
    data: &[S],
    escape: EscapeMechanism,
    bw: &mut BitWriter32<'_>,
) -> Result<()> {
    let data_setup = EncoderSetup::new(cfg.golomb_par, cfg.spill, escape);
    let exp_flags_setup =
        EncoderSetup::new(GOLOMB_PAR_EXPOSURE_FLAGS, SPILL_EXPOSURE_FLAGS, escape);

    for sample in data {
        for (f, desc) in S::FIELDS.iter().enumerate() {
            let setup = match desc.kind {
                FieldKind::Data => &data_setup,
                FieldKind::ExpFlags => &exp_flags_setup,
            };

            setup.encode_value(sample.field(f), desc.bits, bw)?;
        }
    }

    Ok(())
}

/// Compresses `samples` samples of `input` into `output` and fills the result record.
///
/// The pre-processing stages transform `input` in place, so the call is not idempotent: after
/// an error the input may hold residuals instead of samples. On success the output holds the
/// produced bitstream as big-endian 32-bit words, zero-padded to a word boundary, and the
/// bitstream size in bits (excluding padding) is returned and mirrored in
/// [`CmpInfo::cmp_size`].
///
/// Model modes read the prior model from `model` and write the updated model according to the
/// [`ModelUpdate`] variant; all other modes ignore `model`.
pub fn compress<S: Sample>(
    cfg: &CmpConfig,
    input: &mut [S],
    model: Option<ModelUpdate<'_, S>>,
    output: &mut [u32],
    info: &mut CmpInfo,
) -> Result<u32> {
    info.mirror(cfg);

    let model_lens = model.as_ref().map(|m| (m.model_len(), m.updated_len()));

    let err = validate::<S>(cfg, input.len(), model_lens, output.len());
    if !err.is_empty() {
        info.cmp_err = err;
        return invalid_config_error("compression configuration rejected");
    }

    if cfg.samples == 0 {
        warn!("no samples to compress");
        return Ok(0);
    }

    let samples = cfg.samples as usize;
    let data = &mut input[..samples];
    let desc = cfg.mode.descriptor();

    let mut bw = BitWriter32::new(output, cfg.buffer_length);

    let status = match desc.preprocessing {
        Preprocessing::Raw => write_raw(data, &mut bw),
        Preprocessing::Diff | Preprocessing::Model => {
            if desc.preprocessing == Preprocessing::Diff {
                preprocess::diff(data, cfg.round);
            }
            else {
                match model {
                    Some(ModelUpdate::InPlace(model_buf)) => preprocess::model_in_place(
                        data,
                        &mut model_buf[..samples],
                        cfg.model_value,
                        cfg.round,
                    ),
                    Some(ModelUpdate::Into { model, updated }) => preprocess::model(
                        data,
                        &model[..samples],
                        &mut updated[..samples],
                        cfg.model_value,
                        cfg.round,
                    ),
                    None => return internal_error("model mode without a model buffer"),
                }
            }

            map_samples(data);

            let escape = match desc.escape {
                Some(escape) => escape,
                None => return internal_error("entropy coding mode without an escape mechanism"),
            };

            encode_samples(cfg, data, escape, &mut bw)
        }
    };

    match status {
        Ok(()) => {
            let cmp_size = bw.pos() as u32;

            if cmp_size > 0 {
                bw.pad_to_word()?;
            }
            bw.store_be();

            info.cmp_size = cmp_size;
            Ok(cmp_size)
        }
        Err(VelaError::SmallBuffer) => {
            info.cmp_err |= CmpError::SMALL_BUFFER;
            info.cmp_size = 0;
            Err(VelaError::SmallBuffer)
        }
        Err(err) => Err(err),
    }
}
