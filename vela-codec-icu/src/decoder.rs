// Vela
// Copyright (c) 2025 The Project Vela Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `decoder` module mirrors the compression pipeline: it decodes the entropy coded
//! residuals, unfolds the sign mapping, and undoes the pre-processing, reconstructing the
//! rounded input exactly.
//!
//! The decoder shares the codebook, the mapping, and the model update arithmetic with the
//! encoder; given the same configuration and the same initial model it reproduces the encoder's
//! model sequence sample for sample.

use vela_core::errors::{decode_error, internal_error, invalid_config_error, Result};
use vela_core::io::BitReader32;

use crate::config::{
    entropy_par_errors, CmpConfig, ModelUpdate, GOLOMB_PAR_EXPOSURE_FLAGS, SPILL_EXPOSURE_FLAGS,
};
use crate::golomb::CodeParams;
use crate::map::unmap_samples;
use crate::mode::{EscapeMechanism, Preprocessing};
use crate::preprocess;
use crate::sample::{FieldKind, Sample};

/// The decoder-side counterpart of the encoder state: the same codeword parameters, threshold,
/// and escape mechanism.
struct DecoderSetup {
    params: CodeParams,
    spill: u32,
    escape: EscapeMechanism,
}

impl DecoderSetup {
    fn new(golomb_par: u32, spill: u32, escape: EscapeMechanism) -> Self {
        DecoderSetup { params: CodeParams::new(golomb_par), spill, escape }
    }

    /// Reads one mapped value of a `bits`-wide field from the stream.
    fn decode_value(&self, bits: u32, br: &mut BitReader32<'_>) -> Result<u32> {
        let symbol = self.params.decode(br)?;

        match self.escape {
            EscapeMechanism::Zero => {
                if symbol == 0 {
                    // The escape symbol: the mapped value follows unencoded.
                    br.read_bits_leq32(bits)
                }
                else {
                    Ok(symbol)
                }
            }
            EscapeMechanism::Multi => {
                if symbol < self.spill {
                    Ok(symbol)
                }
                else {
                    let offset = symbol - self.spill;

                    if offset > 15 {
                        return decode_error("escape symbol outside the magnitude class table");
                    }

                    let d = br.read_bits_leq32((offset + 1) * 2)?;
                    Ok(self.spill.wrapping_add(d))
                }
            }
        }
    }
}

fn read_raw<S: Sample>(br: &mut BitReader32<'_>, output: &mut [S]) -> Result<()> {
    for sample in output.iter_mut() {
        for (f, desc) in S::FIELDS.iter().enumerate() {
            sample.set_field(f, br.read_bits_leq32(desc.bits)?);
        }
    }

    Ok(())
}

/// Entropy decodes the mapped residual of every field of every sample into `output`. The
/// inverse mapping and pre-processing stages then run over the array, mirroring the encoder's
/// stage order.
fn decode_residuals<S: Sample>(
    cfg: &CmpConfig,
    escape: EscapeMechanism,
    br: &mut BitReader32<'_>,
    output: &mut [S],
) -> Result<()> {
    let data_setup = DecoderSetup::new(cfg.golomb_par, cfg.spill, escape);
    let exp_flags_setup =
        DecoderSetup::new(GOLOMB_PAR_EXPOSURE_FLAGS, SPILL_EXPOSURE_FLAGS, escape);

    for sample in output.iter_mut() {
        for (f, desc) in S::FIELDS.iter().enumerate() {
            let setup = match desc.kind {
                FieldKind::Data => &data_setup,
                FieldKind::ExpFlags => &exp_flags_setup,
            };

            sample.set_field(f, setup.decode_value(desc.bits, br)?);
        }
    }

    Ok(())
}

/// Decompresses `samples` samples from the big-endian word `stream` into `output`.
///
/// The configuration must be the one the stream was compressed with; for model modes the
/// initial model must match the encoder's, and the updated model is maintained exactly as the
/// encoder maintained it. Reconstruction is exact up to the configured lossy rounding.
pub fn decompress<S: Sample>(
    cfg: &CmpConfig,
    stream: &[u32],
    model: Option<ModelUpdate<'_, S>>,
    output: &mut [S],
) -> Result<()> {
    let desc = cfg.mode.descriptor();

    if desc.shape != S::KIND {
        return invalid_config_error("mode does not operate on this sample shape");
    }

    let samples = cfg.samples as usize;

    if output.len() < samples {
        return invalid_config_error("output buffer is shorter than the sample count");
    }

    if desc.preprocessing != Preprocessing::Raw && !entropy_par_errors(cfg).is_empty() {
        return invalid_config_error("decompression configuration rejected");
    }

    if desc.preprocessing == Preprocessing::Model {
        let ok = model
            .as_ref()
            .is_some_and(|m| m.model_len() >= samples && m.updated_len() >= samples);
        if !ok {
            return invalid_config_error("mode requires a model buffer of the sample count");
        }
    }

    if samples == 0 {
        return Ok(());
    }

    let output = &mut output[..samples];
    let mut br = BitReader32::new(stream);

    if desc.preprocessing == Preprocessing::Raw {
        return read_raw(&mut br, output);
    }

    let escape = match desc.escape {
        Some(escape) => escape,
        None => return internal_error("entropy coding mode without an escape mechanism"),
    };

    decode_residuals(cfg, escape, &mut br, output)?;
    unmap_samples(output);

    match desc.preprocessing {
        Preprocessing::Diff => preprocess::diff_inv(output, cfg.round),
        Preprocessing::Model => match model {
            Some(ModelUpdate::InPlace(model_buf)) => preprocess::model_inv_in_place(
                output,
                &mut model_buf[..samples],
                cfg.model_value,
                cfg.round,
            ),
            Some(ModelUpdate::Into { model, updated }) => preprocess::model_inv(
                output,
                &model[..samples],
                &mut updated[..samples],
                cfg.model_value,
                cfg.round,
            ),
            None => return internal_error("model mode without a model buffer"),
        },
        Preprocessing::Raw => return internal_error("raw mode reached the entropy decoder"),
    }

    Ok(())
}
