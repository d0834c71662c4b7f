// Vela
// Copyright (c) 2025 The Project Vela Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Randomized round-trip coverage: every mode and shape combination must reconstruct the
//! rounded input exactly, with encoder and decoder models staying in lockstep.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use vela_codec_icu::{
    compress, compress_chunk_cmp_size_bound, decompress, max_spill, CmpConfig, CmpError,
    CmpInfo, CmpMode, FFx, ModelUpdate, SFx, SFxEfx, SFxEfxNcobEcob, SFxNcob, Sample,
};
use vela_core::errors::VelaError;

const SAMPLES: usize = 64;

fn field_mask(bits: u32) -> u32 {
    u32::MAX >> (32 - bits)
}

/// A mostly-smooth per-field random walk with occasional jumps, the texture the codec is
/// built for.
fn gen_series<S: Sample>(rng: &mut SmallRng, n: usize) -> Vec<S> {
    let mut fields = [0u32; 8];

    for value in fields.iter_mut().take(S::FIELDS.len()) {
        *value = rng.random();
    }

    (0..n)
        .map(|_| {
            let mut sample = S::default();

            for (f, desc) in S::FIELDS.iter().enumerate() {
                let step = rng.random_range(0u32..16).wrapping_sub(8);

                fields[f] = if rng.random_range(0u32..17) == 0 {
                    rng.random()
                }
                else {
                    fields[f].wrapping_add(step)
                };

                sample.set_field(f, fields[f] & field_mask(desc.bits));
            }

            sample
        })
        .collect()
}

/// What the decoder is promised to reconstruct: the input with each field rounded and
/// re-expanded.
fn rounded<S: Sample>(input: &[S], round: u32) -> Vec<S> {
    input
        .iter()
        .map(|sample| {
            let mut out = *sample;
            for (f, desc) in S::FIELDS.iter().enumerate() {
                let r = (sample.field(f) >> round) << round;
                out.set_field(f, r & field_mask(desc.bits));
            }
            out
        })
        .collect()
}

fn run_mode<S: Sample>(mode: CmpMode, golomb_par: u32, round: u32, rng: &mut SmallRng) {
    let input = gen_series::<S>(rng, SAMPLES);
    let initial_model = gen_series::<S>(rng, SAMPLES);

    let buffer_length = (SAMPLES as u32) * 36 + 8;
    let mut cfg = CmpConfig::new(mode, SAMPLES as u32, buffer_length);
    cfg.golomb_par = golomb_par;
    cfg.spill = max_spill(golomb_par, mode).clamp(2, 48);
    cfg.round = round;

    let mut work = input.clone();
    let mut output = vec![0u32; ((buffer_length as usize) + 1) / 2];
    let mut info = CmpInfo::default();

    let mut enc_updated = vec![S::default(); SAMPLES];
    let enc_model = mode
        .is_model()
        .then(|| ModelUpdate::Into { model: &initial_model, updated: &mut enc_updated });

    let size = compress(&cfg, &mut work, enc_model, &mut output, &mut info)
        .unwrap_or_else(|err| panic!("compress failed for {:?}: {}", mode, err));

    assert_eq!(size, info.cmp_size, "{:?}: info does not mirror the stream size", mode);
    assert_eq!(info.cmp_err, CmpError::empty());

    let mut restored = vec![S::default(); SAMPLES];
    let mut dec_model = initial_model.clone();
    let model = mode.is_model().then(|| ModelUpdate::InPlace(&mut dec_model[..]));

    decompress(&cfg, &output, model, &mut restored)
        .unwrap_or_else(|err| panic!("decompress failed for {:?}: {}", mode, err));

    assert_eq!(
        restored,
        rounded(&input, round),
        "{:?} golomb_par={} round={}: reconstruction mismatch",
        mode,
        golomb_par,
        round
    );

    if mode.is_model() {
        // The decoder must maintain the model exactly as the encoder did, regardless of which
        // update flavour either side uses.
        assert_eq!(enc_updated, dec_model, "{:?}: model divergence", mode);
    }
}

fn run_shape<S: Sample>(modes: &[CmpMode]) {
    let mut rng = SmallRng::seed_from_u64(0x5eed_cafe);

    for &mode in modes {
        if mode.is_raw() {
            run_mode::<S>(mode, 1, 0, &mut rng);
            continue;
        }

        for (golomb_par, round) in [(1, 0), (4, 0), (3, 0), (16, 1), (5, 3), (0xffff, 0)] {
            run_mode::<S>(mode, golomb_par, round, &mut rng);
        }
    }
}

#[test]
fn verify_roundtrip_u16() {
    run_shape::<u16>(&[
        CmpMode::Raw,
        CmpMode::DiffZero,
        CmpMode::DiffMulti,
        CmpMode::ModelZero,
        CmpMode::ModelMulti,
    ]);
}

#[test]
fn verify_roundtrip_u32() {
    run_shape::<u32>(&[
        CmpMode::Raw32,
        CmpMode::DiffZero32,
        CmpMode::DiffMulti32,
        CmpMode::ModelZero32,
        CmpMode::ModelMulti32,
    ]);
}

#[test]
fn verify_roundtrip_f_fx() {
    run_shape::<FFx>(&[
        CmpMode::RawFFx,
        CmpMode::DiffZeroFFx,
        CmpMode::DiffMultiFFx,
        CmpMode::ModelZeroFFx,
        CmpMode::ModelMultiFFx,
    ]);
}

#[test]
fn verify_roundtrip_s_fx() {
    run_shape::<SFx>(&[
        CmpMode::RawSFx,
        CmpMode::DiffZeroSFx,
        CmpMode::DiffMultiSFx,
        CmpMode::ModelZeroSFx,
        CmpMode::ModelMultiSFx,
    ]);
}

#[test]
fn verify_roundtrip_s_fx_efx() {
    run_shape::<SFxEfx>(&[
        CmpMode::RawSFxEfx,
        CmpMode::DiffZeroSFxEfx,
        CmpMode::DiffMultiSFxEfx,
        CmpMode::ModelZeroSFxEfx,
        CmpMode::ModelMultiSFxEfx,
    ]);
}

#[test]
fn verify_roundtrip_s_fx_ncob() {
    run_shape::<SFxNcob>(&[
        CmpMode::RawSFxNcob,
        CmpMode::DiffZeroSFxNcob,
        CmpMode::DiffMultiSFxNcob,
        CmpMode::ModelZeroSFxNcob,
        CmpMode::ModelMultiSFxNcob,
    ]);
}

#[test]
fn verify_roundtrip_s_fx_efx_ncob_ecob() {
    run_shape::<SFxEfxNcobEcob>(&[
        CmpMode::RawSFxEfxNcobEcob,
        CmpMode::DiffZeroSFxEfxNcobEcob,
        CmpMode::DiffMultiSFxEfxNcobEcob,
        CmpMode::ModelZeroSFxEfxNcobEcob,
        CmpMode::ModelMultiSFxEfxNcobEcob,
    ]);
}

#[test]
fn verify_roundtrip_wrapped_extremes() {
    // Differences that wrap the full field width must survive the trip, including the
    // largest-magnitude-class escape.
    let input: [u32; 4] = [0, 0x8000_0001, u32::MAX, 1];

    let mut cfg = CmpConfig::new(CmpMode::DiffMulti32, 4, 32);
    cfg.golomb_par = 4;
    cfg.spill = 8;

    let mut work = input;
    let mut output = [0u32; 16];
    let mut info = CmpInfo::default();

    compress(&cfg, &mut work, None, &mut output, &mut info).unwrap();

    let mut restored: [u32; 4] = [0; 4];
    decompress(&cfg, &output, None, &mut restored).unwrap();

    assert_eq!(restored, input);
}

#[test]
fn verify_exact_capacity_detection() {
    let mut rng = SmallRng::seed_from_u64(7);
    let input = gen_series::<u16>(&mut rng, SAMPLES);

    let mut cfg = CmpConfig::new(CmpMode::DiffZero, SAMPLES as u32, 4 * SAMPLES as u32);
    cfg.golomb_par = 4;
    cfg.spill = 16;

    let mut work = input.clone();
    let mut output = vec![0u32; 2 * SAMPLES];
    let mut info = CmpInfo::default();

    let size = compress(&cfg, &mut work, None, &mut output, &mut info).unwrap();

    // The tightest capacity that still fits, in whole words.
    let words_needed = size.div_ceil(32);

    cfg.buffer_length = 2 * words_needed;
    let mut work = input.clone();
    let mut info = CmpInfo::default();
    assert_eq!(compress(&cfg, &mut work, None, &mut output, &mut info).unwrap(), size);

    // One word less must be detected as a capacity error with the size cleared.
    cfg.buffer_length = 2 * (words_needed - 1);
    let mut work = input.clone();
    let mut info = CmpInfo::default();
    let result = compress(&cfg, &mut work, None, &mut output, &mut info);

    assert_eq!(result, Err(VelaError::SmallBuffer));
    assert!(info.cmp_err.contains(CmpError::SMALL_BUFFER));
    assert_eq!(info.cmp_size, 0);
}

#[test]
fn verify_raw_size_respects_chunk_bound() {
    // A raw stream never outgrows the chunk size bound for its own payload.
    let mut rng = SmallRng::seed_from_u64(11);
    let input = gen_series::<SFx>(&mut rng, SAMPLES);

    let cfg = CmpConfig::new(CmpMode::RawSFx, SAMPLES as u32, 4 * SAMPLES as u32);

    let mut work = input.clone();
    let mut output = vec![0u32; 2 * SAMPLES];
    let mut info = CmpInfo::default();

    let size = compress(&cfg, &mut work, None, &mut output, &mut info).unwrap();

    let payload_bytes = size.div_ceil(8);
    let bound = compress_chunk_cmp_size_bound(payload_bytes, 1);

    assert_ne!(bound, 0);
    assert!(payload_bytes <= bound);
}
