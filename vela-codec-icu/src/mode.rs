// Vela
// Copyright (c) 2025 The Project Vela Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `mode` module defines the closed set of compression modes and the descriptor table that
//! drives the pipeline stages.
//!
//! A compression mode names three orthogonal things at once: the sample shape operated on, the
//! pre-processing strategy (none, 1-d differencing, or model prediction), and the escape
//! mechanism used by the entropy coder for outliers. Every stage of the pipeline selects its
//! implementation from the [`ModeDescriptor`] instead of switching on the mode directly.

/// The sample shape a mode operates on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SampleKind {
    /// 16-bit imagette sample.
    U16,
    /// 32-bit imagette sample.
    U32,
    /// Exposure flags and flux.
    SFx,
    /// Exposure flags, flux, and extended flux.
    SFxEfx,
    /// Exposure flags, flux, and center-of-brightness.
    SFxNcob,
    /// Exposure flags, flux, center-of-brightness, and their extended counterparts.
    SFxEfxNcobEcob,
    /// Fast-cadence flux. Preprocessed identically to [`SampleKind::U32`].
    FFx,
}

/// The per-sample transform applied before mapping and entropy coding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Preprocessing {
    /// No transform. The sample array is stored unencoded.
    Raw,
    /// 1-d differencing against the preceding sample.
    Diff,
    /// Subtraction of a caller-provided model that is updated after each sample.
    Model,
}

/// The strategy used to signal out-of-range values in the bitstream.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EscapeMechanism {
    /// The codeword of 0 is reserved as the escape symbol; the outlier follows unencoded in the
    /// field's native width.
    Zero,
    /// The codewords directly above the spillover threshold are used as escape symbols tagged by
    /// the outlier's magnitude class.
    Multi,
}

/// The dispatch record of a [`CmpMode`]: which shape to operate on, how to pre-process it, and
/// how to escape outliers. Raw modes carry no escape mechanism.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ModeDescriptor {
    pub shape: SampleKind,
    pub preprocessing: Preprocessing,
    pub escape: Option<EscapeMechanism>,
}

const fn desc(
    shape: SampleKind,
    preprocessing: Preprocessing,
    escape: Option<EscapeMechanism>,
) -> ModeDescriptor {
    ModeDescriptor { shape, preprocessing, escape }
}

/// `CmpMode` enumerates every supported compression mode.
///
/// The bare variants operate on 16-bit imagette samples; the suffix selects one of the other
/// sample shapes. `Diff*` modes difference neighbouring samples, `Model*` modes subtract a
/// caller-provided model, and `Raw*` modes store the input unencoded. The `Zero`/`Multi` infix
/// selects the escape mechanism.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CmpMode {
    Raw,
    RawSFx,
    RawSFxEfx,
    RawSFxNcob,
    RawSFxEfxNcobEcob,
    Raw32,
    RawFFx,
    DiffZero,
    DiffZeroSFx,
    DiffZeroSFxEfx,
    DiffZeroSFxNcob,
    DiffZeroSFxEfxNcobEcob,
    DiffZero32,
    DiffZeroFFx,
    DiffMulti,
    DiffMultiSFx,
    DiffMultiSFxEfx,
    DiffMultiSFxNcob,
    DiffMultiSFxEfxNcobEcob,
    DiffMulti32,
    DiffMultiFFx,
    ModelZero,
    ModelZeroSFx,
    ModelZeroSFxEfx,
    ModelZeroSFxNcob,
    ModelZeroSFxEfxNcobEcob,
    ModelZero32,
    ModelZeroFFx,
    ModelMulti,
    ModelMultiSFx,
    ModelMultiSFxEfx,
    ModelMultiSFxNcob,
    ModelMultiSFxEfxNcobEcob,
    ModelMulti32,
    ModelMultiFFx,
}

impl CmpMode {
    /// The descriptor naming the shape, pre-processing strategy, and escape mechanism of this
    /// mode.
    pub const fn descriptor(self) -> ModeDescriptor {
        use EscapeMechanism::{Multi, Zero};
        use Preprocessing::{Diff, Model, Raw};
        use SampleKind::*;

        match self {
            CmpMode::Raw => desc(U16, Raw, None),
            CmpMode::RawSFx => desc(SFx, Raw, None),
            CmpMode::RawSFxEfx => desc(SFxEfx, Raw, None),
            CmpMode::RawSFxNcob => desc(SFxNcob, Raw, None),
            CmpMode::RawSFxEfxNcobEcob => desc(SFxEfxNcobEcob, Raw, None),
            CmpMode::Raw32 => desc(U32, Raw, None),
            CmpMode::RawFFx => desc(FFx, Raw, None),

            CmpMode::DiffZero => desc(U16, Diff, Some(Zero)),
            CmpMode::DiffZeroSFx => desc(SFx, Diff, Some(Zero)),
            CmpMode::DiffZeroSFxEfx => desc(SFxEfx, Diff, Some(Zero)),
            CmpMode::DiffZeroSFxNcob => desc(SFxNcob, Diff, Some(Zero)),
            CmpMode::DiffZeroSFxEfxNcobEcob => desc(SFxEfxNcobEcob, Diff, Some(Zero)),
            CmpMode::DiffZero32 => desc(U32, Diff, Some(Zero)),
            CmpMode::DiffZeroFFx => desc(FFx, Diff, Some(Zero)),

            CmpMode::DiffMulti => desc(U16, Diff, Some(Multi)),
            CmpMode::DiffMultiSFx => desc(SFx, Diff, Some(Multi)),
            CmpMode::DiffMultiSFxEfx => desc(SFxEfx, Diff, Some(Multi)),
            CmpMode::DiffMultiSFxNcob => desc(SFxNcob, Diff, Some(Multi)),
            CmpMode::DiffMultiSFxEfxNcobEcob => desc(SFxEfxNcobEcob, Diff, Some(Multi)),
            CmpMode::DiffMulti32 => desc(U32, Diff, Some(Multi)),
            CmpMode::DiffMultiFFx => desc(FFx, Diff, Some(Multi)),

            CmpMode::ModelZero => desc(U16, Model, Some(Zero)),
            CmpMode::ModelZeroSFx => desc(SFx, Model, Some(Zero)),
            CmpMode::ModelZeroSFxEfx => desc(SFxEfx, Model, Some(Zero)),
            CmpMode::ModelZeroSFxNcob => desc(SFxNcob, Model, Some(Zero)),
            CmpMode::ModelZeroSFxEfxNcobEcob => desc(SFxEfxNcobEcob, Model, Some(Zero)),
            CmpMode::ModelZero32 => desc(U32, Model, Some(Zero)),
            CmpMode::ModelZeroFFx => desc(FFx, Model, Some(Zero)),

            CmpMode::ModelMulti => desc(U16, Model, Some(Multi)),
            CmpMode::ModelMultiSFx => desc(SFx, Model, Some(Multi)),
            CmpMode::ModelMultiSFxEfx => desc(SFxEfx, Model, Some(Multi)),
            CmpMode::ModelMultiSFxNcob => desc(SFxNcob, Model, Some(Multi)),
            CmpMode::ModelMultiSFxEfxNcobEcob => desc(SFxEfxNcobEcob, Model, Some(Multi)),
            CmpMode::ModelMulti32 => desc(U32, Model, Some(Multi)),
            CmpMode::ModelMultiFFx => desc(FFx, Model, Some(Multi)),
        }
    }

    /// Returns true if this is a raw (store unencoded) mode.
    pub const fn is_raw(self) -> bool {
        matches!(self.descriptor().preprocessing, Preprocessing::Raw)
    }

    /// Returns true if this mode subtracts a caller-provided model.
    pub const fn is_model(self) -> bool {
        matches!(self.descriptor().preprocessing, Preprocessing::Model)
    }
}
