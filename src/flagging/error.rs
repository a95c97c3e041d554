// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with SIR flagging.

use thiserror::Error;

#[derive(Error, Debug)]
/// Error type associated with applying the SIR operator to visibility masks.
pub enum SirError {
    /// The per-baseline mask had an unusable number of dimensions.
    #[error("The visibility mask must be a 2D (time × frequency) or 3D (time × frequency × polarisation) array, but its shape is {shape:?}")]
    InvalidMaskRank { shape: Vec<usize> },

    /// The noise-source indicator had an unusable number of dimensions.
    #[error("The noise-source indicator must be a 1D (time) or 2D (time × baseline) array, but its shape is {shape:?}")]
    InvalidNoiseIndicatorRank { shape: Vec<usize> },

    /// A 2D noise-source indicator had no column for the requested baseline.
    #[error("The noise-source indicator has {num_columns} columns; no column for baseline {i_bl}")]
    NoiseIndicatorColumn { i_bl: usize, num_columns: usize },

    /// The noise-source indicator didn't cover the mask's timesteps.
    #[error("The noise-source indicator has {indicator} time samples, but the mask has {timesteps}")]
    NoiseIndicatorLength { indicator: usize, timesteps: usize },
}
