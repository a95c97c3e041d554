// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! RFI flagging by applying the SIR (scale-invariant rank) operator.
//!
//! Sparse flags left behind by an earlier detection stage are extended into
//! the contiguous intervals that are likely to be contaminated. The operator
//! runs along the time axis first, then along the frequency axis on the time
//! pass's output; samples where the periodic noise source fired are unflagged
//! again as the final step, whatever the operator produced for them.

mod error;
pub mod sir;
#[cfg(test)]
mod tests;

pub use error::SirError;

use log::trace;
use ndarray::prelude::*;

use crate::context::{RawTimestream, Timestream};
use sir::sir_along_axis;

/// The default aggressiveness of the SIR operator.
pub const DEFAULT_ETA: f64 = 0.2;

/// Parsed SIR-operator settings, shared read-only by all baselines of a run.
#[derive(Debug, Clone, Copy)]
pub struct SirParams {
    /// Aggressiveness factor in the open interval (0, 1). Larger values
    /// extend flagged intervals more readily; as `eta` approaches 1, one
    /// pre-existing flag is enough to flag an entire time series or spectrum.
    pub eta: f64,
}

/// RFI flagging by applying the SIR operator to the visibility masks of a
/// timestream.
pub struct Sir {
    pub params: SirParams,
}

impl Sir {
    /// Flag every baseline of a [`RawTimestream`].
    pub fn process_raw(&self, rt: &mut RawTimestream) -> Result<(), SirError> {
        trace!("start SIR on a raw timestream");
        let eta = self.params.eta;
        rt.bl_data_operate(|vis_mask, i_bl, noise_source_on| {
            sir_flag_baseline(vis_mask, noise_source_on, i_bl, eta)
        })
    }

    /// Flag every baseline of a [`Timestream`]. If the polarisation masks
    /// haven't been combined, each polarisation is flagged separately.
    pub fn process(&self, ts: &mut Timestream) -> Result<(), SirError> {
        trace!(
            "start SIR on a timestream (combined_mask: {})",
            ts.combined_mask
        );
        let eta = self.params.eta;
        if ts.combined_mask {
            ts.bl_data_operate(|vis_mask, i_bl, noise_source_on| {
                sir_flag_baseline(vis_mask, noise_source_on, i_bl, eta)
            })
        } else {
            ts.pol_and_bl_data_operate(|vis_mask, i_bl, noise_source_on| {
                sir_flag_baseline(vis_mask, noise_source_on, i_bl, eta)
            })
        }
    }
}

/// Apply the SIR operator to one baseline's visibility mask, in place.
///
/// The mask is either time × frequency, or time × frequency × polarisation.
/// For the latter, the flags are assumed to have already been combined across
/// polarisations; the operator runs on the first polarisation's slice and the
/// result is broadcast over the others.
///
/// `noise_source_on` marks the timesteps during which the periodic noise
/// source fired, either for all baselines (1D) or per baseline (2D, with
/// `i_bl` selecting the column). Those timesteps are never subject to SIR
/// flagging: they are forced back to unflagged after the operator has run.
pub fn sir_flag_baseline(
    mut vis_mask: ArrayViewMutD<bool>,
    noise_source_on: Option<ArrayViewD<bool>>,
    i_bl: usize,
    eta: f64,
) -> Result<(), SirError> {
    // Pull out the relevant noise-source vector, if there is one.
    let on: Option<Array1<bool>> = match noise_source_on {
        None => None,
        Some(ns) => match ns.ndim() {
            1 => Some(ns.into_dimensionality::<Ix1>().unwrap().to_owned()),
            2 => {
                let ns = ns.into_dimensionality::<Ix2>().unwrap();
                if i_bl >= ns.ncols() {
                    return Err(SirError::NoiseIndicatorColumn {
                        i_bl,
                        num_columns: ns.ncols(),
                    });
                }
                Some(ns.column(i_bl).to_owned())
            }
            _ => {
                return Err(SirError::InvalidNoiseIndicatorRank {
                    shape: ns.shape().to_vec(),
                })
            }
        },
    };

    match vis_mask.ndim() {
        2 => {
            let mut vis_mask = vis_mask.view_mut().into_dimensionality::<Ix2>().unwrap();
            let mut mask = vis_mask.to_owned();
            sir_along_axis(mask.view_mut(), Axis(0), eta);
            sir_along_axis(mask.view_mut(), Axis(1), eta);
            vis_mask.assign(&mask);
        }
        3 => {
            let mut vis_mask = vis_mask.view_mut().into_dimensionality::<Ix3>().unwrap();
            if vis_mask.len_of(Axis(2)) > 0 {
                let mut mask = vis_mask.index_axis(Axis(2), 0).to_owned();
                sir_along_axis(mask.view_mut(), Axis(0), eta);
                sir_along_axis(mask.view_mut(), Axis(1), eta);
                for mut pol_mask in vis_mask.axis_iter_mut(Axis(2)) {
                    pol_mask.assign(&mask);
                }
            }
        }
        _ => {
            return Err(SirError::InvalidMaskRank {
                shape: vis_mask.shape().to_vec(),
            })
        }
    }

    // Noise-source timesteps are never flagged by this stage; undo whatever
    // the operator did to them.
    if let Some(on) = on {
        let num_timesteps = vis_mask.len_of(Axis(0));
        if on.len() != num_timesteps {
            return Err(SirError::NoiseIndicatorLength {
                indicator: on.len(),
                timesteps: num_timesteps,
            });
        }
        for (mut time_mask, &on) in vis_mask.outer_iter_mut().zip(on.iter()) {
            if on {
                time_mask.fill(false);
            }
        }
    }

    Ok(())
}

/// The overall fraction of flagged samples in a mask.
pub fn total_occupancy(mask: ArrayViewD<bool>) -> f64 {
    if mask.is_empty() {
        0.0
    } else {
        mask.iter().filter(|&&f| f).count() as f64 / mask.len() as f64
    }
}

/// The fraction of flagged samples in each frequency channel (axis 1 of a
/// timestream mask); all other axes are collapsed.
pub fn channel_occupancy(mask: ArrayViewD<bool>) -> Vec<f64> {
    if mask.ndim() < 2 {
        return vec![];
    }
    (0..mask.len_of(Axis(1)))
        .map(|i_chan| {
            let chan = mask.index_axis(Axis(1), i_chan);
            if chan.is_empty() {
                0.0
            } else {
                chan.iter().filter(|&&f| f).count() as f64 / chan.len() as f64
            }
        })
        .collect()
}
