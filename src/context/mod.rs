// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Timestream data as seen by the flagging stage.
//!
//! A timestream's visibility mask lives in one array covering every baseline
//! of the chunk handed to this process; the structs here iterate that array
//! per baseline (or per polarisation-and-baseline pair) and hand each slice
//! to a callback, together with a view of the container-wide noise-source
//! indicator. Baselines share no state, so they are processed in parallel.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use ndarray::prelude::*;
use rayon::prelude::*;

use crate::PROGRESS_BARS;

/// Timestream data with one undifferentiated polarisation product per
/// baseline. The visibility mask is time × frequency × baseline; `true`
/// means the sample is flagged.
pub struct RawTimestream {
    pub vis_mask: Array3<bool>,

    /// When was the periodic noise source on? Either one value per timestep,
    /// or one column per baseline.
    pub noise_source_on: Option<ArrayD<bool>>,
}

impl RawTimestream {
    /// Invoke `op` once per baseline with that baseline's mask (time ×
    /// frequency), the baseline index, and a view of the noise-source
    /// indicator. Baselines run in parallel; the first error aborts the
    /// iteration.
    pub fn bl_data_operate<E, F>(&mut self, op: F) -> Result<(), E>
    where
        E: Send,
        F: Fn(ArrayViewMutD<bool>, usize, Option<ArrayViewD<bool>>) -> Result<(), E> + Sync,
    {
        let noise_source_on = self.noise_source_on.as_ref().map(|a| a.view());
        let progress = baseline_progress_bar(self.vis_mask.len_of(Axis(2)));
        let result = self
            .vis_mask
            .axis_iter_mut(Axis(2))
            .into_par_iter()
            .enumerate()
            .try_for_each(|(i_bl, bl_mask)| {
                let result = op(bl_mask.into_dyn(), i_bl, noise_source_on.clone());
                progress.inc(1);
                result
            });
        progress.finish_and_clear();
        result
    }
}

/// Timestream data with an explicit polarisation axis. The visibility mask
/// is time × frequency × polarisation × baseline.
pub struct Timestream {
    pub vis_mask: Array4<bool>,

    /// Have the flags already been combined across polarisations? If so,
    /// per-baseline operations see all polarisations at once; otherwise each
    /// polarisation is treated as its own piece of data.
    pub combined_mask: bool,

    /// When was the periodic noise source on? Either one value per timestep,
    /// or one column per baseline.
    pub noise_source_on: Option<ArrayD<bool>>,
}

impl Timestream {
    /// Invoke `op` once per baseline with that baseline's mask (time ×
    /// frequency × polarisation), the baseline index, and a view of the
    /// noise-source indicator. Baselines run in parallel.
    pub fn bl_data_operate<E, F>(&mut self, op: F) -> Result<(), E>
    where
        E: Send,
        F: Fn(ArrayViewMutD<bool>, usize, Option<ArrayViewD<bool>>) -> Result<(), E> + Sync,
    {
        let noise_source_on = self.noise_source_on.as_ref().map(|a| a.view());
        let progress = baseline_progress_bar(self.vis_mask.len_of(Axis(3)));
        let result = self
            .vis_mask
            .axis_iter_mut(Axis(3))
            .into_par_iter()
            .enumerate()
            .try_for_each(|(i_bl, bl_mask)| {
                let result = op(bl_mask.into_dyn(), i_bl, noise_source_on.clone());
                progress.inc(1);
                result
            });
        progress.finish_and_clear();
        result
    }

    /// Invoke `op` once per polarisation-and-baseline pair with that pair's
    /// mask (time × frequency) and the baseline index. Within a
    /// polarisation, baselines run in parallel.
    pub fn pol_and_bl_data_operate<E, F>(&mut self, op: F) -> Result<(), E>
    where
        E: Send,
        F: Fn(ArrayViewMutD<bool>, usize, Option<ArrayViewD<bool>>) -> Result<(), E> + Sync,
    {
        let noise_source_on = self.noise_source_on.as_ref().map(|a| a.view());
        let num_pols = self.vis_mask.len_of(Axis(2));
        let num_baselines = self.vis_mask.len_of(Axis(3));
        let progress = baseline_progress_bar(num_pols * num_baselines);
        for mut pol_mask in self.vis_mask.axis_iter_mut(Axis(2)) {
            pol_mask
                .axis_iter_mut(Axis(2))
                .into_par_iter()
                .enumerate()
                .try_for_each(|(i_bl, bl_mask)| {
                    let result = op(bl_mask.into_dyn(), i_bl, noise_source_on.clone());
                    progress.inc(1);
                    result
                })?;
        }
        progress.finish_and_clear();
        Ok(())
    }
}

fn baseline_progress_bar(len: usize) -> ProgressBar {
    ProgressBar::with_draw_target(
        Some(len as u64),
        if PROGRESS_BARS.load() {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        },
    )
    .with_style(
        ProgressStyle::default_bar()
            .template("{msg:16}: [{wide_bar:.blue}] {pos:4}/{len:4} ({elapsed_precise}<{eta_precise})")
            .unwrap()
            .progress_chars("=> "),
    )
    .with_position(0)
    .with_message("SIR flagging")
}
