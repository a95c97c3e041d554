// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use ndarray::prelude::*;

use super::*;
use crate::context::{RawTimestream, Timestream};

fn scattered_mask(num_timesteps: usize, num_chans: usize) -> Array2<bool> {
    Array2::from_shape_fn((num_timesteps, num_chans), |(t, f)| {
        (t * 5 + f * 3) % 11 == 0
    })
}

#[test]
fn test_flagging_only_adds_flags() {
    let mut mask = scattered_mask(12, 16);
    let original = mask.clone();
    sir_flag_baseline(mask.view_mut().into_dyn(), None, 0, 0.3).unwrap();
    for (&before, &after) in original.iter().zip(mask.iter()) {
        assert!(!before || after);
    }
}

#[test]
fn test_time_pass_runs_before_frequency_pass() {
    // eta = 0.4 bridges a single gap (density 2/3) but doesn't extend an
    // isolated flag. The time pass fills in (1, 0) from the flags above and
    // below it; only then does row 1 contain the pair that lets the
    // frequency pass bridge across to (1, 2). With the passes swapped,
    // (1, 1) stays unflagged.
    let mut mask = Array2::from_elem((3, 3), false);
    mask[(0, 0)] = true;
    mask[(2, 0)] = true;
    mask[(1, 2)] = true;
    let mut swapped = mask.clone();

    sir_flag_baseline(mask.view_mut().into_dyn(), None, 0, 0.4).unwrap();
    assert!(mask[(1, 0)]);
    assert!(mask[(1, 1)]);

    sir::sir_along_axis(swapped.view_mut(), Axis(1), 0.4);
    sir::sir_along_axis(swapped.view_mut(), Axis(0), 0.4);
    assert!(swapped[(1, 0)]);
    assert!(!swapped[(1, 1)]);
}

#[test]
fn test_noise_source_override_beats_the_operator() {
    let mut mask = scattered_mask(10, 8);
    // Flag timestep 3 entirely so the override demonstrably removes flags
    // that were present before the operator ran.
    mask.slice_mut(s![3, ..]).fill(true);
    let noise_source_on = Array1::from_shape_fn(10, |t| t == 3 || t == 7);

    sir_flag_baseline(
        mask.view_mut().into_dyn(),
        Some(noise_source_on.view().into_dyn()),
        0,
        0.5,
    )
    .unwrap();

    for (&on, time_mask) in noise_source_on.iter().zip(mask.outer_iter()) {
        if on {
            assert!(time_mask.iter().all(|&f| !f));
        }
    }
}

#[test]
fn test_noise_source_column_is_selected_by_baseline() {
    let num_timesteps = 6;
    let num_baselines = 3;
    // The noise source fired on timestep 2 for baseline 1 only.
    let noise_source_on =
        Array2::from_shape_fn((num_timesteps, num_baselines), |(t, b)| t == 2 && b == 1);

    for i_bl in 0..num_baselines {
        let mut mask = Array2::from_elem((num_timesteps, 4), true);
        sir_flag_baseline(
            mask.view_mut().into_dyn(),
            Some(noise_source_on.view().into_dyn()),
            i_bl,
            0.2,
        )
        .unwrap();
        let timestep_2_flagged = mask.slice(s![2, ..]).iter().all(|&f| f);
        if i_bl == 1 {
            assert!(!timestep_2_flagged);
        } else {
            assert!(timestep_2_flagged);
        }
    }
}

#[test]
fn test_3d_masks_broadcast_the_first_polarisation() {
    let num_pols = 4;
    let mut mask = Array3::from_shape_fn((9, 7, num_pols), |(t, f, p)| {
        // Distinct flags per polarisation; only polarisation 0 matters.
        (t * 3 + f + p) % 9 == 0
    });

    // What the 2D path produces for the first polarisation's slice.
    let mut expected = mask.index_axis(Axis(2), 0).to_owned();
    sir_flag_baseline(expected.view_mut().into_dyn(), None, 0, 0.4).unwrap();

    sir_flag_baseline(mask.view_mut().into_dyn(), None, 0, 0.4).unwrap();
    for pol_mask in mask.axis_iter(Axis(2)) {
        assert_eq!(pol_mask, expected.view());
    }
}

#[test]
fn test_unusable_mask_ranks_are_fatal() {
    let mut rank1 = Array1::from_elem(10, false);
    let result = sir_flag_baseline(rank1.view_mut().into_dyn(), None, 0, 0.2);
    assert!(matches!(result, Err(SirError::InvalidMaskRank { .. })));

    let mut rank4 = Array4::from_elem((3, 4, 2, 5), false);
    let result = sir_flag_baseline(rank4.view_mut().into_dyn(), None, 0, 0.2);
    assert!(matches!(result, Err(SirError::InvalidMaskRank { .. })));
}

#[test]
fn test_unusable_indicator_ranks_are_fatal() {
    let mut mask = Array2::from_elem((5, 5), false);
    let noise_source_on = Array3::from_elem((5, 2, 2), false);
    let result = sir_flag_baseline(
        mask.view_mut().into_dyn(),
        Some(noise_source_on.view().into_dyn()),
        0,
        0.2,
    );
    assert!(matches!(
        result,
        Err(SirError::InvalidNoiseIndicatorRank { .. })
    ));
}

#[test]
fn test_indicator_shape_coherence_is_checked() {
    let mut mask = Array2::from_elem((5, 5), false);
    let too_short = Array1::from_elem(3, false);
    let result = sir_flag_baseline(
        mask.view_mut().into_dyn(),
        Some(too_short.view().into_dyn()),
        0,
        0.2,
    );
    assert!(matches!(result, Err(SirError::NoiseIndicatorLength { .. })));

    let mut mask = Array2::from_elem((5, 5), false);
    let two_columns = Array2::from_elem((5, 2), false);
    let result = sir_flag_baseline(
        mask.view_mut().into_dyn(),
        Some(two_columns.view().into_dyn()),
        2,
        0.2,
    );
    assert!(matches!(result, Err(SirError::NoiseIndicatorColumn { .. })));
}

#[test]
fn test_raw_timestream_baselines_are_independent() {
    let num_baselines = 5;
    let mut vis_mask = Array3::from_elem((8, 6, num_baselines), false);
    // Baseline 2 gets a dense run; the others stay clean.
    vis_mask.slice_mut(s![2..5, 1, 2]).fill(true);
    let mut rt = RawTimestream {
        vis_mask,
        noise_source_on: None,
    };

    let sir = Sir {
        params: SirParams { eta: 0.4 },
    };
    sir.process_raw(&mut rt).unwrap();

    for (i_bl, bl_mask) in rt.vis_mask.axis_iter(Axis(2)).enumerate() {
        if i_bl == 2 {
            assert!(bl_mask.iter().any(|&f| f));
        } else {
            assert!(bl_mask.iter().all(|&f| !f));
        }
    }
}

#[test]
fn test_timestream_combined_mask_dispatch() {
    // With a combined mask, every polarisation of a baseline ends up with
    // the first polarisation's flags.
    let mut vis_mask = Array4::from_elem((6, 4, 3, 2), false);
    vis_mask.slice_mut(s![1..3, 2, 0, 0]).fill(true);
    let mut ts = Timestream {
        vis_mask: vis_mask.clone(),
        combined_mask: true,
        noise_source_on: None,
    };
    let sir = Sir {
        params: SirParams { eta: 0.4 },
    };
    sir.process(&mut ts).unwrap();
    let pol0 = ts.vis_mask.slice(s![.., .., 0, 0]).to_owned();
    for i_pol in 1..3 {
        assert_eq!(ts.vis_mask.slice(s![.., .., i_pol, 0]), pol0.view());
    }

    // Without a combined mask, each polarisation is flagged on its own, so
    // the flags of polarisation 0 don't leak into polarisation 1.
    let mut ts = Timestream {
        vis_mask,
        combined_mask: false,
        noise_source_on: None,
    };
    sir.process(&mut ts).unwrap();
    assert!(ts.vis_mask.slice(s![.., .., 0, 0]).iter().any(|&f| f));
    assert!(ts.vis_mask.slice(s![.., .., 1, 0]).iter().all(|&f| !f));
}

#[test]
fn test_occupancy_fractions() {
    use approx::assert_abs_diff_eq;

    let mut mask = Array3::from_elem((4, 2, 5), false);
    mask.slice_mut(s![.., 0, ..]).fill(true);
    let mask = mask.into_dyn();
    assert_abs_diff_eq!(total_occupancy(mask.view()), 0.5);
    let by_channel = channel_occupancy(mask.view());
    assert_eq!(by_channel.len(), 2);
    assert_abs_diff_eq!(by_channel[0], 1.0);
    assert_abs_diff_eq!(by_channel[1], 0.0);
}
