// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The scale-invariant rank (SIR) operator.
//!
//! The SIR operator is a one-dimensional mathematical morphology technique
//! that finds adjacent intervals in the time or frequency domain that are
//! likely to be affected by RFI. A sample is flagged when it sits inside
//! *some* contiguous interval whose flag density is high enough; the
//! criterion depends only on the density, not on the interval's length.

use ndarray::prelude::*;

/// The weight of a single sample. Flagged samples count for `eta`, unflagged
/// samples for `eta - 1`; an interval's summed weight is non-negative exactly
/// when its flag density is at least `1 - eta`.
pub(crate) fn flag_weight(flagged: bool, eta: f64) -> f64 {
    if flagged {
        eta
    } else {
        eta - 1.0
    }
}

/// Apply the SIR operator to a 1D mask, in place.
///
/// A sample ends up flagged iff it is contained in some interval whose summed
/// [`flag_weight`] is non-negative. Directly testing every interval is
/// quadratic; instead, with `prefix[k]` the summed weight of the first `k`
/// samples, sample `i` qualifies iff the maximum of `prefix[i + 1..=n]` is at
/// least the minimum of `prefix[0..=i]`. Both extrema are running sweeps, so
/// the whole operator is linear in the mask length.
///
/// The output is always a superset of the input: a flagged sample is its own
/// interval with weight `eta >= 0`.
pub fn sir_operator(mut mask: ArrayViewMut1<bool>, eta: f64) {
    let n = mask.len();
    if n == 0 {
        return;
    }

    let mut prefix = Vec::with_capacity(n + 1);
    let mut sum = 0.0;
    prefix.push(sum);
    for &flagged in mask.iter() {
        sum += flag_weight(flagged, eta);
        prefix.push(sum);
    }

    // fwd_min[i] is the minimum of prefix[0..=i].
    let mut fwd_min = vec![0.0; n];
    let mut min = f64::INFINITY;
    for (i, m) in fwd_min.iter_mut().enumerate() {
        min = min.min(prefix[i]);
        *m = min;
    }

    // Sweep backwards, tracking the maximum of prefix[i + 1..=n].
    let mut max = f64::NEG_INFINITY;
    for i in (0..n).rev() {
        max = max.max(prefix[i + 1]);
        mask[i] = max >= fwd_min[i];
    }
}

/// Apply the SIR operator along `axis` of a 2D mask, independently for each
/// 1D lane. `Axis(0)` treats each frequency channel's time series as a lane;
/// `Axis(1)` treats each timestep's spectrum as a lane.
pub fn sir_along_axis(mut mask: ArrayViewMut2<bool>, axis: Axis, eta: f64) {
    for lane in mask.lanes_mut(axis) {
        sir_operator(lane, eta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    #[test]
    fn test_flag_weights_are_signed_by_flag_state() {
        assert_abs_diff_eq!(flag_weight(true, 0.2), 0.2);
        assert_abs_diff_eq!(flag_weight(false, 0.2), -0.8);
        // eta = 0 makes unflagged samples maximally repellent and flagged
        // samples neutral.
        assert_abs_diff_eq!(flag_weight(true, 0.0), 0.0);
        assert_abs_diff_eq!(flag_weight(false, 0.0), -1.0);
    }

    #[test]
    fn test_empty_mask_is_a_no_op() {
        let mut mask: Array1<bool> = array![];
        sir_operator(mask.view_mut(), 0.5);
        assert!(mask.is_empty());
    }

    #[test]
    fn test_eta_zero_is_the_identity() {
        let mut mask = array![true, false, false, true, true, false, true];
        let original = mask.clone();
        sir_operator(mask.view_mut(), 0.0);
        assert_eq!(mask, original);
    }

    #[test]
    fn test_eta_near_one_saturates() {
        let mut mask = Array1::from_elem(10, false);
        mask[4] = true;
        sir_operator(mask.view_mut(), 0.99);
        assert!(mask.iter().all(|&f| f));
    }

    #[test]
    fn test_all_unflagged_stays_unflagged() {
        for eta in [0.1, 0.2, 0.5, 0.9] {
            let mut mask = Array1::from_elem(16, false);
            sir_operator(mask.view_mut(), eta);
            assert!(mask.iter().all(|&f| !f), "eta = {eta}");
        }
    }

    #[test]
    fn test_all_flagged_stays_flagged() {
        for eta in [0.1, 0.2, 0.5, 0.9] {
            let mut mask = Array1::from_elem(16, true);
            sir_operator(mask.view_mut(), eta);
            assert!(mask.iter().all(|&f| f), "eta = {eta}");
        }
    }

    #[test]
    fn test_flags_are_never_removed() {
        // A scattered deterministic mask.
        let mut mask = Array1::from_shape_fn(50, |i| (i * 7) % 11 < 2);
        let original = mask.clone();
        sir_operator(mask.view_mut(), 0.3);
        for (&before, &after) in original.iter().zip(mask.iter()) {
            assert!(!before || after);
        }
    }

    // A regression fixture: one flag in ten samples at eta = 0.5. The flag's
    // neighbours at indices 1 and 3 qualify via length-2 intervals of summed
    // weight exactly zero; nothing further away does.
    #[test]
    fn test_single_flag_extension_at_eta_half() {
        let mut mask = array![
            false, false, true, false, false, false, false, false, false, false
        ];
        sir_operator(mask.view_mut(), 0.5);
        assert_eq!(
            mask,
            array![false, true, true, true, false, false, false, false, false, false]
        );
    }

    #[test]
    fn test_gap_bridging_depends_on_density() {
        // Two flags around a single gap: density 2/3, bridged iff
        // 3 * eta - 1 >= 0.
        let mut mask = array![true, false, true];
        sir_operator(mask.view_mut(), 0.4);
        assert_eq!(mask, array![true, true, true]);

        let mut mask = array![true, false, true];
        sir_operator(mask.view_mut(), 0.3);
        assert_eq!(mask, array![true, false, true]);
    }

    #[test]
    fn test_scale_invariance() {
        // A short dense run and a long sparse run of the same density extend
        // identically: both [T] and [T, F, T, T, F, T] have density >= 2/3,
        // so at eta = 0.4 both become fully flagged.
        let mut short = array![true, false, true];
        let mut long = array![true, false, true, true, false, true];
        sir_operator(short.view_mut(), 0.4);
        sir_operator(long.view_mut(), 0.4);
        assert!(short.iter().all(|&f| f));
        assert!(long.iter().all(|&f| f));
    }

    #[test]
    fn test_axis_application_is_lane_independent() {
        // One flagged column; a time-axis pass may only alter that column.
        let mut mask = Array2::from_elem((4, 5), false);
        mask[(1, 2)] = true;
        mask[(2, 2)] = true;
        sir_along_axis(mask.view_mut(), Axis(0), 0.4);
        for ((_t, f), &flagged) in mask.indexed_iter() {
            if f != 2 {
                assert!(!flagged);
            }
        }
        // The flagged pair survives.
        assert!(mask[(1, 2)]);
        assert!(mask[(2, 2)]);
    }
}
