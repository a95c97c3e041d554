// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
RFI flagging software for radio telescope timestream data using the
scale-invariant rank (SIR) operator.
 */

pub mod cli;
pub mod context;
pub mod flagging;
pub mod io;
mod params;

// Re-exports.
pub use flagging::{Sir, SirError, SirParams, DEFAULT_ETA};

use crossbeam_utils::atomic::AtomicCell;

/// Are progress bars being drawn?
pub(crate) static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);
