// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters for sirflag operations.
//!
//! The code here "mirrors" the code within the `cli` module; `cli` is
//! unparsed, user-facing code, whereas parameters have been parsed and are
//! ready to be used directly.

use std::path::PathBuf;

use log::{debug, info};
use ndarray::prelude::*;
use thiserror::Error;

use crate::{
    context::{RawTimestream, Timestream},
    flagging::{total_occupancy, Sir, SirError, SirParams},
    io::{FlagFile, FlagFileError},
};

/// Parameters for a `flag` run.
pub(crate) struct FlagParams {
    /// The flag file to read.
    pub(crate) input: PathBuf,

    /// Where to write the flagged result.
    pub(crate) output: PathBuf,

    pub(crate) sir: SirParams,
}

impl FlagParams {
    pub(crate) fn run(&self, dry_run: bool) -> Result<(), FlagError> {
        debug!("eta: {}", self.sir.eta);

        let flag_file = FlagFile::read(&self.input)?;
        let shape = flag_file.vis_mask.shape().to_vec();
        info!(
            "Read {} (mask shape {:?})",
            self.input.display(),
            shape
        );
        let occupancy_before = total_occupancy(flag_file.vis_mask.view());
        info!(
            "{:.2}% of samples flagged before SIR",
            100.0 * occupancy_before
        );

        if dry_run {
            info!("Dry run specified; not applying the SIR operator.");
            return Ok(());
        }

        let FlagFile {
            vis_mask,
            noise_source_on,
            telescope,
            obsid,
            combined_mask,
        } = flag_file;
        let sir = Sir { params: self.sir };
        let (vis_mask, noise_source_on) = match shape.len() {
            3 => {
                let mut rt = RawTimestream {
                    vis_mask: vis_mask.into_dimensionality::<Ix3>().unwrap(),
                    noise_source_on,
                };
                sir.process_raw(&mut rt)?;
                (rt.vis_mask.into_dyn(), rt.noise_source_on)
            }
            4 => {
                let mut ts = Timestream {
                    vis_mask: vis_mask.into_dimensionality::<Ix4>().unwrap(),
                    combined_mask,
                    noise_source_on,
                };
                sir.process(&mut ts)?;
                (ts.vis_mask.into_dyn(), ts.noise_source_on)
            }
            _ => return Err(FlagError::UnhandledMaskRank { shape }),
        };

        let occupancy_after = total_occupancy(vis_mask.view());
        info!(
            "{:.2}% of samples flagged after SIR (was {:.2}%)",
            100.0 * occupancy_after,
            100.0 * occupancy_before
        );

        let flag_file = FlagFile {
            vis_mask,
            noise_source_on,
            telescope,
            obsid,
            combined_mask,
        };
        flag_file.write(&self.output)?;
        info!("Wrote {}", self.output.display());

        Ok(())
    }
}

#[derive(Error, Debug)]
pub(crate) enum FlagError {
    #[error("No input flag file was supplied")]
    NoInput,

    #[error("No output flag file was supplied")]
    NoOutput,

    #[error("eta must be in the open interval (0, 1), but was {eta}")]
    InvalidEta { eta: f64 },

    #[error("The flag file's mask has shape {shape:?}; only 3D (time × frequency × baseline) and 4D (time × frequency × polarisation × baseline) masks are supported")]
    UnhandledMaskRank { shape: Vec<usize> },

    #[error(transparent)]
    Sir(#[from] SirError),

    #[error(transparent)]
    FlagFile(#[from] FlagFileError),
}
