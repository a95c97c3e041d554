// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Arguments for the `inspect` subcommand.

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info};

use super::SirflagError;
use crate::{
    flagging::{channel_occupancy, total_occupancy},
    io::FlagFile,
};

#[derive(Debug, Parser)]
pub(super) struct InspectArgs {
    /// Path to the flag file.
    #[clap(name = "FLAG_FILE", parse(from_os_str))]
    file: PathBuf,
}

impl InspectArgs {
    pub(super) fn run(&self) -> Result<(), SirflagError> {
        let flag_file = FlagFile::read(&self.file)?;

        info!("{}:", self.file.display());
        if let Some(telescope) = flag_file.telescope.as_deref() {
            info!("  Telescope: {telescope}");
        }
        if let Some(obsid) = flag_file.obsid {
            info!("  Obsid: {obsid}");
        }
        let shape = flag_file.vis_mask.shape();
        match shape.len() {
            3 => info!("  Mask shape: {shape:?} (time × frequency × baseline)"),
            4 => info!("  Mask shape: {shape:?} (time × frequency × polarisation × baseline)"),
            _ => info!("  Mask shape: {shape:?}"),
        }
        if shape.len() == 4 {
            info!("  Polarisation masks combined: {}", flag_file.combined_mask);
        }
        match &flag_file.noise_source_on {
            Some(on) => info!("  Noise-source indicator shape: {:?}", on.shape()),
            None => info!("  No noise-source indicator"),
        }

        info!(
            "  Total occupancy: {:.2}%",
            100.0 * total_occupancy(flag_file.vis_mask.view())
        );
        for (i_chan, occ) in channel_occupancy(flag_file.vis_mask.view())
            .into_iter()
            .enumerate()
        {
            debug!("  Channel {i_chan:4}: {:6.2}% flagged", 100.0 * occ);
        }

        Ok(())
    }
}
