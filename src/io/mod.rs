// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to read and write sirflag flag files.
//!
//! A flag file is FITS. The primary HDU carries observation metadata as
//! header keys; a byte image HDU named `MASK` holds the visibility mask
//! (0 for unflagged, anything else for flagged), shaped time × frequency ×
//! baseline or time × frequency × polarisation × baseline; an optional byte
//! image HDU named `NSON` holds the noise-source indicator, shaped time or
//! time × baseline.

mod error;

pub use error::FlagFileError;

use std::path::Path;

use fitsio::{
    hdu::HduInfo,
    images::{ImageDescription, ImageType},
    FitsFile,
};
use log::{debug, trace};
use ndarray::prelude::*;

/// The persisted state of a timestream's flags.
pub struct FlagFile {
    /// The visibility mask; `true` is flagged. Time × frequency × baseline,
    /// or time × frequency × polarisation × baseline.
    pub vis_mask: ArrayD<bool>,

    /// When was the periodic noise source on? One value per timestep, or one
    /// column per baseline.
    pub noise_source_on: Option<ArrayD<bool>>,

    /// The name of the telescope that observed this data.
    pub telescope: Option<String>,

    /// The observation ID associated with these flags.
    pub obsid: Option<u32>,

    /// Have the flags already been combined across polarisations? Only
    /// meaningful for 4D masks.
    pub combined_mask: bool,
}

impl FlagFile {
    /// Read a [`FlagFile`] from disk.
    pub fn read<P: AsRef<Path>>(file: P) -> Result<FlagFile, FlagFileError> {
        let file = file.as_ref();
        trace!("Reading in {}", file.display());
        let mut fptr = FitsFile::open(file)?;

        let primary = fptr.hdu(0)?;
        let telescope: Option<String> = primary.read_key(&mut fptr, "TELESCOP").ok();
        let obsid: Option<u32> = primary
            .read_key::<i64>(&mut fptr, "OBSID")
            .ok()
            .map(|o| o as u32);
        let combined_mask = primary
            .read_key::<String>(&mut fptr, "COMBINED")
            .map(|c| matches!(c.as_str(), "Y"))
            .unwrap_or(false);

        let vis_mask = read_bool_image(&mut fptr, file, "MASK")?;

        // The noise-source indicator is optional.
        let noise_source_on = if fptr.hdu("NSON").is_ok() {
            Some(read_bool_image(&mut fptr, file, "NSON")?)
        } else {
            debug!("{} has no NSON HDU", file.display());
            None
        };

        Ok(FlagFile {
            vis_mask,
            noise_source_on,
            telescope,
            obsid,
            combined_mask,
        })
    }

    /// Write a [`FlagFile`] to disk, replacing any existing file.
    pub fn write<P: AsRef<Path>>(&self, file: P) -> Result<(), FlagFileError> {
        let file = file.as_ref();
        trace!("Writing {}", file.display());
        if file.exists() {
            std::fs::remove_file(file)?;
        }
        let mut fptr = FitsFile::create(file).open()?;

        let primary = fptr.hdu(0)?;
        if let Some(telescope) = self.telescope.as_deref() {
            primary.write_key(&mut fptr, "TELESCOP", telescope)?;
        }
        if let Some(obsid) = self.obsid {
            primary.write_key(&mut fptr, "OBSID", i64::from(obsid))?;
        }
        primary.write_key(
            &mut fptr,
            "COMBINED",
            if self.combined_mask { "Y" } else { "N" },
        )?;
        primary.write_key(
            &mut fptr,
            "SOFTWARE",
            format!(
                "Created by {} v{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ),
        )?;

        write_bool_image(&mut fptr, "MASK", self.vis_mask.view())?;
        if let Some(noise_source_on) = &self.noise_source_on {
            write_bool_image(&mut fptr, "NSON", noise_source_on.view())?;
        }

        Ok(())
    }
}

/// Read a named byte image HDU into a boolean array of the image's shape.
fn read_bool_image(
    fptr: &mut FitsFile,
    file: &Path,
    name: &'static str,
) -> Result<ArrayD<bool>, FlagFileError> {
    let hdu = fptr.hdu(name)?;
    let shape = match &hdu.info {
        HduInfo::ImageInfo { shape, .. } => shape.clone(),
        _ => {
            return Err(FlagFileError::NotAnImage {
                file: file.to_path_buf(),
                hdu: name,
            })
        }
    };
    let data: Vec<u8> = hdu.read_image(fptr)?;
    let bytes = ArrayD::from_shape_vec(IxDyn(&shape), data)?;
    Ok(bytes.mapv(|b| b != 0))
}

/// Write a boolean array as a named byte image HDU.
fn write_bool_image(
    fptr: &mut FitsFile,
    name: &str,
    mask: ArrayViewD<bool>,
) -> Result<(), FlagFileError> {
    let dim = mask.shape().to_vec();
    let image_description = ImageDescription {
        data_type: ImageType::UnsignedByte,
        dimensions: &dim,
    };
    let hdu = fptr.create_image(name, &image_description)?;
    let data: Vec<u8> = mask.iter().map(|&f| u8::from(f)).collect();
    hdu.write_image(fptr, &data)?;
    Ok(())
}
