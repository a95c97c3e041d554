// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading and writing flag files.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
/// Error type associated with flag files.
pub enum FlagFileError {
    /// An HDU that should have been an image wasn't one.
    #[error("HDU '{hdu}' in {file} isn't an image")]
    NotAnImage { file: PathBuf, hdu: &'static str },

    #[error(transparent)]
    Fits(#[from] fitsio::errors::Error),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
