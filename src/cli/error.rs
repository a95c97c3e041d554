// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all sirflag-related errors. This should be the *only*
//! error enum that is publicly visible.

use thiserror::Error;

use crate::{io::FlagFileError, params::FlagError};

/// The *only* publicly visible error from sirflag.
#[derive(Error, Debug)]
pub enum SirflagError {
    /// An error related to flagging or flag files.
    #[error("{0}")]
    Flag(String),

    /// An error related to argument files.
    #[error("{0}")]
    ArgFile(String),

    /// A generic error.
    #[error("{0}")]
    Generic(String),
}

impl From<FlagError> for SirflagError {
    fn from(e: FlagError) -> Self {
        Self::Flag(e.to_string())
    }
}

impl From<FlagFileError> for SirflagError {
    fn from(e: FlagFileError) -> Self {
        Self::Flag(e.to_string())
    }
}

impl From<std::io::Error> for SirflagError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
