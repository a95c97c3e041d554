// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Arguments for the `flag` subcommand.

use std::path::PathBuf;

use clap::Parser;
use log::debug;
use serde::{Deserialize, Serialize};

use super::SirflagError;
use crate::{
    flagging::{SirParams, DEFAULT_ETA},
    params::{FlagError, FlagParams},
};

#[derive(Debug, Clone, Default, Parser, Serialize, Deserialize)]
pub(super) struct FlagArgs {
    /// Path to the input flag file.
    #[clap(name = "INPUT_FLAG_FILE", parse(from_os_str))]
    #[serde(default)]
    input: Option<PathBuf>,

    /// Path to write the flagged result to.
    #[clap(name = "OUTPUT_FLAG_FILE", parse(from_os_str))]
    #[serde(default)]
    output: Option<PathBuf>,

    /// The aggressiveness of the SIR operator, strictly between 0 and 1.
    /// Larger values extend flagged intervals more readily. The default is
    /// 0.2.
    #[clap(short, long)]
    #[serde(default)]
    eta: Option<f64>,

    /// All of the arguments to flag may be specified in a toml or json file.
    /// Any CLI arguments override arguments set in the file.
    #[clap(long, parse(from_os_str))]
    #[serde(skip)]
    args_file: Option<PathBuf>,
}

impl FlagArgs {
    /// Consolidate command-line and file arguments into a single struct,
    /// preferring CLI arguments where both are specified.
    pub(super) fn merge(self) -> Result<FlagArgs, SirflagError> {
        if let Some(args_file) = &self.args_file {
            debug!(
                "Merging command-line arguments with {}",
                args_file.display()
            );
            let contents = std::fs::read_to_string(args_file)?;
            let file_args: FlagArgs = match args_file
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase())
                .as_deref()
            {
                Some("toml") => toml::from_str(&contents).map_err(|err| {
                    SirflagError::ArgFile(format!(
                        "Couldn't decode toml structure from {:?}:\n{err}",
                        args_file
                    ))
                })?,
                Some("json") => serde_json::from_str(&contents).map_err(|err| {
                    SirflagError::ArgFile(format!(
                        "Couldn't decode json structure from {:?}:\n{err}",
                        args_file
                    ))
                })?,
                _ => {
                    return Err(SirflagError::ArgFile(format!(
                        "Unrecognised file extension on {:?}; supported formats: toml, json",
                        args_file
                    )))
                }
            };

            Ok(FlagArgs {
                input: self.input.or(file_args.input),
                output: self.output.or(file_args.output),
                eta: self.eta.or(file_args.eta),
                args_file: None,
            })
        } else {
            Ok(self)
        }
    }

    /// Parse the arguments into parameters ready for flagging.
    pub(super) fn parse(self) -> Result<FlagParams, FlagError> {
        debug!("{:#?}", self);

        let FlagArgs {
            input,
            output,
            eta,
            args_file: _,
        } = self;

        let input = input.ok_or(FlagError::NoInput)?;
        let output = output.ok_or(FlagError::NoOutput)?;
        let eta = eta.unwrap_or(DEFAULT_ETA);
        if !(eta > 0.0 && eta < 1.0) {
            return Err(FlagError::InvalidEta { eta });
        }

        Ok(FlagParams {
            input,
            output,
            sir: SirParams { eta },
        })
    }
}
