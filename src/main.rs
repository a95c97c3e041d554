// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The main sirflag binary.

use clap::Parser;

use sirflag::cli::Sirflag;

fn main() {
    // Don't return a Result from main; that would print the debug
    // representation of any error. Print the display representation instead.
    if let Err(e) = Sirflag::parse().run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
