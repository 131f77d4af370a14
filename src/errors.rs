// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The one error type the renderer produces.  Image I/O lives outside
//! the core and reports through `failure::Error` instead.

use failure::Fail;

/// Everything that can go wrong while configuring or running a render.
#[derive(Debug, Fail, PartialEq)]
pub enum NebulaError {
    /// An interpolation was asked to map out of a range whose two
    /// ends are the same number.
    #[fail(display = "cannot interpolate out of the degenerate range [{}, {}]", start, end)]
    DivisionByZero {
        /// Start of the source range.
        start: f64,
        /// End of the source range.
        end: f64,
    },

    /// A window on the complex plane is inverted, empty, or not finite.
    #[fail(
        display = "the {} range [{}, {}] must be finite and its end must be above its start",
        axis, start, end
    )]
    BadWindow {
        /// Which window and axis was rejected.
        axis: &'static str,
        /// Start of the rejected range.
        start: f64,
        /// End of the rejected range.
        end: f64,
    },

    /// A scalar parameter is out of its legal range.
    #[fail(display = "bad configuration: {}", _0)]
    BadConfig(String),

    /// One of the scoped worker threads panicked mid-pass.
    #[fail(display = "a worker thread panicked during the pass")]
    WorkerPanicked,
}
