// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Colour channels.  A Nebulabrot is three (or more) Buddhabrots laid
//! over each other, each one built only from orbits that escaped
//! within a particular band of iteration counts, and each tinted with
//! its own colour.  Fast escapers trace the broad cloud; slow ones
//! trace the fine filaments near the set's edge.

use std::ops::Range;

use crate::errors::NebulaError;
use crate::escape::MandelPoint;
use crate::ranges::RangeMapper;

/// Upper bound of the reference "fast" band.
pub const LOW_BAND: usize = 50;
/// Upper bound of the reference "medium" band.
pub const MEDIUM_BAND: usize = 500;

/// An iteration band and the red, green and blue weights its
/// normalized histogram is spread over.  The band is half-open: a
/// point belongs to it when `start <= iterations < end`.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorChannel {
    /// The iteration counts this channel collects.
    pub iterations: Range<usize>,
    /// Red weight, non-negative.
    pub red: f64,
    /// Green weight, non-negative.
    pub green: f64,
    /// Blue weight, non-negative.
    pub blue: f64,
}

impl ColorChannel {
    /// Constructor.  Call `check()` before rendering with it.
    pub fn new(iterations: Range<usize>, red: f64, green: f64, blue: f64) -> Self {
        ColorChannel {
            iterations,
            red,
            green,
            blue,
        }
    }

    /// Rejects inverted bands and negative or non-finite weights.  An
    /// empty band is allowed; it just renders black.
    pub fn check(&self) -> Result<(), NebulaError> {
        if self.iterations.start > self.iterations.end {
            return Err(NebulaError::BadConfig(format!(
                "channel band {}..{} is inverted",
                self.iterations.start, self.iterations.end
            )));
        }
        for &(name, weight) in [("red", self.red), ("green", self.green), ("blue", self.blue)].iter()
        {
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(NebulaError::BadConfig(format!(
                    "channel {}..{} has a {} weight of {}",
                    self.iterations.start, self.iterations.end, name, weight
                )));
            }
        }
        Ok(())
    }

    /// True if the point escaped within this channel's band.
    #[inline]
    pub fn contains(&self, point: &MandelPoint) -> bool {
        self.iterations.start <= point.iterations && point.iterations < self.iterations.end
    }

    /// Spreads one normalized value over the three weights: the value
    /// is mapped independently into `[0, red]`, `[0, green]` and
    /// `[0, blue]`.
    pub fn spread(&self, value: f64) -> [f64; 3] {
        [
            RangeMapper::from_unit((0.0, self.red)).map(value),
            RangeMapper::from_unit((0.0, self.green)).map(value),
            RangeMapper::from_unit((0.0, self.blue)).map(value),
        ]
    }
}

/// The classic palette: fast escapers in blue, medium in green, slow
/// in red.  The bands are clipped to `limit`, so a short limit simply
/// empties the upper channels.
pub fn reference_channels(limit: usize) -> Vec<ColorChannel> {
    let low = LOW_BAND.min(limit);
    let medium = MEDIUM_BAND.min(limit);
    vec![
        ColorChannel::new(0..low, 0.0, 0.0, 1.0),
        ColorChannel::new(low..medium, 0.0, 1.0, 0.0),
        ColorChannel::new(medium..limit, 1.0, 0.0, 0.0),
    ]
}
