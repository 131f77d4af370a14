// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The parameters of a render.  Fixed at startup; nothing here
//! changes once the driver is running.

use crate::channels::{reference_channels, ColorChannel};
use crate::errors::NebulaError;
use crate::escape::EscapeEvaluator;
use crate::planes::{check_window, RenderArea};

/// Reference image side, in pixels.
pub const DEFAULT_SIDE: usize = 1024;
/// Reference number of samples drawn per pass.
pub const DEFAULT_BATCH: usize = 4_194_304;
/// Reference iteration limit.
pub const DEFAULT_LIMIT: usize = 4096;
/// Reference escape radius.
pub const DEFAULT_RADIUS: f64 = 16.0;

/// Everything the driver needs to know.
#[derive(Clone, Debug, PartialEq)]
pub struct NebulaConfig {
    /// Width and height of the output, in pixels.
    pub side: usize,
    /// Real range of the view window.
    pub view_x: (f64, f64),
    /// Imaginary range of the view window.
    pub view_y: (f64, f64),
    /// Real range samples are drawn from.
    pub compute_x: (f64, f64),
    /// Imaginary range samples are drawn from.
    pub compute_y: (f64, f64),
    /// Samples per pass.
    pub batch_size: usize,
    /// Iteration limit.
    pub limit: usize,
    /// Escape radius.
    pub radius: f64,
    /// Colour channels, rendered in order and summed.
    pub channels: Vec<ColorChannel>,
    /// Worker threads per pass.
    pub threads: usize,
    /// Seed for the sampler.  `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for NebulaConfig {
    fn default() -> Self {
        NebulaConfig {
            side: DEFAULT_SIDE,
            view_x: (-2.0, 1.0),
            view_y: (-1.5, 1.5),
            compute_x: (-2.5, 1.5),
            compute_y: (-2.0, 2.0),
            batch_size: DEFAULT_BATCH,
            limit: DEFAULT_LIMIT,
            radius: DEFAULT_RADIUS,
            channels: reference_channels(DEFAULT_LIMIT),
            threads: num_cpus::get(),
            seed: None,
        }
    }
}

impl NebulaConfig {
    /// Check every parameter, reporting the first problem found.
    pub fn validate(&self) -> Result<(), NebulaError> {
        self.area()?;
        self.evaluator()?;
        check_window("compute real", self.compute_x)?;
        check_window("compute imaginary", self.compute_y)?;
        if self.batch_size == 0 {
            return Err(NebulaError::BadConfig(
                "each pass needs at least one sample".to_string(),
            ));
        }
        if self.threads == 0 {
            return Err(NebulaError::BadConfig(
                "at least one thread is required".to_string(),
            ));
        }
        if self.channels.is_empty() {
            return Err(NebulaError::BadConfig(
                "at least one colour channel is required".to_string(),
            ));
        }
        for channel in &self.channels {
            channel.check()?;
        }
        Ok(())
    }

    /// The output grid and view window.
    pub fn area(&self) -> Result<RenderArea, NebulaError> {
        RenderArea::new(self.side, self.view_x, self.view_y)
    }

    /// The escape test.
    pub fn evaluator(&self) -> Result<EscapeEvaluator, NebulaError> {
        EscapeEvaluator::new(self.limit, self.radius)
    }
}
