#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Nebulabrot renderer
//!
//! The Buddhabrot (and the Nebulabrot) are variants of the Mandelbrot
//! set that explore the orbits of points rather than the points
//! themselves.  The Mandelbrot takes a point on the complex plane and
//! repeatedly squares it and adds it back, measuring how quickly that
//! number goes to infinity.  Each of those steps produces a new
//! complex number, which is itself a coordinate on the complex
//! plane.  By mapping every such coordinate to the nearest integral
//! pixel and incrementing that pixel by one, we plot the orbits of
//! the points that escape.  That density plot is a Buddhabrot.
//!
//! A Nebulabrot does this several times over, once per colour
//! channel, each time keeping only the orbits that escaped within a
//! given band of iteration counts, and lays the channels on top of
//! each other.
//!
//! Samples are drawn at random, so any one pass is noisy.  The driver
//! runs pass after pass and sums them, like a long exposure, writing
//! out the image as it improves.

pub mod channels;
pub mod compositor;
pub mod config;
pub mod driver;
pub mod errors;
pub mod escape;
pub mod histogram;
pub mod output;
pub mod planes;
pub mod ranges;

pub use channels::{reference_channels, ColorChannel};
pub use compositor::NebulaCompositor;
pub use config::NebulaConfig;
pub use driver::{run, Accumulator, Frame, PassReport};
pub use errors::NebulaError;
pub use escape::{trace, ComplexPoint, EscapeEvaluator, MandelPoint};
pub use histogram::{ChannelRenderer, Histogram};
pub use output::ImageSink;
pub use planes::{pixel_to_plane, plane_to_pixel, Pixel, RenderArea};
pub use ranges::{remap, RangeMapper};
