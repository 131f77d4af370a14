// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Lays the channels of a nebula over each other.  Each channel is
//! rendered on its own and the results are summed; channels whose
//! bands overlap simply add up, which is how palettes blend.

use crate::channels::ColorChannel;
use crate::errors::NebulaError;
use crate::escape::MandelPoint;
use crate::histogram::ChannelRenderer;

/// A channel renderer and the list of channels to run it over.
#[derive(Clone, Debug)]
pub struct NebulaCompositor {
    renderer: ChannelRenderer,
    channels: Vec<ColorChannel>,
}

impl NebulaCompositor {
    /// Checks every channel before accepting it.
    pub fn new(
        renderer: ChannelRenderer,
        channels: Vec<ColorChannel>,
    ) -> Result<Self, NebulaError> {
        for channel in &channels {
            channel.check()?;
        }
        Ok(NebulaCompositor { renderer, channels })
    }

    /// The channels, in render order.
    pub fn channels(&self) -> &[ColorChannel] {
        &self.channels
    }

    /// How many of `points` fall in each channel's band.
    pub fn channel_counts(&self, points: &[MandelPoint]) -> Vec<usize> {
        self.channels
            .iter()
            .map(|channel| points.iter().filter(|p| channel.contains(p)).count())
            .collect()
    }

    /// Render every channel and sum them into one `side * side * 3`
    /// frame.
    pub fn compose(&self, points: &[MandelPoint]) -> Result<Vec<f64>, NebulaError> {
        let mut frame = vec![0.0; self.renderer.area.len() * 3];
        for channel in &self.channels {
            let layer = self.renderer.render(channel, points)?;
            for (total, value) in frame.iter_mut().zip(layer) {
                *total += value;
            }
        }
        Ok(frame)
    }
}
