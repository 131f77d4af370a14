// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Writes frames to disk.  Two files come out of every pass: the
//! latest image, overwritten each time, and an optional numbered
//! snapshot that is kept.

use std::path::{Path, PathBuf};

use image::ColorType;
use log::debug;

use crate::driver::Frame;

/// The file that always holds the most recent frame.
pub fn latest_path(dir: &Path) -> PathBuf {
    dir.join("nebula.png")
}

/// The snapshot file for a given pass.
pub fn snapshot_path(dir: &Path, pass: usize) -> PathBuf {
    dir.join(format!("nebula-{:06}.png", pass))
}

/// Encode a frame as an eight-bit RGB PNG.
pub fn write_rgb(path: &Path, frame: &Frame) -> Result<(), failure::Error> {
    image::save_buffer(
        path,
        &frame.pixels,
        frame.side as u32,
        frame.side as u32,
        ColorType::RGB(8),
    )?;
    debug!("wrote {}", path.display());
    Ok(())
}

/// Writes every pass into one directory.
#[derive(Clone, Debug)]
pub struct ImageSink {
    dir: PathBuf,
    snapshots: bool,
}

impl ImageSink {
    /// Frames go in `dir`; numbered snapshots only if `snapshots`.
    pub fn new<P: AsRef<Path>>(dir: P, snapshots: bool) -> Self {
        ImageSink {
            dir: dir.as_ref().to_path_buf(),
            snapshots,
        }
    }

    /// Write the latest image, then the snapshot.  The first failure
    /// is returned.
    pub fn write(&self, pass: usize, frame: &Frame) -> Result<(), failure::Error> {
        write_rgb(&latest_path(&self.dir), frame)?;
        if self.snapshots {
            write_rgb(&snapshot_path(&self.dir, pass), frame)?;
        }
        Ok(())
    }

    /// Rewrite only the latest image; used when a run is interrupted.
    pub fn flush(&self, frame: &Frame) -> Result<(), failure::Error> {
        write_rgb(&latest_path(&self.dir), frame)
    }
}
