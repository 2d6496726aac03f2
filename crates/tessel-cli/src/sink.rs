//! Writes PPM previews of the initial and final partition states.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tessel_engine::{FrameSink, FrameStage, PartitionView};
use tracing::debug;

use crate::ppm::Raster;

/// A [`FrameSink`] writing one PPM file per partition per stage.
///
/// Files are named `{partition}{name}` inside the output directory, so
/// partition 3's initial preview with the default names is
/// `3initial.ppm`. Per-step frames are not requested.
#[derive(Clone, Debug)]
pub struct PpmSink {
    out_dir: PathBuf,
    initial: String,
    final_name: String,
    written: usize,
}

impl PpmSink {
    /// Write into `out_dir` using the given initial and final file names.
    pub fn new(out_dir: impl Into<PathBuf>, initial: impl Into<String>, final_name: impl Into<String>) -> Self {
        Self {
            out_dir: out_dir.into(),
            initial: initial.into(),
            final_name: final_name.into(),
            written: 0,
        }
    }

    /// The output directory.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Number of files written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Where a frame for `view` at `stage` is written, if anywhere.
    pub fn path_for(&self, stage: FrameStage, view: &PartitionView<'_>) -> Option<PathBuf> {
        let name = match stage {
            FrameStage::Initial => &self.initial,
            FrameStage::Final => &self.final_name,
            FrameStage::Step(_) => return None,
        };
        Some(self.out_dir.join(format!("{}{}", view.id, name)))
    }
}

impl FrameSink for PpmSink {
    fn frame(&mut self, stage: FrameStage, view: &PartitionView<'_>) -> io::Result<()> {
        let Some(path) = self.path_for(stage, view) else {
            return Ok(());
        };
        let raster = Raster::from_view(view, view.bounds.width());
        let mut out = BufWriter::new(File::create(&path)?);
        write!(out, "{raster}")?;
        out.flush()?;
        self.written += 1;
        debug!(partition = %view.id, path = %path.display(), "wrote preview");
        Ok(())
    }
}
