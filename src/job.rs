// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Job-output access for the external framework's on-disk store.
//!
//! Layout under the database root:
//!
//! ```text
//! <db_path>/<dataset>/dataset.toml
//! <db_path>/<dataset>/jobs/<job>/<stream>/<video index>.bin
//! ```
//!
//! Each `.bin` file is a binary table: a u64-LE frame count, then per frame
//! a u64-LE frame index, a u32-LE buffer length, and the raw buffer bytes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::codec::RecordReader;
use crate::config::Config;
use crate::error::{OverlayError, Result};
use crate::loader::{Decoded, LoaderRegistry};

/// Dataset metadata: video identifiers and original file paths.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetMeta {
    /// Display names, indexed by video.
    pub video_names: Vec<String>,
    /// Original video file paths, indexed by video.
    pub video_paths: Vec<PathBuf>,
}

/// Outputs of one job stream for one video.
#[derive(Debug)]
pub struct VideoOutput {
    /// Video index within the dataset.
    pub video: usize,
    /// Sampled frame indices, ascending.
    pub frames: Vec<usize>,
    /// One decoded buffer per sampled frame.
    pub buffers: Vec<Decoded>,
}

/// Handle to the on-disk job database. Passed explicitly into every load;
/// there is no process-wide singleton.
pub struct Database {
    root: PathBuf,
}

impl Database {
    /// Open the database at the configured root.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            root: config.db_path.clone(),
        }
    }

    /// Open the database at an explicit root.
    #[must_use]
    pub fn open<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Read a dataset's metadata.
    ///
    /// # Errors
    ///
    /// Returns a `JobError` if the metadata file is missing or malformed.
    pub fn dataset_meta(&self, dataset: &str) -> Result<DatasetMeta> {
        let path = self.root.join(dataset).join("dataset.toml");
        let text = fs::read_to_string(&path).map_err(|e| {
            OverlayError::JobError(format!("failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&text).map_err(|e| {
            OverlayError::JobError(format!("failed to parse {}: {e}", path.display()))
        })
    }

    /// Load one stream of a job's outputs, decoding every buffer with the
    /// registered loader for `stream`. Outputs are ordered by video index.
    ///
    /// # Errors
    ///
    /// Returns a `JobError` if the stream directory is missing, and a
    /// `DecodeError` if any buffer is malformed; either is fatal to the job
    /// load.
    pub fn load_outputs(
        &self,
        registry: &LoaderRegistry,
        dataset: &str,
        job: &str,
        stream: &str,
    ) -> Result<Vec<VideoOutput>> {
        let dir = self
            .root
            .join(dataset)
            .join("jobs")
            .join(job)
            .join(stream);
        let mut entries = collect_video_tables(&dir)?;
        entries.sort_by_key(|&(video, _)| video);

        let mut outputs = Vec::with_capacity(entries.len());
        for (video, path) in entries {
            let raw = fs::read(&path).map_err(|e| {
                OverlayError::JobError(format!("failed to read {}: {e}", path.display()))
            })?;
            let (frames, raw_buffers) = parse_stream_table(&raw)?;
            let buffers = raw_buffers
                .into_iter()
                .map(|buf| registry.decode(stream, &buf))
                .collect::<Result<Vec<_>>>()?;
            outputs.push(VideoOutput {
                video,
                frames,
                buffers,
            });
        }
        Ok(outputs)
    }
}

/// Collect `<video index>.bin` files under a stream directory.
fn collect_video_tables(dir: &Path) -> Result<Vec<(usize, PathBuf)>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        OverlayError::JobError(format!("missing job stream {}: {e}", dir.display()))
    })?;

    let mut tables = Vec::new();
    for entry in entries.filter_map(std::result::Result::ok) {
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "bin") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let video = stem.parse::<usize>().map_err(|_| {
            OverlayError::JobError(format!("non-numeric video table name {}", path.display()))
        })?;
        tables.push((video, path));
    }
    Ok(tables)
}

/// Parse one binary stream table into frame indices and raw buffers.
fn parse_stream_table(buf: &[u8]) -> Result<(Vec<usize>, Vec<Vec<u8>>)> {
    let mut reader = RecordReader::new(buf);
    let count = reader.read_u64_le()?;
    let mut frames = Vec::new();
    let mut buffers = Vec::new();
    for _ in 0..count {
        let frame = reader.read_u64_le()?;
        let len = reader.read_u32_le()? as usize;
        let bytes = reader.read_bytes(len)?;
        frames.push(usize::try_from(frame).map_err(|_| {
            OverlayError::DecodeError(format!("frame index {frame} out of range"))
        })?);
        buffers.push(bytes.to_vec());
    }
    if !reader.is_empty() {
        return Err(OverlayError::DecodeError(format!(
            "{} trailing bytes after stream table",
            reader.remaining()
        )));
    }
    Ok((frames, buffers))
}
