//! Fixed 10-byte object records grouped by superchunk.
//!
//! | byte | content                                   |
//! |------|-------------------------------------------|
//! | 0    | record length (always 10)                 |
//! | 1    | `(chunk_x % 16) << 4 \| local_x`          |
//! | 2    | `(chunk_y % 16) << 4 \| local_y`          |
//! | 3    | `shape & 0xff`                            |
//! | 4    | `(shape >> 8) & 0x3 \| frame << 2`        |
//! | 5    | `lift & 0x0f`                             |
//! | 6    | quality                                   |
//! | 7-9  | reserved, zero                            |

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::export::ExportError;
use crate::geo::{ChunkCoord, CHUNK_SIZE};
use crate::world::{PlacedObject, TileGrid};

pub const RECORD_LEN: usize = 10;

/// Superchunks per row of the index.
const SUPERCHUNK_STRIDE: u32 = 12;
const STREAM_PREFIX: &str = "u7ireg";

pub fn encode_record(object: &PlacedObject) -> [u8; RECORD_LEN] {
    let chunk = object.tile.chunk();
    let (local_x, local_y) = object.tile.local();

    let mut record = [0u8; RECORD_LEN];
    record[0] = RECORD_LEN as u8;
    record[1] = (((chunk.cx % CHUNK_SIZE) << 4) | local_x) as u8;
    record[2] = (((chunk.cy % CHUNK_SIZE) << 4) | local_y) as u8;
    record[3] = (object.shape & 0xFF) as u8;
    record[4] = ((object.shape >> 8) & 0x3) as u8 | (object.frame << 2);
    record[5] = object.lift & 0x0F;
    record[6] = object.quality;
    record
}

pub fn superchunk_index(chunk: ChunkCoord) -> u32 {
    (chunk.cy / CHUNK_SIZE) * SUPERCHUNK_STRIDE + chunk.cx / CHUNK_SIZE
}

pub fn stream_name(index: u32) -> String {
    format!("{STREAM_PREFIX}{index:02x}")
}

/// Encoded records per superchunk, chunks in grid order and objects in
/// insertion order. Superchunks without objects are absent.
pub fn group_records(grid: &TileGrid) -> BTreeMap<u32, Vec<u8>> {
    let mut streams: BTreeMap<u32, Vec<u8>> = BTreeMap::new();
    for (coord, chunk) in grid.chunks() {
        if chunk.objects().is_empty() {
            continue;
        }
        let stream = streams.entry(superchunk_index(coord)).or_default();
        for object in chunk.objects() {
            stream.extend_from_slice(&encode_record(object));
        }
    }
    streams
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Each write replaces the stream set: streams are truncated and stale
    /// streams from earlier runs are removed.
    #[default]
    Overwrite,
    /// Each write grows the stream.
    Append,
}

/// Writes superchunk streams into one directory.
#[derive(Debug, Clone)]
pub struct IregWriter {
    dir: PathBuf,
    mode: WriteMode,
}

impl IregWriter {
    pub fn new(dir: impl Into<PathBuf>, mode: WriteMode) -> Self {
        Self {
            dir: dir.into(),
            mode,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, index: u32) -> PathBuf {
        self.dir.join(stream_name(index))
    }

    /// Write every superchunk stream of `grid`; returns the streams written.
    pub fn write(&self, grid: &TileGrid) -> Result<usize, ExportError> {
        fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;

        let streams = group_records(grid);
        if self.mode == WriteMode::Overwrite {
            self.remove_stale(&streams)?;
        }
        for (index, bytes) in &streams {
            let path = self.path_for(*index);
            self.write_stream(&path, bytes).map_err(io_err(&path))?;
            debug!(
                stream = %stream_name(*index),
                records = bytes.len() / RECORD_LEN,
                "wrote object stream"
            );
        }
        Ok(streams.len())
    }

    /// Delete streams in the directory that this run does not produce.
    fn remove_stale(&self, streams: &BTreeMap<u32, Vec<u8>>) -> Result<(), ExportError> {
        let entries = fs::read_dir(&self.dir).map_err(io_err(&self.dir))?;
        for entry in entries {
            let entry = entry.map_err(io_err(&self.dir))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let is_stream = name.starts_with(STREAM_PREFIX);
            let current = streams.keys().any(|index| stream_name(*index) == name);
            if is_stream && !current && entry.path().is_file() {
                let path = entry.path();
                fs::remove_file(&path).map_err(io_err(&path))?;
                debug!(stream = name, "removed stale object stream");
            }
        }
        Ok(())
    }

    fn write_stream(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut options = OpenOptions::new();
        match self.mode {
            WriteMode::Overwrite => options.write(true).create(true).truncate(true),
            WriteMode::Append => options.append(true).create(true),
        };
        let mut file = options.open(path)?;
        file.write_all(bytes)?;
        file.flush()
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError {
    let path = path.to_path_buf();
    move |source| ExportError::Io { path, source }
}
