use std::io::{self, Read, Seek, Write};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::draw_lock::DrawLock;
use crate::header::{HeaderProbe, SaveHeader, read_header, write_header, write_header_now};
use crate::state::{GameState, GameView, load_state, save_state};
use crate::stream::{LittleEndianReader, LittleEndianWriter};
use crate::thumbnail::Thumbnail;
use crate::types::{MAGIC_LEN, STAMP_SIZE};

/// Payload of the `InvalidData` error returned for a file whose magic is
/// not in the format list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized savegame format {:?}", String::from_utf8_lossy(.magic).trim_end_matches('\0'))]
pub struct UnrecognizedFormat {
    pub magic: [u8; MAGIC_LEN],
}

impl UnrecognizedFormat {
    pub fn find(e: &io::Error) -> Option<&Self> {
        e.get_ref().and_then(|inner| inner.downcast_ref::<Self>())
    }
}

/// How well the bytes of a loaded file matched what the loader consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadStatus {
    Clean,
    /// Loading finished but stopped short of, or ran past, the end of file.
    SizeMismatch { position: u64, len: u64 },
    /// The file ended inside the state section. Fields read before the end
    /// were kept.
    Truncated { position: u64, len: u64 },
}

impl LoadStatus {
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub header: SaveHeader,
    pub status: LoadStatus,
}

/// Write a complete savegame: header, thumbnail, state.
pub fn write_savegame<W: Write + Seek>(
    w: &mut LittleEndianWriter<W>,
    name: &str,
    timestamp: i64,
    thumbnail: &Thumbnail,
    state: &GameState,
    lock: &DrawLock,
) -> io::Result<()> {
    write_header(w, name, timestamp)?;
    write_body(w, thumbnail, state, lock)
}

/// [`write_savegame`] stamped with the current time, which is returned.
pub fn write_savegame_now<W: Write + Seek>(
    w: &mut LittleEndianWriter<W>,
    name: &str,
    thumbnail: &Thumbnail,
    state: &GameState,
    lock: &DrawLock,
) -> io::Result<i64> {
    let timestamp = write_header_now(w, name)?;
    write_body(w, thumbnail, state, lock)?;
    Ok(timestamp)
}

fn write_body<W: Write + Seek>(
    w: &mut LittleEndianWriter<W>,
    thumbnail: &Thumbnail,
    state: &GameState,
    lock: &DrawLock,
) -> io::Result<()> {
    thumbnail.write(w)?;
    save_state(w, state, lock)?;
    w.flush()
}

/// Read a complete savegame into `state`. `file` only names the source in
/// diagnostics.
pub fn read_savegame<R: Read + Seek>(
    r: &mut LittleEndianReader<R>,
    state: &mut GameState,
    view: &mut dyn GameView,
    file: Option<&Path>,
) -> io::Result<LoadReport> {
    let header = match read_header(r)? {
        HeaderProbe::Recognized(header) => header,
        HeaderProbe::Unrecognized { magic } => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                UnrecognizedFormat { magic },
            ));
        }
    };

    r.skip(STAMP_SIZE as i64)?;

    let status = match load_state(r, state, header.format, view) {
        Ok(()) => {
            view.redraw_map();
            validate_load_status(r.position()?, r.len()?, file)
        }
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            view.redraw_map();
            let status = LoadStatus::Truncated {
                position: r.position()?,
                len: r.len()?,
            };
            warn_mismatch(file);
            status
        }
        Err(e) => return Err(e),
    };

    Ok(LoadReport { header, status })
}

/// Compare the final read position with the stream size. A mismatch is
/// reported, never treated as a failure.
pub fn validate_load_status(position: u64, len: u64, file: Option<&Path>) -> LoadStatus {
    if position == len {
        return LoadStatus::Clean;
    }
    warn_mismatch(file);
    LoadStatus::SizeMismatch { position, len }
}

fn warn_mismatch(file: Option<&Path>) {
    warn!("savegame size mismatch, some game state data may be invalid");
    if let Some(file) = file {
        warn!(
            "please send the savegame file {} to the game developers",
            file.display()
        );
    }
}
