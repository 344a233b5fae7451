use std::io::{self, Read, Seek, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keybcs2::keybcs2_to_utf8;
use crate::stream::{LittleEndianReader, LittleEndianWriter};
use crate::types::{MAGIC_LEN, NAME_FIELD_LEN, NAME_LIMIT};

/// Recognized magic strings. The index is the format version, so new
/// formats may only ever be appended.
pub const MAGIC_LIST: [&[u8]; 2] = [b"SIGNUS SAVE", b"SIGNUS GPL0"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormatVersion {
    /// First commercial release: KEYBCS2 name, 32-bit timestamp.
    Legacy,
    /// GPL release: UTF-8 name, 64-bit timestamp.
    Gpl0,
}

impl FormatVersion {
    pub const CURRENT: Self = Self::Gpl0;
    pub const UNRECOGNIZED_INDEX: i32 = -1;

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Legacy),
            1 => Some(Self::Gpl0),
            _ => None,
        }
    }

    pub fn index(self) -> i32 {
        match self {
            Self::Legacy => 0,
            Self::Gpl0 => 1,
        }
    }

    pub fn magic(self) -> &'static [u8] {
        MAGIC_LIST[self.index() as usize]
    }
}

/// Look a magic field up in [`MAGIC_LIST`]. Only the bytes before the first
/// NUL take part in the comparison.
pub fn detect_format(magic: &[u8]) -> Option<FormatVersion> {
    let end = magic.iter().position(|&b| b == 0).unwrap_or(magic.len());
    let magic = &magic[..end];

    MAGIC_LIST
        .iter()
        .position(|&known| known == magic)
        .and_then(FormatVersion::from_index)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveHeader {
    pub magic: [u8; MAGIC_LEN],
    pub format: FormatVersion,
    /// Name bytes up to the terminating NUL, in the encoding of `format`.
    pub raw_name: Vec<u8>,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

impl SaveHeader {
    pub fn display_name(&self) -> String {
        match self.format {
            FormatVersion::Legacy => keybcs2_to_utf8(&self.raw_name),
            FormatVersion::Gpl0 => String::from_utf8_lossy(&self.raw_name).into_owned(),
        }
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// Byte length of the header as stored on disk.
    pub fn encoded_len(&self) -> usize {
        encoded_len(self.format)
    }
}

pub fn encoded_len(format: FormatVersion) -> usize {
    let timestamp = match format {
        FormatVersion::Legacy => 4,
        FormatVersion::Gpl0 => 8,
    };
    MAGIC_LEN + NAME_FIELD_LEN + timestamp
}

/// Outcome of reading a header. Nothing past the magic is read for an
/// unrecognized file, so only the magic is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderProbe {
    Recognized(SaveHeader),
    Unrecognized { magic: [u8; MAGIC_LEN] },
}

impl HeaderProbe {
    pub fn format_index(&self) -> i32 {
        match self {
            Self::Recognized(header) => header.format.index(),
            Self::Unrecognized { .. } => FormatVersion::UNRECOGNIZED_INDEX,
        }
    }

    pub fn magic(&self) -> &[u8; MAGIC_LEN] {
        match self {
            Self::Recognized(header) => &header.magic,
            Self::Unrecognized { magic } => magic,
        }
    }

    pub fn recognized(self) -> Option<SaveHeader> {
        match self {
            Self::Recognized(header) => Some(header),
            Self::Unrecognized { .. } => None,
        }
    }
}

pub fn read_header<R: Read + Seek>(r: &mut LittleEndianReader<R>) -> io::Result<HeaderProbe> {
    let magic: [u8; MAGIC_LEN] = r.read_array()?;
    let Some(format) = detect_format(&magic) else {
        return Ok(HeaderProbe::Unrecognized { magic });
    };

    let raw_name = r.read_fixed_cstr(NAME_FIELD_LEN)?;
    let timestamp = match format {
        FormatVersion::Legacy => i64::from(r.read_i32()?),
        FormatVersion::Gpl0 => r.read_i64()?,
    };

    Ok(HeaderProbe::Recognized(SaveHeader {
        magic,
        format,
        raw_name,
        timestamp,
    }))
}

/// Write a header in the current format. The legacy layout is never written.
pub fn write_header<W: Write + Seek>(
    w: &mut LittleEndianWriter<W>,
    name: &str,
    timestamp: i64,
) -> io::Result<()> {
    w.write_padded(FormatVersion::CURRENT.magic(), MAGIC_LEN)?;
    w.write_padded(truncate_name(name).as_bytes(), NAME_FIELD_LEN)?;
    w.write_i64(timestamp)
}

pub fn write_header_now<W: Write + Seek>(
    w: &mut LittleEndianWriter<W>,
    name: &str,
) -> io::Result<i64> {
    let timestamp = Utc::now().timestamp();
    write_header(w, name, timestamp)?;
    Ok(timestamp)
}

/// Cut `name` to the name field limit without splitting a UTF-8 sequence.
pub fn truncate_name(name: &str) -> &str {
    if name.len() <= NAME_LIMIT {
        return name;
    }

    let mut end = NAME_LIMIT;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}
