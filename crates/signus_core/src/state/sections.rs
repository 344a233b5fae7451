use std::io::{self, Read, Seek, Write};

use crate::header::FormatVersion;
use crate::stream::{LittleEndianReader, LittleEndianWriter};
use crate::types::{MAX_MAP_SIDE, MAX_UNITS};

// --- Map ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapData {
    pub width: i32,
    pub height: i32,
    /// Terrain tile per cell, row-major.
    pub terrain: Vec<u8>,
    /// Elevation level per cell, row-major.
    pub elevation: Vec<u8>,
}

impl MapData {
    pub fn new(width: i32, height: i32) -> Self {
        let cells = cell_count(width, height).unwrap_or(0);
        Self {
            width,
            height,
            terrain: vec![0; cells],
            elevation: vec![0; cells],
        }
    }

    pub fn cells(&self) -> usize {
        cell_count(self.width, self.height).unwrap_or(0)
    }

    pub fn read<R: Read + Seek>(r: &mut LittleEndianReader<R>) -> io::Result<Self> {
        let width = r.read_i32()?;
        let height = r.read_i32()?;
        let cells = cell_count(width, height).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("map size {width}x{height} outside 1..={MAX_MAP_SIDE}"),
            )
        })?;

        let terrain = r.read_bytes(cells)?;
        let elevation = r.read_bytes(cells)?;
        Ok(Self {
            width,
            height,
            terrain,
            elevation,
        })
    }

    pub fn write<W: Write + Seek>(&self, w: &mut LittleEndianWriter<W>) -> io::Result<()> {
        let cells = cell_count(self.width, self.height).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "map size {}x{} outside 1..={MAX_MAP_SIDE}",
                    self.width, self.height
                ),
            )
        })?;
        expect_len("terrain layer", self.terrain.len(), cells)?;
        expect_len("elevation layer", self.elevation.len(), cells)?;

        w.write_i32(self.width)?;
        w.write_i32(self.height)?;
        w.write_bytes(&self.terrain)?;
        w.write_bytes(&self.elevation)
    }
}

fn cell_count(width: i32, height: i32) -> Option<usize> {
    let side = 1..=MAX_MAP_SIDE;
    if !side.contains(&width) || !side.contains(&height) {
        return None;
    }
    Some(width as usize * height as usize)
}

pub(crate) fn expect_len(what: &str, actual: usize, expected: usize) -> io::Result<()> {
    if actual != expected {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{what} has {actual} entries, expected {expected}"),
        ));
    }
    Ok(())
}

pub(crate) fn read_count<R: Read + Seek>(
    r: &mut LittleEndianReader<R>,
    what: &str,
    max: usize,
) -> io::Result<usize> {
    let raw = r.read_i32()?;
    match usize::try_from(raw) {
        Ok(n) if n <= max => Ok(n),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{what} count {raw} outside 0..={max}"),
        )),
    }
}

pub(crate) fn write_count<W: Write + Seek>(
    w: &mut LittleEndianWriter<W>,
    what: &str,
    n: usize,
    max: usize,
) -> io::Result<()> {
    if n > max {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{what} count {n} exceeds {max}"),
        ));
    }
    w.write_i32(n as i32)
}

// --- Camera / mines ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapPos {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mine {
    pub x: i32,
    pub y: i32,
    pub party: i32,
}

// --- Autofire ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutofireConfig {
    pub enabled: bool,
    /// Units that return fire automatically during the enemy turn.
    pub units: Vec<i32>,
}

impl AutofireConfig {
    pub fn read<R: Read + Seek>(r: &mut LittleEndianReader<R>) -> io::Result<Self> {
        let enabled = r.read_i8()? != 0;
        let count = read_count(r, "autofire unit", MAX_UNITS)?;
        let mut units = Vec::with_capacity(count);
        for _ in 0..count {
            units.push(r.read_i32()?);
        }
        Ok(Self { enabled, units })
    }

    pub fn write<W: Write + Seek>(&self, w: &mut LittleEndianWriter<W>) -> io::Result<()> {
        w.write_i8(i8::from(self.enabled))?;
        write_count(w, "autofire unit", self.units.len(), MAX_UNITS)?;
        for &unit in &self.units {
            w.write_i32(unit)?;
        }
        Ok(())
    }
}

// --- Artificial intelligence ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiTarget {
    pub unit: i32,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiState {
    pub mission_phase: i32,
    /// Not stored by the legacy format; reads as 0 there.
    pub alarm_level: i32,
    pub targets: Vec<AiTarget>,
}

impl AiState {
    pub fn read<R: Read + Seek>(
        r: &mut LittleEndianReader<R>,
        format: FormatVersion,
    ) -> io::Result<Self> {
        match format {
            FormatVersion::Legacy => Self::read_legacy(r),
            FormatVersion::Gpl0 => Self::read_current(r),
        }
    }

    fn read_legacy<R: Read + Seek>(r: &mut LittleEndianReader<R>) -> io::Result<Self> {
        let mission_phase = r.read_i32()?;
        let targets = read_targets(r)?;
        Ok(Self {
            mission_phase,
            alarm_level: 0,
            targets,
        })
    }

    fn read_current<R: Read + Seek>(r: &mut LittleEndianReader<R>) -> io::Result<Self> {
        let mission_phase = r.read_i32()?;
        let alarm_level = r.read_i32()?;
        let targets = read_targets(r)?;
        Ok(Self {
            mission_phase,
            alarm_level,
            targets,
        })
    }

    pub fn write<W: Write + Seek>(&self, w: &mut LittleEndianWriter<W>) -> io::Result<()> {
        w.write_i32(self.mission_phase)?;
        w.write_i32(self.alarm_level)?;
        write_count(w, "AI target", self.targets.len(), MAX_UNITS)?;
        for target in &self.targets {
            w.write_i32(target.unit)?;
            w.write_i32(target.x)?;
            w.write_i32(target.y)?;
        }
        Ok(())
    }
}

fn read_targets<R: Read + Seek>(r: &mut LittleEndianReader<R>) -> io::Result<Vec<AiTarget>> {
    let count = read_count(r, "AI target", MAX_UNITS)?;
    let mut targets = Vec::with_capacity(count);
    for _ in 0..count {
        targets.push(AiTarget {
            unit: r.read_i32()?,
            x: r.read_i32()?,
            y: r.read_i32()?,
        });
    }
    Ok(targets)
}
