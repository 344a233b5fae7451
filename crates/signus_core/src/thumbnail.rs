use std::fs::File;
use std::io::{self, BufReader, Read, Seek, Write};
use std::path::Path;

use tracing::debug;

use crate::catalog::SaveCatalog;
use crate::header::read_header;
use crate::stream::{LittleEndianReader, LittleEndianWriter};
use crate::types::{PLACEHOLDER_STAMP, STAMP_HEIGHT, STAMP_SIZE, STAMP_WIDTH};

// Sampling grid of the original 504x420 preview, halved on both axes.
const SAMPLE_WIDTH: usize = STAMP_WIDTH * 2;
const SAMPLE_HEIGHT: usize = STAMP_HEIGHT * 2;

/// Palette-indexed slot preview stored after every savegame header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pixels: Vec<u8>,
}

impl Thumbnail {
    pub const WIDTH: usize = STAMP_WIDTH;
    pub const HEIGHT: usize = STAMP_HEIGHT;

    pub fn blank() -> Self {
        Self {
            pixels: vec![0; STAMP_SIZE],
        }
    }

    pub fn from_pixels(pixels: Vec<u8>) -> io::Result<Self> {
        if pixels.len() != STAMP_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("thumbnail needs {STAMP_SIZE} pixels, got {}", pixels.len()),
            ));
        }
        Ok(Self { pixels })
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x >= STAMP_WIDTH || y >= STAMP_HEIGHT {
            return None;
        }
        self.pixels.get(y * STAMP_WIDTH + x).copied()
    }

    pub fn read<R: Read + Seek>(r: &mut LittleEndianReader<R>) -> io::Result<Self> {
        Ok(Self {
            pixels: r.read_bytes(STAMP_SIZE)?,
        })
    }

    pub fn write<W: Write + Seek>(&self, w: &mut LittleEndianWriter<W>) -> io::Result<()> {
        w.write_bytes(&self.pixels)
    }
}

/// The on-screen map viewport inside an 8-bit frame buffer.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub pixels: &'a [u8],
    /// Bytes per frame buffer row.
    pub pitch: usize,
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Downsample the viewport into a thumbnail by nearest-neighbour sampling.
pub fn capture(frame: &FrameView<'_>) -> io::Result<Thumbnail> {
    let offset = |i: usize, j: usize| {
        (frame.width * i / SAMPLE_WIDTH + frame.x)
            + (frame.height * j / SAMPLE_HEIGHT + frame.y) * frame.pitch
    };

    let last = offset(SAMPLE_WIDTH - 2, SAMPLE_HEIGHT - 2);
    if frame.width == 0 || frame.height == 0 || last >= frame.pixels.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "viewport {}x{} at ({}, {}) does not fit a {}-byte frame buffer with pitch {}",
                frame.width,
                frame.height,
                frame.x,
                frame.y,
                frame.pixels.len(),
                frame.pitch
            ),
        ));
    }

    let mut pixels = Vec::with_capacity(STAMP_SIZE);
    for j in (0..SAMPLE_HEIGHT).step_by(2) {
        for i in (0..SAMPLE_WIDTH).step_by(2) {
            pixels.push(frame.pixels[offset(i, j)]);
        }
    }

    Ok(Thumbnail { pixels })
}

/// Source of built-in images, keyed by name.
pub trait ImageProvider {
    fn image(&self, name: &str) -> Option<Vec<u8>>;
}

/// Provider with no images; placeholders come out blank.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImages;

impl ImageProvider for NoImages {
    fn image(&self, _name: &str) -> Option<Vec<u8>> {
        None
    }
}

pub fn placeholder(provider: &dyn ImageProvider) -> Thumbnail {
    match provider.image(PLACEHOLDER_STAMP) {
        Some(mut pixels) if pixels.len() >= STAMP_SIZE => {
            pixels.truncate(STAMP_SIZE);
            Thumbnail { pixels }
        }
        _ => Thumbnail::blank(),
    }
}

/// Preview for catalog entry `index`. The new-save slot, missing entries and
/// files that fail to read all get the placeholder.
pub fn retrieve(catalog: &SaveCatalog, index: usize, provider: &dyn ImageProvider) -> Thumbnail {
    if catalog.is_new_save_slot(index) {
        return placeholder(provider);
    }

    let Some(entry) = catalog.entry(index) else {
        return placeholder(provider);
    };

    match read_from_file(&entry.file_path) {
        Ok(Some(thumbnail)) => thumbnail,
        Ok(None) => placeholder(provider),
        Err(e) => {
            debug!(path = %entry.file_path.display(), error = %e, "thumbnail unavailable");
            placeholder(provider)
        }
    }
}

/// Read the thumbnail of a savegame file; `None` for an unrecognized format.
pub fn read_from_file(path: &Path) -> io::Result<Option<Thumbnail>> {
    let file = File::open(path)?;
    let mut r = LittleEndianReader::new(BufReader::new(file));
    if read_header(&mut r)?.recognized().is_none() {
        return Ok(None);
    }
    Thumbnail::read(&mut r).map(Some)
}
