use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tracing::info;

use crate::catalog::{CatalogConfig, CatalogMode, ListCursor, SaveCatalog, SaveSlotEntry};
use crate::draw_lock::DrawLock;
use crate::header::{HeaderProbe, read_header};
use crate::savegame::{LoadReport, UnrecognizedFormat, read_savegame, write_savegame_now};
use crate::state::{GameState, GameView, MapData, NullView};
use crate::stream::{LittleEndianReader, LittleEndianWriter};
use crate::thumbnail::{self, ImageProvider, Thumbnail};

use super::error::{CoreError, CoreErrorCode};
use super::types::{Inspection, SlotSummary, StateOverview};

/// Save directory front end used by the load/save dialogs.
#[derive(Debug, Clone)]
pub struct SaveStore {
    config: CatalogConfig,
}

impl SaveStore {
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn open_catalog(&self, mode: CatalogMode) -> Result<SaveCatalog, CoreError> {
        SaveCatalog::scan(&self.config, mode).map_err(|e| {
            CoreError::from_io(
                &format!("failed to scan {}", self.config.save_dir.display()),
                &e,
            )
        })
    }

    /// Write `state` to `path` under `name`. Returns the stored timestamp.
    pub fn save(
        &self,
        path: &Path,
        name: &str,
        state: &GameState,
        thumbnail: &Thumbnail,
        lock: &DrawLock,
    ) -> Result<i64, CoreError> {
        let context = || format!("failed to save {}", path.display());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CoreError::from_io(&context(), &e))?;
        }

        let file = File::create(path).map_err(|e| CoreError::from_io(&context(), &e))?;
        let mut w = LittleEndianWriter::new(BufWriter::new(file));
        let timestamp = write_savegame_now(&mut w, name, thumbnail, state, lock)
            .map_err(|e| CoreError::from_io(&context(), &e))?;

        info!(path = %path.display(), name, "game saved");
        Ok(timestamp)
    }

    /// Save into catalog entry `index` under the entry's current name.
    pub fn save_to_slot(
        &self,
        catalog: &SaveCatalog,
        index: usize,
        state: &GameState,
        thumbnail: &Thumbnail,
        lock: &DrawLock,
    ) -> Result<i64, CoreError> {
        let entry = catalog.entry(index).ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::InvalidSlot,
                format!("slot index {index} out of range"),
            )
        })?;
        self.save(&entry.file_path, &entry.display_name, state, thumbnail, lock)
    }

    /// Load `path` into `state`. Size mismatches come back in the report,
    /// not as errors.
    pub fn load(
        &self,
        path: &Path,
        state: &mut GameState,
        view: &mut dyn GameView,
    ) -> Result<LoadReport, CoreError> {
        let context = format!("failed to load {}", path.display());
        let file = File::open(path).map_err(|e| CoreError::from_io(&context, &e))?;
        let mut r = LittleEndianReader::new(BufReader::new(file));

        let report = read_savegame(&mut r, state, view, Some(path)).map_err(|e| {
            if UnrecognizedFormat::find(&e).is_some() {
                CoreError::new(CoreErrorCode::UnrecognizedFormat, format!("{context}: {e}"))
            } else {
                CoreError::from_io(&context, &e)
            }
        })?;

        info!(path = %path.display(), status = ?report.status, "game loaded");
        Ok(report)
    }

    /// Read only the header of `path`.
    pub fn inspect(&self, path: &Path) -> Result<SlotSummary, CoreError> {
        let context = format!("failed to read {}", path.display());
        let file = File::open(path).map_err(|e| CoreError::from_io(&context, &e))?;
        let mut r = LittleEndianReader::new(BufReader::new(file));

        match read_header(&mut r).map_err(|e| CoreError::from_io(&context, &e))? {
            HeaderProbe::Recognized(header) => Ok(SlotSummary {
                file_path: path.to_path_buf(),
                name: header.display_name(),
                format: header.format,
                format_index: header.format.index(),
                timestamp: header.timestamp,
            }),
            HeaderProbe::Unrecognized { magic } => Err(CoreError::new(
                CoreErrorCode::UnrecognizedFormat,
                format!("{context}: {}", UnrecognizedFormat { magic }),
            )),
        }
    }

    /// Load `path` into a scratch state and summarize it.
    pub fn inspect_full(&self, path: &Path) -> Result<Inspection, CoreError> {
        let mut state = GameState::new(MapData::new(1, 1));
        let report = self.load(path, &mut state, &mut NullView)?;
        Ok(Inspection {
            summary: SlotSummary {
                file_path: path.to_path_buf(),
                name: report.header.display_name(),
                format: report.header.format,
                format_index: report.header.format.index(),
                timestamp: report.header.timestamp,
            },
            state: StateOverview::from(&state),
            status: report.status,
        })
    }

    pub fn thumbnail(
        &self,
        catalog: &SaveCatalog,
        index: usize,
        provider: &dyn ImageProvider,
    ) -> Thumbnail {
        thumbnail::retrieve(catalog, index, provider)
    }

    pub fn delete(
        &self,
        catalog: &mut SaveCatalog,
        cursor: &mut ListCursor,
    ) -> Result<SaveSlotEntry, CoreError> {
        catalog
            .delete_selected(cursor)
            .map_err(|e| CoreError::from_io("failed to delete save slot", &e))
    }
}
