use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::header::{FormatVersion, read_header, truncate_name};
use crate::stream::LittleEndianReader;
use crate::types::{DEFAULT_NEW_SAVE_LABEL, MAX_CATALOG_ENTRIES, MAX_SLOT_NUMBER, SLOT_PREFIX};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CatalogMode {
    Load,
    /// Index 0 is reserved for the slot the next save goes to.
    Save,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub save_dir: PathBuf,
    pub new_save_label: String,
    pub max_slot_number: u16,
    pub max_entries: usize,
}

impl CatalogConfig {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            new_save_label: DEFAULT_NEW_SAVE_LABEL.to_string(),
            max_slot_number: MAX_SLOT_NUMBER,
            max_entries: MAX_CATALOG_ENTRIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveSlotEntry {
    pub display_name: String,
    pub file_path: PathBuf,
    /// Negated save time, so ascending order lists the newest save first.
    pub sort_timestamp: i64,
}

impl SaveSlotEntry {
    /// Save time in seconds since the Unix epoch.
    pub fn saved_at(&self) -> i64 {
        self.sort_timestamp.saturating_neg()
    }
}

/// Selection state of the list widget showing a catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListCursor {
    pub current: usize,
    /// Index of the first visible row.
    pub scroll: usize,
    pub visible_rows: usize,
}

impl ListCursor {
    pub fn new(visible_rows: usize) -> Self {
        Self {
            current: 0,
            scroll: 0,
            visible_rows,
        }
    }

    /// Bring the cursor back in bounds after the list shrank to `len` rows.
    pub fn after_removal(&mut self, len: usize) {
        if self.current >= len {
            self.current = len.saturating_sub(1);
        }
        if self.visible_rows < len && self.scroll + self.visible_rows > len {
            self.scroll -= 1;
        }
    }
}

/// Save slots found in one directory scan, kept for one dialog session.
#[derive(Debug, Clone)]
pub struct SaveCatalog {
    mode: CatalogMode,
    entries: Vec<SaveSlotEntry>,
}

impl SaveCatalog {
    pub fn scan(config: &CatalogConfig, mode: CatalogMode) -> io::Result<Self> {
        let reserved = usize::from(mode == CatalogMode::Save);
        let capacity = config.max_entries.saturating_sub(reserved);
        let listing = list_save_dir(&config.save_dir)?;

        let mut entries = Vec::new();
        for path in &listing.slots {
            if entries.len() >= capacity {
                debug!(limit = config.max_entries, "catalog full, ignoring remaining files");
                break;
            }
            if let Some(entry) = read_entry(path) {
                entries.push(entry);
            }
        }
        entries.sort_by_key(|e| e.sort_timestamp);

        if mode == CatalogMode::Save {
            let target = match free_slot_path(config, &listing.names) {
                Some(file_path) => SaveSlotEntry {
                    display_name: config.new_save_label.clone(),
                    file_path,
                    sort_timestamp: 0,
                },
                None => {
                    let oldest = entries.pop().ok_or_else(|| {
                        io::Error::new(
                            io::ErrorKind::StorageFull,
                            format!(
                                "no free save slot in {} and no existing slot to reuse",
                                config.save_dir.display()
                            ),
                        )
                    })?;
                    info!(path = %oldest.file_path.display(), "all save slots taken, reusing oldest");
                    oldest
                }
            };
            entries.insert(0, target);
        }

        Ok(Self { mode, entries })
    }

    pub fn mode(&self) -> CatalogMode {
        self.mode
    }

    pub fn entries(&self) -> &[SaveSlotEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&SaveSlotEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_new_save_slot(&self, index: usize) -> bool {
        self.mode == CatalogMode::Save && index == 0
    }

    /// Delete the slot file and drop the entry. A file that is already gone
    /// still drops the entry; any other I/O error leaves the catalog as is.
    pub fn delete(&mut self, index: usize) -> io::Result<SaveSlotEntry> {
        self.check_index(index)?;
        if self.is_new_save_slot(index) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "the new-save slot cannot be deleted",
            ));
        }

        let path = &self.entries[index].file_path;
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "slot file already removed");
            }
            Err(e) => return Err(e),
        }

        let removed = self.entries.remove(index);
        info!(path = %removed.file_path.display(), "deleted save slot");
        Ok(removed)
    }

    /// Delete the entry under the cursor and keep the cursor in bounds.
    pub fn delete_selected(&mut self, cursor: &mut ListCursor) -> io::Result<SaveSlotEntry> {
        let removed = self.delete(cursor.current)?;
        cursor.after_removal(self.entries.len());
        Ok(removed)
    }

    /// Change the name the next save to this slot will carry. Nothing is
    /// written to disk.
    pub fn rename(&mut self, index: usize, name: &str) -> io::Result<()> {
        self.check_index(index)?;
        self.entries[index].display_name = truncate_name(name).to_string();
        Ok(())
    }

    /// Text to prefill the name prompt with.
    pub fn editable_name(&self, index: usize) -> Option<String> {
        let entry = self.entries.get(index)?;
        if self.is_new_save_slot(index) {
            return Some(String::new());
        }
        Some(truncate_name(&entry.display_name).to_string())
    }

    fn check_index(&self, index: usize) -> io::Result<()> {
        if index >= self.entries.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "slot index {index} out of range, catalog has {} entries",
                    self.entries.len()
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Default)]
struct DirListing {
    /// Regular files whose name starts with the slot prefix, by name.
    slots: Vec<PathBuf>,
    /// Every entry name in the directory, for slot name collisions.
    names: Vec<String>,
}

fn list_save_dir(dir: &Path) -> io::Result<DirListing> {
    let read_dir = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "save directory missing");
            return Ok(DirListing::default());
        }
        Err(e) => return Err(e),
    };

    let mut slots = Vec::new();
    let mut names = Vec::new();
    for dir_entry in read_dir {
        let dir_entry = match dir_entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        let name = dir_entry.file_name().to_string_lossy().into_owned();
        let path = dir_entry.path();
        // `is_file` follows symlinks.
        if name.starts_with(SLOT_PREFIX) && path.is_file() {
            slots.push(path);
        }
        names.push(name);
    }
    slots.sort();
    Ok(DirListing { slots, names })
}

fn read_entry(path: &Path) -> Option<SaveSlotEntry> {
    let probe = File::open(path).and_then(|file| {
        let mut r = LittleEndianReader::new(BufReader::new(file));
        read_header(&mut r)
    });

    let header = match probe {
        Ok(probe) => match probe.recognized() {
            Some(header) => header,
            None => {
                debug!(path = %path.display(), "skipping file with unknown format");
                return None;
            }
        },
        Err(e) => {
            debug!(path = %path.display(), error = %e, "skipping unreadable file");
            return None;
        }
    };

    if header.format == FormatVersion::Legacy {
        debug!(path = %path.display(), "legacy savegame");
    }

    Some(SaveSlotEntry {
        display_name: header.display_name(),
        file_path: path.to_path_buf(),
        sort_timestamp: header.timestamp.saturating_neg(),
    })
}

/// First `savegame.NNN` that no directory entry uses, ignoring case.
fn free_slot_path(config: &CatalogConfig, taken: &[String]) -> Option<PathBuf> {
    (0..=config.max_slot_number)
        .map(slot_file_name)
        .find(|candidate| !taken.iter().any(|t| t.eq_ignore_ascii_case(candidate)))
        .map(|name| config.save_dir.join(name))
}

pub fn slot_file_name(number: u16) -> String {
    format!("{SLOT_PREFIX}.{number:03}")
}
