// Savegame layout constants
pub const MAGIC_LEN: usize = 12;
pub const NAME_FIELD_LEN: usize = 64;
pub const NAME_LIMIT: usize = NAME_FIELD_LEN - 1;

pub const STAMP_WIDTH: usize = 504 / 2;
pub const STAMP_HEIGHT: usize = 420 / 2;
pub const STAMP_SIZE: usize = STAMP_WIDTH * STAMP_HEIGHT; // 52,920 bytes
pub const PLACEHOLDER_STAMP: &str = "newsave";

// Save directory conventions
pub const SLOT_PREFIX: &str = "savegame";
pub const MAX_SLOT_NUMBER: u16 = 999;
pub const MAX_CATALOG_ENTRIES: usize = 1000;
pub const DEFAULT_NEW_SAVE_LABEL: &str = "New save";

// Game state limits. Counts read from a file are checked against these
// before anything is allocated.
pub const MAX_MAP_SIDE: i32 = 1024;
pub const MAX_MINES: usize = 1024;
pub const MAX_UNITS: usize = 512;
pub const SELECTION_HISTORY_LEN: usize = 256;

// The render loop is quiesced by stacking this many draw locks.
pub const SAVE_LOCK_DEPTH: usize = 4;
