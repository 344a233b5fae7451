pub mod sections;

use std::io::{self, Read, Seek, Write};

use crate::draw_lock::{DrawLock, DrawLockGuard};
use crate::header::FormatVersion;
use crate::stream::{LittleEndianReader, LittleEndianWriter};
use crate::types::{MAX_MINES, SAVE_LOCK_DEPTH, SELECTION_HISTORY_LEN};
use sections::{expect_len, read_count, write_count};

pub use sections::{AiState, AiTarget, AutofireConfig, MapData, MapPos, Mine};

/// Everything a savegame captures about a running mission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub map: MapData,
    pub camera: MapPos,
    pub turn_time: i32,
    pub mission_time: i32,
    pub mission: i32,
    pub difficulty: i8,
    pub allowed_badlife: i32,
    /// Cells the enemy may currently see; `map.width * map.height` bytes.
    pub badlife_visibility: Option<Vec<u8>>,
    /// Always [`SELECTION_HISTORY_LEN`] entries.
    pub selection_history: Vec<i32>,
    pub goodlife_deads: i32,
    pub badlife_deads: i32,
    pub time_reserve: i32,
    pub mines: Vec<Mine>,
    pub money_goodlife: i32,
    pub money_badlife: i32,
    pub autofire: AutofireConfig,
    pub ai: AiState,
}

impl GameState {
    pub fn new(map: MapData) -> Self {
        Self {
            map,
            camera: MapPos::default(),
            turn_time: 0,
            mission_time: 0,
            mission: 0,
            difficulty: 0,
            allowed_badlife: 0,
            badlife_visibility: None,
            selection_history: vec![0; SELECTION_HISTORY_LEN],
            goodlife_deads: 0,
            badlife_deads: 0,
            time_reserve: 0,
            mines: Vec::new(),
            money_goodlife: 0,
            money_badlife: 0,
            autofire: AutofireConfig::default(),
            ai: AiState::default(),
        }
    }
}

/// Hooks into the live engine that a load has to drive.
pub trait GameView {
    fn scroll_to(&mut self, _x: i32, _y: i32) {}
    fn redraw_map(&mut self) {}
}

/// A view with no engine behind it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl GameView for NullView {}

/// Serialize `state`. The render loop is held off through `lock` until the
/// last field is written.
pub fn save_state<W: Write + Seek>(
    w: &mut LittleEndianWriter<W>,
    state: &GameState,
    lock: &DrawLock,
) -> io::Result<()> {
    let _guard = DrawLockGuard::acquire(lock, SAVE_LOCK_DEPTH);

    state.map.write(w)?;

    w.write_i32(state.camera.x)?;
    w.write_i32(state.camera.y)?;
    w.write_i32(state.turn_time)?;
    w.write_i32(state.mission_time)?;
    w.write_i32(state.mission)?;
    w.write_i8(state.difficulty)?;

    w.write_i32(state.allowed_badlife)?;
    match &state.badlife_visibility {
        Some(mask) => {
            expect_len("visibility mask", mask.len(), state.map.cells())?;
            w.write_i32(1)?;
            w.write_bytes(mask)?;
        }
        None => w.write_i32(0)?,
    }

    expect_len(
        "selection history",
        state.selection_history.len(),
        SELECTION_HISTORY_LEN,
    )?;
    for &unit in &state.selection_history {
        w.write_i32(unit)?;
    }

    w.write_i32(state.goodlife_deads)?;
    w.write_i32(state.badlife_deads)?;
    w.write_i32(state.time_reserve)?;

    write_count(w, "mine", state.mines.len(), MAX_MINES)?;
    for mine in &state.mines {
        w.write_i32(mine.x)?;
        w.write_i32(mine.y)?;
        w.write_i32(mine.party)?;
    }

    w.write_i32(state.money_goodlife)?;
    w.write_i32(state.money_badlife)?;

    state.autofire.write(w)?;
    state.ai.write(w)
}

/// Read a state section written by `format` into `state`, field by field.
/// On error the fields read so far stay applied.
pub fn load_state<R: Read + Seek>(
    r: &mut LittleEndianReader<R>,
    state: &mut GameState,
    format: FormatVersion,
    view: &mut dyn GameView,
) -> io::Result<()> {
    state.map = MapData::read(r)?;

    let camera = MapPos {
        x: r.read_i32()?,
        y: r.read_i32()?,
    };
    state.turn_time = r.read_i32()?;
    state.mission_time = r.read_i32()?;
    state.mission = r.read_i32()?;
    state.difficulty = r.read_i8()?;
    state.camera = camera;
    view.scroll_to(camera.x, camera.y);

    state.allowed_badlife = r.read_i32()?;
    let has_visibility = r.read_i32()? != 0;
    state.badlife_visibility = None;
    if has_visibility {
        state.badlife_visibility = Some(r.read_bytes(state.map.cells())?);
    }

    let mut history = Vec::with_capacity(SELECTION_HISTORY_LEN);
    for _ in 0..SELECTION_HISTORY_LEN {
        history.push(r.read_i32()?);
    }
    state.selection_history = history;

    state.goodlife_deads = r.read_i32()?;
    state.badlife_deads = r.read_i32()?;
    state.time_reserve = r.read_i32()?;

    let mine_count = read_count(r, "mine", MAX_MINES)?;
    let mut mines = Vec::with_capacity(mine_count);
    for _ in 0..mine_count {
        mines.push(Mine {
            x: r.read_i32()?,
            y: r.read_i32()?,
            party: r.read_i32()?,
        });
    }
    state.mines = mines;

    state.money_goodlife = r.read_i32()?;
    state.money_badlife = r.read_i32()?;

    state.autofire = AutofireConfig::read(r)?;
    skip_retired_fields(r, format)?;
    state.ai = AiState::read(r, format)?;

    Ok(())
}

/// Fields that older formats stored but that no longer carry meaning.
fn skip_retired_fields<R: Read + Seek>(
    r: &mut LittleEndianReader<R>,
    format: FormatVersion,
) -> io::Result<()> {
    match format {
        // Remaining-saves counter of the commercial release.
        FormatVersion::Legacy => r.read_i32().map(drop),
        FormatVersion::Gpl0 => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, ErrorKind};

    use super::{GameState, GameView, MapData, NullView, load_state, save_state};
    use crate::draw_lock::DrawLock;
    use crate::header::FormatVersion;
    use crate::stream::{LittleEndianReader, LittleEndianWriter};

    struct Recorder {
        scrolls: Vec<(i32, i32)>,
    }

    impl GameView for Recorder {
        fn scroll_to(&mut self, x: i32, y: i32) {
            self.scrolls.push((x, y));
        }
    }

    fn encode(state: &GameState) -> Vec<u8> {
        let mut w = LittleEndianWriter::new(Cursor::new(Vec::new()));
        save_state(&mut w, state, &DrawLock::new()).expect("state should encode");
        w.into_inner().into_inner()
    }

    #[test]
    fn load_scrolls_to_camera() {
        let mut state = GameState::new(MapData::new(4, 4));
        state.camera.x = 3;
        state.camera.y = 1;
        let bytes = encode(&state);

        let mut loaded = GameState::new(MapData::new(1, 1));
        let mut view = Recorder { scrolls: Vec::new() };
        let mut r = LittleEndianReader::new(Cursor::new(bytes));
        load_state(&mut r, &mut loaded, FormatVersion::Gpl0, &mut view).expect("load");

        assert_eq!(view.scrolls, vec![(3, 1)]);
    }

    #[test]
    fn load_drops_previous_visibility_mask() {
        let state = GameState::new(MapData::new(2, 2));
        let bytes = encode(&state);

        let mut loaded = GameState::new(MapData::new(2, 2));
        loaded.badlife_visibility = Some(vec![1; 4]);
        let mut r = LittleEndianReader::new(Cursor::new(bytes));
        load_state(&mut r, &mut loaded, FormatVersion::Gpl0, &mut NullView).expect("load");

        assert_eq!(loaded.badlife_visibility, None);
    }

    #[test]
    fn save_rejects_mismatched_visibility_mask() {
        let mut state = GameState::new(MapData::new(3, 3));
        state.badlife_visibility = Some(vec![0; 8]);

        let mut w = LittleEndianWriter::new(Cursor::new(Vec::new()));
        let err = save_state(&mut w, &state, &DrawLock::new()).expect_err("mask too short");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn lock_is_released_after_failed_save() {
        let mut state = GameState::new(MapData::new(3, 3));
        state.selection_history.pop();
        let lock = DrawLock::new();

        let mut w = LittleEndianWriter::new(Cursor::new(Vec::new()));
        assert!(save_state(&mut w, &state, &lock).is_err());
        assert!(!lock.is_locked());
    }
}
