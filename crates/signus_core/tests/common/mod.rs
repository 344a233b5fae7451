#![allow(dead_code)]

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use signus_core::draw_lock::DrawLock;
use signus_core::savegame::write_savegame;
use signus_core::state::{AiState, AiTarget, AutofireConfig, GameState, MapData, MapPos, Mine};
use signus_core::stream::LittleEndianWriter;
use signus_core::thumbnail::Thumbnail;
use signus_core::types::{SELECTION_HISTORY_LEN, STAMP_SIZE};

pub fn sample_state() -> GameState {
    let mut map = MapData::new(12, 9);
    for (i, cell) in map.terrain.iter_mut().enumerate() {
        *cell = (i % 7) as u8;
    }
    for (i, cell) in map.elevation.iter_mut().enumerate() {
        *cell = (i % 3) as u8;
    }

    let mut state = GameState::new(map);
    state.camera = MapPos { x: 4, y: 2 };
    state.turn_time = 17;
    state.mission_time = 1_234;
    state.mission = 6;
    state.difficulty = 2;
    state.allowed_badlife = 3;
    state.badlife_visibility = Some((0..108u8).collect());
    state.selection_history = (0..SELECTION_HISTORY_LEN as i32).map(|i| i * 3 - 1).collect();
    state.goodlife_deads = 11;
    state.badlife_deads = 42;
    state.time_reserve = 5;
    state.mines = vec![
        Mine { x: 1, y: 1, party: 0 },
        Mine { x: 7, y: 3, party: 1 },
    ];
    state.money_goodlife = 15_000;
    state.money_badlife = -20;
    state.autofire = AutofireConfig {
        enabled: true,
        units: vec![3, 9, 120],
    };
    state.ai = AiState {
        mission_phase: 2,
        alarm_level: 4,
        targets: vec![
            AiTarget { unit: 3, x: 5, y: 6 },
            AiTarget { unit: 9, x: 0, y: 8 },
        ],
    };
    state
}

pub fn stamp_with(value: u8) -> Thumbnail {
    Thumbnail::from_pixels(vec![value; STAMP_SIZE]).expect("stamp size")
}

pub fn encode_save(name: &str, timestamp: i64, state: &GameState) -> Vec<u8> {
    let mut w = LittleEndianWriter::new(Cursor::new(Vec::new()));
    write_savegame(&mut w, name, timestamp, &stamp_with(9), state, &DrawLock::new())
        .expect("savegame should encode");
    w.into_inner().into_inner()
}

pub fn write_save(dir: &Path, file_name: &str, name: &str, timestamp: i64) -> PathBuf {
    let path = dir.join(file_name);
    fs::write(&path, encode_save(name, timestamp, &sample_state())).expect("write fixture");
    path
}

/// Legacy header: "SIGNUS SAVE" magic, KEYBCS2 name, 32-bit timestamp.
pub fn legacy_header(raw_name: &[u8], timestamp: i32) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"SIGNUS SAVE\0");
    let mut name = raw_name.to_vec();
    name.resize(64, 0);
    bytes.extend_from_slice(&name);
    bytes.extend_from_slice(&timestamp.to_le_bytes());
    bytes
}

/// Whole legacy savegame for `state`. The legacy state section differs from
/// the current one in two places: a retired i32 before the AI block, and an
/// AI block without the alarm level.
pub fn encode_legacy_save(raw_name: &[u8], timestamp: i32, state: &GameState) -> Vec<u8> {
    let current = encode_save("x", 0, state);
    let current_ai_len = 12 + 12 * state.ai.targets.len();
    let state_start = 12 + 64 + 8 + STAMP_SIZE;
    let ai_start = current.len() - current_ai_len;

    let mut bytes = legacy_header(raw_name, timestamp);
    bytes.extend_from_slice(&[9u8; STAMP_SIZE]);
    bytes.extend_from_slice(&current[state_start..ai_start]);
    bytes.extend_from_slice(&7i32.to_le_bytes());
    bytes.extend_from_slice(&state.ai.mission_phase.to_le_bytes());
    bytes.extend_from_slice(&(state.ai.targets.len() as i32).to_le_bytes());
    for target in &state.ai.targets {
        bytes.extend_from_slice(&target.unit.to_le_bytes());
        bytes.extend_from_slice(&target.x.to_le_bytes());
        bytes.extend_from_slice(&target.y.to_le_bytes());
    }
    bytes
}

/// A slot file holding only a current-format header. Enough for a catalog
/// scan, which never reads past it.
pub fn write_header_only(dir: &Path, file_name: &str, name: &str, timestamp: i64) -> PathBuf {
    let mut w = LittleEndianWriter::new(Cursor::new(Vec::new()));
    signus_core::header::write_header(&mut w, name, timestamp).expect("header should encode");
    let path = dir.join(file_name);
    fs::write(&path, w.into_inner().into_inner()).expect("write fixture");
    path
}
