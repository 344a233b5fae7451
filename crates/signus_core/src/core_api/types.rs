use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::header::FormatVersion;
use crate::savegame::LoadStatus;
use crate::state::GameState;

/// Header-level facts about one savegame file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotSummary {
    pub file_path: PathBuf,
    pub name: String,
    pub format: FormatVersion,
    pub format_index: i32,
    pub timestamp: i64,
}

/// Headline numbers of a loaded game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateOverview {
    pub mission: i32,
    pub difficulty: i8,
    pub map_width: i32,
    pub map_height: i32,
    pub camera_x: i32,
    pub camera_y: i32,
    pub turn_time: i32,
    pub mission_time: i32,
    pub goodlife_deads: i32,
    pub badlife_deads: i32,
    pub money_goodlife: i32,
    pub money_badlife: i32,
    pub mine_count: usize,
    pub has_visibility_mask: bool,
    pub autofire_enabled: bool,
    pub ai_target_count: usize,
}

impl From<&GameState> for StateOverview {
    fn from(state: &GameState) -> Self {
        Self {
            mission: state.mission,
            difficulty: state.difficulty,
            map_width: state.map.width,
            map_height: state.map.height,
            camera_x: state.camera.x,
            camera_y: state.camera.y,
            turn_time: state.turn_time,
            mission_time: state.mission_time,
            goodlife_deads: state.goodlife_deads,
            badlife_deads: state.badlife_deads,
            money_goodlife: state.money_goodlife,
            money_badlife: state.money_badlife,
            mine_count: state.mines.len(),
            has_visibility_mask: state.badlife_visibility.is_some(),
            autofire_enabled: state.autofire.enabled,
            ai_target_count: state.ai.targets.len(),
        }
    }
}

/// Everything `SaveStore::inspect_full` learns from a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inspection {
    pub summary: SlotSummary,
    pub state: StateOverview,
    pub status: LoadStatus,
}
