use std::fmt::{self, Write as _};
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map as JsonMap, Value as JsonValue};
use signus_core::catalog::{CatalogMode, SaveCatalog, SaveSlotEntry};
use signus_core::core_api::{Inspection, SlotSummary, StateOverview};
use signus_core::header::FormatVersion;
use signus_core::savegame::LoadStatus;

const INDEX_COL_WIDTH: usize = 5;
const DATE_COL_WIDTH: usize = 22;
const NAME_COL_WIDTH: usize = 40;
const LABEL_WIDTH: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextStyle {
    #[default]
    Listing,
}

pub fn render_catalog_json(catalog: &SaveCatalog, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(catalog_json(catalog)),
    }
}

pub fn render_catalog_text(catalog: &SaveCatalog, style: TextStyle) -> String {
    match style {
        TextStyle::Listing => render_with(|out| write_catalog_listing(out, catalog)),
    }
}

pub fn render_summary_json(summary: &SlotSummary, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(summary_json(summary)),
    }
}

pub fn render_summary_text(summary: &SlotSummary, style: TextStyle) -> String {
    match style {
        TextStyle::Listing => render_with(|out| write_summary(out, summary)),
    }
}

pub fn render_inspection_json(inspection: &Inspection, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => {
            let mut out = summary_json(&inspection.summary);
            out.insert("status".to_string(), status_to_json(&inspection.status));
            out.insert("state".to_string(), overview_to_json(&inspection.state));
            JsonValue::Object(out)
        }
    }
}

pub fn render_inspection_text(inspection: &Inspection, style: TextStyle) -> String {
    match style {
        TextStyle::Listing => render_with(|out| {
            write_summary(out, &inspection.summary)?;
            write_field(out, "Load status", &describe_status(&inspection.status))?;
            writeln!(out)?;
            write_overview(out, &inspection.state)
        }),
    }
}

// Writing into a String cannot fail, so the error arm is never taken.
fn render_with(f: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    match f(&mut out) {
        Ok(()) => out,
        Err(fmt::Error) => String::new(),
    }
}

fn catalog_json(catalog: &SaveCatalog) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    out.insert(
        "mode".to_string(),
        JsonValue::String(mode_name(catalog.mode()).to_string()),
    );
    out.insert(
        "entries".to_string(),
        JsonValue::Array(
            catalog
                .entries()
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    entry_to_json(index, entry, catalog.is_new_save_slot(index))
                })
                .collect(),
        ),
    );
    out
}

fn entry_to_json(index: usize, entry: &SaveSlotEntry, new_save_slot: bool) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("index".to_string(), JsonValue::from(index));
    out.insert(
        "name".to_string(),
        JsonValue::String(entry.display_name.clone()),
    );
    out.insert("file".to_string(), path_to_json(&entry.file_path));
    out.insert("new_save_slot".to_string(), JsonValue::Bool(new_save_slot));
    let saved_at = if new_save_slot && entry.sort_timestamp == 0 {
        JsonValue::Null
    } else {
        timestamp_to_json(entry.saved_at())
    };
    out.insert("saved_at".to_string(), saved_at);
    JsonValue::Object(out)
}

fn summary_json(summary: &SlotSummary) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    out.insert("file".to_string(), path_to_json(&summary.file_path));
    out.insert("name".to_string(), JsonValue::String(summary.name.clone()));
    out.insert(
        "format".to_string(),
        JsonValue::String(format_name(summary.format).to_string()),
    );
    out.insert(
        "format_index".to_string(),
        JsonValue::from(summary.format_index),
    );
    out.insert("timestamp".to_string(), JsonValue::from(summary.timestamp));
    out.insert("saved_at".to_string(), timestamp_to_json(summary.timestamp));
    out
}

fn status_to_json(status: &LoadStatus) -> JsonValue {
    let mut out = JsonMap::new();
    let (kind, extent) = match *status {
        LoadStatus::Clean => ("clean", None),
        LoadStatus::SizeMismatch { position, len } => ("size_mismatch", Some((position, len))),
        LoadStatus::Truncated { position, len } => ("truncated", Some((position, len))),
    };
    out.insert("kind".to_string(), JsonValue::String(kind.to_string()));
    if let Some((position, len)) = extent {
        out.insert("position".to_string(), JsonValue::from(position));
        out.insert("file_len".to_string(), JsonValue::from(len));
    }
    JsonValue::Object(out)
}

fn overview_to_json(state: &StateOverview) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("mission".to_string(), JsonValue::from(state.mission));
    out.insert("difficulty".to_string(), JsonValue::from(state.difficulty));

    let mut map = JsonMap::new();
    map.insert("width".to_string(), JsonValue::from(state.map_width));
    map.insert("height".to_string(), JsonValue::from(state.map_height));
    out.insert("map".to_string(), JsonValue::Object(map));

    let mut camera = JsonMap::new();
    camera.insert("x".to_string(), JsonValue::from(state.camera_x));
    camera.insert("y".to_string(), JsonValue::from(state.camera_y));
    out.insert("camera".to_string(), JsonValue::Object(camera));

    out.insert("turn_time".to_string(), JsonValue::from(state.turn_time));
    out.insert("mission_time".to_string(), JsonValue::from(state.mission_time));

    let mut deads = JsonMap::new();
    deads.insert("goodlife".to_string(), JsonValue::from(state.goodlife_deads));
    deads.insert("badlife".to_string(), JsonValue::from(state.badlife_deads));
    out.insert("deads".to_string(), JsonValue::Object(deads));

    let mut money = JsonMap::new();
    money.insert("goodlife".to_string(), JsonValue::from(state.money_goodlife));
    money.insert("badlife".to_string(), JsonValue::from(state.money_badlife));
    out.insert("money".to_string(), JsonValue::Object(money));

    out.insert("mines".to_string(), JsonValue::from(state.mine_count));
    out.insert(
        "visibility_mask".to_string(),
        JsonValue::Bool(state.has_visibility_mask),
    );
    out.insert(
        "autofire".to_string(),
        JsonValue::Bool(state.autofire_enabled),
    );
    out.insert(
        "ai_targets".to_string(),
        JsonValue::from(state.ai_target_count),
    );
    JsonValue::Object(out)
}

fn write_catalog_listing(out: &mut String, catalog: &SaveCatalog) -> fmt::Result {
    if catalog.is_empty() {
        return writeln!(out, "No saved games.");
    }

    writeln!(
        out,
        "{:>iw$}  {:<dw$}  {:<nw$}  File",
        "#",
        "Saved",
        "Name",
        iw = INDEX_COL_WIDTH,
        dw = DATE_COL_WIDTH,
        nw = NAME_COL_WIDTH
    )?;

    for (index, entry) in catalog.entries().iter().enumerate() {
        let date = if catalog.is_new_save_slot(index) && entry.sort_timestamp == 0 {
            "(new save)".to_string()
        } else {
            format_timestamp(entry.saved_at())
        };
        let line = format!(
            "{:>iw$}  {:<dw$}  {:<nw$}  {}",
            index,
            date,
            fit_column(&entry.display_name, NAME_COL_WIDTH),
            file_label(&entry.file_path),
            iw = INDEX_COL_WIDTH,
            dw = DATE_COL_WIDTH,
            nw = NAME_COL_WIDTH
        );
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}

fn write_summary(out: &mut String, summary: &SlotSummary) -> fmt::Result {
    write_field(out, "Name", &summary.name)?;
    write_field(out, "File", &summary.file_path.display().to_string())?;
    write_field(
        out,
        "Format",
        &format!(
            "{} (version {})",
            format_name(summary.format),
            summary.format_index
        ),
    )?;
    write_field(out, "Saved", &format_timestamp(summary.timestamp))
}

fn write_overview(out: &mut String, state: &StateOverview) -> fmt::Result {
    write_field(out, "Mission", &state.mission.to_string())?;
    write_field(out, "Difficulty", &state.difficulty.to_string())?;
    write_field(
        out,
        "Map",
        &format!("{} x {}", state.map_width, state.map_height),
    )?;
    write_field(
        out,
        "Camera",
        &format!("{}, {}", state.camera_x, state.camera_y),
    )?;
    write_field(out, "Turn time", &state.turn_time.to_string())?;
    write_field(out, "Mission time", &state.mission_time.to_string())?;
    write_field(
        out,
        "Losses",
        &format!(
            "{} GoodLife, {} BadLife",
            state.goodlife_deads, state.badlife_deads
        ),
    )?;
    write_field(
        out,
        "Money",
        &format!(
            "{} GoodLife, {} BadLife",
            format_number_with_commas(i64::from(state.money_goodlife)),
            format_number_with_commas(i64::from(state.money_badlife))
        ),
    )?;
    write_field(out, "Mines", &state.mine_count.to_string())?;
    write_field(out, "Visibility mask", yes_no(state.has_visibility_mask))?;
    write_field(out, "Autofire", yes_no(state.autofire_enabled))?;
    write_field(out, "AI targets", &state.ai_target_count.to_string())
}

fn write_field(out: &mut String, label: &str, value: &str) -> fmt::Result {
    let label = format!("{label}:");
    writeln!(out, "{label:<LABEL_WIDTH$} {value}")
}

fn describe_status(status: &LoadStatus) -> String {
    match *status {
        LoadStatus::Clean => "clean".to_string(),
        LoadStatus::SizeMismatch { position, len } => {
            format!("size mismatch (stopped at byte {position} of {len})")
        }
        LoadStatus::Truncated { position, len } => {
            format!("truncated (file ends at byte {len}, reader at {position})")
        }
    }
}

fn mode_name(mode: CatalogMode) -> &'static str {
    match mode {
        CatalogMode::Load => "load",
        CatalogMode::Save => "save",
    }
}

fn format_name(format: FormatVersion) -> &'static str {
    match format {
        FormatVersion::Legacy => "legacy",
        FormatVersion::Gpl0 => "gpl0",
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn saved_at(timestamp: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp, 0)
}

fn timestamp_to_json(timestamp: i64) -> JsonValue {
    match saved_at(timestamp) {
        Some(at) => JsonValue::String(at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        None => JsonValue::Null,
    }
}

fn format_timestamp(timestamp: i64) -> String {
    match saved_at(timestamp) {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("@{timestamp}"),
    }
}

fn path_to_json(path: &Path) -> JsonValue {
    JsonValue::String(path.display().to_string())
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn fit_column(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 3 {
        return value.chars().take(width).collect();
    }

    let mut out: String = value.chars().take(width - 3).collect();
    out.push_str("...");
    out
}

fn format_number_with_commas(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        result.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}
