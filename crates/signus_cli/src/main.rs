use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;
use signus_core::catalog::{CatalogConfig, CatalogMode, ListCursor};
use signus_core::core_api::{CoreError, SaveStore};
use signus_core::draw_lock::DrawLock;
use signus_core::savegame::LoadStatus;
use signus_core::state::{GameState, MapData, NullView};
use signus_core::thumbnail::{self, Thumbnail};
use signus_render::{
    JsonStyle, TextStyle, render_catalog_json, render_catalog_text, render_inspection_json,
    render_inspection_text,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the save slots of a directory, newest first
    List {
        #[arg(long, value_name = "DIR")]
        save_dir: Option<PathBuf>,
        /// Reserve index 0 for the next new save, as the save dialog does
        #[arg(long)]
        save_mode: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show header, load status and state overview of one savegame
    Info {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Export the slot preview as a binary PGM image
    Thumbnail {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[arg(long, value_name = "OUT.pgm")]
        output: PathBuf,
    },
    /// Delete the save slot at a load-list index
    Delete {
        index: usize,
        #[arg(long, value_name = "DIR")]
        save_dir: Option<PathBuf>,
    },
    /// Load a savegame and write it back in the current format
    Resave {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[arg(long, value_name = "OUT")]
        output: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::List {
            save_dir,
            save_mode,
            json,
        } => list(save_dir, save_mode, json),
        Command::Info { path, json } => info(&path, json),
        Command::Thumbnail { path, output } => export_thumbnail(&path, &output),
        Command::Delete { index, save_dir } => delete(index, save_dir),
        Command::Resave { path, output, name } => resave(&path, &output, name),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn list(save_dir: Option<PathBuf>, save_mode: bool, json: bool) {
    let store = open_store(save_dir);
    let mode = if save_mode {
        CatalogMode::Save
    } else {
        CatalogMode::Load
    };
    let catalog = store.open_catalog(mode).unwrap_or_else(|e| fail(e));

    if json {
        print_json(&render_catalog_json(&catalog, JsonStyle::CanonicalV1));
    } else {
        print!("{}", render_catalog_text(&catalog, TextStyle::Listing));
    }
}

fn info(path: &Path, json: bool) {
    let store = store_for_file(path);
    let inspection = store.inspect_full(path).unwrap_or_else(|e| fail(e));

    if json {
        print_json(&render_inspection_json(&inspection, JsonStyle::CanonicalV1));
    } else {
        print!("{}", render_inspection_text(&inspection, TextStyle::Listing));
    }
}

fn export_thumbnail(path: &Path, output: &Path) {
    let stamp = match thumbnail::read_from_file(path) {
        Ok(Some(stamp)) => stamp,
        Ok(None) => {
            eprintln!("Error reading {}: unrecognized savegame format", path.display());
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error reading {}: {e}", path.display());
            process::exit(1);
        }
    };

    fs::write(output, encode_pgm(&stamp)).unwrap_or_else(|e| {
        eprintln!("Error writing {}: {e}", output.display());
        process::exit(1);
    });
    println!("Wrote thumbnail to {}", output.display());
}

fn delete(index: usize, save_dir: Option<PathBuf>) {
    let store = open_store(save_dir);
    let mut catalog = store
        .open_catalog(CatalogMode::Load)
        .unwrap_or_else(|e| fail(e));
    let mut cursor = ListCursor::new(catalog.len());
    cursor.current = index;

    let removed = store
        .delete(&mut catalog, &mut cursor)
        .unwrap_or_else(|e| fail(e));
    println!(
        "Deleted \"{}\" ({})",
        removed.display_name,
        removed.file_path.display()
    );
}

fn resave(path: &Path, output: &Path, name: Option<String>) {
    let store = store_for_file(path);
    let mut state = GameState::new(MapData::new(1, 1));
    let report = store
        .load(path, &mut state, &mut NullView)
        .unwrap_or_else(|e| fail(e));

    if let LoadStatus::Truncated { position, len } = report.status {
        eprintln!(
            "Error: {} ends at byte {len} inside the game state (reader at {position}); refusing to rewrite a partial game",
            path.display()
        );
        process::exit(1);
    }
    if !report.status.is_clean() {
        warn!(path = %path.display(), "rewriting a savegame whose size did not match");
    }

    let stamp = match thumbnail::read_from_file(path) {
        Ok(Some(stamp)) => stamp,
        _ => Thumbnail::blank(),
    };
    let name = name.unwrap_or_else(|| report.header.display_name());

    store
        .save(output, &name, &state, &stamp, &DrawLock::new())
        .unwrap_or_else(|e| fail(e));
    println!("Wrote {} as \"{name}\"", output.display());
}

fn open_store(save_dir: Option<PathBuf>) -> SaveStore {
    let config = match save_dir {
        Some(dir) => CatalogConfig::new(dir),
        None => CatalogConfig::from_env().unwrap_or_else(|e| {
            eprintln!("Error: {}", e.message);
            eprintln!("  or pass --save-dir <DIR>");
            process::exit(2);
        }),
    };
    SaveStore::new(config)
}

fn store_for_file(path: &Path) -> SaveStore {
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    SaveStore::new(CatalogConfig::new(dir))
}

/// Binary greymap of the raw palette indices.
fn encode_pgm(stamp: &Thumbnail) -> Vec<u8> {
    let header = format!("P5\n{} {}\n255\n", Thumbnail::WIDTH, Thumbnail::HEIGHT);
    let mut bytes = Vec::with_capacity(header.len() + stamp.pixels().len());
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(stamp.pixels());
    bytes
}

fn print_json(value: &JsonValue) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}

fn fail(e: CoreError) -> ! {
    eprintln!("Error: {}", e.message);
    process::exit(1);
}
