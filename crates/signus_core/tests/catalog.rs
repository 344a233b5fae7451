mod common;

use std::fs;
use std::io::ErrorKind;

use signus_core::catalog::{CatalogConfig, CatalogMode, ListCursor, SaveCatalog};
use tempfile::tempdir;

use common::{legacy_header, write_header_only};

fn names(catalog: &SaveCatalog) -> Vec<&str> {
    catalog.entries().iter().map(|e| e.display_name.as_str()).collect()
}

#[test]
fn load_mode_lists_newest_first() {
    let dir = tempdir().expect("tempdir");
    write_header_only(dir.path(), "savegame.000", "ten", 10);
    write_header_only(dir.path(), "savegame.001", "thirty", 30);
    write_header_only(dir.path(), "savegame.002", "twenty", 20);

    let catalog = SaveCatalog::scan(&CatalogConfig::new(dir.path()), CatalogMode::Load).expect("scan");

    assert_eq!(names(&catalog), ["thirty", "twenty", "ten"]);
    let stamps: Vec<i64> = catalog.entries().iter().map(|e| e.saved_at()).collect();
    assert_eq!(stamps, [30, 20, 10]);
    assert!(!catalog.is_new_save_slot(0));
}

#[test]
fn save_mode_reserves_first_free_slot() {
    let dir = tempdir().expect("tempdir");
    for n in 0..6 {
        write_header_only(dir.path(), &format!("savegame.{n:03}"), &format!("s{n}"), 100 + n);
    }

    let catalog = SaveCatalog::scan(&CatalogConfig::new(dir.path()), CatalogMode::Save).expect("scan");

    assert_eq!(catalog.len(), 7);
    let target = catalog.entry(0).expect("new-save slot");
    assert_eq!(target.display_name, "New save");
    assert_eq!(target.file_path, dir.path().join("savegame.006"));
    assert!(catalog.is_new_save_slot(0));
    assert_eq!(names(&catalog)[1..], ["s5", "s4", "s3", "s2", "s1", "s0"]);
}

#[test]
fn save_mode_fills_gaps_first() {
    let dir = tempdir().expect("tempdir");
    write_header_only(dir.path(), "savegame.000", "a", 1);
    write_header_only(dir.path(), "savegame.002", "b", 2);

    let catalog = SaveCatalog::scan(&CatalogConfig::new(dir.path()), CatalogMode::Save).expect("scan");
    assert_eq!(catalog.entries()[0].file_path, dir.path().join("savegame.001"));
}

#[test]
fn unrecognized_slot_file_still_blocks_its_number() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("savegame.000"), b"NOT A SAVE AT ALL, JUST BYTES").expect("write");

    let catalog = SaveCatalog::scan(&CatalogConfig::new(dir.path()), CatalogMode::Save).expect("scan");
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.entries()[0].file_path, dir.path().join("savegame.001"));
}

#[test]
fn full_directory_reuses_oldest_slot() {
    let dir = tempdir().expect("tempdir");
    write_header_only(dir.path(), "savegame.000", "middle", 50);
    write_header_only(dir.path(), "savegame.001", "oldest", 10);
    write_header_only(dir.path(), "savegame.002", "newest", 90);

    let mut config = CatalogConfig::new(dir.path());
    config.max_slot_number = 2;
    let catalog = SaveCatalog::scan(&config, CatalogMode::Save).expect("scan");

    assert_eq!(catalog.len(), 3);
    assert_eq!(names(&catalog), ["oldest", "newest", "middle"]);
    assert_eq!(catalog.entries()[0].file_path, dir.path().join("savegame.001"));
    assert!(catalog.is_new_save_slot(0));
}

#[test]
fn full_directory_without_saves_is_storage_full() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("savegame.000"), b"junk").expect("write");

    let mut config = CatalogConfig::new(dir.path());
    config.max_slot_number = 0;
    let err = SaveCatalog::scan(&config, CatalogMode::Save).expect_err("nothing to reuse");
    assert_eq!(err.kind(), ErrorKind::StorageFull);
}

#[test]
fn unrelated_and_unknown_files_are_skipped() {
    let dir = tempdir().expect("tempdir");
    write_header_only(dir.path(), "savegame.004", "kept", 4);
    write_header_only(dir.path(), "notes.txt", "not a slot", 5);
    fs::write(dir.path().join("savegame.bak"), b"SIGNUS XXXX\0trailing").expect("write");
    fs::write(dir.path().join("savegame.005"), b"SIG").expect("write");
    fs::create_dir(dir.path().join("savegame.dir")).expect("mkdir");

    let catalog = SaveCatalog::scan(&CatalogConfig::new(dir.path()), CatalogMode::Load).expect("scan");
    assert_eq!(names(&catalog), ["kept"]);
}

#[test]
fn legacy_slots_are_listed_with_transcoded_names() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("savegame.000"),
        legacy_header(&[0x97, b't', b'o', b'k'], 700),
    )
    .expect("write");
    write_header_only(dir.path(), "savegame.001", "new", 800);

    let catalog = SaveCatalog::scan(&CatalogConfig::new(dir.path()), CatalogMode::Load).expect("scan");
    assert_eq!(names(&catalog), ["new", "Útok"]);
}

#[test]
fn missing_directory_gives_empty_catalog() {
    let dir = tempdir().expect("tempdir");
    let config = CatalogConfig::new(dir.path().join("does-not-exist"));

    let catalog = SaveCatalog::scan(&config, CatalogMode::Load).expect("scan");
    assert!(catalog.is_empty());

    let catalog = SaveCatalog::scan(&config, CatalogMode::Save).expect("scan");
    assert_eq!(catalog.len(), 1);
    assert_eq!(
        catalog.entries()[0].file_path,
        dir.path().join("does-not-exist").join("savegame.000")
    );
}

#[test]
fn entry_limit_caps_the_listing() {
    let dir = tempdir().expect("tempdir");
    for n in 0..5 {
        write_header_only(dir.path(), &format!("savegame.{n:03}"), "x", n);
    }

    let mut config = CatalogConfig::new(dir.path());
    config.max_entries = 3;
    assert_eq!(SaveCatalog::scan(&config, CatalogMode::Load).expect("scan").len(), 3);
    assert_eq!(SaveCatalog::scan(&config, CatalogMode::Save).expect("scan").len(), 3);
}

#[test]
fn delete_removes_file_and_shifts_entries() {
    let dir = tempdir().expect("tempdir");
    let a = write_header_only(dir.path(), "savegame.000", "a", 3);
    let b = write_header_only(dir.path(), "savegame.001", "b", 2);
    let c = write_header_only(dir.path(), "savegame.002", "c", 1);

    let mut catalog = SaveCatalog::scan(&CatalogConfig::new(dir.path()), CatalogMode::Load).expect("scan");
    let before = catalog.entries().to_vec();

    let removed = catalog.delete(1).expect("delete");
    assert_eq!(removed.file_path, b);
    assert!(!b.exists());
    assert!(a.exists() && c.exists());
    assert_eq!(catalog.entries(), [before[0].clone(), before[2].clone()]);
}

#[test]
fn delete_of_vanished_file_still_drops_entry() {
    let dir = tempdir().expect("tempdir");
    let a = write_header_only(dir.path(), "savegame.000", "a", 1);

    let mut catalog = SaveCatalog::scan(&CatalogConfig::new(dir.path()), CatalogMode::Load).expect("scan");
    fs::remove_file(&a).expect("remove");

    catalog.delete(0).expect("delete");
    assert!(catalog.is_empty());
}

#[test]
fn new_save_slot_cannot_be_deleted() {
    let dir = tempdir().expect("tempdir");
    write_header_only(dir.path(), "savegame.000", "a", 1);

    let mut catalog = SaveCatalog::scan(&CatalogConfig::new(dir.path()), CatalogMode::Save).expect("scan");
    let err = catalog.delete(0).expect_err("protected");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(catalog.len(), 2);

    let err = catalog.delete(7).expect_err("out of range");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn delete_selected_moves_cursor_off_the_end() {
    let dir = tempdir().expect("tempdir");
    for n in 0..3 {
        write_header_only(dir.path(), &format!("savegame.{n:03}"), "x", n);
    }

    let mut catalog = SaveCatalog::scan(&CatalogConfig::new(dir.path()), CatalogMode::Load).expect("scan");
    let mut cursor = ListCursor::new(10);
    cursor.current = 2;

    catalog.delete_selected(&mut cursor).expect("delete");
    assert_eq!(catalog.len(), 2);
    assert_eq!(cursor.current, 1);
}

#[test]
fn rename_truncates_and_edit_prefill() {
    let dir = tempdir().expect("tempdir");
    write_header_only(dir.path(), "savegame.000", "old name", 1);

    let mut catalog = SaveCatalog::scan(&CatalogConfig::new(dir.path()), CatalogMode::Save).expect("scan");
    assert_eq!(catalog.editable_name(0).as_deref(), Some(""));
    assert_eq!(catalog.editable_name(1).as_deref(), Some("old name"));
    assert_eq!(catalog.editable_name(2), None);

    catalog.rename(1, &"n".repeat(80)).expect("rename");
    assert_eq!(catalog.entries()[1].display_name, "n".repeat(63));
    assert!(catalog.rename(5, "x").is_err());

    catalog.rename(0, "Before the assault").expect("rename new slot");
    assert_eq!(catalog.entries()[0].display_name, "Before the assault");
    assert_eq!(catalog.editable_name(0).as_deref(), Some(""));
}

#[test]
fn new_slot_avoids_names_differing_only_in_case() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("SAVEGAME.000"), b"upper").expect("write");
    fs::write(dir.path().join("SaveGame.001"), b"mixed").expect("write");

    let catalog = SaveCatalog::scan(&CatalogConfig::new(dir.path()), CatalogMode::Save).expect("scan");
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.entries()[0].file_path, dir.path().join("savegame.002"));
}

#[cfg(unix)]
#[test]
fn symlinked_slot_files_are_listed() {
    let dir = tempdir().expect("tempdir");
    let store = tempdir().expect("tempdir");
    let real = write_header_only(store.path(), "real-save", "linked", 40);
    std::os::unix::fs::symlink(&real, dir.path().join("savegame.000")).expect("symlink");
    write_header_only(dir.path(), "savegame.001", "plain", 30);

    let catalog = SaveCatalog::scan(&CatalogConfig::new(dir.path()), CatalogMode::Save).expect("scan");
    assert_eq!(names(&catalog), ["New save", "linked", "plain"]);
    assert_eq!(catalog.entries()[0].file_path, dir.path().join("savegame.002"));
}

#[test]
fn every_default_slot_taken_reuses_oldest_listed() {
    let dir = tempdir().expect("tempdir");
    for n in 0..=999i64 {
        let timestamp = if n == 500 { 1 } else { 10_000 + n };
        write_header_only(dir.path(), &format!("savegame.{n:03}"), &format!("s{n}"), timestamp);
    }

    let catalog = SaveCatalog::scan(&CatalogConfig::new(dir.path()), CatalogMode::Save).expect("scan");

    // Save mode reads at most 999 files; savegame.999 stays unlisted but
    // still blocks its number.
    assert_eq!(catalog.len(), 999);
    assert!(catalog.is_new_save_slot(0));
    assert_eq!(catalog.entries()[0].file_path, dir.path().join("savegame.500"));
    assert_eq!(catalog.entries()[0].display_name, "s500");
    assert_eq!(catalog.entries()[1].display_name, "s998");
    assert!(
        catalog
            .entries()
            .iter()
            .all(|e| e.file_path != dir.path().join("savegame.999"))
    );
}
