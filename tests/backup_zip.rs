use gradebookd::{backup, db, GradeStore};
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

#[test]
fn zip_export_and_import_roundtrip() {
    let workspace = temp_dir("gradebook-backup-src");
    let workspace2 = temp_dir("gradebook-backup-dst");
    let out_dir = temp_dir("gradebook-backup-out");

    let store = GradeStore::open(&workspace).expect("open store");
    store.add_grade("Alice", "Math", 95.0).expect("add");
    store.add_grade("Alice", "Science", 85.0).expect("add");
    let expected_report = store.build_report().expect("report");
    store.close().expect("close");

    let bundle_path = out_dir.join("workspace.gradebook.zip");
    let export = backup::export_workspace_bundle(&workspace, &bundle_path).expect("export bundle");
    assert_eq!(export.bundle_format, backup::BUNDLE_FORMAT_V1);
    assert_eq!(export.entry_count, 3);
    assert_eq!(export.db_sha256.len(), 64);

    let f = File::open(&bundle_path).expect("open bundle");
    let mut archive = zip::ZipArchive::new(f).expect("open zip archive");
    let mut manifest = String::new();
    archive
        .by_name("manifest.json")
        .expect("manifest entry")
        .read_to_string(&mut manifest)
        .expect("read manifest");
    assert!(manifest.contains(backup::BUNDLE_FORMAT_V1));
    assert!(manifest.contains(&export.db_sha256));
    archive
        .by_name("db/student_grades.db")
        .expect("database entry in bundle");

    let import = backup::import_workspace_bundle(&bundle_path, &workspace2).expect("import bundle");
    assert_eq!(import.bundle_format_detected, backup::BUNDLE_FORMAT_V1);

    let restored = GradeStore::open(&workspace2).expect("open restored store");
    assert_eq!(restored.build_report().expect("report"), expected_report);
    restored.close().expect("close");

    let _ = std::fs::remove_dir_all(workspace);
    let _ = std::fs::remove_dir_all(workspace2);
    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn tampered_bundle_is_rejected_and_workspace_untouched() {
    let out_dir = temp_dir("gradebook-backup-tamper");
    let workspace = temp_dir("gradebook-backup-tamper-dst");
    let existing = b"existing-db-bytes";
    std::fs::write(workspace.join(db::DB_FILE_NAME), existing).expect("write existing db");

    let bundle_path = out_dir.join("tampered.zip");
    {
        let f = File::create(&bundle_path).expect("create bundle");
        let mut zip = zip::ZipWriter::new(f);
        let opts = FileOptions::default();
        zip.start_file("manifest.json", opts).expect("manifest");
        let manifest = serde_json::json!({
            "format": backup::BUNDLE_FORMAT_V1,
            "dbSha256": "00".repeat(32),
        });
        zip.write_all(manifest.to_string().as_bytes())
            .expect("write manifest");
        zip.start_file("db/student_grades.db", opts).expect("db entry");
        zip.write_all(b"not the promised bytes").expect("write db");
        zip.finish().expect("finish");
    }

    let e = backup::import_workspace_bundle(&bundle_path, &workspace).expect_err("checksum");
    assert!(e.to_string().contains("checksum mismatch"), "{e:#}");
    let kept = std::fs::read(workspace.join(db::DB_FILE_NAME)).expect("read kept db");
    assert_eq!(kept, existing);

    let _ = std::fs::remove_dir_all(out_dir);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn unknown_bundle_format_is_rejected() {
    let out_dir = temp_dir("gradebook-backup-format");
    let workspace = temp_dir("gradebook-backup-format-dst");

    let bundle_path = out_dir.join("other.zip");
    {
        let f = File::create(&bundle_path).expect("create bundle");
        let mut zip = zip::ZipWriter::new(f);
        zip.start_file("manifest.json", FileOptions::default())
            .expect("manifest");
        zip.write_all(br#"{"format":"someone-elses-v9"}"#)
            .expect("write manifest");
        zip.finish().expect("finish");
    }

    let e = backup::import_workspace_bundle(&bundle_path, &workspace).expect_err("format");
    assert!(e.to_string().contains("unsupported bundle format"));

    let _ = std::fs::remove_dir_all(out_dir);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn raw_sqlite_import_is_supported() {
    let src_workspace = temp_dir("gradebook-backup-raw-src");
    let workspace = temp_dir("gradebook-backup-raw-dst");

    let store = GradeStore::open(&src_workspace).expect("open store");
    store.add_grade("Bob", "Math", 55.0).expect("add");
    store.close().expect("close");

    let raw = src_workspace.join(db::DB_FILE_NAME);
    let import = backup::import_workspace_bundle(&raw, &workspace).expect("import raw sqlite");
    assert_eq!(import.bundle_format_detected, backup::RAW_SQLITE_FORMAT);

    let restored = GradeStore::open(&workspace).expect("open restored");
    let all = restored.all_grades().expect("all");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Bob");
    drop(restored);

    let _ = std::fs::remove_dir_all(src_workspace);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn export_without_database_fails() {
    let workspace = temp_dir("gradebook-backup-missing");
    let e = backup::export_workspace_bundle(&workspace, &workspace.join("out.zip"))
        .expect_err("no db");
    assert!(e.to_string().contains("workspace database not found"));
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn non_database_file_is_rejected_and_records_survive() {
    let workspace = temp_dir("gradebook-backup-notes");
    let out_dir = temp_dir("gradebook-backup-notes-src");

    let store = GradeStore::open(&workspace).expect("open store");
    store.add_grade("Alice", "Math", 95.0).expect("add");
    store.close().expect("close");

    let notes = out_dir.join("notes.txt");
    std::fs::write(&notes, "remember to grade the essays\n").expect("write notes");

    let e = backup::import_workspace_bundle(&notes, &workspace).expect_err("text file");
    assert!(format!("{e:#}").contains("is not a gradebook database"), "{e:#}");
    assert!(!workspace
        .join(format!("{}.importing", db::DB_FILE_NAME))
        .exists());

    let reopened = GradeStore::open(&workspace).expect("reopen store");
    let all = reopened.all_grades().expect("all");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Alice");
    reopened.close().expect("close");

    let _ = std::fs::remove_dir_all(workspace);
    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn sqlite_file_without_grades_table_is_rejected() {
    let workspace = temp_dir("gradebook-backup-foreign");
    let out_dir = temp_dir("gradebook-backup-foreign-src");

    let store = GradeStore::open(&workspace).expect("open store");
    store.add_grade("Bob", "Math", 55.0).expect("add");
    store.close().expect("close");

    let foreign = out_dir.join("other.sqlite3");
    {
        let conn = rusqlite::Connection::open(&foreign).expect("open foreign db");
        conn.execute("CREATE TABLE notes(id INTEGER PRIMARY KEY, body TEXT)", [])
            .expect("create notes");
    }

    let e = backup::import_workspace_bundle(&foreign, &workspace).expect_err("foreign db");
    assert!(format!("{e:#}").contains("grades table missing column"), "{e:#}");

    let reopened = GradeStore::open(&workspace).expect("reopen store");
    assert_eq!(reopened.record_count().expect("count"), 1);
    drop(reopened);

    let _ = std::fs::remove_dir_all(workspace);
    let _ = std::fs::remove_dir_all(out_dir);
}
