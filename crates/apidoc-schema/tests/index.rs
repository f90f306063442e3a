use std::fs;
use std::io::Write;
use std::path::Path;

use apidoc_schema::{IndexFile, Item, SchemaError, SchemaIndex};
use tempfile::TempDir;

fn setup_file(dir: &TempDir, name: &str, contents: &str) {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    let mut file = fs::File::create(path).expect("create file");
    file.write_all(contents.as_bytes()).expect("write file");
}

fn object(name: &str) -> String {
    format!(r#"{{"name": "{name}", "item": {{"type": "object", "fields": []}}}}"#)
}

#[test]
fn load_keeps_index_order_and_derives_packages() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(
        &temp,
        "index.json",
        r#"{"version": "0.3.0", "items": ["todel/Message.json", "effis/FileData.json"]}"#,
    );
    setup_file(&temp, "todel/Message.json", &object("Message"));
    setup_file(
        &temp,
        "effis/FileData.json",
        r#"{"name": "FileData", "package": "files", "item": {"type": "object"}}"#,
    );

    let index = SchemaIndex::load(temp.path(), Path::new("index.json")).expect("load index");

    assert_eq!(index.len(), 2);
    assert_eq!(index.version(), Some("0.3.0"));
    let paths: Vec<_> = index.entries().map(|e| e.path()).collect();
    assert_eq!(paths, vec!["todel/Message.json", "effis/FileData.json"]);

    let message = index.lookup("Message").expect("message entry");
    assert_eq!(message.info().package, "todel");
    assert!(matches!(message.info().item, Item::Object(_)));
    assert_eq!(
        index.lookup("FileData").expect("file data").info().package,
        "files"
    );
    assert_eq!(index.link_target("Message"), Some("todel/Message"));
    assert_eq!(index.link_target("Missing"), None);
    assert!(index.has_target("effis/FileData"));
}

#[test]
fn discover_walks_sorted_and_skips_index_file() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(&temp, "index.json", r#"{"items": []}"#);
    setup_file(&temp, "todel/User.json", &object("User"));
    setup_file(&temp, "oprish/get_user.json", &object("get_user"));
    setup_file(&temp, "todel/notes.txt", "not an item");

    let index =
        SchemaIndex::discover(temp.path(), Path::new("index.json")).expect("discover items");

    let listing = index.to_index_file();
    assert_eq!(
        listing.items,
        vec![
            "oprish/get_user.json".to_string(),
            "todel/User.json".to_string()
        ]
    );
    assert_eq!(listing.version, None);
}

#[test]
fn load_or_discover_falls_back_without_index() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(&temp, "todel/User.json", &object("User"));

    let index = SchemaIndex::load_or_discover(temp.path(), Path::new("index.json"))
        .expect("fallback discovery");
    assert!(index.lookup("User").is_some());
}

#[test]
fn duplicate_names_resolve_to_first_entry() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(
        &temp,
        "index.json",
        r#"{"items": ["todel/Status.json", "oprish/Status.json"]}"#,
    );
    setup_file(&temp, "todel/Status.json", &object("Status"));
    setup_file(&temp, "oprish/Status.json", &object("Status"));

    let index = SchemaIndex::load(temp.path(), Path::new("index.json")).expect("load index");

    assert_eq!(index.len(), 2);
    assert_eq!(index.link_target("Status"), Some("todel/Status"));
    assert_eq!(index.names().collect::<Vec<_>>(), vec!["Status"]);
}

#[test]
fn malformed_item_reports_its_path() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(&temp, "index.json", r#"{"items": ["todel/Broken.json"]}"#);
    setup_file(&temp, "todel/Broken.json", r#"{"name": "Broken"}"#);

    let err = SchemaIndex::load(temp.path(), Path::new("index.json")).expect_err("parse failure");
    match err {
        SchemaError::Parse { path, .. } => assert!(path.ends_with("todel/Broken.json")),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn missing_item_file_is_an_io_error() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(&temp, "index.json", r#"{"items": ["todel/Gone.json"]}"#);

    let err = SchemaIndex::load(temp.path(), Path::new("index.json")).expect_err("io failure");
    assert!(matches!(err, SchemaError::Io { .. }), "got {err:?}");
}

#[test]
fn index_file_omits_missing_version() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(&temp, "todel/Message.json", &object("Message"));
    let index = SchemaIndex::discover(temp.path(), Path::new("index.json")).expect("discover");

    let listing = index.to_index_file();
    assert_eq!(listing.version, None);
    let json = serde_json::to_string(&listing).expect("serialize listing");
    assert_eq!(json, r#"{"items":["todel/Message.json"]}"#);

    let parsed: IndexFile = serde_json::from_str(&json).expect("parse listing");
    assert_eq!(parsed, listing);
}
