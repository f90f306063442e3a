//! Shared fixtures for apidoc tests.

use std::fs;
use std::path::{Path, PathBuf};

use apidoc_config::Config;

/// Item files of the sample autodoc directory, as `(entry path, json)`.
pub const FIXTURE_ITEMS: &[(&str, &str)] = &[
    ("todel/Message.json", MESSAGE),
    ("todel/UserInfo.json", USER_INFO),
    ("todel/Status.json", STATUS),
    ("effis/FileUpload.json", FILE_UPLOAD),
    ("oprish/get_message.json", GET_MESSAGE),
];

pub const MESSAGE: &str = r#"{
    "name": "Message",
    "doc": "A message sent in a channel.",
    "category": "Messaging",
    "item": {
        "type": "object",
        "fields": [
            {"name": "content", "doc": "The message content.", "type": "String"},
            {"name": "status", "type": "Status", "nullable": true},
            {"name": "author", "type": "UserInfo", "flattened": true}
        ]
    }
}"#;

pub const USER_INFO: &str = r#"{
    "name": "UserInfo",
    "category": "Users",
    "item": {
        "type": "object",
        "fields": [
            {"name": "id", "doc": "The user id.", "type": "u64"}
        ]
    }
}"#;

pub const STATUS: &str = r#"{
    "name": "Status",
    "doc": "See [Message](/reference/todel/Message) and [gone](/reference/todel/Gone).",
    "category": "Users",
    "item": {
        "type": "enum",
        "tag": "type",
        "rename_all": "SCREAMING_SNAKE_CASE",
        "variants": [
            {"type": "unit", "name": "Online"},
            {"type": "unit", "name": "DoNotDisturb"}
        ]
    }
}"#;

pub const FILE_UPLOAD: &str = r#"{
    "name": "FileUpload",
    "hidden": true,
    "item": {
        "type": "object",
        "fields": [{"name": "file", "type": "file"}]
    }
}"#;

pub const GET_MESSAGE: &str = r#"{
    "name": "get_message",
    "doc": "Fetch a single message.",
    "category": "Messaging",
    "item": {
        "type": "route",
        "method": "GET",
        "route": "/messages/<id>",
        "path_params": [{"name": "id", "type": "u64"}],
        "response": {"type": "Message", "format": "application/json"}
    }
}"#;

/// Write the sample items and their `index.json` under `root/autodoc`,
/// returning the autodoc directory.
pub fn write_fixture(root: &Path) -> PathBuf {
    let dir = root.join("autodoc");
    for (entry, contents) in FIXTURE_ITEMS {
        write_file(&dir.join(entry), contents);
    }

    let items = FIXTURE_ITEMS
        .iter()
        .map(|(entry, _)| format!("\"{entry}\""))
        .collect::<Vec<_>>()
        .join(", ");
    write_file(
        &dir.join("index.json"),
        &format!("{{\"version\": \"0.1.0\", \"items\": [{items}]}}"),
    );
    dir
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(path, contents).expect("write fixture file");
}

/// Default configuration rooted at `root`, ignoring any config files.
pub fn test_config(root: &Path) -> Config {
    Config::defaults_at(root)
}
