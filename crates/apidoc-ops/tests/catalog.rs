use std::fs;

use apidoc_format::ListFormat;
use apidoc_ops::{IndexRunOptions, ListOptions, OperationError, Operations, ShowOptions};
use apidoc_schema::{IndexFile, ItemKind};
use apidoc_test_support::{test_config, write_fixture};
use tempfile::TempDir;

fn fixture_ops(temp: &TempDir) -> Operations {
    write_fixture(temp.path());
    Operations::new(test_config(temp.path()))
}

fn list(ops: &Operations, category: Option<&str>, include_hidden: bool) -> Vec<String> {
    ops.list(ListOptions {
        format: ListFormat::Plain,
        category: category.map(str::to_string),
        include_hidden,
    })
    .expect("list")
    .items
    .into_iter()
    .map(|item| item.name)
    .collect()
}

#[test]
fn show_renders_a_single_page() {
    let temp = TempDir::new().expect("tempdir");
    let ops = fixture_ops(&temp);

    let outcome = ops
        .show(ShowOptions {
            name: "get_message".into(),
        })
        .expect("show");
    assert_eq!(outcome.target, "oprish/get_message");
    assert!(outcome.rendered.starts_with("# Get Message\n\n<span class=\"method\">GET</span>"));
    assert!(outcome.rendered.contains("## Path Params"));
    assert!(!outcome.rendered.ends_with('\n'));
}

#[test]
fn show_suggests_close_names() {
    let temp = TempDir::new().expect("tempdir");
    let ops = fixture_ops(&temp);

    let err = ops
        .show(ShowOptions {
            name: "Mesage".into(),
        })
        .expect_err("unknown item");
    match err {
        OperationError::ItemNotFound { name, suggestion } => {
            assert_eq!(name, "Mesage");
            assert_eq!(suggestion.as_deref(), Some("Message"));
        }
        other => panic!("expected not found, got {other:?}"),
    }

    let err = ops
        .show(ShowOptions {
            name: "Completely".into(),
        })
        .expect_err("unknown item");
    assert!(matches!(
        err,
        OperationError::ItemNotFound {
            suggestion: None,
            ..
        }
    ));
}

#[test]
fn list_filters_hidden_items_and_categories() {
    let temp = TempDir::new().expect("tempdir");
    let ops = fixture_ops(&temp);

    assert_eq!(
        list(&ops, None, false),
        vec!["Message", "UserInfo", "Status", "get_message"]
    );
    assert_eq!(list(&ops, None, true).len(), 5);
    assert_eq!(list(&ops, Some("Users"), false), vec!["UserInfo", "Status"]);
    assert_eq!(list(&ops, Some("Other"), true), vec!["FileUpload"]);
    assert!(list(&ops, Some("Other"), false).is_empty());
}

#[test]
fn list_renders_plain_and_json() {
    let temp = TempDir::new().expect("tempdir");
    let ops = fixture_ops(&temp);

    let plain = ops
        .list(ListOptions {
            format: ListFormat::Plain,
            category: Some("Messaging".into()),
            include_hidden: false,
        })
        .expect("list plain");
    assert_eq!(
        plain.rendered,
        "object\tMessage\t/reference/todel/Message\nroute\tget_message\t/reference/oprish/get_message"
    );
    assert_eq!(plain.items[1].kind, ItemKind::Route);

    let json = ops
        .list(ListOptions {
            format: ListFormat::Json,
            category: None,
            include_hidden: true,
        })
        .expect("list json");
    let value: serde_json::Value = serde_json::from_str(&json.rendered).expect("valid json");
    let items = value["items"].as_array().expect("items array");
    assert_eq!(items.len(), 5);
    assert_eq!(items[0]["title"], "Message");
    assert_eq!(items[1]["title"], "User Info");
    assert_eq!(items[3]["hidden"], true);
    assert_eq!(items[4]["kind"], "route");
}

#[test]
fn build_index_discovers_items_and_keeps_version() {
    let temp = TempDir::new().expect("tempdir");
    let ops = fixture_ops(&temp);

    let preview = ops
        .build_index(IndexRunOptions { write: false })
        .expect("build index");
    assert!(!preview.written);
    assert_eq!(preview.listing.version.as_deref(), Some("0.1.0"));
    assert_eq!(
        preview.listing.items,
        vec![
            "effis/FileUpload.json",
            "oprish/get_message.json",
            "todel/Message.json",
            "todel/Status.json",
            "todel/UserInfo.json",
        ]
    );

    let written = ops
        .build_index(IndexRunOptions { write: true })
        .expect("write index");
    assert!(written.written);
    let on_disk: IndexFile = serde_json::from_str(
        &fs::read_to_string(temp.path().join("autodoc/index.json")).expect("read index"),
    )
    .expect("parse index");
    assert_eq!(on_disk, preview.listing);
}
