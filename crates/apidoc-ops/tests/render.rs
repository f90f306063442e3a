use std::fs;
use std::path::PathBuf;

use apidoc_config::{Config, LoadOptions};
use apidoc_ops::{Operations, PageStatus, RenderMode, RenderRunOptions};
use apidoc_test_support::{test_config, write_file, write_fixture};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const MESSAGE_PAGE: &str = "# Message

A message sent in a channel.

|Field|Type|Description|
|---|---|---|
|content|String|The message content.|
|status|[Status](/reference/todel/Status)?||
|id|Number|The user id.|
";

fn run(ops: &Operations, mode: RenderMode) -> apidoc_ops::RenderOutcome {
    ops.render(RenderRunOptions {
        mode,
        output_dir: None,
    })
    .expect("render")
}

#[test]
fn write_mode_creates_pages_then_reports_unchanged() {
    let temp = TempDir::new().expect("tempdir");
    write_fixture(temp.path());
    let ops = Operations::new(test_config(temp.path()));

    let first = run(&ops, RenderMode::Write);
    assert_eq!(first.exit_code, 0);
    assert_eq!(first.pages.len(), 5);
    assert!(first
        .pages
        .iter()
        .all(|page| page.status == PageStatus::Created));
    assert!(first.rendered.contains("created todel/Message.md"));
    assert!(first
        .rendered
        .ends_with("5 pages: 5 created, 0 updated, 0 unchanged"));

    let page = fs::read_to_string(temp.path().join("reference/todel/Message.md"))
        .expect("read rendered page");
    assert_eq!(page, MESSAGE_PAGE);
    assert!(temp
        .path()
        .join("reference/oprish/get_message.md")
        .exists());

    let second = run(&ops, RenderMode::Write);
    assert!(second
        .pages
        .iter()
        .all(|page| page.status == PageStatus::Unchanged));
    assert_eq!(second.rendered, "5 pages: 0 created, 0 updated, 5 unchanged");
}

#[test]
fn check_mode_reports_missing_and_stale_pages_without_writing() {
    let temp = TempDir::new().expect("tempdir");
    write_fixture(temp.path());
    let ops = Operations::new(test_config(temp.path()));

    let fresh = run(&ops, RenderMode::Check);
    assert_eq!(fresh.exit_code, 1);
    assert!(fresh
        .pages
        .iter()
        .all(|page| page.status == PageStatus::Missing));
    assert!(!temp.path().join("reference").exists());

    run(&ops, RenderMode::Write);
    let message = temp.path().join("reference/todel/Message.md");
    fs::write(&message, "# Message\n\nHand edited.\n").expect("edit page");

    let checked = run(&ops, RenderMode::Check);
    assert_eq!(checked.exit_code, 1);
    let stale: Vec<_> = checked
        .pages
        .iter()
        .filter(|page| page.status == PageStatus::Stale)
        .map(|page| page.path.clone())
        .collect();
    assert_eq!(stale, vec![PathBuf::from("todel/Message.md")]);
    assert!(checked.rendered.ends_with("1 of 5 pages out of date"));
    assert_eq!(
        fs::read_to_string(&message).expect("read page"),
        "# Message\n\nHand edited.\n"
    );

    let diffed = run(&ops, RenderMode::Diff);
    let diff = diffed
        .pages
        .iter()
        .find_map(|page| page.diff.clone())
        .expect("diff for stale page");
    assert!(diff.contains("--- a/todel/Message.md"));
    assert!(diff.contains("-Hand edited."));
    assert!(diff.contains("+|id|Number|The user id.|"));
}

#[test]
fn output_override_resolves_against_project_root() {
    let temp = TempDir::new().expect("tempdir");
    write_fixture(temp.path());
    let ops = Operations::new(test_config(temp.path()));

    let outcome = ops
        .render(RenderRunOptions {
            mode: RenderMode::Write,
            output_dir: Some(PathBuf::from("site/api")),
        })
        .expect("render");

    assert_eq!(outcome.output_dir, temp.path().join("site/api"));
    assert!(temp.path().join("site/api/todel/Status.md").exists());
    assert!(!temp.path().join("reference").exists());
}

#[test]
fn summary_page_groups_visible_items_by_category() {
    let temp = TempDir::new().expect("tempdir");
    write_fixture(temp.path());
    let mut config = test_config(temp.path());
    config.output.summary = Some(config.output.dir.join("index.md"));
    let ops = Operations::new(config);

    let outcome = run(&ops, RenderMode::Write);
    assert_eq!(outcome.pages.len(), 6);

    let summary =
        fs::read_to_string(temp.path().join("reference/index.md")).expect("read summary");
    assert_eq!(
        summary,
        "# API Reference

## Messaging

- [Message](/reference/todel/Message)
- [Get Message](/reference/oprish/get_message)

## Users

- [User Info](/reference/todel/UserInfo)
- [Status](/reference/todel/Status)
"
    );
}

#[test]
fn summary_lists_every_entry_that_shares_a_name() {
    let temp = TempDir::new().expect("tempdir");
    let dir = write_fixture(temp.path());
    write_file(
        &dir.join("legacy/Status.json"),
        r#"{
            "name": "Status",
            "category": "Legacy",
            "item": {"type": "object", "fields": [{"name": "code", "type": "u8"}]}
        }"#,
    );
    write_file(
        &dir.join("index.json"),
        r#"{"items": [
            "todel/Message.json", "todel/UserInfo.json", "todel/Status.json",
            "effis/FileUpload.json", "oprish/get_message.json", "legacy/Status.json"
        ]}"#,
    );
    let mut config = test_config(temp.path());
    config.output.summary = Some(config.output.dir.join("index.md"));
    let ops = Operations::new(config);

    let outcome = run(&ops, RenderMode::Write);
    assert_eq!(outcome.pages.len(), 7);
    assert!(temp.path().join("reference/legacy/Status.md").exists());

    let summary =
        fs::read_to_string(temp.path().join("reference/index.md")).expect("read summary");
    assert_eq!(
        summary,
        "# API Reference

## Legacy

- [Status](/reference/legacy/Status)

## Messaging

- [Message](/reference/todel/Message)
- [Get Message](/reference/oprish/get_message)

## Users

- [User Info](/reference/todel/UserInfo)
- [Status](/reference/todel/Status)
"
    );
}

#[test]
fn excluded_entries_get_no_page_but_stay_linkable() {
    let temp = TempDir::new().expect("tempdir");
    write_fixture(temp.path());
    write_file(
        &temp.path().join(".apidoc.toml"),
        "[render]\nexclude = [\"todel/Status.json\"]\n",
    );
    let config =
        Config::load(LoadOptions::default().with_working_dir(temp.path())).expect("load config");
    let ops = Operations::new(config);

    let outcome = run(&ops, RenderMode::Write);
    assert_eq!(outcome.pages.len(), 4);
    let reference = ops.config().output.dir.clone();
    assert!(!reference.join("todel/Status.md").exists());

    let message = fs::read_to_string(reference.join("todel/Message.md")).expect("read page");
    assert!(message.contains("[Status](/reference/todel/Status)?"));
}

#[test]
fn missing_index_file_falls_back_to_discovery() {
    let temp = TempDir::new().expect("tempdir");
    let autodoc = write_fixture(temp.path());
    fs::remove_file(autodoc.join("index.json")).expect("remove index");
    let ops = Operations::new(test_config(temp.path()));

    let outcome = run(&ops, RenderMode::Write);
    assert_eq!(outcome.pages.len(), 5);
    assert_eq!(outcome.pages[0].path, PathBuf::from("effis/FileUpload.md"));
}
