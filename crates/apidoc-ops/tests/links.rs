use apidoc_format::LinksFormat;
use apidoc_ops::{LinkFinding, LinksOptions, Operations};
use apidoc_test_support::{test_config, write_fixture};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn reports_links_to_unknown_items() {
    let temp = TempDir::new().expect("tempdir");
    write_fixture(temp.path());
    let ops = Operations::new(test_config(temp.path()));

    let outcome = ops
        .links(LinksOptions {
            format: LinksFormat::Plain,
        })
        .expect("links");

    assert_eq!(outcome.exit_code, 1);
    assert_eq!(outcome.pages_checked, 5);
    assert_eq!(
        outcome.findings,
        vec![LinkFinding {
            page: "todel/Status.md".into(),
            line: 3,
            target: "/reference/todel/Gone".into(),
        }]
    );
    assert_eq!(
        outcome.rendered,
        "todel/Status.md:3: broken link to '/reference/todel/Gone'\n1 broken links across 5 pages"
    );
}

#[test]
fn json_report_is_clean_when_every_link_resolves() {
    let temp = TempDir::new().expect("tempdir");
    write_fixture(temp.path());
    let mut config = test_config(temp.path());
    config.output.link_base = "/api".into();
    let ops = Operations::new(config);

    // The hand-written link in Status points under /reference, outside /api.
    let outcome = ops
        .links(LinksOptions {
            format: LinksFormat::Json,
        })
        .expect("links");

    assert_eq!(outcome.exit_code, 0);
    let value: serde_json::Value = serde_json::from_str(&outcome.rendered).expect("valid json");
    assert_eq!(value["pages_checked"], 5);
    assert_eq!(value["findings"].as_array().map(Vec::len), Some(0));
}
