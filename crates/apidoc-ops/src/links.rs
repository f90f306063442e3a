use apidoc_format::LinksFormat;
use apidoc_schema::SchemaIndex;
use pulldown_cmark::{Event, Options, Parser, Tag};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::json;

use crate::catalog::render_json;
use crate::render::Page;
use crate::{ExitCode, OperationResult, Operations};

#[derive(Clone, Debug)]
pub struct LinksOptions {
    pub format: LinksFormat,
}

/// A cross-link under the link base that points at no indexed item.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct LinkFinding {
    pub page: String,
    pub line: usize,
    pub target: String,
}

#[derive(Clone, Debug)]
pub struct LinksOutcome {
    pub pages_checked: usize,
    pub findings: Vec<LinkFinding>,
    pub rendered: String,
    pub exit_code: i32,
}

impl Operations {
    /// Render every page in memory and report dangling cross-links.
    pub fn links(&self, options: LinksOptions) -> OperationResult<LinksOutcome> {
        let index = self.load_index()?;
        let pages = self.render_pages(&index)?;
        let prefix = format!("{}/", self.config().output.link_base);

        let mut findings: Vec<LinkFinding> = pages
            .par_iter()
            .flat_map_iter(|page| broken_links(page, &prefix, &index))
            .collect();
        findings.sort_by(|a, b| a.page.cmp(&b.page).then(a.line.cmp(&b.line)));

        let exit_code = if findings.is_empty() {
            ExitCode::Success
        } else {
            ExitCode::Findings
        };

        let rendered = match options.format {
            LinksFormat::Plain => render_plain(&findings, pages.len()),
            LinksFormat::Json => render_json(&json!({
                "pages_checked": pages.len(),
                "findings": findings,
            }))?,
        };

        Ok(LinksOutcome {
            pages_checked: pages.len(),
            findings,
            rendered,
            exit_code: exit_code.code(),
        })
    }
}

fn broken_links(page: &Page, prefix: &str, index: &SchemaIndex) -> Vec<LinkFinding> {
    let offsets = compute_line_offsets(&page.contents);
    let page_name = page.relative.to_string_lossy().replace('\\', "/");

    extract_links(&page.contents)
        .into_iter()
        .filter_map(|(target, byte)| {
            let rest = target.strip_prefix(prefix)?;
            let rest = rest.split(['#', '?']).next().unwrap_or(rest);
            let rest = rest.trim_end_matches('/');
            if index.has_target(rest) {
                return None;
            }
            Some(LinkFinding {
                page: page_name.clone(),
                line: byte_to_line(byte, &offsets),
                target,
            })
        })
        .collect()
}

fn extract_links(contents: &str) -> Vec<(String, usize)> {
    let parser = Parser::new_ext(contents, Options::all());
    parser
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::Link(_, dest, _)) => Some((dest.trim().to_string(), range.start)),
            _ => None,
        })
        .collect()
}

fn compute_line_offsets(contents: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    for (idx, ch) in contents.char_indices() {
        if ch == '\n' {
            offsets.push(idx + 1);
        }
    }
    offsets
}

fn byte_to_line(byte: usize, offsets: &[usize]) -> usize {
    match offsets.binary_search(&byte) {
        Ok(idx) => idx + 1,
        Err(idx) => idx,
    }
}

fn render_plain(findings: &[LinkFinding], pages_checked: usize) -> String {
    if findings.is_empty() {
        return format!("No broken links across {pages_checked} pages.");
    }
    let mut lines: Vec<String> = findings
        .iter()
        .map(|f| format!("{}:{}: broken link to '{}'", f.page, f.line, f.target))
        .collect();
    lines.push(format!(
        "{} broken links across {pages_checked} pages",
        findings.len()
    ));
    lines.join("\n")
}
