use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use apidoc_format::title_case;
use apidoc_schema::SchemaIndex;
use apidoc_utils::{atomic_write, build_unified_diff, read_optional};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::{ExitCode, OperationError, OperationResult, Operations};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Write changed pages to disk.
    Write,
    /// Report out-of-date pages without writing.
    Check,
    /// Like `Check`, with a unified diff per page.
    Diff,
}

#[derive(Clone, Debug)]
pub struct RenderRunOptions {
    pub mode: RenderMode,
    /// Replaces `output.dir`; relative paths resolve against the project root.
    pub output_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageStatus {
    Created,
    Updated,
    Unchanged,
    Stale,
    Missing,
}

impl PageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PageStatus::Created => "created",
            PageStatus::Updated => "updated",
            PageStatus::Unchanged => "unchanged",
            PageStatus::Stale => "stale",
            PageStatus::Missing => "missing",
        }
    }

    fn is_outdated(self) -> bool {
        matches!(self, PageStatus::Stale | PageStatus::Missing)
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct PageChange {
    /// Page path relative to the output directory.
    pub path: PathBuf,
    pub status: PageStatus,
    pub diff: Option<String>,
}

#[derive(Clone, Debug)]
pub struct RenderOutcome {
    pub output_dir: PathBuf,
    pub pages: Vec<PageChange>,
    pub rendered: String,
    pub exit_code: i32,
}

/// A rendered page waiting to be compared against disk.
pub(crate) struct Page {
    pub relative: PathBuf,
    pub contents: String,
}

impl Operations {
    pub fn render(&self, options: RenderRunOptions) -> OperationResult<RenderOutcome> {
        let index = self.load_index()?;
        let output_dir = match &options.output_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => self.config().project.root.join(dir),
            None => self.config().output.dir.clone(),
        };

        let pages = self.render_pages(&index)?;
        let mode = options.mode;
        let pages = pages
            .par_iter()
            .map(|page| sync_page(&output_dir, page, mode))
            .collect::<OperationResult<Vec<_>>>()?;

        let outdated = pages.iter().filter(|page| page.status.is_outdated()).count();
        let exit_code = if outdated > 0 {
            ExitCode::Findings
        } else {
            ExitCode::Success
        };

        info!(
            pages = pages.len(),
            outdated,
            output = %output_dir.display(),
            "render finished"
        );

        let rendered = render_report(&pages, mode);
        Ok(RenderOutcome {
            output_dir,
            pages,
            rendered,
            exit_code: exit_code.code(),
        })
    }

    /// Every page this configuration produces, item pages first and the
    /// summary page last.
    pub(crate) fn render_pages(&self, index: &SchemaIndex) -> OperationResult<Vec<Page>> {
        let renderer = self.renderer(index);
        let exclude = &self.config().render.exclude;

        let entries: Vec<_> = index
            .entries()
            .filter(|entry| {
                let excluded = exclude.matches(entry.path());
                if excluded {
                    debug!(entry = entry.path(), "excluded from rendering");
                }
                !excluded
            })
            .collect();

        let mut pages: Vec<Page> = entries
            .par_iter()
            .map(|entry| {
                debug!(entry = entry.path(), "rendering page");
                Page {
                    relative: PathBuf::from(format!("{}.md", entry.target())),
                    contents: format!("{}\n", renderer.render(entry.info())),
                }
            })
            .collect();

        if let Some(relative) = self.summary_relative()? {
            pages.push(Page {
                relative,
                contents: self.summary_page(index),
            });
        }
        Ok(pages)
    }

    fn summary_relative(&self) -> OperationResult<Option<PathBuf>> {
        let output = &self.config().output;
        let Some(summary) = &output.summary else {
            return Ok(None);
        };
        summary
            .strip_prefix(&output.dir)
            .map(|relative| Some(relative.to_path_buf()))
            .map_err(|_| {
                OperationError::InvalidInput(format!(
                    "summary page {} must live inside the output directory {}",
                    summary.display(),
                    output.dir.display()
                ))
            })
    }

    /// `# API Reference` followed by one list per category. Hidden and
    /// excluded items are left out; entries sharing a name are each listed.
    pub(crate) fn summary_page(&self, index: &SchemaIndex) -> String {
        let exclude = &self.config().render.exclude;
        let mut categories: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for entry in index.entries() {
            let info = entry.info();
            if info.hidden || exclude.matches(entry.path()) {
                continue;
            }
            let category = if info.category.is_empty() {
                "Other"
            } else {
                info.category.as_str()
            };
            categories.entry(category).or_default().push(format!(
                "- [{}]({})",
                title_case(&info.name),
                self.link_to(entry.target())
            ));
        }

        let mut out = String::from("# API Reference\n");
        for (category, links) in categories {
            out.push_str(&format!("\n## {category}\n\n"));
            for link in links {
                out.push_str(&link);
                out.push('\n');
            }
        }
        out
    }
}

fn sync_page(output_dir: &Path, page: &Page, mode: RenderMode) -> OperationResult<PageChange> {
    let path = output_dir.join(&page.relative);
    let existing = read_optional(&path).map_err(|err| OperationError::io(&path, err))?;

    let status = match (&existing, mode) {
        (Some(current), _) if *current == page.contents => PageStatus::Unchanged,
        (Some(_), RenderMode::Write) => PageStatus::Updated,
        (None, RenderMode::Write) => PageStatus::Created,
        (Some(_), _) => PageStatus::Stale,
        (None, _) => PageStatus::Missing,
    };

    match mode {
        RenderMode::Write if status != PageStatus::Unchanged => {
            atomic_write(&path, &page.contents).map_err(|err| OperationError::io(&path, err))?;
            debug!(path = %path.display(), %status, "wrote page");
        }
        _ => {}
    }

    let diff = if mode == RenderMode::Diff {
        let label = page.relative.to_string_lossy().replace('\\', "/");
        build_unified_diff(existing.as_deref().unwrap_or(""), &page.contents, &label)
    } else {
        None
    };

    Ok(PageChange {
        path: page.relative.clone(),
        status,
        diff,
    })
}

fn render_report(pages: &[PageChange], mode: RenderMode) -> String {
    let mut lines = Vec::new();
    for page in pages {
        if page.status == PageStatus::Unchanged {
            continue;
        }
        lines.push(format!("{} {}", page.status, page.path.display()));
        if let Some(diff) = &page.diff {
            lines.push(diff.trim_end().to_string());
        }
    }

    let count = |status: PageStatus| pages.iter().filter(|page| page.status == status).count();
    let summary = match mode {
        RenderMode::Write => format!(
            "{} pages: {} created, {} updated, {} unchanged",
            pages.len(),
            count(PageStatus::Created),
            count(PageStatus::Updated),
            count(PageStatus::Unchanged)
        ),
        RenderMode::Check | RenderMode::Diff => {
            let outdated = count(PageStatus::Stale) + count(PageStatus::Missing);
            if outdated == 0 {
                format!("{} pages up to date", pages.len())
            } else {
                format!("{outdated} of {} pages out of date", pages.len())
            }
        }
    };
    lines.push(summary);
    lines.join("\n")
}
