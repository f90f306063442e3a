//! Markdown rendering of extracted API items.

mod display;
mod names;
mod page;

use apidoc_schema::{ItemInfo, SchemaIndex};

pub use display::{display_type, inline_doc, route_line, split_example, unwrap_body_type};
pub use names::{title_case, RenameRule, UnknownRenameRule};

pub const DEFAULT_LINK_BASE: &str = "/reference";
pub const DEFAULT_EXAMPLE_SEPARATOR: &str = "-----";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// URL prefix for cross-links, without a trailing slash.
    pub link_base: String,
    pub example_separator: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            link_base: DEFAULT_LINK_BASE.to_string(),
            example_separator: DEFAULT_EXAMPLE_SEPARATOR.to_string(),
        }
    }
}

/// Renders item pages, resolving type references through a shared index.
pub struct Renderer<'a> {
    index: &'a SchemaIndex,
    options: RenderOptions,
}

impl<'a> Renderer<'a> {
    pub fn new(index: &'a SchemaIndex, options: RenderOptions) -> Self {
        Self { index, options }
    }

    /// Full Markdown page for `info`, without a trailing newline.
    pub fn render(&self, info: &ItemInfo) -> String {
        self.page(info)
    }
}

/// Render one page with the default link base and separator.
pub fn render(info: &ItemInfo, index: &SchemaIndex) -> String {
    Renderer::new(index, RenderOptions::default()).render(info)
}

/// Output format for `list`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListFormat {
    Plain,
    Json,
}

/// Output format for `links`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinksFormat {
    Plain,
    Json,
}
