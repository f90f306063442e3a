//! High-level operations shared by apidoc commands.

mod catalog;
mod error;
mod links;
mod render;

use apidoc_config::Config;
use apidoc_format::{RenderOptions, Renderer};
use apidoc_schema::SchemaIndex;
use tracing::debug;

pub use catalog::{
    IndexOutcome, IndexRunOptions, ItemSummary, ListOptions, ListOutcome, ShowOptions, ShowOutcome,
};
pub use error::{ExitCode, OperationError, OperationResult};
pub use links::{LinkFinding, LinksOptions, LinksOutcome};
pub use render::{PageChange, PageStatus, RenderMode, RenderOutcome, RenderRunOptions};

/// Operation bundle behind every CLI subcommand.
pub struct Operations {
    config: Config,
}

impl Operations {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the schema index, falling back to discovery when the index file
    /// is missing.
    pub fn load_index(&self) -> OperationResult<SchemaIndex> {
        let input = &self.config.input;
        let index = SchemaIndex::load_or_discover(&input.dir, &input.index_relative())?;
        debug!(items = index.len(), dir = %input.dir.display(), "schema index ready");
        Ok(index)
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            link_base: self.config.output.link_base.clone(),
            example_separator: self.config.render.example_separator.clone(),
        }
    }

    fn renderer<'a>(&self, index: &'a SchemaIndex) -> Renderer<'a> {
        Renderer::new(index, self.render_options())
    }

    fn link_to(&self, target: &str) -> String {
        format!("{}/{}", self.config.output.link_base, target)
    }
}
