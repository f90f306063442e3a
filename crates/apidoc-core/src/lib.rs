//! Core orchestration layer for apidoc.

use apidoc_config::Config;
use apidoc_ops::Operations;

/// Entry point for higher-level consumers such as the CLI.
pub struct ApiDoc {
    ops: Operations,
}

impl ApiDoc {
    pub fn bootstrap(config: Config) -> Self {
        Self {
            ops: Operations::new(config),
        }
    }

    /// Access the operation bundle.
    pub fn operations(&self) -> &Operations {
        &self.ops
    }
}
