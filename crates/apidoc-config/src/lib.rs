//! Configuration primitives and loader for the apidoc toolkit.
//!
//! The loader resolves configuration using a fixed precedence stack:
//! override flag → working directory → git root → built-in defaults.
//! Every layer is merged field by field and each value remembers the layer it
//! came from, so relative paths resolve against the right directory and
//! validation errors can name their origin.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobMatcher};
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".apidoc.toml";

const DEFAULT_INPUT_DIR: &str = "autodoc";
const DEFAULT_INDEX_FILE: &str = "index.json";
const DEFAULT_OUTPUT_DIR: &str = "reference";
const DEFAULT_LINK_BASE: &str = "/reference";
const DEFAULT_EXAMPLE_SEPARATOR: &str = "-----";

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub project: ProjectSettings,
    pub input: InputSettings,
    pub output: OutputSettings,
    pub render: RenderSettings,
    pub sources: ConfigSources,
}

/// Project-level settings.
#[derive(Clone, Debug)]
pub struct ProjectSettings {
    pub name: Option<String>,
    pub root: PathBuf,
}

/// Where item schemas are read from.
#[derive(Clone, Debug)]
pub struct InputSettings {
    pub dir: PathBuf,
    /// Absolute path of the index file.
    pub index: PathBuf,
}

impl InputSettings {
    /// Index file name relative to the input directory.
    pub fn index_relative(&self) -> PathBuf {
        self.index
            .strip_prefix(&self.dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| self.index.clone())
    }
}

/// Where rendered pages go and how they link to each other.
#[derive(Clone, Debug)]
pub struct OutputSettings {
    pub dir: PathBuf,
    pub link_base: String,
    /// Absolute path of the summary page, when enabled.
    pub summary: Option<PathBuf>,
}

/// Formatter behaviour.
#[derive(Clone, Debug)]
pub struct RenderSettings {
    pub example_separator: String,
    pub exclude: PatternList,
}

/// Pattern plus compiled matcher helper.
#[derive(Clone, Debug)]
pub struct Pattern {
    original: String,
    matcher: GlobMatcher,
}

impl Pattern {
    fn new(source: ConfigSource, value: String) -> Result<Self, ConfigValidationError> {
        match Glob::new(&value) {
            Ok(glob) => Ok(Pattern {
                original: value,
                matcher: glob.compile_matcher(),
            }),
            Err(err) => Err(ConfigValidationError::new(
                Some(source),
                format!("invalid glob pattern '{value}': {err}"),
            )),
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn is_match(&self, path: impl AsRef<Path>) -> bool {
        self.matcher.is_match(path)
    }
}

/// Ordered list of glob patterns.
#[derive(Clone, Debug, Default)]
pub struct PatternList {
    patterns: Vec<Pattern>,
}

impl PatternList {
    fn new(patterns: Vec<Pattern>) -> Self {
        PatternList { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// True when any pattern matches `path`.
    pub fn matches(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        self.patterns.iter().any(|pattern| pattern.is_match(path))
    }
}

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// Specific layer of configuration (default/git/local/override).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
    pub base_dir: PathBuf,
}

impl ConfigSource {
    fn default(base_dir: PathBuf) -> Self {
        ConfigSource {
            kind: ConfigSourceKind::Default,
            path: None,
            base_dir,
        }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        ConfigSource {
            kind,
            path: Some(path),
            base_dir,
        }
    }

    fn describe(&self) -> String {
        match (&self.kind, &self.path) {
            (ConfigSourceKind::Default, _) => "built-in defaults".to_owned(),
            (kind, Some(path)) => format!("{} at {}", kind, path.display()),
            (kind, None) => kind.to_string(),
        }
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::GitRoot => "git-root config",
            ConfigSourceKind::Local => "local config",
            ConfigSourceKind::Override => "override config",
        };
        f.write_str(label)
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let override_path = options
            .override_path
            .map(|path| make_absolute(&path, &working_dir));

        if let Some(path) = &override_path {
            if !path.exists() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let default_source = ConfigSource::default(working_dir.clone());
        let mut merged = defaults_layer(default_source.clone());
        let mut source_layers = vec![default_source];

        let git_root = find_git_root(&working_dir);
        let git_config_path = git_root.as_ref().map(|root| root.join(CONFIG_FILE_NAME));
        let local_config_path = working_dir.join(CONFIG_FILE_NAME);

        if let Some(path) = git_config_path.as_ref() {
            if path.exists() && Some(path) != override_path.as_ref() && path != &local_config_path {
                let source = ConfigSource::for_file(ConfigSourceKind::GitRoot, path.clone());
                merged.merge(load_layer(path, source.clone())?);
                source_layers.push(source);
            }
        }

        if local_config_path.exists() && Some(&local_config_path) != override_path.as_ref() {
            let source = ConfigSource::for_file(ConfigSourceKind::Local, local_config_path.clone());
            merged.merge(load_layer(&local_config_path, source.clone())?);
            source_layers.push(source);
        }

        if let Some(path) = override_path {
            let source = ConfigSource::for_file(ConfigSourceKind::Override, path.clone());
            merged.merge(load_layer(&path, source.clone())?);
            source_layers.push(source);
        }

        let resolved = merged.finalize().map_err(ConfigError::Validation)?;
        Ok(Config {
            project: resolved.project,
            input: resolved.input,
            output: resolved.output,
            render: resolved.render,
            sources: ConfigSources {
                working_directory: working_dir,
                layers: source_layers,
            },
        })
    }

    /// Builds a configuration rooted at `root` from defaults only, ignoring any
    /// config files on disk.
    pub fn defaults_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let source = ConfigSource::default(root.clone());
        let resolved = defaults_layer(source.clone())
            .finalize()
            .unwrap_or_else(|err| panic!("built-in apidoc defaults are invalid: {err}"));
        Config {
            project: resolved.project,
            input: resolved.input,
            output: resolved.output,
            render: resolved.render,
            sources: ConfigSources {
                working_directory: root,
                layers: vec![source],
            },
        }
    }
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    joined
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

fn load_layer(path: &Path, source: ConfigSource) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.into(),
        source,
    })?;
    Ok(raw.into_partial(source))
}

fn defaults_layer(source: ConfigSource) -> PartialConfig {
    PartialConfig {
        project: ProjectPartial {
            name: None,
            root: Some(Located::new(PathBuf::from("."), source.clone())),
        },
        // Input and output dirs stay unset so they follow `project.root`.
        input: InputPartial {
            dir: None,
            index: Some(Located::new(PathBuf::from(DEFAULT_INDEX_FILE), source.clone())),
        },
        output: OutputPartial {
            dir: None,
            link_base: Some(Located::new(DEFAULT_LINK_BASE.into(), source.clone())),
            summary: None,
        },
        render: RenderPartial {
            example_separator: Some(Located::new(
                DEFAULT_EXAMPLE_SEPARATOR.into(),
                source.clone(),
            )),
            exclude: Some(Located::new(Vec::new(), source)),
        },
    }
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    project: ProjectPartial,
    input: InputPartial,
    output: OutputPartial,
    render: RenderPartial,
}

impl PartialConfig {
    fn merge(&mut self, other: PartialConfig) {
        self.project.merge(other.project);
        self.input.merge(other.input);
        self.output.merge(other.output);
        self.render.merge(other.render);
    }

    fn finalize(self) -> Result<ResolvedConfig, ConfigValidationErrors> {
        let mut errors = Vec::new();

        let project_root = self
            .project
            .root
            .as_ref()
            .map(resolve_path)
            .unwrap_or_else(|| PathBuf::from("."));

        let input_dir = self
            .input
            .dir
            .as_ref()
            .map(resolve_path)
            .unwrap_or_else(|| project_root.join(DEFAULT_INPUT_DIR));
        let index = self
            .input
            .index
            .map(|located| make_absolute(&located.value, &input_dir))
            .unwrap_or_else(|| input_dir.join(DEFAULT_INDEX_FILE));

        let output_dir = self
            .output
            .dir
            .as_ref()
            .map(resolve_path)
            .unwrap_or_else(|| project_root.join(DEFAULT_OUTPUT_DIR));
        let summary = self
            .output
            .summary
            .map(|located| make_absolute(&located.value, &output_dir));

        let link_base = self.output.link_base.unwrap_or_else(|| {
            Located::new(
                DEFAULT_LINK_BASE.to_string(),
                ConfigSource::default(PathBuf::from(".")),
            )
        });
        let link_base_value = link_base.value.trim().trim_end_matches('/').to_string();
        if link_base_value.is_empty() {
            errors.push(ConfigValidationError::new(
                Some(link_base.source.clone()),
                "output.link_base cannot be empty or '/'".into(),
            ));
        }

        let separator = self.render.example_separator.unwrap_or_else(|| {
            Located::new(
                DEFAULT_EXAMPLE_SEPARATOR.to_string(),
                ConfigSource::default(PathBuf::from(".")),
            )
        });
        if separator.value.trim().is_empty() {
            errors.push(ConfigValidationError::new(
                Some(separator.source.clone()),
                "render.example_separator cannot be empty".into(),
            ));
        }

        let exclude = compile_patterns(
            self.render.exclude.unwrap_or_default(),
            "render.exclude",
            &mut errors,
        );

        if !errors.is_empty() {
            return Err(ConfigValidationErrors(errors));
        }

        Ok(ResolvedConfig {
            project: ProjectSettings {
                name: self.project.name.map(|name| name.value),
                root: project_root,
            },
            input: InputSettings {
                dir: input_dir,
                index,
            },
            output: OutputSettings {
                dir: output_dir,
                link_base: link_base_value,
                summary,
            },
            render: RenderSettings {
                example_separator: separator.value.trim().to_string(),
                exclude: PatternList::new(exclude),
            },
        })
    }
}

#[derive(Clone, Debug, Default)]
struct ProjectPartial {
    name: Option<Located<String>>,
    root: Option<Located<PathBuf>>,
}

impl ProjectPartial {
    fn merge(&mut self, other: ProjectPartial) {
        if other.name.is_some() {
            self.name = other.name;
        }
        if other.root.is_some() {
            self.root = other.root;
        }
    }
}

#[derive(Clone, Debug, Default)]
struct InputPartial {
    dir: Option<Located<PathBuf>>,
    index: Option<Located<PathBuf>>,
}

impl InputPartial {
    fn merge(&mut self, other: InputPartial) {
        if other.dir.is_some() {
            self.dir = other.dir;
        }
        if other.index.is_some() {
            self.index = other.index;
        }
    }
}

#[derive(Clone, Debug, Default)]
struct OutputPartial {
    dir: Option<Located<PathBuf>>,
    link_base: Option<Located<String>>,
    summary: Option<Located<PathBuf>>,
}

impl OutputPartial {
    fn merge(&mut self, other: OutputPartial) {
        if other.dir.is_some() {
            self.dir = other.dir;
        }
        if other.link_base.is_some() {
            self.link_base = other.link_base;
        }
        if other.summary.is_some() {
            self.summary = other.summary;
        }
    }
}

#[derive(Clone, Debug, Default)]
struct RenderPartial {
    example_separator: Option<Located<String>>,
    exclude: Option<Located<Vec<String>>>,
}

impl RenderPartial {
    fn merge(&mut self, other: RenderPartial) {
        if other.example_separator.is_some() {
            self.example_separator = other.example_separator;
        }
        if other.exclude.is_some() {
            self.exclude = other.exclude;
        }
    }
}

#[derive(Clone, Debug)]
struct Located<T> {
    value: T,
    source: ConfigSource,
}

impl<T> Located<T> {
    fn new(value: T, source: ConfigSource) -> Self {
        Located { value, source }
    }
}

impl Default for Located<Vec<String>> {
    fn default() -> Self {
        Located::new(Vec::new(), ConfigSource::default(PathBuf::from(".")))
    }
}

fn resolve_path(located: &Located<PathBuf>) -> PathBuf {
    make_absolute(&located.value, &located.source.base_dir)
}

fn compile_patterns(
    located: Located<Vec<String>>,
    context: &str,
    errors: &mut Vec<ConfigValidationError>,
) -> Vec<Pattern> {
    let mut patterns = Vec::new();
    for pattern in located.value {
        match Pattern::new(located.source.clone(), pattern) {
            Ok(compiled) => patterns.push(compiled),
            Err(err) => errors.push(err.with_context(context)),
        }
    }
    patterns
}

#[derive(Clone, Debug)]
struct ResolvedConfig {
    project: ProjectSettings,
    input: InputSettings,
    output: OutputSettings,
    render: RenderSettings,
}

/// Container for validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

/// Validation failure with optional provenance.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub message: String,
    pub context: Option<String>,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        ConfigValidationError {
            source,
            message,
            context: None,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source.describe())?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    project: Option<RawProject>,
    #[serde(default)]
    input: Option<RawInput>,
    #[serde(default)]
    output: Option<RawOutput>,
    #[serde(default)]
    render: Option<RawRender>,
}

impl RawConfig {
    fn into_partial(self, source: ConfigSource) -> PartialConfig {
        let located = |value| Located::new(value, source.clone());
        let mut partial = PartialConfig::default();

        if let Some(project) = self.project {
            partial.project = ProjectPartial {
                name: project.name.map(|value| Located::new(value, source.clone())),
                root: project.root.map(located),
            };
        }
        if let Some(input) = self.input {
            partial.input = InputPartial {
                dir: input.dir.map(located),
                index: input.index.map(located),
            };
        }
        if let Some(output) = self.output {
            partial.output = OutputPartial {
                dir: output.dir.map(located),
                link_base: output
                    .link_base
                    .map(|value| Located::new(value, source.clone())),
                summary: output.summary.map(located),
            };
        }
        if let Some(render) = self.render {
            partial.render = RenderPartial {
                example_separator: render
                    .example_separator
                    .map(|value| Located::new(value, source.clone())),
                exclude: render
                    .exclude
                    .map(|value| Located::new(value, source.clone())),
            };
        }
        partial
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProject {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    root: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawInput {
    #[serde(default)]
    dir: Option<PathBuf>,
    #[serde(default)]
    index: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOutput {
    #[serde(default)]
    dir: Option<PathBuf>,
    #[serde(default)]
    link_base: Option<String>,
    #[serde(default)]
    summary: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRender {
    #[serde(default)]
    example_separator: Option<String>,
    #[serde(default)]
    exclude: Option<Vec<String>>,
}
