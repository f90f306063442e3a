mod logging;

use std::path::PathBuf;

use anyhow::Result;
use apidoc_config::{Config, LoadOptions};
use apidoc_core::ApiDoc;
use apidoc_format::{LinksFormat, ListFormat};
use apidoc_ops::{
    ExitCode, IndexOutcome, IndexRunOptions, LinksOptions, ListOptions, OperationError,
    Operations, RenderMode, RenderRunOptions, ShowOptions,
};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing::debug;

pub use logging::{level_for, LOG_ENV};

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet)?;

    let mut options = LoadOptions::default();
    if let Some(path) = cli.config {
        options = options.with_override_path(path);
    }
    let config = match Config::load(options) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return Ok(ExitCode::Config.code());
        }
    };
    debug!(layers = config.sources.layers.len(), "configuration loaded");

    let engine = ApiDoc::bootstrap(config);
    let ops = engine.operations();

    let result = match cli.command {
        Command::Render(args) => handle_render(ops, args),
        Command::Show(args) => handle_show(ops, args),
        Command::List(args) => handle_list(ops, args),
        Command::Index(args) => handle_index(ops, args),
        Command::Links(args) => handle_links(ops, args),
    };

    match result {
        Ok(code) => Ok(code),
        Err(err) => {
            eprintln!("{err}");
            Ok(err.exit_code().code())
        }
    }
}

fn handle_render(ops: &Operations, args: RenderArgs) -> Result<i32, OperationError> {
    let RenderArgs {
        check,
        diff,
        output,
    } = args;

    let mode = if diff {
        RenderMode::Diff
    } else if check {
        RenderMode::Check
    } else {
        RenderMode::Write
    };

    let outcome = ops.render(RenderRunOptions {
        mode,
        output_dir: output,
    })?;
    emit(&outcome.rendered);
    Ok(outcome.exit_code)
}

fn handle_show(ops: &Operations, args: ShowArgs) -> Result<i32, OperationError> {
    let outcome = ops.show(ShowOptions { name: args.name })?;
    emit(&outcome.rendered);
    Ok(0)
}

fn handle_list(ops: &Operations, args: ListArgs) -> Result<i32, OperationError> {
    let ListArgs {
        format,
        category,
        all,
    } = args;

    let format = match format.unwrap_or(FormatValue::Plain) {
        FormatValue::Plain => ListFormat::Plain,
        FormatValue::Json => ListFormat::Json,
    };

    let outcome = ops.list(ListOptions {
        format,
        category,
        include_hidden: all,
    })?;
    emit(&outcome.rendered);
    Ok(0)
}

fn handle_index(ops: &Operations, args: IndexArgs) -> Result<i32, OperationError> {
    let IndexOutcome {
        path,
        listing,
        rendered,
        written,
    } = ops.build_index(IndexRunOptions {
        write: !args.stdout,
    })?;

    if written {
        println!("wrote {} items to {}", listing.items.len(), path.display());
    } else {
        emit(&rendered);
    }
    Ok(0)
}

fn handle_links(ops: &Operations, args: LinksArgs) -> Result<i32, OperationError> {
    let format = match args.format.unwrap_or(FormatValue::Plain) {
        FormatValue::Plain => LinksFormat::Plain,
        FormatValue::Json => LinksFormat::Json,
    };

    let outcome = ops.links(LinksOptions { format })?;
    emit(&outcome.rendered);
    Ok(outcome.exit_code)
}

fn emit(content: &str) {
    print!("{content}");
    if !content.ends_with('\n') {
        println!();
    }
}

#[derive(Parser)]
#[command(
    name = "apidoc",
    author,
    version,
    about = "Render extracted API schemas into Markdown reference pages",
    propagate_version = true
)]
struct Cli {
    /// Configuration file applied on top of discovered `.apidoc.toml` files
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render every item page into the output directory
    Render(RenderArgs),
    /// Print the rendered page of one item
    Show(ShowArgs),
    /// List indexed items
    List(ListArgs),
    /// Rebuild the schema index from the files on disk
    Index(IndexArgs),
    /// Report cross-links that point at unknown items
    Links(LinksArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// Report out-of-date pages without writing them
    #[arg(long, conflicts_with = "diff")]
    check: bool,
    /// Print unified diffs for out-of-date pages without writing them
    #[arg(long, conflicts_with = "check")]
    diff: bool,
    /// Write pages here instead of `output.dir`
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ShowArgs {
    /// Type or route name, e.g. `Message` or `get_messages`
    #[arg(value_name = "NAME")]
    name: String,
}

#[derive(Args)]
struct ListArgs {
    /// Output format
    #[arg(long, value_enum)]
    format: Option<FormatValue>,
    /// Only list items in this category (`Other` for uncategorised)
    #[arg(long, value_name = "CATEGORY")]
    category: Option<String>,
    /// Include hidden items
    #[arg(long)]
    all: bool,
}

#[derive(Args)]
struct IndexArgs {
    /// Print the index instead of writing it
    #[arg(long)]
    stdout: bool,
}

#[derive(Args)]
struct LinksArgs {
    /// Output format
    #[arg(long, value_enum)]
    format: Option<FormatValue>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatValue {
    Plain,
    Json,
}
