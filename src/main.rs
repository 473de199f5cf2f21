//! CLI entry point for the package catalog engine.
//!
//! Provides commands for building the index from a corpus, querying it and
//! serving it over HTTP.

use anyhow::Context;
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use pkgdex::display::{
    TableBuilder, create_kind_table, create_packages_table, create_selector_table,
    create_stats_table,
};
use pkgdex::index::views::{ImplementerView, TypeRef};
use pkgdex::io::{ExitCode, OutputFormat, OutputManager};
use pkgdex::{Corpus, Index, IndexBuilder, PackageOrder, Settings};
use std::path::PathBuf;
use std::time::Instant;
use tracing::Level;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Cross-referenced package catalog for Go corpora
#[derive(Parser)]
#[command(
    name = "pkgdex",
    version = env!("CARGO_PKG_VERSION"),
    about = "Cross-referenced package catalog for Go corpora",
    long_about = "Build a semantic index from a type-checked Go corpus and query packages, \
                  types, implementations and references.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize project
    #[command(about = "Set up .pkgdex directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings from .pkgdex/settings.toml")]
    Config,

    /// Build the index and print statistics
    #[command(about = "Build the index from a corpus document")]
    Index {
        /// Corpus document (defaults to index.corpus_path)
        corpus: Option<PathBuf>,
    },

    /// Query the index
    #[command(
        about = "Query packages, types, implementations and references",
        after_help = "Examples:\n  pkgdex retrieve packages --order depth\n  pkgdex retrieve package net/http\n  pkgdex retrieve type io Reader\n  pkgdex retrieve implementations io Reader\n  pkgdex retrieve references io Reader.Read\n  pkgdex retrieve source fmt print.go --json"
    )]
    Retrieve {
        /// Corpus document (defaults to index.corpus_path)
        #[arg(long)]
        corpus: Option<PathBuf>,

        #[command(subcommand)]
        query: RetrieveQuery,
    },

    /// Serve pages over HTTP
    #[command(about = "Start the page server")]
    Serve {
        /// Corpus document (defaults to index.corpus_path)
        corpus: Option<PathBuf>,

        /// Bind address (overrides server.bind)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Subcommand)]
enum RetrieveQuery {
    /// List every package
    Packages {
        /// alphabet, importedbys or depth
        #[arg(long, default_value = "alphabet")]
        order: String,
    },

    /// Package detail
    Package { path: String },

    /// Transitive dependencies and dependents of a package
    Deps { path: String },

    /// Fields, methods and method sets of a type
    Type { package: String, name: String },

    /// Implementers of an interface, or interfaces a type implements
    Implementations { package: String, name: String },

    /// Every occurrence of `Name` or `Type.selector`
    References { package: String, identifier: String },

    /// Annotated source of a file
    Source { package: String, file: String },
}

fn init_tracing(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Settings::load().unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            Settings::default()
        }),
    };
    settings.debug |= cli.debug;
    Ok(settings)
}

fn corpus_path(arg: Option<&PathBuf>, settings: &Settings) -> anyhow::Result<PathBuf> {
    arg.or(settings.index.corpus_path.as_ref())
        .cloned()
        .context("no corpus given; pass a path or set index.corpus_path")
}

fn build_index(path: &PathBuf) -> pkgdex::IndexResult<Index> {
    let corpus = Corpus::load(path)?;
    IndexBuilder::new().build(corpus)
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code.into(),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::GeneralError.into()
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = load_settings(&cli)?;
    init_tracing(settings.debug);
    let mut output = OutputManager::new(OutputFormat::from_json_flag(cli.json));

    match &cli.command {
        Commands::Init { force } => {
            let path = Settings::init_config_file(*force)
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("Created configuration file at: {}", path.display());
            Ok(ExitCode::Success)
        }

        Commands::Config => {
            println!("Current Configuration:");
            println!("{}", "=".repeat(50));
            println!("{}", toml::to_string_pretty(&settings)?);
            Ok(ExitCode::Success)
        }

        Commands::Index { corpus } => {
            let path = corpus_path(corpus.as_ref(), &settings)?;
            output.progress(&format!("Indexing {}", path.display()))?;
            let started = Instant::now();
            let index = match build_index(&path) {
                Ok(index) => index,
                Err(e) => return Ok(output.error(&e)?),
            };
            let elapsed = started.elapsed();
            Ok(output.success(index.stats(), |stats| {
                format!(
                    "{}\n{}\nBuilt in {elapsed:?}",
                    create_stats_table(stats),
                    create_kind_table(stats)
                )
            })?)
        }

        Commands::Retrieve { corpus, query } => {
            let path = corpus_path(corpus.as_ref(), &settings)?;
            let index = match build_index(&path) {
                Ok(index) => index,
                Err(e) => return Ok(output.error(&e)?),
            };
            retrieve(&index, query, &settings, &mut output)
        }

        Commands::Serve { corpus, bind } => {
            let path = corpus_path(corpus.as_ref(), &settings)?;
            let mut settings = settings.clone();
            if let Some(bind) = bind {
                settings.server.bind = bind.clone();
            }
            serve(settings, path)
        }
    }
}

fn retrieve(
    index: &Index,
    query: &RetrieveQuery,
    settings: &Settings,
    output: &mut OutputManager,
) -> anyhow::Result<ExitCode> {
    let unexported = settings.index.show_unexported;
    let code = match query {
        RetrieveQuery::Packages { order } => {
            let order: PackageOrder = match order.parse() {
                Ok(order) => order,
                Err(e) => return Ok(output.error(&e)?),
            };
            output.success(&index.packages(order), |packages| create_packages_table(packages))?
        }

        RetrieveQuery::Package { path } => {
            output.result(index.package_detail(path, unexported), |detail| {
                let mut table = TableBuilder::new().set_headers(vec!["Declaration", "Kind", "Type"]);
                for tn in &detail.type_names {
                    table = table.add_row(vec![tn.name.clone(), "type".to_string(), tn.spec.clone()]);
                }
                for value in detail
                    .constants
                    .iter()
                    .chain(&detail.variables)
                    .chain(&detail.functions)
                {
                    let name = match &value.receiver {
                        Some(receiver) => format!("({receiver}) {}", value.name),
                        None => value.name.clone(),
                    };
                    table = table.add_row(vec![
                        name,
                        format!("{:?}", value.kind).to_lowercase(),
                        value.type_string.clone(),
                    ]);
                }
                format!(
                    "package {} ({})\n{} files, {} imports, {} importers\n{}",
                    detail.summary.name,
                    detail.summary.path,
                    detail.files.len(),
                    detail.imports.len(),
                    detail.importers.len(),
                    table.build()
                )
            })?
        }

        RetrieveQuery::Deps { path } => output.result(index.dependencies(path), |deps| {
            format!(
                "Dependencies of {}:\n{}\nDepended on by:\n{}",
                deps.package.path,
                create_packages_table(&deps.deps),
                create_packages_table(&deps.deped_bys)
            )
        })?,

        RetrieveQuery::Type { package, name } => {
            output.result(index.type_detail(package, name, unexported), |detail| {
                let mut text = format!(
                    "type {} {}\n",
                    detail.ty.display, detail.underlying
                );
                if !detail.fields.is_empty() {
                    text.push_str(&create_selector_table("Field", &detail.fields));
                    text.push('\n');
                }
                if !detail.methods.is_empty() {
                    text.push_str(&create_selector_table("Method", &detail.methods));
                    text.push('\n');
                }
                text.push_str(&format!(
                    "method set of T: {}\nmethod set of *T: {}\n",
                    detail.value_method_set.join(", "),
                    detail.pointer_method_set.join(", ")
                ));
                text.push_str(&format!("implements: {}", type_list(&detail.implements)));
                text
            })?
        }

        RetrieveQuery::Implementations { package, name } => {
            output.result(index.implementations(package, name), |view| {
                format!(
                    "{}\nimplemented by: {}\nimplements: {}",
                    view.ty.display,
                    implementer_list(&view.implemented_bys),
                    type_list(&view.implements)
                )
            })?
        }

        RetrieveQuery::References {
            package,
            identifier,
        } => output.result(index.references(package, identifier), |refs| {
            let mut table = TableBuilder::new().set_headers(vec!["Package", "Location", "Kind"]);
            for group in &refs.groups {
                for occurrence in &group.occurrences {
                    table = table.add_row(vec![
                        group.package.clone(),
                        format!("{}:{}:{}", occurrence.file, occurrence.line, occurrence.column),
                        if occurrence.declaration { "declaration" } else { "use" }.to_string(),
                    ]);
                }
            }
            format!("{} occurrences of {}\n{}", refs.total, refs.target, table.build())
        })?,

        RetrieveQuery::Source { package, file } => {
            output.result(index.source(package, file), |source| source.content.clone())?
        }
    };
    Ok(code)
}

fn type_list(types: &[TypeRef]) -> String {
    if types.is_empty() {
        return "-".to_string();
    }
    types
        .iter()
        .map(|t| t.display.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn implementer_list(implementers: &[ImplementerView]) -> String {
    if implementers.is_empty() {
        return "-".to_string();
    }
    implementers
        .iter()
        .map(|i| {
            if i.pointer {
                format!("*{}", i.ty.display)
            } else {
                i.ty.display.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(feature = "http-server")]
fn serve(settings: Settings, path: PathBuf) -> anyhow::Result<ExitCode> {
    let corpus = Corpus::load(&path)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(pkgdex::server::http::serve(settings, corpus))?;
    Ok(ExitCode::Success)
}

#[cfg(not(feature = "http-server"))]
fn serve(_settings: Settings, _path: PathBuf) -> anyhow::Result<ExitCode> {
    anyhow::bail!("pkgdex was built without the `http-server` feature")
}
