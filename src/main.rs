//! glossmark CLI
//!
//! Usage:
//!   glossmark [OPTIONS] [FILES]...
//!
//! Options:
//!   -c, --config <FILE>      Project configuration (TOML format)
//!   -p, --project <NAME>     Project identifier
//!   -s, --style <STYLE>      Output style: html or text
//!   -o, --output-dir <DIR>   Write one output file per input
//!   --fragment               HTML without the page wrapper
//!   --clear-definitions      Start from an empty definition registry
//!   --list-definitions       Print collected definitions as TOML
//!   -v, --verbose            Debug logging
//!   -h, --help               Print help

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glossmark::{Project, ProjectId, PublishConfig, PublishError, Publisher, Style};

#[derive(Parser)]
#[command(name = "glossmark")]
#[command(about = "Publish markup with an interactive glossary")]
struct Cli {
    /// Input files, published in order (reads stdin if none are given)
    files: Vec<PathBuf>,

    /// Project configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project identifier (overrides the configuration)
    #[arg(short, long)]
    project: Option<String>,

    /// Output style
    #[arg(short, long, value_enum, default_value_t = StyleArg::Html)]
    style: StyleArg,

    /// Write <stem>.html or <stem>.txt files into this directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Emit HTML fragments instead of complete pages
    #[arg(long)]
    fragment: bool,

    /// Start from an empty definition registry, ignoring configured definitions
    #[arg(long)]
    clear_definitions: bool,

    /// Print the project's definitions as TOML after publishing
    #[arg(long)]
    list_definitions: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Registry dump, shaped like the `[definitions]` section of a project file
#[derive(Serialize)]
struct DefinitionListing {
    definitions: BTreeMap<String, String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum StyleArg {
    Html,
    Text,
}

impl From<StyleArg> for Style {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Html => Style::Html,
            StyleArg::Text => Style::Text,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "glossmark=debug"
    } else {
        "glossmark=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // Load project
    let mut project = match &cli.config {
        Some(path) => match Project::from_file(path) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error loading project '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Project::default(),
    };
    if let Some(name) = &cli.project {
        project.id = ProjectId::new(name.clone());
    }

    let mut config = PublishConfig::for_project(&project).with_style(cli.style.into());
    if project.html.standalone.is_none() {
        config = config.with_standalone(!cli.fragment);
    } else if cli.fragment {
        config = config.with_standalone(false);
    }

    let mut publisher = Publisher::new(project, config);
    if cli.clear_definitions {
        publisher.clear_definitions();
    }

    if let Some(dir) = &cli.output_dir {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Error creating output directory '{}': {}", dir.display(), e);
            return ExitCode::FAILURE;
        }
    }

    let mut failed = false;
    if cli.files.is_empty() {
        let mut source = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut source) {
            eprintln!("Error reading from stdin: {}", e);
            return ExitCode::FAILURE;
        }
        match publisher.publish_str(&source, None) {
            Ok(report) => print!("{}", report.output),
            Err(e) => {
                report_error(&e);
                failed = true;
            }
        }
    } else {
        for file in &cli.files {
            match publisher.publish_file(file) {
                Ok(report) => {
                    if let Err(e) = write_output(&cli, file, &report.output) {
                        eprintln!("Error writing output for '{}': {}", file.display(), e);
                        failed = true;
                    }
                }
                Err(e) => {
                    report_error(&e);
                    failed = true;
                }
            }
        }
    }

    if cli.list_definitions {
        let listing = DefinitionListing {
            definitions: publisher.registry().snapshot(&publisher.project().id),
        };
        match toml::to_string(&listing) {
            Ok(listing) => print!("{}", listing),
            Err(e) => {
                eprintln!("Error listing definitions: {}", e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn report_error(err: &PublishError) {
    eprintln!("Error: {}", err.format());
}

fn write_output(cli: &Cli, input: &Path, output: &str) -> io::Result<()> {
    match &cli.output_dir {
        Some(dir) => {
            let style: Style = cli.style.into();
            let stem = input.file_stem().unwrap_or(input.as_os_str());
            let target = dir.join(format!("{}.{}", stem.to_string_lossy(), style.extension()));
            fs::write(&target, output)?;
            tracing::info!(file = %target.display(), "wrote output");
            Ok(())
        }
        None => {
            print!("{}", output);
            Ok(())
        }
    }
}
