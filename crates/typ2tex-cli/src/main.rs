//! typ2tex: CLI tool to convert Typst documents to LaTeX

mod config;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::{CONFIG_FILE_NAME, Config};
use typ2tex_core::metadata::parse_bibliography_path;
use typ2tex_core::{
    CitationKeys, CommandConverter, Conversion, ConverterOptions, DEFAULT_TEMPLATE,
    convert_document,
};

#[derive(Parser, Debug)]
#[command(name = "typ2tex")]
#[command(about = "Convert Typst documents to LaTeX")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
#[command(after_help = "Examples:
  typ2tex paper.typ                     # Convert to paper.tex
  typ2tex paper.typ -o out/paper.tex    # Convert to a specific file
  typ2tex paper.typ -b refs.bib         # Resolve citations against refs.bib
  typ2tex paper.typ --no-math           # Keep $...$ spans as written
  typ2tex init                          # Write a sample _typ2tex.toml")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input Typst file
    #[arg(required = true)]
    input: Option<PathBuf>,

    /// Output LaTeX file (defaults to the input with a .tex extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// BibTeX file whose keys are cited; other @references become \thref
    #[arg(short, long)]
    bib: Option<PathBuf>,

    /// LaTeX template file
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Configuration file (defaults to _typ2tex.toml next to the input)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep math spans as written instead of converting them
    #[arg(long)]
    no_math: bool,

    /// Command used to convert math spans
    #[arg(long)]
    math_command: Option<String>,

    /// Seconds a single math span may take
    #[arg(long)]
    math_timeout: Option<u64>,

    /// Verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Quiet mode - only show errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a sample configuration file
    Init {
        /// Path of the file to create
        #[arg(default_value = CONFIG_FILE_NAME)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the JSON schema of the configuration file
    Schema {
        /// Write the schema to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match &cli.command {
        Some(Commands::Init { path, force }) => write_sample_config(path, *force, cli.quiet),
        Some(Commands::Schema { output }) => write_schema(output.as_deref()),
        None => {
            let input = cli.input.as_deref().context("No input file given")?;
            convert_file(&cli, input)
        }
    }
}

/// `-v` enables DEBUG, `-q` limits to ERROR, otherwise RUST_LOG or WARN
fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Settings after merging command-line flags, configuration and defaults
#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    template: Option<PathBuf>,
    date: Option<String>,
    math: Option<CommandConverter>,
    auto_discover_bib: bool,
}

impl Settings {
    /// Flags win over the configuration, which wins over defaults
    ///
    /// A template named in the configuration is relative to `config_dir`.
    fn resolve(cli: &Cli, config: &Config, config_dir: &Path) -> Self {
        let template = cli.template.clone().or_else(|| {
            config
                .output
                .template
                .as_ref()
                .map(|path| config_dir.join(path))
        });

        let math_enabled = !cli.no_math && config.math.enabled.unwrap_or(true);
        let math = math_enabled.then(|| {
            let mut converter = CommandConverter::default();
            if let Some(command) = cli.math_command.as_ref().or(config.math.command.as_ref()) {
                converter.command = command.clone();
            }
            if let Some(args) = &config.math.args {
                converter.args = args.clone();
            }
            if let Some(secs) = cli.math_timeout.or(config.math.timeout_secs) {
                converter.timeout = Duration::from_secs(secs);
            }
            converter
        });

        Self {
            template,
            date: config.output.date.clone(),
            math,
            auto_discover_bib: config.bibliography.auto_discover.unwrap_or(true),
        }
    }
}

/// Convert a single Typst file to LaTeX
fn convert_file(cli: &Cli, input: &Path) -> Result<()> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("Failed to read: {}", input.display()))?;

    let input_dir = input
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let (config, config_dir) = load_config(cli.config.as_deref(), input_dir)?;
    let settings = Settings::resolve(cli, &config, &config_dir);
    debug!(?settings, "Resolved settings");

    let template = match &settings.template {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read template: {}", path.display()))?,
        None => DEFAULT_TEMPLATE.to_string(),
    };

    let keys = load_citation_keys(
        cli.bib.as_deref(),
        settings.auto_discover_bib,
        &source,
        input_dir,
    );

    let mut options = ConverterOptions::default().with_citation_keys(keys);
    if let Some(converter) = settings.math {
        options = options.with_math(converter);
    }

    let mut conversion = convert_document(&source, &options);
    conversion.metadata.date = settings.date;
    if conversion.metadata.bibliography_path.is_none() {
        conversion.metadata.bibliography_path = cli.bib.as_ref().map(|p| p.display().to_string());
    }

    let output_path = match &cli.output {
        Some(p) => p.clone(),
        None => input.with_extension("tex"),
    };

    if cli.verbose {
        eprintln!(
            "Converting: {} -> {}",
            input.display(),
            output_path.display()
        );
        print_summary(&conversion, options.citation_keys.len());
    }

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(&output_path, conversion.render(&template))
        .with_context(|| format!("Failed to write: {}", output_path.display()))?;

    if !cli.quiet {
        println!("{}", output_path.display());
    }

    Ok(())
}

/// Load the explicit configuration file, or `_typ2tex.toml` from the input's
/// directory
///
/// Returns the configuration and the directory its relative paths start from.
fn load_config(explicit: Option<&Path>, input_dir: &Path) -> Result<(Config, PathBuf)> {
    if let Some(path) = explicit {
        let config = Config::load(path)?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        return Ok((config, dir));
    }

    let config = Config::load_from_dir(input_dir)?.unwrap_or_default();
    Ok((config, input_dir.to_path_buf()))
}

/// Citation keys from `--bib`, or from the bibliography the document names
///
/// An unreadable file yields an empty set with a warning.
fn load_citation_keys(
    explicit: Option<&Path>,
    auto_discover: bool,
    source: &str,
    input_dir: &Path,
) -> CitationKeys {
    if let Some(path) = explicit {
        return CitationKeys::load_or_empty(path);
    }
    if !auto_discover {
        return CitationKeys::new();
    }
    match parse_bibliography_path(source) {
        Some(name) => CitationKeys::load_or_empty(&input_dir.join(name)),
        None => CitationKeys::new(),
    }
}

fn print_summary(conversion: &Conversion, key_count: usize) {
    let metadata = &conversion.metadata;
    let authors: Vec<_> = metadata.authors.iter().map(|a| a.name.as_str()).collect();

    eprintln!("  Title: {}", metadata.title.as_deref().unwrap_or("(none)"));
    eprintln!(
        "  Authors: {}",
        if authors.is_empty() {
            "(none)".to_string()
        } else {
            authors.join(", ")
        }
    );
    eprintln!(
        "  Abstract: {}",
        match &metadata.abstract_text {
            Some(text) => format!("{} characters", text.chars().count()),
            None => "(none)".to_string(),
        }
    );
    eprintln!(
        "  Bibliography: {} ({} keys)",
        metadata.bibliography_path.as_deref().unwrap_or("(none)"),
        key_count
    );
}

/// Write a sample configuration file with a schema directive
fn write_sample_config(path: &Path, force: bool, quiet: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let content = Config::sample().to_toml_with_schema()?;
    fs::write(path, content).with_context(|| format!("Failed to write: {}", path.display()))?;

    if !quiet {
        println!("{}", path.display());
    }
    Ok(())
}

fn write_schema(output: Option<&Path>) -> Result<()> {
    let schema = Config::json_schema_string()?;
    match output {
        Some(path) => fs::write(path, schema + "\n")
            .with_context(|| format!("Failed to write: {}", path.display()))?,
        None => println!("{schema}"),
    }
    Ok(())
}
