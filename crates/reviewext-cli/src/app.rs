//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::glob;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use reviewext_core::config::Settings;
use reviewext_core::convert::{Converter, EXTENDED_OPTIONS, RULES};
use reviewext_core::diagnostics::{apply_fixes, Diagnostic};
use reviewext_core::include::{expand, MapfileResolver};
use reviewext_core::parser;
use reviewext_render::{render_document, Backend};
use reviewext_validate::ValidationEngine;

/// Output format for diagnostics
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

/// Render backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    /// LaTeX for print
    #[default]
    Latex,
    /// HTML for the web
    Html,
}

impl From<RenderFormat> for Backend {
    fn from(format: RenderFormat) -> Self {
        match format {
            RenderFormat::Latex => Backend::Latex,
            RenderFormat::Html => Backend::Html,
        }
    }
}

#[derive(Parser)]
#[command(name = "reviewext")]
#[command(author, version, about = "Listing extensions for Re:VIEW", long_about = None)]
struct Cli {
    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (default: reviewext.toml next to the input)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the listings of a Re:VIEW source
    Render {
        /// Input .re file
        input: PathBuf,

        /// Output backend
        #[arg(short, long, value_enum, default_value = "latex")]
        format: RenderFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert legacy listing syntax to //list with options
    Preprocess {
        /// Glob patterns for Re:VIEW files (e.g. "chapters/*.re")
        #[arg(required_unless_present = "list_options")]
        patterns: Vec<String>,

        /// Output directory
        #[arg(short, long, default_value = ".out")]
        out_dir: PathBuf,

        /// Report what would be converted without writing files
        #[arg(long)]
        dry_run: bool,

        /// Show per-rule statistics
        #[arg(long)]
        stats: bool,

        /// Also expand #@mapfile / #@maprange includes
        #[arg(long)]
        mapfile: bool,

        /// Show the available listing options and exit
        #[arg(long)]
        list_options: bool,
    },

    /// Check a Re:VIEW source for deprecated listing directives
    Check {
        /// Input .re file
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Rewrite the file with every available fix applied
        #[arg(long)]
        fix: bool,
    },
}

/// Options for the preprocess command
#[derive(Debug, Clone, Default)]
pub struct PreprocessOptions {
    pub out_dir: PathBuf,
    pub dry_run: bool,
    pub stats: bool,
    pub mapfile: bool,
}

/// Totals reported by the preprocess command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreprocessStats {
    pub files_processed: usize,
    pub total_replacements: usize,
    /// Per-rule counts, in rule order
    pub rules: Vec<(&'static str, usize)>,
}

/// Run the CLI application
///
/// Parses arguments, installs logging and dispatches to the command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render {
            input,
            format,
            output,
        } => {
            let settings = load_settings(cli.config.as_deref(), &input)?;
            render_command(&input, format, output.as_deref(), &settings)?;
        }
        Commands::Preprocess {
            patterns,
            out_dir,
            dry_run,
            stats,
            mapfile,
            list_options,
        } => {
            if list_options {
                print_list_options();
                return Ok(());
            }
            let options = PreprocessOptions {
                out_dir,
                dry_run,
                stats: stats || cli.verbose,
                mapfile,
            };
            preprocess_command(&patterns, &options, cli.config.as_deref())?;
        }
        Commands::Check { input, format, fix } => {
            let settings = load_settings(cli.config.as_deref(), &input)?;
            let has_errors = check_command(&input, format, fix, &settings)?;
            if has_errors {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Install the stderr subscriber; `RUST_LOG` wins over the default level
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute the render command
pub fn render_command(
    input: &Path,
    format: RenderFormat,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let source = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    let source = expand(&source, &resolver_for(input, settings))
        .with_context(|| format!("Failed to expand includes in {}", input.display()))?;

    let document = parser::parse(&source)
        .with_context(|| format!("Failed to parse {}", input.display()))?;
    debug!(blocks = document.len(), "parsed document");

    let backend = Backend::from(format);
    let rendered = render_document(&document, backend, settings)
        .with_context(|| format!("Failed to render {} as {}", input.display(), backend))?;

    match output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            println!("reviewext v{}", reviewext_core::VERSION);
            println!("  Rendered: {} -> {}", input.display(), path.display());
            println!("  Listings: {}", document.listings().count());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Execute the preprocess command
pub fn preprocess_command(
    patterns: &[String],
    options: &PreprocessOptions,
    config_path: Option<&Path>,
) -> Result<PreprocessStats> {
    println!("reviewext v{} - Starting conversion...", reviewext_core::VERSION);

    let files = collect_files(patterns)?;
    if files.is_empty() {
        println!("No files found matching the patterns.");
        return Ok(PreprocessStats::default());
    }
    println!("Found {} file(s) to process", files.len());

    let mut stats = PreprocessStats {
        rules: RULES.iter().map(|rule| (rule.name, 0)).collect(),
        ..Default::default()
    };

    for file in &files {
        let settings = load_settings(config_path, file)?;
        if options.dry_run {
            println!("[DRY RUN] Would process: {}", file.display());
            continue;
        }

        let replacements = preprocess_file(file, options, &settings, &mut stats)?;
        if replacements > 0 {
            println!("✓ {} ({} replacements)", file.display(), replacements);
        } else {
            println!("✓ {} (no changes)", file.display());
        }
    }

    if options.stats {
        println!();
        println!("=== Conversion Statistics ===");
        println!("Files processed: {}", stats.files_processed);
        println!("Total replacements: {}", stats.total_replacements);
        println!();
        println!("Rule applications:");
        for (rule, count) in &stats.rules {
            if *count > 0 {
                println!("  {}: {}", rule, count);
            }
        }
    }

    println!();
    if options.dry_run {
        println!("[DRY RUN] No files were modified.");
    } else {
        println!(
            "✓ Preprocessing complete! Output written to: {}",
            options.out_dir.display()
        );
    }

    Ok(stats)
}

/// Convert one file into the output directory, returning its replacement count
fn preprocess_file(
    file: &Path,
    options: &PreprocessOptions,
    settings: &Settings,
    stats: &mut PreprocessStats,
) -> Result<usize> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("Failed to read input file: {}", file.display()))?;

    let conversion = Converter::new(&settings.listing)
        .convert(&source)
        .with_context(|| format!("Failed to convert {}", file.display()))?;

    let output = if options.mapfile {
        expand(&conversion.output, &resolver_for(file, settings))
            .with_context(|| format!("Failed to expand includes in {}", file.display()))?
    } else {
        conversion.output.clone()
    };

    let target = options.out_dir.join(output_relative_path(file));
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create output directory: {}", parent.display())
        })?;
    }
    fs::write(&target, output)
        .with_context(|| format!("Failed to write output file: {}", target.display()))?;
    info!(input = %file.display(), output = %target.display(), "converted");

    stats.files_processed += 1;
    stats.total_replacements += conversion.total();
    for (slot, count) in stats.rules.iter_mut().zip(&conversion.counts) {
        slot.1 += count.count;
    }

    Ok(conversion.total())
}

/// Print the listing options the converter understands
fn print_list_options() {
    println!("Available List Options:");
    for (syntax, description) in EXTENDED_OPTIONS {
        println!("  {:<28} - {}", syntax, description);
    }
    println!();
    println!("Conversion Rules:");
    for rule in &RULES {
        println!("  - {}", rule.description);
    }
}

/// Execute the check command
///
/// Returns whether any error-severity diagnostic was reported.
pub fn check_command(
    input: &Path,
    format: OutputFormat,
    fix: bool,
    settings: &Settings,
) -> Result<bool> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    let document = parser::parse(&content)
        .with_context(|| format!("Failed to parse {}", input.display()))?;

    let engine = ValidationEngine::with_settings(&settings.lint);
    let diagnostics: Vec<Diagnostic> = engine
        .validate(&document)
        .into_iter()
        .map(|d| d.with_file(input.display().to_string()))
        .collect();

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&diagnostics)
                .context("Failed to serialize diagnostics to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            if diagnostics.is_empty() {
                println!("✓ No issues found in {}", input.display());
            } else {
                for diag in &diagnostics {
                    println!("{}", diag);
                    println!();
                }
                let error_count = diagnostics.iter().filter(|d| d.is_error()).count();
                let warning_count = diagnostics.iter().filter(|d| d.is_warning()).count();
                println!(
                    "Found {} error(s) and {} warning(s)",
                    error_count, warning_count
                );
            }
        }
    }

    if fix {
        let fixable = diagnostics.iter().filter(|d| d.fix.is_some()).count();
        if fixable > 0 {
            let fixed = apply_fixes(&content, &diagnostics);
            fs::write(input, fixed)
                .with_context(|| format!("Failed to write fixed file: {}", input.display()))?;
            if let OutputFormat::Text = format {
                println!("Applied {} fix(es) to {}", fixable, input.display());
            }
        }
        return Ok(false);
    }

    Ok(diagnostics.iter().any(|d| d.is_error()))
}

/// Load settings from `--config`, or discover them next to `input`
fn load_settings(config_path: Option<&Path>, input: &Path) -> Result<Settings> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Settings::from_file(path)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        }
        None => Settings::discover(input)
            .with_context(|| format!("Failed to load settings for {}", input.display())),
    }
}

/// Mapfile resolver rooted at the input's directory
fn resolver_for(input: &Path, settings: &Settings) -> MapfileResolver {
    let base = match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    MapfileResolver::new(base, settings.mapfile.clone())
}

/// Expand glob patterns into a sorted, de-duplicated file list
fn collect_files(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        for entry in glob(pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))? {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => warn!("Could not read {}", e),
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Where a converted file lands under the output directory
///
/// Relative inputs keep their path; absolute inputs are made relative to
/// the working directory, or lose their root when outside it.
fn output_relative_path(file: &Path) -> PathBuf {
    if file.is_relative() {
        return file.to_path_buf();
    }
    if let Ok(cwd) = std::env::current_dir() {
        if let Ok(relative) = file.strip_prefix(&cwd) {
            return relative.to_path_buf();
        }
    }
    file.components()
        .filter(|c| matches!(c, std::path::Component::Normal(_)))
        .collect()
}
