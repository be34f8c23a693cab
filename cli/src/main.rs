//! untable CLI - HTML table extraction tool

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use untable::{codec, ExtractOptions, ExtractedTable, JsonFormat, NestedTables, TableExtractor};

#[derive(Parser)]
#[command(name = "untable")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract normalized tables from HTML pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract tables as a JSON array
    Extract {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page URL used for table ids (defaults to a file:// URL)
        #[arg(long, env = "UNTABLE_URL")]
        url: Option<String>,

        /// Keep cells where the markup puts them instead of resolving spans
        #[arg(long)]
        no_span: bool,

        /// Leave short rows ragged
        #[arg(long)]
        no_pad: bool,

        /// Harvest caption, headings and surrounding text
        #[arg(short, long)]
        context: bool,

        /// Which tables to return
        #[arg(long, value_enum, default_value = "all")]
        nested: NestedMode,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show a summary line per table
    Info {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page URL used for table ids (defaults to a file:// URL)
        #[arg(long, env = "UNTABLE_URL")]
        url: Option<String>,
    },

    /// Write every table of every page in binary form
    Pack {
        /// Input HTML files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Harvest caption, headings and surrounding text
        #[arg(short, long)]
        context: bool,
    },

    /// Decode a packed table and print it as JSON
    Unpack {
        /// Packed table file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum NestedMode {
    /// Every table, outer and nested
    All,
    /// Only tables without a nested table
    Innermost,
}

impl From<NestedMode> for NestedTables {
    fn from(mode: NestedMode) -> Self {
        match mode {
            NestedMode::All => NestedTables::All,
            NestedMode::Innermost => NestedTables::InnermostOnly,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input,
            url,
            no_span,
            no_pad,
            context,
            nested,
            compact,
            output,
        } => {
            let options = ExtractOptions::new()
                .with_auto_span(!no_span)
                .with_auto_pad(!no_pad)
                .with_context(context)
                .with_nested(nested.into());
            cmd_extract(&input, url, &options, compact, output.as_deref())
        }
        Commands::Info { input, url } => cmd_info(&input, url),
        Commands::Pack {
            inputs,
            output,
            context,
        } => cmd_pack(&inputs, &output, context),
        Commands::Unpack { input } => cmd_unpack(&input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// URL for a local file when none is given.
fn default_url(path: &Path) -> String {
    let absolute = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display())
}

/// Output stems for packed inputs.
///
/// A file stem shared by several inputs gets the input position appended.
/// Fails if two inputs would still write to the same names.
fn packed_stems(inputs: &[PathBuf]) -> Result<Vec<String>, String> {
    let stems: Vec<String> = inputs
        .iter()
        .map(|p| p.file_stem().unwrap_or_default().to_string_lossy().into_owned())
        .collect();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for stem in &stems {
        *counts.entry(stem.as_str()).or_default() += 1;
    }

    let unique: Vec<String> = stems
        .iter()
        .enumerate()
        .map(|(i, stem)| match counts.get(stem.as_str()) {
            Some(n) if *n > 1 => format!("{}-{}", stem, i),
            _ => stem.clone(),
        })
        .collect();

    let mut seen = BTreeSet::new();
    for (input, stem) in inputs.iter().zip(&unique) {
        if !seen.insert(stem.as_str()) {
            return Err(format!(
                "{} would overwrite the output of another input ({}.*.utbl)",
                input.display(),
                stem
            ));
        }
    }
    Ok(unique)
}

/// File name of a packed table.
fn packed_name(stem: &str, table: &ExtractedTable) -> String {
    format!("{}.{}.utbl", stem, table.index)
}

fn read_page(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let data = fs::read(path)?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

fn cmd_extract(
    input: &Path,
    url: Option<String>,
    options: &ExtractOptions,
    compact: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = url.unwrap_or_else(|| default_url(input));
    let html = read_page(input)?;

    let report = TableExtractor::default().extract_with_stats(&url, &html, options)?;
    if report.stats.has_diagnostics() {
        log::info!(
            "{}: {} span defaults, {} overlaps",
            input.display(),
            report.stats.default_span_count,
            report.stats.overlap_count
        );
    }

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = codec::tables_to_json(&report.tables, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!(
            "{} {} tables to {}",
            "Saved".green(),
            report.tables.len(),
            path.display()
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path, url: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let url = url.unwrap_or_else(|| default_url(input));
    let html = read_page(input)?;

    let options = ExtractOptions::new().with_context(true);
    let report = TableExtractor::default().extract_with_stats(&url, &html, &options)?;

    println!("{}", "Page Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "URL".bold(), url);
    if let Some(title) = report
        .tables
        .first()
        .and_then(|t| t.context.as_ref())
        .and_then(|c| c.page_title.as_deref())
    {
        println!("{}: {}", "Title".bold(), title);
    }

    println!();
    println!("{}", "Tables".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for table in &report.tables {
        let indent = "  ".repeat(table.nesting_depth as usize);
        println!(
            "{}{} {}x{} {}",
            indent,
            format!("#{}", table.index).bold(),
            table.grid.height,
            table.grid.width,
            table.source_path.dimmed()
        );
        if let Some(caption) = table.caption() {
            println!("{}   {}: {}", indent, "Caption".bold(), caption);
        }
        if let Some(context) = &table.context {
            if !context.heading_chain.is_empty() {
                println!("{}   {}: {}", indent, "Section".bold(), context.heading_path());
            }
        }
    }

    let stats = &report.stats;
    println!();
    println!("{}", "Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Tables".bold(), stats.table_count);
    println!("{}: {}", "Nested".bold(), stats.nested_table_count);
    println!("{}: {}", "Cells".bold(), stats.cell_count);
    println!("{}: {}", "Spanned fills".bold(), stats.spanned_fill_count);
    println!("{}: {}", "Padding".bold(), stats.padding_count);
    println!("{}: {}", "Span defaults".bold(), stats.default_span_count);
    println!("{}: {}", "Overlaps".bold(), stats.overlap_count);

    Ok(())
}

fn cmd_pack(
    inputs: &[PathBuf],
    output: &Path,
    context: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let stems = packed_stems(inputs)?;
    fs::create_dir_all(output)?;

    let mut pages = Vec::with_capacity(inputs.len());
    for input in inputs {
        pages.push((default_url(input), read_page(input)?));
    }
    let borrowed: Vec<(&str, &str)> = pages
        .iter()
        .map(|(url, html)| (url.as_str(), html.as_str()))
        .collect();

    let options = ExtractOptions::new().with_context(context);
    let results = TableExtractor::default().extract_batch(&borrowed, &options);

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut written = 0;
    let mut failed = 0;
    for ((input, stem), result) in inputs.iter().zip(&stems).zip(results) {
        pb.set_message(input.display().to_string());
        match result {
            Ok(tables) => {
                for table in &tables {
                    fs::write(output.join(packed_name(stem, table)), table.to_bytes()?)?;
                    written += 1;
                }
            }
            Err(e) => {
                pb.println(format!("{} {}: {}", "Skipped".yellow(), input.display(), e));
                failed += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Done!");
    println!(
        "\n{} {} tables written to {}",
        "Done!".green().bold(),
        written,
        output.display()
    );
    if failed > 0 {
        println!("{} {} pages skipped", "Warning:".yellow().bold(), failed);
    }

    Ok(())
}

fn cmd_unpack(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(input)?;
    let table = ExtractedTable::from_bytes(&bytes)?;
    println!("{}", table.to_json(JsonFormat::Pretty)?);
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "untable".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("HTML table extraction tool");
    println!();
    println!("License: MIT");
}
