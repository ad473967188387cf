//! CLI tool for turning AI-generated presentation markup into slide records.

use anyhow::{Context, Result};
use clap::Parser;
use slidemark_core::{sanitize, SlideData};
use slidemark_markup::{get_fallback_image_query, PresentationParser};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Input path that means "read from stdin".
const STDIN_PATH: &str = "-";

/// Parse generated presentation markup into JSON slide records.
#[derive(Parser, Debug)]
#[command(name = "slidemark")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input markup file(s), or - for stdin
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Presentation title (default: input file stem)
    #[arg(short, long)]
    title: Option<String>,

    /// Parse each input as a single slide with this number
    #[arg(short, long)]
    single: Option<usize>,

    /// Disable the regex recovery tier
    #[arg(long)]
    no_fallback: bool,

    /// Add a generated image query to slides that embed none
    #[arg(long)]
    fill_image_queries: bool,

    /// Print the sanitized markup instead of parsing it
    #[arg(long)]
    sanitize_only: bool,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print output to stdout instead of writing to file
    #[arg(short, long)]
    print: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let parser = PresentationParser::new().with_fallback(!args.no_fallback);

    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        match process_input(input_path, &args, &parser) {
            Ok(output) => {
                if args.print || is_stdin(input_path) {
                    print!("{}", output);
                } else {
                    let extension = if args.sanitize_only { "xml" } else { "json" };
                    let output_path =
                        get_output_path(input_path, args.output.as_ref(), extension)?;
                    write_output(&output_path, &output)?;
                    if args.verbose {
                        eprintln!("Written to: {}", output_path.display());
                    }
                }
            }
            Err(e) => {
                eprintln!("Error processing {}: {:#}", input_path.display(), e);
            }
        }
    }

    Ok(())
}

/// Process a single markup input.
fn process_input(input_path: &Path, args: &Args, parser: &PresentationParser) -> Result<String> {
    let markup = read_input(input_path)?;

    if args.sanitize_only {
        return Ok(format!("{}\n", sanitize(&markup)));
    }

    let title = presentation_title(input_path, args.title.as_deref());

    let mut slides = match args.single {
        Some(slide_number) => vec![parser.parse_single(&markup, slide_number, &title)],
        None => {
            let parsed = parser
                .parse_detailed(&markup, &title)
                .with_context(|| format!("Failed to parse '{}'", title))?;
            if args.verbose {
                eprintln!("  Found {} slides ({:?} tier)", parsed.slides.len(), parsed.tier);
            }
            parsed.slides
        }
    };

    if args.fill_image_queries {
        fill_image_queries(&mut slides, &title);
    }

    render_json(&slides, args.pretty)
}

/// Read markup from a file, or from stdin for `-`.
fn read_input(input_path: &Path) -> Result<String> {
    let mut markup = String::new();

    if is_stdin(input_path) {
        std::io::stdin()
            .read_to_string(&mut markup)
            .context("Failed to read stdin")?;
    } else {
        File::open(input_path)
            .with_context(|| format!("Failed to open {}", input_path.display()))?
            .read_to_string(&mut markup)
            .with_context(|| format!("Failed to read {}", input_path.display()))?;
    }

    Ok(markup)
}

fn is_stdin(input_path: &Path) -> bool {
    input_path.as_os_str() == STDIN_PATH
}

/// The explicit title, or the input's file stem.
fn presentation_title(input_path: &Path, title: Option<&str>) -> String {
    match title {
        Some(title) => title.to_string(),
        None => input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|stem| *stem != STDIN_PATH)
            .unwrap_or("Untitled Presentation")
            .to_string(),
    }
}

/// Give every slide without images a generated query.
fn fill_image_queries(slides: &mut [SlideData], title: &str) {
    for slide in slides.iter_mut().filter(|slide| !slide.has_images) {
        let query = get_fallback_image_query(&slide.content, slide.layout_type, title);
        log::debug!("slide {}: fallback image query '{}'", slide.slide_number, query);
        slide.add_image_query(query);
    }
}

fn render_json(slides: &[SlideData], pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(slides)
    } else {
        serde_json::to_string(slides)
    }
    .context("Failed to serialize slides")?;

    Ok(format!("{}\n", json))
}

/// Determine the output path for a processed file.
fn get_output_path(
    input_path: &Path,
    output_dir: Option<&PathBuf>,
    extension: &str,
) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}.{}", stem, extension);

    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(output_filename)
        }
        None => {
            if let Some(parent) = input_path.parent() {
                parent.join(output_filename)
            } else {
                PathBuf::from(output_filename)
            }
        }
    };

    Ok(output_path)
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
