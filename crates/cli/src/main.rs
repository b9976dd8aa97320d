//! CLI tool for converting PDF files into editable PowerPoint decks.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pdfdeck_core::{ConvertOptions, Converter, PageMode, PageReport, DEFAULT_DPI, DPI_PRESETS};
use pdfdeck_pdfium::{bind_pdfium, Pdfium, PdfiumDocument};
use pdfdeck_pptx::{DeckSummary, PptxReader, PptxWriter};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

/// Convert PDF pages into PowerPoint slides with editable text.
#[derive(Parser, Debug)]
#[command(name = "pdf2pptx")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PDF file(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output .pptx file, or directory for the converted decks (default: beside the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render resolution for backgrounds and scanned pages
    #[arg(short, long, default_value_t = DEFAULT_DPI, value_parser = parse_dpi)]
    dpi: u32,

    /// Per-page report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
    report: ReportFormat,

    /// Extra directory to search for the PDFium shared library
    #[arg(long, value_name = "DIR")]
    pdfium_lib: Option<PathBuf>,

    /// Re-read the written deck and print a per-slide shape summary
    #[arg(long)]
    summary: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Table,
    Json,
}

/// Report for one converted file.
#[derive(Debug, Serialize)]
struct FileReport {
    input: PathBuf,
    output: PathBuf,
    pages: Vec<PageReport>,
    native_pages: usize,
    scan_pages: usize,
}

impl FileReport {
    fn new(input: &Path, output: &Path, pages: Vec<PageReport>) -> Self {
        let native_pages = pages.iter().filter(|p| p.mode == PageMode::Native).count();
        let scan_pages = pages.len() - native_pages;
        Self {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            pages,
            native_pages,
            scan_pages,
        }
    }
}

fn parse_dpi(value: &str) -> std::result::Result<u32, String> {
    let dpi: u32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if DPI_PRESETS.contains(&dpi) {
        Ok(dpi)
    } else {
        let presets: Vec<String> = DPI_PRESETS.iter().map(u32::to_string).collect();
        Err(format!("DPI must be one of {}", presets.join(", ")))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let is_file_target = args.output.as_deref().is_some_and(has_pptx_extension);
    if is_file_target && args.input.len() > 1 {
        anyhow::bail!("--output names a single .pptx file but {} inputs were given", args.input.len());
    }

    let pdfium = bind_pdfium(args.pdfium_lib.as_deref()).context("PDFium is not available")?;
    let options = ConvertOptions::new().with_dpi(args.dpi);

    let failures = for_each_input(&args.input, |input_path| {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        let report = process_file(&pdfium, input_path, &args, &options)?;
        print_report(&report, args.report)?;
        if args.summary {
            let summary = read_summary(&report.output)?;
            print_summary(&summary);
        }
        Ok(())
    });

    if failures > 0 {
        anyhow::bail!("{} of {} files failed to convert", failures, args.input.len());
    }
    Ok(())
}

/// Run `handle` on every input, reporting each failure and moving on.
/// Returns the number of inputs that failed.
fn for_each_input<F>(inputs: &[PathBuf], mut handle: F) -> usize
where
    F: FnMut(&Path) -> Result<()>,
{
    let mut failures = 0;
    for input_path in inputs {
        if let Err(e) = handle(input_path) {
            eprintln!("Error processing {}: {:#}", input_path.display(), e);
            failures += 1;
        }
    }
    failures
}

/// Convert a single PDF file and write its deck.
fn process_file(
    pdfium: &Pdfium,
    input_path: &Path,
    args: &Args,
    options: &ConvertOptions,
) -> Result<FileReport> {
    let bytes = std::fs::read(input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?;

    let title = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Presentation")
        .to_string();

    let (pptx, pages) = convert_bytes(pdfium, bytes, options, &title, args.verbose)?;

    let output_path = get_output_path(input_path, args.output.as_ref())?;
    write_output(&output_path, &pptx)?;
    if args.verbose {
        eprintln!("Written to: {}", output_path.display());
    }

    Ok(FileReport::new(input_path, &output_path, pages))
}

/// Convert PDF bytes into PPTX bytes plus the per-page report.
fn convert_bytes(
    pdfium: &Pdfium,
    bytes: Vec<u8>,
    options: &ConvertOptions,
    title: &str,
    verbose: bool,
) -> Result<(Vec<u8>, Vec<PageReport>)> {
    let document = PdfiumDocument::load(pdfium, bytes).context("Failed to read the PDF")?;

    let converter = Converter::new(*options);
    let conversion = converter
        .convert(&document, |index, total, mode| {
            log::info!("Page {}/{} converted as {}", index + 1, total, mode);
            if verbose {
                eprintln!("  Page {}/{}: {}", index + 1, total, mode);
            }
        })
        .context("Conversion failed")?;

    let pptx = PptxWriter::new()
        .with_title(title)
        .to_bytes(&conversion.deck)
        .context("Failed to write the presentation")?;

    Ok((pptx, conversion.reports))
}

fn has_pptx_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pptx"))
}

/// Determine the output path for a converted file.
fn get_output_path(input_path: &Path, output: Option<&PathBuf>) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}.pptx", stem);

    let output_path = match output {
        Some(file) if has_pptx_extension(file) => {
            if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory: {}", parent.display())
                })?;
            }
            file.clone()
        }
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
fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content)
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}

fn render_table(report: &FileReport) -> String {
    let mut out = String::new();
    for page in &report.pages {
        out.push_str(&format!(
            "Page {:<4} {:<7} {} words\n",
            page.page_number,
            page.mode.label().to_uppercase(),
            page.word_count
        ));
    }
    out.push_str(&format!(
        "{} pages: {} native, {} scan\n",
        report.pages.len(),
        report.native_pages,
        report.scan_pages
    ));
    out
}

fn print_report(report: &FileReport, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Table => {
            println!("{} -> {}", report.input.display(), report.output.display());
            print!("{}", render_table(report));
        }
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("Failed to encode report")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn read_summary(path: &Path) -> Result<DeckSummary> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    PptxReader::new()
        .read(BufReader::new(file))
        .with_context(|| format!("Failed to read back {}", path.display()))
}

fn print_summary(summary: &DeckSummary) {
    println!(
        "Slide size: {} x {} EMU, {} slides",
        summary.width,
        summary.height,
        summary.slides.len()
    );
    for slide in &summary.slides {
        println!(
            "  Slide {}: {} pictures, {} text boxes",
            slide.number,
            slide.pictures,
            slide.texts.len()
        );
    }
}
