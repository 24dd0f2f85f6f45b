//! pdfrender CLI - PDF page rendering tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfrender::{
    Document, DocumentInfo, PageSelection, PdfiumEngine, RenderHints, RenderOptions, DEFAULT_DPI,
};

#[derive(Parser)]
#[command(name = "pdfrender")]
#[command(version)]
#[command(about = "Render PDF pages to images", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// PDFium library file or directory
    #[arg(long, global = true, env = "PDFIUM_DYNAMIC_LIB_PATH", value_name = "PATH")]
    pdfium_lib: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render pages to PNG files
    Render {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Resolution in dots per inch
        #[arg(long, default_value_t = DEFAULT_DPI)]
        dpi: u32,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Disable anti-aliasing of paths, images and text
        #[arg(long)]
        no_antialias: bool,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Resolution used to report page sizes
        #[arg(long, default_value_t = DEFAULT_DPI)]
        dpi: u32,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let lib = cli.pdfium_lib.as_deref();

    let result = match cli.command {
        Some(Commands::Render {
            input,
            output,
            dpi,
            pages,
            no_antialias,
        }) => cmd_render(lib, &input, output.as_deref(), dpi, pages.as_deref(), no_antialias),
        Some(Commands::Info { input, dpi, json }) => cmd_info(lib, &input, dpi, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            if let Some(input) = cli.input {
                cmd_render(lib, &input, cli.output.as_deref(), DEFAULT_DPI, None, false)
            } else {
                println!("{}", "Usage: pdfrender <FILE> [OUTPUT]".yellow());
                println!("       pdfrender --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_engine(lib: Option<&Path>) -> pdfrender::Result<PdfiumEngine> {
    match lib {
        Some(path) => PdfiumEngine::from_library(path),
        None => PdfiumEngine::new(),
    }
}

/// Output file name for a zero-based page index, padded to the page count.
fn page_filename(index: usize, page_count: usize) -> String {
    let width = page_count.max(1).to_string().len().max(3);
    format!("page_{:0width$}.png", index + 1, width = width)
}

fn cmd_render(
    lib: Option<&Path>,
    input: &Path,
    output: Option<&Path>,
    dpi: u32,
    pages: Option<&str>,
    no_antialias: bool,
) -> CliResult {
    let page_selection = match pages {
        Some(p) => PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?,
        None => PageSelection::All,
    };

    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_pages", stem))
    });
    fs::create_dir_all(&output_dir)?;

    let hints = if no_antialias {
        RenderHints::none()
    } else {
        RenderHints::default()
    };
    let options = RenderOptions::new()
        .with_dpi(dpi)
        .with_hints(hints)
        .with_pages(page_selection);

    let engine = load_engine(lib)?;
    let doc = Document::open(&engine, input)?;
    let page_count = doc.page_count()?;
    let renders = doc.render_pages(&options)?;

    let pb = ProgressBar::new(renders.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut written = 0;
    let mut blank = Vec::new();
    for (index, page) in renders {
        pb.set_message(format!("page {}", index + 1));
        match page? {
            Some(image) => {
                image.save(output_dir.join(page_filename(index, page_count)))?;
                written += 1;
            }
            None => blank.push(index + 1),
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    for page in &blank {
        println!("{} page {} rendered blank", "Skipped".yellow(), page);
    }
    println!(
        "\n{} {} pages written to {}",
        "Done!".green().bold(),
        written,
        output_dir.display()
    );

    Ok(())
}

fn cmd_info(lib: Option<&Path>, input: &Path, dpi: u32, json: bool) -> CliResult {
    let engine = load_engine(lib)?;
    let doc = Document::open(&engine, input)?;
    let info = DocumentInfo::collect(&doc, dpi)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), info.page_count);

    println!();
    println!("{}", format!("Page Sizes ({} dpi)", info.dpi).cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (index, size) in info.page_sizes.iter().enumerate() {
        match size {
            Some((w, h)) => println!("{} {}: {}x{}", "Page".bold(), index + 1, w, h),
            None => println!("{} {}: {}", "Page".bold(), index + 1, "blank".dimmed()),
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfrender".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF page rendering tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_filename_padding() {
        assert_eq!(page_filename(0, 1), "page_001.png");
        assert_eq!(page_filename(41, 120), "page_042.png");
        assert_eq!(page_filename(999, 1000), "page_1000.png");
        assert_eq!(page_filename(0, 0), "page_001.png");
    }

    #[test]
    fn test_cli_parses_render() {
        let cli = Cli::try_parse_from([
            "pdfrender", "render", "in.pdf", "--dpi", "150", "--pages", "1-2", "--no-antialias",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Render {
                dpi,
                pages,
                no_antialias,
                ..
            }) => {
                assert_eq!(dpi, 150);
                assert_eq!(pages.as_deref(), Some("1-2"));
                assert!(no_antialias);
            }
            _ => panic!("Expected render command"),
        }
    }
}
