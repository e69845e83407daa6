//! CLI binary for resumind-preview.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, converts each input and writes the PNG previews.

use anyhow::{Context, Result};
use clap::Parser;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use resumind_preview::{ConversionConfig, ConversionResult, Converter, RasterFormat};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Preview the first page next to the PDF (writes ./resume.png)
  resumind-preview resume.pdf

  # Choose the output file
  resumind-preview resume.pdf -o previews/jane-doe.png

  # Many uploads at once, into a directory
  resumind-preview uploads/*.pdf -o previews/ --concurrency 8

  # Sharper preview of page 2
  resumind-preview --scale 3 --page 2 portfolio.pdf

  # From a URL, JSON summary on stdout
  resumind-preview --json https://example.com/cv.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RESUMIND_SCALE          Render scale (default 2.0)
  RESUMIND_MAX_DIMENSION  Maximum rendered edge in pixels
  RUST_LOG                Override log filter (e.g. resumind_preview=debug)
"#;

#[derive(Parser, Debug)]
#[command(
    name = "resumind-preview",
    version,
    about = "Render the first page of PDF résumés to PNG previews",
    after_help = AFTER_HELP
)]
struct Cli {
    /// PDF file paths or HTTP/HTTPS URLs.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file (single input) or directory. Default: current directory.
    #[arg(short, long, env = "RESUMIND_OUTPUT")]
    output: Option<PathBuf>,

    /// Render scale relative to the page's native size.
    #[arg(long, env = "RESUMIND_SCALE", default_value_t = 2.0)]
    scale: f32,

    /// Page to render (1-indexed).
    #[arg(long, env = "RESUMIND_PAGE", default_value_t = 1,
          value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,

    /// Output image format.
    #[arg(long, env = "RESUMIND_FORMAT", default_value = "png")]
    format: RasterFormat,

    /// Refuse to render pages whose longest edge would exceed this many pixels.
    #[arg(long, env = "RESUMIND_MAX_DIMENSION", default_value_t = 8192)]
    max_dimension: u32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "RESUMIND_PASSWORD")]
    password: Option<String>,

    /// Path to the pdfium shared library (file or directory).
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Conversions to run at once.
    #[arg(short, long, env = "RESUMIND_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "RESUMIND_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Print a JSON summary per input on stdout.
    #[arg(long, env = "RESUMIND_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "RESUMIND_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "RESUMIND_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "RESUMIND_QUIET")]
    quiet: bool,
}

/// One line of `--json` output.
#[derive(Serialize)]
struct Summary<'a> {
    input: &'a str,
    output: Option<String>,
    file_name: Option<&'a str>,
    media_type: &'a str,
    width: Option<u32>,
    height: Option<u32>,
    bytes: Option<usize>,
    error_kind: Option<String>,
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level logs; verbose always wins.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && cli.inputs.len() > 1;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;
    let output_target = OutputTarget::resolve(cli.output.as_deref(), cli.inputs.len())?;
    let converter = Converter::new(config);

    let bar = if show_progress {
        let bar = ProgressBar::new(cli.inputs.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>3}/{len} files  ⏱ {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Rendering");
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    } else {
        None
    };

    // ── Run conversions ──────────────────────────────────────────────────
    let results: Vec<(String, ConversionResult)> =
        stream::iter(cli.inputs.iter().map(|input| {
            let converter = &converter;
            let bar = bar.clone();
            async move {
                let result = converter.convert_file(input).await;
                if let Some(ref bar) = bar {
                    bar.inc(1);
                }
                (input.clone(), result)
            }
        }))
        .buffered(cli.concurrency.max(1))
        .collect()
        .await;

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    // ── Write outputs ────────────────────────────────────────────────────
    let mut failed = 0usize;
    for (input, result) in &results {
        let written = match result.file() {
            Some(file) => {
                let path = output_target.path_for(input, &file.name);
                file.write_to(&path)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                Some(path)
            }
            None => {
                failed += 1;
                None
            }
        };

        if cli.json {
            let summary = Summary {
                input,
                output: written.as_ref().map(|p| p.display().to_string()),
                file_name: result.file_name(),
                media_type: result.media_type(),
                width: result.dimensions().map(|(w, _)| w),
                height: result.dimensions().map(|(_, h)| h),
                bytes: result.image_bytes().map(<[u8]>::len),
                error_kind: result.error_kind().map(|k| k.to_string()),
                error: result.error().map(|e| e.to_string()),
            };
            println!(
                "{}",
                serde_json::to_string(&summary).context("Failed to serialise summary")?
            );
        } else if !cli.quiet {
            match (&written, result.error()) {
                (Some(path), _) => {
                    let (w, h) = result.dimensions().unwrap_or_default();
                    eprintln!(
                        "  {} {}  {}  →  {}",
                        green("✓"),
                        input,
                        dim(&format!("{w}x{h} px")),
                        bold(&path.display().to_string())
                    );
                }
                (None, Some(e)) => eprintln!("  {} {}  {}", red("✗"), input, red(&e.to_string())),
                (None, None) => {}
            }
        }
    }

    if failed > 0 {
        if !cli.quiet && !cli.json {
            eprintln!(
                "{} {}/{} inputs failed",
                red("✘"),
                failed,
                results.len()
            );
        }
        std::process::exit(1);
    }
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .scale(cli.scale)
        .format(cli.format)
        .page_index(cli.page as usize - 1)
        .max_dimension(cli.max_dimension)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.library_path(lib.clone());
    }

    builder.build().context("Invalid configuration")
}

/// Where converted images go.
enum OutputTarget {
    File(PathBuf),
    Dir(PathBuf),
}

impl OutputTarget {
    /// A single input may name a file; otherwise `-o` is a directory.
    fn resolve(output: Option<&Path>, input_count: usize) -> Result<Self> {
        match output {
            None => Ok(OutputTarget::Dir(PathBuf::from("."))),
            Some(p) if p.is_dir() => Ok(OutputTarget::Dir(p.to_path_buf())),
            Some(p) if p.extension().is_some() => {
                if input_count > 1 {
                    anyhow::bail!(
                        "--output {} looks like a file but {} inputs were given; pass a directory",
                        p.display(),
                        input_count
                    );
                }
                Ok(OutputTarget::File(p.to_path_buf()))
            }
            Some(p) => Ok(OutputTarget::Dir(p.to_path_buf())),
        }
    }

    /// Directory outputs are named after the input's stem so batches don't
    /// overwrite each other.
    fn path_for(&self, input: &str, file_name: &str) -> PathBuf {
        match self {
            OutputTarget::File(p) => p.clone(),
            OutputTarget::Dir(dir) => {
                let ext = Path::new(file_name)
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "png".to_string());
                let stem = input
                    .rsplit('/')
                    .next()
                    .and_then(|last| Path::new(last).file_stem())
                    .map(|s| s.to_string_lossy().into_owned())
                    .filter(|s| !s.is_empty());
                match stem {
                    Some(stem) => dir.join(format!("{stem}.{ext}")),
                    None => dir.join(file_name),
                }
            }
        }
    }
}
