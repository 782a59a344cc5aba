// ============================================================================
// SpriteCel CLI — headless batch export via command-line arguments
// ============================================================================
//
// Usage examples:
//   spritecel --input walker.scl --format gif --output-dir renders/
//   spritecel -i walker.scl -o walker.png                (format inferred from output ext)
//   spritecel -i "sprites/*.scl" --format bmp --output-dir out/
//   spritecel -i walker.scl --format sequence --fps 12
//
// All processing runs synchronously on the current thread; only the
// per-frame compositing inside the animated exporters fans out to rayon.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::export::{bmp, gif, png, sequence};
use crate::io::load_sprite;
use crate::project::DEFAULT_FPS;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// SpriteCel headless exporter.
///
/// Render .scl sprite projects to image containers — no editor required.
#[derive(Parser, Debug)]
#[command(
    name = "spritecel",
    about = "SpriteCel headless sprite exporter",
    long_about = "Render SpriteCel sprite projects (.scl) to BMP, PNG, GIF or a\n\
                  numbered PNG frame sequence without opening the editor.\n\n\
                  Example:\n  \
                  spritecel --input walker.scl --format gif --output-dir renders/\n  \
                  spritecel -i \"sprites/*.scl\" --format png --output-dir out/"
)]
pub struct CliArgs {
    /// Input project file(s). Glob patterns accepted (e.g. "sprites/*.scl").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Output file path. Only valid for single-file input.
    /// For batch input use --output-dir instead.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    /// Files are written here with the project's stem and the format's extension.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: bmp, png, gif, sequence.
    /// When omitted, the format is inferred from --output's extension, defaulting to png.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Playback FPS for gif/sequence output. Overrides the FPS stored in the project.
    #[arg(long, value_name = "FPS")]
    pub fps: Option<u32>,

    /// Frame slot to render for still formats (bmp/png). Defaults to the
    /// project's current frame.
    #[arg(long, value_name = "INDEX")]
    pub frame: Option<usize>,

    /// Print per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output container selected on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Bmp,
    Png,
    Gif,
    Sequence,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Bmp => "bmp",
            ExportFormat::Png => "png",
            ExportFormat::Gif => "gif",
            ExportFormat::Sequence => "png", // per-frame files
        }
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    if run_all(&args) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Returns true when every input was exported successfully.
fn run_all(args: &CliArgs) -> bool {
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return false;
    }

    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return false;
    }

    let format = parse_format(args.format.as_deref(), args.output.as_deref());

    if let Some(dir) = &args.output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "error: could not create output directory '{}': {}",
                dir.display(),
                e
            );
            return false;
        }
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }

        let file_start = Instant::now();

        match run_one(input_path, args, format) {
            Ok(written) => {
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        written.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    !any_failure
}

// ============================================================================
// Per-file processing
// ============================================================================

fn run_one(input: &Path, args: &CliArgs, format: ExportFormat) -> Result<PathBuf, String> {
    let (mut sprite, stored_fps) =
        load_sprite(input).map_err(|e| format!("load failed: {}", e))?;
    let stored_fps = if stored_fps == 0 { DEFAULT_FPS } else { stored_fps };
    let fps = args.fps.unwrap_or(stored_fps).max(1);

    if let Some(frame) = args.frame {
        if sprite.frame(frame).is_none() {
            return Err(format!("frame slot {} is empty", frame));
        }
        sprite.set_current_frame_index(frame);
    }

    let (dir, stem) = resolve_destination(input, args, format)?;

    let result = match format {
        ExportFormat::Bmp => bmp::export(&sprite, &dir, &stem),
        ExportFormat::Png => png::export(&sprite, &dir, &stem),
        ExportFormat::Gif => gif::export(&sprite, &dir, &stem, fps),
        ExportFormat::Sequence => sequence::export(&sprite, &dir, &stem, fps),
    };
    result.map_err(|e| format!("export failed: {}", e))
}

/// Split the target into (directory, file stem). The encoders append their
/// own extensions.
fn resolve_destination(
    input: &Path,
    args: &CliArgs,
    format: ExportFormat,
) -> Result<(PathBuf, String), String> {
    if let Some(out) = &args.output {
        let dir = out
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        let stem = out
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| format!("cannot derive a file stem from '{}'", out.display()))?;
        return Ok((dir, stem));
    }

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| format!("cannot derive a file stem from '{}'", input.display()))?;

    if let Some(dir) = &args.output_dir {
        return Ok((dir.clone(), stem));
    }

    // Write next to the input file
    let dir = input.parent().unwrap_or(Path::new(".")).to_path_buf();
    // Avoid silent overwrite when the input shares the target extension
    let collides = input
        .extension()
        .map(|e| e.eq_ignore_ascii_case(format.extension()))
        .unwrap_or(false);
    if collides {
        Ok((dir, format!("{}_out", stem)))
    } else {
        Ok((dir, stem))
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            // Literal path — use directly
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        // Treat as glob pattern
        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Choose the [`ExportFormat`] from the `--format` string or infer it from
/// the output file extension. Defaults to PNG when neither is known.
fn parse_format(format_arg: Option<&str>, output: Option<&Path>) -> ExportFormat {
    if let Some(f) = format_arg {
        return match f.to_lowercase().as_str() {
            "bmp"            => ExportFormat::Bmp,
            "gif"            => ExportFormat::Gif,
            "sequence" | "seq" => ExportFormat::Sequence,
            _                => ExportFormat::Png,
        };
    }

    if let Some(out) = output {
        return match out
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "bmp" => ExportFormat::Bmp,
            "gif" => ExportFormat::Gif,
            _     => ExportFormat::Png,
        };
    }

    ExportFormat::Png
}
