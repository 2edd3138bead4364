//! pad-texture-tool - extracts texture images from Puzzle & Dragons data files.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use pad_texture_tool::{extract, Settings};

#[derive(Parser)]
#[command(name = "pad-texture-tool")]
#[command(about = "Extracts texture images from the binary data of Puzzle & Dragons")]
#[command(version)]
struct Cli {
    /// A texture file (typically ".bc"), a Puzzle & Dragons ".apk", or a
    /// folder of such files to process recursively
    input: PathBuf,

    /// Folder to write textures to (default: next to each input file)
    #[arg(short, long = "outdir", value_name = "OUT_DIR")]
    outdir: Option<PathBuf>,

    /// Do not trim the transparent padding around textures
    #[arg(long, visible_alias = "nt")]
    notrim: bool,

    /// Do not zero the color of fully transparent pixels
    #[arg(long, visible_alias = "nb")]
    noblacken: bool,

    /// Extract monsters made of multiple animation frames
    #[arg(long)]
    animations: bool,

    /// Rename animated textures to the old MONS_<id>_<frame>.PNG style
    #[arg(long)]
    rename: bool,

    /// JSON settings file; command-line flags take precedence
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// `RUST_LOG` directives when present and valid, `info` otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() -> ExitCode {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .without_time()
        .init();

    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => match Settings::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::error!("{}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };
    if cli.notrim {
        settings.trimming_enabled = false;
    }
    if cli.noblacken {
        settings.blackening_enabled = false;
    }
    if cli.animations {
        settings.animations_enabled = true;
    }
    if cli.rename {
        settings.rename_enabled = true;
    }

    match extract(&cli.input, cli.outdir.as_deref(), &settings) {
        Ok(summary) => {
            tracing::info!(
                "Done: {} file(s) read, {} skipped, {} image(s) written",
                summary.files_read,
                summary.files_skipped,
                summary.images_written
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
