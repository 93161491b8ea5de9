use clap::{Parser, Subcommand};
use profile_photo::acquisition::Gesture;
use profile_photo::field::ProfilePhotoField;
use profile_photo::imaging::RustBackend;
use profile_photo::types::{CropRegion, UploadState};
use profile_photo::{config, intake, output, render};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "profile-photo")]
#[command(about = "Validate, square-crop and normalize profile photos")]
#[command(long_about = "\
Validate, square-crop and normalize profile photos

Runs image files through the same pipeline as the profile photo form field:

  1. Validate    type must be JPEG, PNG, WebP or AVIF; size at most 5 MB
  2. Crop        square crop box, centered over 80% of the shorter edge
  3. Normalize   rendered to 2048x2048 and encoded as JPEG at quality 95
  4. Bind        written to the form's file field as profile.jpg

Settings are read from profile-photo.toml in the config directory.
Run 'profile-photo gen-config' to generate a documented one.")]
#[command(version)]
struct Cli {
    /// Directory holding profile-photo.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Log debug events when RUST_LOG is unset
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate files without processing them
    Check { files: Vec<PathBuf> },
    /// Crop and normalize one file
    Crop {
        file: PathBuf,
        /// Output directory
        #[arg(long, default_value = "out")]
        out: PathBuf,
        /// Crop box left edge, in source pixels
        #[arg(long, requires_all = ["y", "size"])]
        x: Option<u32>,
        /// Crop box top edge, in source pixels
        #[arg(long, requires_all = ["x", "size"])]
        y: Option<u32>,
        /// Crop box edge length, in source pixels
        #[arg(long, requires_all = ["x", "y"])]
        size: Option<u32>,
        /// Print the form submission as JSON instead of the summary
        #[arg(long)]
        json: bool,
    },
    /// Crop and normalize every image under a directory, in parallel
    Batch {
        dir: PathBuf,
        /// Output directory
        #[arg(long, default_value = "out")]
        out: PathBuf,
    },
    /// Print the field's markup as a standalone HTML page
    Render {
        /// URL of the profile's current image, if any
        #[arg(long)]
        existing: Option<String>,
        /// Apply the delete button before rendering
        #[arg(long)]
        deleted: bool,
    },
    /// Print a stock profile-photo.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Check { files } => {
            output::print_check_paths(&files);
        }
        Command::Crop {
            file,
            out,
            x,
            y,
            size,
            json,
        } => {
            let config = config::load_config(&cli.config_dir)?;
            let region = match (x, y, size) {
                (Some(x), Some(y), Some(size)) => Some(CropRegion::square(x, y, size)),
                _ => None,
            };
            match intake::intake_file(RustBackend::new(), &config, &file, region) {
                Ok(outcome) => {
                    let written = intake::write_outcome(&outcome, &out)?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&outcome.submission)?);
                    } else {
                        for line in output::format_outcome(&outcome, Some(&written)) {
                            println!("{}", line);
                        }
                    }
                }
                Err(err) => {
                    for line in output::format_failure(&file, &err) {
                        println!("{}", line);
                    }
                    std::process::exit(1);
                }
            }
        }
        Command::Batch { dir, out } => {
            let config = config::load_config(&cli.config_dir)?;
            init_thread_pool(&config.processing);
            let backend = RustBackend::new();
            let results = intake::intake_dir(&backend, &config, &dir);
            output::print_batch(&intake::write_batch(&dir, results, &out));
        }
        Command::Render { existing, deleted } => {
            let config = config::load_config(&cli.config_dir)?;
            let mut field = ProfilePhotoField::new(RustBackend::new(), &config, existing);
            if deleted && field.state() != UploadState::Deleted {
                field.handle(Gesture::DeleteClicked);
            }
            println!("{}", render::render_page("Profile photo", &field.view()).into_string());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the config can only lower it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
