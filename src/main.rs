use anyhow::{bail, Context, Result};
use clap::Parser;
use clipslicer::analysis::Analyzers;
use clipslicer::audio;
use clipslicer::config::ConfigurationFile;
use clipslicer::pipeline::{Slicer, StageOutcome};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Clipslicer - cut a long recording into clips at significant boundaries
///
/// Runs the slicing logic from a configuration file (interval, chaos, beat, volume, vocal,
/// onset, tempo and pitch stages), optionally refines the candidates by consensus, and writes
/// each clip as a WAV file.
#[derive(Parser, Debug)]
#[command(name = "clipslicer")]
#[command(version = "0.1.0")]
#[command(about = "Audio clip slicing tool", long_about = None)]
struct Args {
    /// Input audio file path (supports MP3, OGG, FLAC, WAV, etc.)
    #[arg(value_name = "INPUT", required_unless_present = "template")]
    input_file: Option<PathBuf>,

    /// Output directory where clip files will be written
    #[arg(value_name = "OUTPUT_DIR", required_unless_present = "template")]
    output_dir: Option<PathBuf>,

    /// Path to the JSON configuration and slicing logic
    #[arg(long, value_name = "PATH", required_unless_present = "template")]
    configuration: Option<PathBuf>,

    /// Write a configuration template listing every slicing method and exit
    #[arg(long, value_name = "PATH", conflicts_with_all = ["input_file", "configuration"])]
    template: Option<PathBuf>,

    /// Refine the candidate intervals by consensus clustering
    #[arg(long)]
    consensus: bool,

    /// Seed for the random slicer (overrides the configuration)
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Log debug detail for every stage
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Validate CLI arguments
    fn validate(&self) -> Result<()> {
        if self.template.is_some() {
            return Ok(());
        }

        let Some(input) = &self.input_file else {
            bail!("Provide an input file or --template");
        };
        if !input.exists() {
            bail!("Input file does not exist: {:?}", input);
        }
        if !input.is_file() {
            bail!("Input path is not a file: {:?}", input);
        }

        match &self.configuration {
            Some(path) if !path.is_file() => {
                bail!("Configuration file does not exist: {:?}", path)
            }
            Some(_) => {}
            None => bail!("Provide the slicing logic via --configuration"),
        }

        if let Some(output_dir) = &self.output_dir {
            if output_dir.exists() && !output_dir.is_dir() {
                bail!("Output path must be a directory: {:?}", output_dir);
            }
        }

        Ok(())
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    args.validate()
        .context("Failed to validate command-line arguments")?;

    if let Some(path) = &args.template {
        ConfigurationFile::template()
            .write(path)
            .context("Failed to write configuration template")?;
        println!("Wrote configuration template to {:?}", path);
        return Ok(());
    }

    let (Some(input_file), Some(output_dir), Some(configuration)) =
        (&args.input_file, &args.output_dir, &args.configuration)
    else {
        bail!("Input, output directory and configuration are required");
    };

    println!("Clipslicer v0.1.0");
    println!("Input:  {:?}", input_file);
    println!("Output dir: {:?}", output_dir);

    let mut file = ConfigurationFile::load(configuration)?;
    if args.consensus {
        file.configuration.consensus = true;
    }
    if args.seed.is_some() {
        file.configuration.seed = args.seed;
    }
    println!("Logic: {} stages", file.logic.len());

    println!("\n1. Decoding input audio...");
    let recording =
        audio::decode_recording(input_file).context("Failed to decode input audio")?;
    println!(
        "   Loaded {} frames x {} channels at {} Hz",
        recording.frame_count(),
        recording.channel_count,
        recording.frame_rate
    );

    println!("\n2. Running slicing stages...");
    let config = file.configuration.clone();
    let mut slicer = Slicer::new(config.clone(), Analyzers::default());
    let outcome = slicer
        .run(&recording, &file.logic)
        .context("Slicing pipeline failed")?;
    for report in &outcome.reports {
        match &report.outcome {
            StageOutcome::Dispatched { intervals } => {
                println!("   Stage {} ({}): {} intervals", report.index, report.method, intervals)
            }
            StageOutcome::Skipped(reason) => {
                println!("   Stage {} ({}): skipped ({:?})", report.index, report.method, reason)
            }
            StageOutcome::Failed(message) => {
                println!("   Stage {} ({}): failed: {}", report.index, report.method, message)
            }
        }
    }
    if !outcome.diagnostics.is_empty() {
        println!("   {} warnings", outcome.diagnostics.len());
    }

    let candidates = outcome.intervals.len();
    if config.consensus {
        println!("\n3. Refining by consensus...");
    }
    let intervals = slicer.refine(&recording, outcome.intervals);
    if config.consensus {
        println!("   {} candidates reduced to {} intervals", candidates, intervals.len());
    }

    println!("\n4. Writing clips...");
    let clips = audio::materialize_all(&recording, &intervals);
    write_clips(&clips, output_dir)?;

    println!("\n✓ Processing complete!");
    Ok(())
}

fn write_clips(clips: &[clipslicer::types::Clip], output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;

    let mut written = 0usize;
    for (i, clip) in clips.iter().enumerate() {
        if clip.samples.frame_count() == 0 {
            eprintln!("   Clip {} is empty; skipping", i + 1);
            continue;
        }
        let output_path = output_dir.join(clip_file_name(i));
        audio::encode_recording(&clip.samples, &output_path)
            .with_context(|| format!("Failed to encode clip {} at {:?}", i + 1, output_path))?;
        println!(
            "   Wrote clip {:04} to {:?} ({:.3}s → {:.3}s)",
            i + 1,
            output_path,
            clip.begin.time,
            clip.end.time
        );
        written += 1;
    }
    println!(
        "   Completed writing {} clip files under {:?}",
        written, output_dir
    );
    Ok(())
}

fn clip_file_name(index: usize) -> String {
    format!("clip_{:04}.wav", index + 1)
}
