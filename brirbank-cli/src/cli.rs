use anyhow::{bail, Context, Result};
use brirbank_core::audio_data::{AudioSignal, LoadOptions};
use brirbank_core::hrtf::{regular_grid, write_hrtf_set, HRTF_CONTAINER_EXTENSION};
use brirbank_core::{
    BrirBankDesc, BrirEvent, BrirPipeline, HrtfSet, LoudspeakerLayout, LoudspeakerSignals,
    SpatialRoomDescription,
};
use clap::{Args, Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Synthesizes 360-orientation BRIR banks for head-tracked binaural playback.
#[derive(Parser)]
#[command(name = "brirbank", version)]
pub struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Bank from loudspeaker-array impulse responses (one channel per loudspeaker)
    Array {
        /// Multichannel impulse response file
        #[arg(long)]
        irs: PathBuf,

        /// Loudspeaker directions in degrees, `azimuth:colatitude,...`
        /// (default: evenly spaced horizontal ring)
        #[arg(long)]
        layout: Option<String>,

        /// Output bank (`.wav` appended when missing)
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Bank from a spatial decomposition file `[pressure, azimuth, colatitude]`
    Room {
        /// Three channel SDM file, directions in radians
        #[arg(long)]
        sdm: PathBuf,

        /// Output bank (`.wav` appended when missing)
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Write an identity HRTF container (unit impulses on a regular grid)
    GenerateHrtf {
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value_t = 48000)]
        sample_rate: u32,

        /// Samples per impulse response
        #[arg(long, default_value_t = 256)]
        length: usize,

        #[arg(long, default_value_t = 5)]
        azimuth_step: u32,

        #[arg(long, default_value_t = 5)]
        colatitude_step: u32,
    },
}

#[derive(Args)]
pub struct CommonArgs {
    #[arg(long, default_value_t = 48000)]
    sample_rate: u32,

    /// HRTF container (default: the built-in set for the sample rate)
    #[arg(long)]
    hrtf: Option<PathBuf>,

    /// Replace HRTFs by unit impulses
    #[arg(long)]
    dummy_hrtf: bool,

    /// Directory holding the default HRTF sets (default: $BRIRBANK_DATA_DIR or ./data)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Worker threads for the orientation sweep
    #[arg(long)]
    threads: Option<NonZeroUsize>,

    /// Keep the bank as rendered even if it clips
    #[arg(long)]
    no_normalize: bool,
}

impl CommonArgs {
    fn desc(&self) -> BrirBankDesc {
        let mut desc = BrirBankDesc::new()
            .sample_rate(self.sample_rate)
            .dummy_hrtf(self.dummy_hrtf)
            .normalize(!self.no_normalize);
        if let Some(path) = &self.hrtf {
            desc = desc.hrtf_path(path);
        }
        if let Some(dir) = &self.data_dir {
            desc = desc.data_dir(dir);
        }
        if let Some(threads) = self.threads {
            desc = desc.worker_threads(threads);
        }
        desc
    }
}

pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Array {
            irs,
            layout,
            output,
            common,
        } => cmd_array(&irs, layout.as_deref(), &output, &common),
        Command::Room {
            sdm,
            output,
            common,
        } => cmd_room(&sdm, &output, &common),
        Command::GenerateHrtf {
            output,
            sample_rate,
            length,
            azimuth_step,
            colatitude_step,
        } => cmd_generate_hrtf(&output, sample_rate, length, azimuth_step, colatitude_step),
    }
}

fn cmd_array(irs: &Path, layout: Option<&str>, output: &Path, common: &CommonArgs) -> Result<()> {
    let mut pipeline = BrirPipeline::new(common.desc())?;

    let options = LoadOptions::new().target_sample_rate(common.sample_rate);
    let signal = AudioSignal::from_path_with_options(path_str(irs)?, &options)
        .with_context(|| format!("Failed to load impulse responses {}", irs.display()))?;
    let signals = LoudspeakerSignals::from_audio(&signal);

    let layout = match layout {
        Some(spec) => LoudspeakerLayout::from_degrees(&parse_layout(spec)?),
        None => LoudspeakerLayout::horizontal_ring(signals.loudspeakers()),
    };
    if layout.positions().len() != signals.loudspeakers() {
        bail!(
            "Layout has {} loudspeakers but {} has {} channels",
            layout.positions().len(),
            irs.display(),
            signals.loudspeakers()
        );
    }

    log::info!(
        "Array source: {} loudspeakers, {} samples",
        signals.loudspeakers(),
        signals.len()
    );
    let path = pipeline
        .write_loudspeaker_brirs(output, signals, Arc::new(layout), None)
        .context("Failed to synthesize loudspeaker BRIR bank")?;
    report(&mut pipeline);
    println!("{}", path.display());
    Ok(())
}

fn cmd_room(sdm: &Path, output: &Path, common: &CommonArgs) -> Result<()> {
    let mut pipeline = BrirPipeline::new(common.desc())?;

    let signal = AudioSignal::from_path(path_str(sdm)?)
        .with_context(|| format!("Failed to load SDM file {}", sdm.display()))?;
    if signal.sample_rate() != common.sample_rate {
        bail!(
            "{} runs at {} Hz, expected {} Hz",
            sdm.display(),
            signal.sample_rate(),
            common.sample_rate
        );
    }
    let room = SpatialRoomDescription::from_audio(&signal)?.sanitize_nan();

    log::info!("Room source: {} samples", room.len());
    let path = pipeline
        .write_room_brirs(output, room, None)
        .context("Failed to synthesize room BRIR bank")?;
    report(&mut pipeline);
    println!("{}", path.display());
    Ok(())
}

fn cmd_generate_hrtf(
    output: &Path,
    sample_rate: u32,
    length: usize,
    azimuth_step: u32,
    colatitude_step: u32,
) -> Result<()> {
    if azimuth_step == 0 || colatitude_step == 0 {
        bail!("Grid steps must be at least one degree");
    }
    let output = match output.extension() {
        Some(_) => output.to_path_buf(),
        None => output.with_extension(HRTF_CONTAINER_EXTENSION),
    };
    let output = output.as_path();

    let grid = regular_grid(azimuth_step, colatitude_step);
    let set = HrtfSet::identity(grid, length, sample_rate)?;
    write_hrtf_set(&set, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    log::info!(
        "Identity HRTF set: {} positions, {} samples, {} Hz -> {}",
        set.grid_len(),
        set.ir_len(),
        set.sample_rate(),
        output.display()
    );
    Ok(())
}

fn report(pipeline: &mut BrirPipeline) {
    for event in pipeline.poll_events() {
        match event {
            BrirEvent::ClippingCorrected { peak } => {
                log::warn!("Bank rescaled, peak was {:.3}", peak);
            }
            BrirEvent::SweepCompleted { elapsed, .. } => {
                log::info!("Sweep took {:.2?}", elapsed);
            }
            other => log::debug!("{:?}", other),
        }
    }
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .with_context(|| format!("Path is not valid UTF-8: {}", path.display()))
}

/// Parses `azimuth:colatitude` pairs in degrees, separated by commas.
pub fn parse_layout(spec: &str) -> Result<Vec<(f32, f32)>> {
    spec.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (azimuth, colatitude) = entry
                .split_once(':')
                .with_context(|| format!("Expected `azimuth:colatitude`, got `{}`", entry))?;
            let azimuth: f32 = azimuth
                .trim()
                .parse()
                .with_context(|| format!("Invalid azimuth in `{}`", entry))?;
            let colatitude: f32 = colatitude
                .trim()
                .parse()
                .with_context(|| format!("Invalid colatitude in `{}`", entry))?;
            Ok((azimuth, colatitude))
        })
        .collect()
}
