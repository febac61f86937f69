//! `brirbank` command-line front end.
//!
//! ```bash
//! brirbank generate-hrtf -o data/hrtf_default_48k.hrts --sample-rate 48000
//! brirbank array --irs array_irs.wav --layout 0:90,90:90,180:90,270:90 -o array_brirs
//! brirbank room --sdm room_sdm.wav -o room_brirs --threads 8
//! ```

mod cli;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    cli::run(cli.command)
}
