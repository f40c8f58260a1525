//! folio Book - terminal reader

mod cli;
mod player;

use std::io;

use anyhow::Context;
use clap::Parser;
use folio_engine::{Config, NullAudio, Session, StorySource};
use folio_runtime::Storage;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::player::Player;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    tracing::info!("Starting folio Book v{}", folio_engine::VERSION);

    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path).with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if args.seed.is_some() {
        config.rng_seed = args.seed;
    }

    let storage = match &args.save_file {
        Some(path) => Storage::local(path)?,
        None => Storage::session(),
    };

    let mut session = Session::new(config, storage, Box::new(NullAudio))?;
    session.start(&StorySource::parse(&args.story))?;

    let mut player = Player::new(session, args.speed);
    player.run(io::stdin().lock(), io::stdout().lock())
}
