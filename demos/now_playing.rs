use anyhow::{Context, Result};
use clap::Parser;
use mpris_chapters::time::to_hhmmss;

mod common;

/// Show what the player is playing right now.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Also print every metadata entry.
    #[arg(short, long)]
    all: bool,

    #[command(flatten)]
    connect: common::Connect,
}

fn main() {
    common::init_logging();
    if let Err(error) = now_playing(Cli::parse()) {
        common::exit_with(error);
    }
}

fn now_playing(cli: Cli) -> Result<()> {
    let player = cli.connect.player()?;
    let metadata = player
        .metadata()
        .context("Could not get metadata for player")?
        .unwrap_or_default();

    println!("Player:   {}", player.ext_name().unwrap_or_default());
    println!("Status:   {}", player.playback_status()?.unwrap_or_default());
    println!("Title:    {}", metadata.title().unwrap_or("Unknown title"));
    if let Some(artists) = metadata.artists() {
        println!("Artists:  {}", artists.join(", "));
    }
    if let Some(album) = metadata.album_name() {
        println!("Album:    {}", album);
    }
    println!("Track ID: {}", player.track_id()?.unwrap_or_default());

    let position = player.position()?.unwrap_or(0);
    let length = metadata
        .length_in_microseconds()
        .and_then(|length| i64::try_from(length).ok());
    match length {
        Some(length) => println!("Position: {} / {}", to_hhmmss(position)?, to_hhmmss(length)?),
        None => println!("Position: {}", to_hhmmss(position)?),
    }

    if cli.all {
        let mut entries: Vec<_> = metadata.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        println!();
        for (key, value) in entries {
            println!("{:<25} {:?}", key, value);
        }
    }

    Ok(())
}
