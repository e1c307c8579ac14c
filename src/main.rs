use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chain_reaction::arena::{self, Tally};
use chain_reaction::config::{AppConfig, Seat};
use chain_reaction::engine::{Engine, MatchSetup};
use chain_reaction::game::Player;

/// Play Chain Reaction matches between bots.
#[derive(Parser)]
#[command(name = "chain-reaction", about = "Run Chain Reaction bot matches")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Number of matches to play
    #[arg(long, default_value_t = 1)]
    games: usize,

    /// Comma-separated seats in turn order, e.g. minimax,greedy,random
    #[arg(long, value_delimiter = ',')]
    seats: Option<Vec<Seat>>,

    /// Override board rows
    #[arg(long)]
    rows: Option<usize>,

    /// Override board columns
    #[arg(long)]
    cols: Option<usize>,

    /// Override minimax search depth
    #[arg(long)]
    depth: Option<usize>,

    /// Seed for the random bot; match N uses seed + N
    #[arg(long)]
    seed: Option<u64>,

    /// Print the board after every move
    #[arg(long)]
    show: bool,

    /// Emit one JSON line per match
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(seats) = cli.seats {
        config.players.seats = seats;
    }
    if let Some(rows) = cli.rows {
        config.board.rows = rows;
    }
    if let Some(cols) = cli.cols {
        config.board.cols = cols;
    }
    if let Some(depth) = cli.depth {
        config.search.depth = depth;
    }
    if cli.seed.is_some() {
        config.search.seed = cli.seed;
    }
    config.validate().context("invalid settings")?;

    if let Some(i) = config.players.seats.iter().position(|s| *s == Seat::Human) {
        bail!("seat {i} is human; this runner only plays bot seats (set --seats or players.seats)");
    }

    let seats = config.players.seats.clone();
    tracing::info!(
        games = cli.games,
        rows = config.board.rows,
        cols = config.board.cols,
        seats = ?seats,
        "starting arena"
    );

    let mut engine = Engine::new();
    let mut tally = Tally::new(seats.len());
    for game in 0..cli.games {
        let mut setup = MatchSetup::from_config(&config);
        if let Some(seed) = config.search.seed {
            setup.settings.seed = Some(seed.wrapping_add(game as u64));
        }

        let record = arena::play_match(&mut engine, setup, |event| {
            if cli.show {
                println!(
                    "move {} {} -> {} ({} transfers, {} waves)\n{}",
                    event.move_number,
                    event.player,
                    event.at,
                    event.transfers,
                    event.waves,
                    event.board
                );
            }
        })
        .with_context(|| format!("match {} failed", game + 1))?;

        if cli.json {
            let line = serde_json::json!({
                "game": game + 1,
                "seats": seats,
                "result": record,
            });
            println!("{line}");
        } else {
            println!(
                "game {}: {} ({}) wins after {} moves, longest cascade {} waves",
                game + 1,
                record.winner.name(),
                seats[record.winner.index()].label(),
                record.moves,
                record.longest_cascade
            );
        }
        tally.record(&record);
    }

    if !cli.json {
        println!("\n{} matches, {:.1} moves on average", tally.matches(), tally.average_length());
        for (i, seat) in seats.iter().enumerate() {
            let player = Player::new(i);
            println!(
                "  {:<9} {:<21} {:>4} wins ({:.1}%)",
                player.name(),
                seat.label(),
                tally.wins(player),
                tally.win_rate(player) * 100.0
            );
        }
    }

    Ok(())
}
