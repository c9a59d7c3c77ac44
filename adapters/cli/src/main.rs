#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Skirmish session on standard input and
//! output.
//!
//! Every input line is a run of command symbols; the board is redrawn after
//! each line until the player quits or input ends.

mod board;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use skirmish_core::{
    ChunkDimensions, Command, Event, REFERENCE_TERMINAL_HEIGHT, REFERENCE_TERMINAL_WIDTH,
};
use skirmish_system_generator::GeneratorConfig;
use skirmish_system_turn_engine::{apply, query, Game, GameConfig};

/// Turn-based tactical skirmish on a terminal grid.
#[derive(Debug, Parser)]
#[command(name = "skirmish")]
struct Args {
    /// Seed for generation and every combat roll.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Terminal width the board is sized for.
    #[arg(long, default_value_t = REFERENCE_TERMINAL_WIDTH)]
    width: u32,
    /// Terminal height the board is sized for.
    #[arg(long, default_value_t = REFERENCE_TERMINAL_HEIGHT)]
    height: u32,
    /// Upper bound on scattered cover pieces.
    #[arg(long)]
    cover: Option<u32>,
    /// Command symbols replayed before standard input is read.
    #[arg(long, default_value = "")]
    script: String,
}

impl Args {
    fn config(&self) -> Result<GameConfig> {
        let dimensions = ChunkDimensions::from_terminal(self.width, self.height)
            .with_context(|| format!("cannot fit a board in {}x{}", self.width, self.height))?;
        let mut generator = GeneratorConfig::for_dimensions(dimensions);
        if let Some(cover) = self.cover {
            generator.cover = cover;
        }
        Ok(GameConfig {
            dimensions,
            seed: self.seed,
            generator,
            ..GameConfig::default()
        })
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let mut game = Game::new(args.config()?);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    draw(&mut out, &game)?;
    if !args.script.is_empty() {
        play_line(&mut out, &mut game, &args.script)?;
    }

    let mut lines = io::stdin().lock().lines();
    while !query::is_quit(&game) {
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read a command line")?;
        play_line(&mut out, &mut game, &line)?;
    }

    log::info!("session over after {} turns", query::turn(&game));
    drop(game.end());
    Ok(())
}

fn play_line(out: &mut impl Write, game: &mut Game, symbols: &str) -> Result<()> {
    let mut events = Vec::new();
    for symbol in symbols.chars() {
        apply(game, Command::from_symbol(symbol), &mut events);
    }
    for event in &events {
        report(out, event)?;
    }
    draw(out, game)
}

fn report(out: &mut impl Write, event: &Event) -> Result<()> {
    let written = match event {
        Event::ShotResolved {
            actor,
            target,
            threshold,
            roll,
            outcome,
        } => writeln!(
            out,
            "({},{}) fires at ({},{}): needs under {threshold}, rolled {roll}, {}",
            actor.column(),
            actor.row(),
            target.column(),
            target.row(),
            outcome.status(),
        ),
        Event::AlienDowned { cell } => {
            writeln!(out, "alien at ({},{}) is down", cell.column(), cell.row())
        }
        other => {
            log::trace!("{other:?}");
            Ok(())
        }
    };
    written.context("failed to write to stdout")
}

fn draw(out: &mut impl Write, game: &Game) -> Result<()> {
    writeln!(out, "{}", board::render(game)).context("failed to write to stdout")?;
    out.flush().context("failed to flush stdout")
}
