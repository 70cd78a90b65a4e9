use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use minesweep_core::{
    CellCount, Coord, FlagCycle, GameConfig, GameSession, RandomBoardGenerator, Snapshot,
};

use crate::command::Command;

mod command;
mod render;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Preset {
    Beginner,
    Intermediate,
    Expert,
}

impl Preset {
    fn config(self) -> GameConfig {
        match self {
            Self::Beginner => GameConfig::beginner(),
            Self::Intermediate => GameConfig::intermediate(),
            Self::Expert => GameConfig::expert(),
        }
    }
}

/// Play minesweeper in the terminal: `r ROW COL` reveals, `f ROW COL` flags, `n` restarts, `q` quits.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Board preset, individual dimensions below override it
    #[arg(short, long, value_enum, default_value_t = Preset::Expert)]
    preset: Preset,

    /// Number of columns
    #[arg(long)]
    width: Option<Coord>,

    /// Number of rows
    #[arg(long)]
    height: Option<Coord>,

    /// Number of mines
    #[arg(short, long)]
    mines: Option<CellCount>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Toggle only between flag and hidden, without question marks
    #[arg(long)]
    two_state_flags: bool,
}

impl Args {
    fn game_config(&self) -> anyhow::Result<GameConfig> {
        let preset = self.preset.config();
        let config = GameConfig::new(
            self.width.unwrap_or(preset.width()),
            self.height.unwrap_or(preset.height()),
            self.mines.unwrap_or(preset.mines()),
        )?;
        Ok(config)
    }

    fn flag_cycle(&self) -> FlagCycle {
        if self.two_state_flags {
            FlagCycle::TwoState
        } else {
            FlagCycle::ThreeState
        }
    }
}

fn draw(out: &mut impl Write, session: &GameSession) -> io::Result<()> {
    write!(out, "{}", render::render(&Snapshot::from_session(session)))?;
    write!(out, "> ")?;
    out.flush()
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.verbose.tracing_level_filter())
        .with_writer(io::stderr)
        .init();

    let config = args.game_config().context("invalid board configuration")?;
    log::debug!("config: {:?}, seed: {:?}", config, args.seed);
    let generator = match args.seed {
        Some(seed) => RandomBoardGenerator::from_seed(seed),
        None => RandomBoardGenerator::from_entropy(),
    };
    let mut session = GameSession::with_generator(config, generator).with_flag_cycle(args.flag_cycle());

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    draw(&mut stdout, &session)?;

    for line in stdin.lock().lines() {
        let line = line.context("could not read from stdin")?;
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                write!(stdout, "{}\n> ", err)?;
                stdout.flush()?;
                continue;
            }
        };
        log::debug!("command: {:?}", command);

        let updated = match command {
            Command::Quit => break,
            Command::Restart => {
                session.restart();
                true
            }
            // like clicking on the finished board, any move starts over
            Command::Reveal(_) | Command::Flag(_) if session.is_finished() => {
                session.restart();
                true
            }
            Command::Reveal(coords) => session.reveal(coords).has_update(),
            Command::Flag(coords) => session.toggle_flag(coords).has_update(),
        };

        if updated {
            draw(&mut stdout, &session)?;
        } else {
            write!(stdout, "nothing to do there\n> ")?;
            stdout.flush()?;
        }
    }

    log::info!("bye");
    Ok(())
}
