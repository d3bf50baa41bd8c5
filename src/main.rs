//! Minimax chess: play against a fixed-depth material engine in the terminal.
//!
//! ## Usage
//!
//! - `minimax-chess` - Play as White against the engine
//! - `minimax-chess play --engine-color white` - Let the engine open
//! - `minimax-chess analyze --fen <FEN>` - Search one position and report

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::debug;
use tracing_subscriber::EnvFilter;

use chess_core::{Board, Color, GameResult, Move};
use chess_engine::{evaluate_position, ChessAI, EngineConfig, DEFAULT_SEARCH_DEPTH};

const INVALID_MOVE_MESSAGE: &str = "Invalid move. Please enter a valid move in UCI format (e.g., e2e4).";

/// Minimax chess: a fixed-depth material search engine
#[derive(Parser)]
#[command(name = "minimax-chess")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game against the engine, entering moves in UCI notation
    Play(PlayArgs),
    /// Search a single position and print the engine's choice
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug, Clone)]
struct EngineArgs {
    /// Plies the engine searches (1-6)
    #[arg(long, default_value_t = DEFAULT_SEARCH_DEPTH)]
    depth: u8,
    /// Seed for the engine's fallback move choice
    #[arg(long)]
    seed: Option<u64>,
    /// Start from this position instead of the initial one
    #[arg(long)]
    fen: Option<String>,
}

impl Default for EngineArgs {
    fn default() -> Self {
        Self {
            depth: DEFAULT_SEARCH_DEPTH,
            seed: None,
            fen: None,
        }
    }
}

impl EngineArgs {
    fn config(&self) -> EngineConfig {
        EngineConfig {
            depth: self.depth,
            seed: self.seed,
        }
    }

    fn board(&self) -> Result<Board> {
        match &self.fen {
            Some(fen) => Board::from_fen(fen).with_context(|| format!("invalid FEN '{fen}'")),
            None => Ok(Board::new()),
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
struct PlayArgs {
    #[command(flatten)]
    engine: EngineArgs,
    /// Side the engine plays
    #[arg(long, value_enum, default_value_t = Side::Black)]
    engine_color: Side,
}

#[derive(Args, Debug, Clone)]
struct AnalyzeArgs {
    #[command(flatten)]
    engine: EngineArgs,
    /// Also print the score of every root move
    #[arg(long)]
    scores: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    White,
    Black,
}

impl Default for Side {
    fn default() -> Self {
        Side::Black
    }
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Analyze(args)) => analyze(&args),
        Some(Commands::Play(args)) => play(&args),
        None => play(&PlayArgs::default()),
    }
}

/// Log records go to stderr so stdout stays the game transcript.
/// Verbosity comes from `RUST_LOG`, e.g. `RUST_LOG=chess_engine=debug`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn play(args: &PlayArgs) -> Result<()> {
    let mut board = args.engine.board()?;
    let mut ai = ChessAI::from_config(&args.engine.config());
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_game(
        &mut board,
        &mut ai,
        args.engine_color.into(),
        &mut stdin.lock(),
        &mut stdout.lock(),
    )?;
    Ok(())
}

/// Alternates human and engine moves until the game ends or input runs out.
fn run_game<R: BufRead, W: Write>(
    board: &mut Board,
    ai: &mut ChessAI,
    engine_color: Color,
    input: &mut R,
    output: &mut W,
) -> Result<GameResult> {
    while !board.is_game_over() {
        if board.current_turn() == engine_color {
            let mv = ai.get_move(board).context("engine could not move")?;
            writeln!(output, "Engine plays: {mv}")?;
            board.push_unchecked(mv);
            continue;
        }

        writeln!(output, "{board}")?;
        let Some(mv) = read_player_move(board, input, output)? else {
            writeln!(output)?;
            writeln!(output, "Input closed, leaving the game.")?;
            return Ok(board.result());
        };
        board.push_unchecked(mv);
    }

    let result = board.result();
    writeln!(output, "Game over. Result: {result}")?;
    Ok(result)
}

/// Prompts until a legal move is entered. `None` means end of input.
fn read_player_move<R: BufRead, W: Write>(board: &Board, input: &mut R, output: &mut W) -> Result<Option<Move>> {
    loop {
        write!(output, "Enter your move: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line).context("failed to read move")? == 0 {
            return Ok(None);
        }

        match board.parse_move(&line) {
            Ok(mv) => return Ok(Some(mv)),
            Err(err) => {
                debug!("rejected input {:?}: {}", line.trim(), err);
                writeln!(output, "{INVALID_MOVE_MESSAGE}")?;
            }
        }
    }
}

fn analyze(args: &AnalyzeArgs) -> Result<()> {
    let mut board = args.engine.board()?;
    let mut ai = ChessAI::from_config(&args.engine.config());

    println!("{board}");
    println!();
    println!("FEN: {}", board.to_fen());
    println!("Material (White): {}", evaluate_position(&board));

    if board.is_game_over() {
        println!("Game over. Result: {}", board.result());
        return Ok(());
    }

    if args.scores {
        for (mv, score) in ai.root_scores(&mut board)? {
            println!("  {mv:<6} {score:>4}");
        }
    }

    let result = ai.analyze(&mut board)?;
    println!(
        "Best move: {} (score {}, depth {}, {} nodes)",
        result.best_move, result.score, result.depth, result.nodes
    );
    Ok(())
}
