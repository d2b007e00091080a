//! Blindfold: a terminal blindfold chess trainer.
//!
//! ## Usage
//!
//! - `blindfold play` - Play the engine without seeing the board
//! - `blindfold path` - Knight / bishop shortest-path puzzles
//! - `blindfold mate` - Find the mating line
//! - `blindfold colors` - Name the colour of a square
//! - `blindfold coords` - Tap the named square on an unlabelled board
//! - `blindfold schema` - Print the configuration JSON schema

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use blindfold_trainer::TrainerConfig;
use blindfold_trainer::domain::{PieceColor, ShakmatyOracle, Square};
use blindfold_trainer::models::{EngineSession, GameOrchestrator, GamePhase, ProcessTransport};
use blindfold_trainer::prefs::{JsonFileStore, Preferences};
use blindfold_trainer::puzzles::{
    ColorQuiz, ColorVerdict, CoordTrainer, MatePuzzle, MateSession, MateVerdict, PathGrade, PathPiece, PathPuzzle,
    PathSolver, TapVerdict, parse_shade,
};
use blindfold_trainer::ui::{Orientation, render_move_list};

/// Blindfold chess trainer
#[derive(Parser)]
#[command(name = "blindfold")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Preference file
    #[arg(long, global = true, default_value = "blindfold-prefs.json")]
    prefs: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game against the engine
    Play {
        #[arg(long, value_enum)]
        side: Option<Side>,
        /// Engine skill level (0-20)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=20))]
        skill: Option<u8>,
        /// Search depth per engine move
        #[arg(long)]
        depth: Option<u32>,
        /// Engine executable
        #[arg(long)]
        engine: Option<String>,
    },
    /// Shortest-path puzzles for a lone piece
    Path {
        #[arg(long, value_enum, default_value = "knight")]
        piece: Piece,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Mate puzzles
    Mate {
        /// Puzzle id, random when omitted
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Square colour quiz
    Colors {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Tap the named square on an unlabelled board
    Coords {
        /// Side at the bottom of the board
        #[arg(long, value_enum, default_value = "white")]
        side: Side,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the configuration JSON schema
    Schema,
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    White,
    Black,
}

impl From<Side> for PieceColor {
    fn from(side: Side) -> Self {
        match side {
            Side::White => PieceColor::White,
            Side::Black => PieceColor::Black,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Piece {
    Knight,
    Bishop,
}

impl From<Piece> for PathPiece {
    fn from(piece: Piece) -> Self {
        match piece {
            Piece::Knight => PathPiece::Knight,
            Piece::Bishop => PathPiece::Bishop,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blindfold_trainer=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => TrainerConfig::load(path)?,
        None => TrainerConfig::default(),
    };

    match cli.command {
        Commands::Play {
            side,
            skill,
            depth,
            engine,
        } => {
            let mut config = config;
            if let Some(depth) = depth {
                config.engine.search_depth = depth;
            }
            if let Some(engine) = engine {
                config.engine.path = engine;
            }
            run_play(&config, cli.prefs, side.map(Into::into), skill)
        }
        Commands::Path { piece, seed } => run_path(piece.into(), seed),
        Commands::Mate { id, seed } => run_mate(id.as_deref(), seed),
        Commands::Colors { seed } => run_colors(seed),
        Commands::Coords { side, seed } => run_coords(&config, Orientation::for_side(side.into()), seed),
        Commands::Schema => {
            println!("{}", TrainerConfig::schema_json()?);
            Ok(())
        }
    }
}

fn rng_from(seed: Option<u64>) -> fastrand::Rng {
    match seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    }
}

/// Print a prompt and read one trimmed line; `None` at end of input
fn prompt(text: &str) -> Result<Option<String>> {
    print!("{}", text);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn run_play(
    config: &TrainerConfig,
    prefs_path: PathBuf,
    side: Option<PieceColor>,
    skill: Option<u8>,
) -> Result<()> {
    let mut store = JsonFileStore::open(&prefs_path);
    let mut prefs = Preferences::load(&store);
    let side = side.unwrap_or(prefs.side);
    let skill = skill.unwrap_or(prefs.skill_level);

    let transport = ProcessTransport::spawn(&config.engine.path)
        .with_context(|| format!("Failed to start engine '{}'", config.engine.path))?;
    let session = EngineSession::new(transport, &config.engine);
    let mut game = GameOrchestrator::new(ShakmatyOracle::new(), session);

    game.start(side, skill).context("Failed to start game")?;
    prefs.side = side;
    prefs.skill_level = skill;
    if let Err(e) = prefs.save(&mut store) {
        tracing::warn!(error = %e, "could not save preferences");
    }
    println!("Commands: <move> | peek | flip | moves | pgn | new | quit");
    let mut orientation = Orientation::for_side(side);

    loop {
        if game.phase() == GamePhase::AwaitingEngine {
            if let Err(e) = game.wait_for_engine() {
                println!("{}", e);
            }
        }
        for note in game.drain_notifications() {
            println!("{}", note);
        }

        let label = match game.phase() {
            GamePhase::Finished => "(game over) > ",
            _ => "> ",
        };
        let Some(line) = prompt(label)? else { break };
        match line.as_str() {
            "" => continue,
            "quit" | "exit" => break,
            "peek" => print!("{}", game.peek(orientation)?),
            "flip" => {
                orientation = orientation.flip();
                print!("{}", game.peek(orientation)?);
            }
            "moves" => println!("{}", render_move_list(game.history())),
            "pgn" => print!("{}", game.export_record()),
            "new" => game.start(side, skill).context("Failed to start game")?,
            text => {
                if let Err(e) = game.submit_user_move(text) {
                    println!("{}", e);
                }
            }
        }
    }
    info!("leaving game");
    Ok(())
}

fn run_path(piece: PathPiece, seed: Option<u64>) -> Result<()> {
    let solver = PathSolver::new(ShakmatyOracle::new());
    let mut rng = rng_from(seed);
    println!("Commands: <square> | undo | reset | len | reveal | next | quit");

    'puzzles: loop {
        let puzzle = PathPuzzle::random(&solver, piece, &mut rng);
        let mut hops: Vec<Square> = Vec::new();
        println!("{}: {} -> {}", piece.name(), puzzle.start, puzzle.target);

        loop {
            let Some(line) = prompt("> ")? else { break 'puzzles };
            match line.to_ascii_lowercase().as_str() {
                "" => continue,
                "quit" | "exit" => break 'puzzles,
                "next" => continue 'puzzles,
                "undo" => {
                    hops.pop();
                }
                "reset" => hops.clear(),
                "len" => println!("Minimal moves: {}", puzzle.optimal().moves()),
                "reveal" => println!("Optimal path ({}): {}", puzzle.optimal().moves(), puzzle.optimal()),
                text => {
                    let Some(square) = Square::from_algebraic(text) else {
                        println!("Enter a square like c3");
                        continue;
                    };
                    let from = hops.last().copied().unwrap_or(puzzle.start);
                    if !solver.is_hop(piece, from, square) {
                        println!("Illegal {} move: {} -> {}", piece.name(), from, square);
                        continue;
                    }
                    hops.push(square);
                    match puzzle.check_path(&solver, &hops) {
                        PathGrade::Optimal { moves } => {
                            println!("Perfect! Reached {} in the minimal {}.", puzzle.target, moves);
                            continue 'puzzles;
                        }
                        PathGrade::Longer { used, optimal } => {
                            println!("Reached the target in {}. Optimal is {}.", used, optimal);
                            continue 'puzzles;
                        }
                        PathGrade::Incomplete | PathGrade::IllegalHop { .. } => {}
                    }
                }
            }
            let path: Vec<String> = std::iter::once(puzzle.start)
                .chain(hops.iter().copied())
                .map(|s| s.to_string())
                .collect();
            println!("{} ({})", path.join(" -> "), hops.len());
        }
    }
    Ok(())
}

fn run_mate(id: Option<&str>, seed: Option<u64>) -> Result<()> {
    let mut rng = rng_from(seed);
    let mut puzzle = match id {
        Some(id) => MatePuzzle::by_id(id).with_context(|| format!("Unknown puzzle '{}'", id))?,
        None => MatePuzzle::random(&mut rng),
    };
    println!("Commands: <move> | peek | reveal | next | quit");

    'puzzles: loop {
        let mut session = MateSession::new(ShakmatyOracle::new(), puzzle)?;
        println!(
            "{} ({}): {} to move, mate in {}",
            puzzle.title,
            puzzle.id,
            session.solver(),
            puzzle.moves_to_find()
        );
        println!("{}", puzzle.fen);

        loop {
            let Some(line) = prompt("> ")? else { break 'puzzles };
            match line.as_str() {
                "" => {}
                "quit" | "exit" => break 'puzzles,
                "next" => {
                    puzzle = MatePuzzle::random(&mut rng);
                    continue 'puzzles;
                }
                "reveal" => println!("{}", session.reveal()),
                "peek" => print!("{}", session.peek(Orientation::for_side(session.solver()))?),
                text => match session.submit(text) {
                    MateVerdict::Correct { reply: Some(reply) } => println!("Correct. Opponent plays {}.", reply),
                    MateVerdict::Correct { reply: None } => println!("Correct."),
                    MateVerdict::Solved => println!("Solved! Type next for another."),
                    MateVerdict::Wrong { .. } => println!("Not the best move for this puzzle."),
                    MateVerdict::Invalid(e) => println!("{}", e),
                },
            }
        }
    }
    Ok(())
}

fn run_colors(seed: Option<u64>) -> Result<()> {
    let mut rng = rng_from(seed);
    let mut quiz = ColorQuiz::new(&mut rng);
    println!("Commands: l | d | next | quit");

    loop {
        let Some(line) = prompt(&format!("{}? ", quiz.square()))? else { break };
        match line.to_ascii_lowercase().as_str() {
            "" => continue,
            "quit" | "exit" => break,
            "next" => {
                quiz.next(&mut rng);
            }
            text => {
                let Some(shade) = parse_shade(text) else {
                    println!("Answer l (light) or d (dark)");
                    continue;
                };
                match quiz.answer(shade) {
                    ColorVerdict::Correct => println!("Correct!"),
                    ColorVerdict::Incorrect { square, shade } => println!("Incorrect. {} is {}.", square, shade),
                }
                quiz.next(&mut rng);
            }
        }
    }
    println!("{} correct, {} wrong", quiz.correct(), quiz.wrong());
    Ok(())
}

/// Unlabelled grid with screen columns and lines numbered 1-8
fn render_blank_grid() -> String {
    let mut out = String::from("   1  2  3  4  5  6  7  8\n");
    for line in 1..=8 {
        out.push_str(&format!("{} ", line));
        out.push_str(&" . ".repeat(8));
        out.push('\n');
    }
    out
}

fn run_coords(config: &TrainerConfig, orientation: Orientation, seed: Option<u64>) -> Result<()> {
    let mut rng = rng_from(seed);
    let mut trainer = CoordTrainer::new(config.board.layout(), orientation);
    println!("Tap a cell as '<column> <line>', counted from the top-left.");
    println!("Commands: <col> <line> | flip | end | start | quit");
    print!("{}", render_blank_grid());
    trainer.start_round(&mut rng);

    loop {
        let label = match trainer.target() {
            Some(target) => format!("Tap {} > ", target),
            None => "(round over) > ".to_string(),
        };
        let Some(line) = prompt(&label)? else { break };
        match line.to_ascii_lowercase().as_str() {
            "" => continue,
            "quit" | "exit" => break,
            "flip" => {
                trainer.set_orientation(trainer.orientation().flip());
                println!("{:?} orientation", trainer.orientation());
            }
            "end" => println!("{}", trainer.end_round()),
            "start" => {
                trainer.start_round(&mut rng);
            }
            text => {
                let cell: Vec<u8> = text.split_whitespace().filter_map(|n| n.parse().ok()).collect();
                let &[col, line] = cell.as_slice() else {
                    println!("Enter a column and a line, like 3 5");
                    continue;
                };
                let verdict = match (col.checked_sub(1), line.checked_sub(1)) {
                    (Some(col), Some(line)) => trainer.tap_cell(col, line, &mut rng),
                    _ => None,
                };
                match verdict {
                    Some(TapVerdict::Correct { square }) => println!("{}: correct", square),
                    Some(TapVerdict::Wrong { tapped, wanted }) => println!("{}: wanted {}", tapped, wanted),
                    None if trainer.is_running() => println!("Columns and lines run from 1 to 8"),
                    None => println!("Type start for a new round"),
                }
            }
        }
    }
    if trainer.is_running() {
        println!("{}", trainer.end_round());
    }
    Ok(())
}
