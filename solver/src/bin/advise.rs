use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use qwixx::api_computations::Decision;
use qwixx::dice_mechanics::Roll;
use qwixx::env_config;
use qwixx::storage::load_state_values;
use qwixx::types::{Board, Color, QwixxContext};

#[derive(Parser, Debug)]
#[command(
    name = "qwixx-advise",
    about = "Recommend the best Qwixx move for a board and a roll"
)]
struct Args {
    /// Value table (default: $QWIXX_TABLE or data/qwixx.bin)
    #[arg(short, long)]
    table: Option<PathBuf>,

    /// Board as "R r Y y G g B b P": marks and rightmost value per color, then penalties
    #[arg(short, long, default_value = "0 0 0 0 0 0 0 0 0")]
    board: String,

    /// Dice as "w1 w2 r y g b"
    #[arg(short, long)]
    dice: String,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Advice {
    board: Board,
    roll: Roll,
    value: f32,
    best: Decision,
    candidates: Vec<Decision>,
}

fn parse_numbers(text: &str, expected: usize, what: &str) -> Result<Vec<u8>, Box<dyn Error>> {
    let numbers = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid {what} '{text}': {e}"))?;
    if numbers.len() != expected {
        return Err(format!(
            "{what} needs {expected} numbers, got {}",
            numbers.len()
        )
        .into());
    }
    Ok(numbers)
}

fn parse_board(text: &str) -> Result<Board, Box<dyn Error>> {
    let n = parse_numbers(text, 9, "board")?;
    let mut board = Board::new().with_penalties(n[8]);
    for color in Color::ALL {
        let i = color.index() * 2;
        board = board.with_row(color, n[i], n[i + 1]);
    }
    Ok(board)
}

fn parse_roll(text: &str) -> Result<Roll, Box<dyn Error>> {
    let n = parse_numbers(text, 6, "dice")?;
    Ok(Roll::new([n[0], n[1]], [n[2], n[3], n[4], n[5]])?)
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let board = parse_board(&args.board)?;
    let roll = parse_roll(&args.dice)?;
    let table = args.table.unwrap_or_else(env_config::table_path);

    let ctx = QwixxContext::with_values(load_state_values(&table)?);
    let value = ctx.evaluate(&board)?;
    let best = ctx.best_action(&board, &roll)?;
    let candidates: Vec<Decision> = ctx
        .rank_actions(&board, &roll)?
        .into_iter()
        .map(Decision::from)
        .collect();

    if args.json {
        let advice = Advice {
            board,
            roll,
            value,
            best,
            candidates,
        };
        println!("{}", serde_json::to_string_pretty(&advice)?);
        return Ok(());
    }

    println!("Board:  {}", board);
    let [low, high] = roll.white();
    let [red, yellow, green, blue] = roll.colored();
    println!(
        "Roll:   white {} {} | red {} yellow {} green {} blue {}",
        low, high, red, yellow, green, blue
    );
    println!("Value:  {:.3}", value);
    println!();
    println!(" id | value    | action");
    println!("----|----------|------------------------------");
    let mut ranked = candidates;
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
    for d in &ranked {
        let marker = if d.action == best.action { '*' } else { ' ' };
        println!(
            "{}{:2} | {:8.3} | {} -> {}",
            marker, d.action_id, d.value, d.action, d.board
        );
    }
    println!();
    println!("Best: {} (expected {:.3})", best.action, best.value);
    Ok(())
}

fn main() {
    let _logger = match env_config::init_logging() {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to start logger: {}", e);
            std::process::exit(1);
        }
    };
    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
