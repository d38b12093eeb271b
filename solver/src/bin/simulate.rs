use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;

use qwixx::env_config;
use qwixx::simulation::simulate_batch;
use qwixx::state_computation::greedy_state_values;
use qwixx::storage::load_state_values;
use qwixx::tables::Tables;
use qwixx::types::QwixxContext;

#[derive(Parser, Debug)]
#[command(
    name = "qwixx-simulate",
    about = "Play Qwixx games following a value table"
)]
struct Args {
    /// Value table (default: $QWIXX_TABLE or data/qwixx.bin)
    #[arg(short, long, conflicts_with = "greedy")]
    table: Option<PathBuf>,

    /// Number of games to simulate
    #[arg(short, long, default_value_t = 1000)]
    games: usize,

    /// RNG seed (game i uses seed + i)
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Play the zero look-ahead baseline instead of a stored table
    #[arg(long)]
    greedy: bool,

    /// Write the summary as JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    env_config::init_base_path()?;
    let num_threads = env_config::init_rayon_threads()?;

    log::info!("Qwixx Simulation ({} games, {} threads)", args.games, num_threads);

    let ctx = if args.greedy {
        log::info!("  Policy: greedy baseline");
        QwixxContext::with_values(greedy_state_values(&Tables::new()))
    } else {
        let table = args.table.unwrap_or_else(env_config::table_path);
        log::info!("  Policy: table {}", table.display());
        QwixxContext::with_values(load_state_values(&table)?)
    };

    if !args.greedy {
        match ctx.evaluate(&Default::default()) {
            Ok(ev) => log::info!("  Expected score from the empty sheet: {:.3}", ev),
            Err(e) => log::warn!("  Empty sheet not in table: {}", e),
        }
    }

    let result = simulate_batch(&ctx, args.games, args.seed)?;

    log::info!(
        "Simulated {} games in {:.2}s ({:.0} games/s)",
        result.games,
        result.elapsed.as_secs_f64(),
        result.games as f64 / result.elapsed.as_secs_f64().max(1e-9)
    );
    log::info!("  Mean:    {:.3}", result.mean);
    log::info!("  Std dev: {:.3}", result.std_dev);
    log::info!("  Median:  {}", result.median);
    log::info!("  Min/Max: {} / {}", result.min, result.max);
    log::info!("  Turns:   {:.1} per game", result.mean_turns);
    log::info!(
        "  Ended by fourth penalty: {:.1}%",
        result.penalty_endings * 100.0
    );

    if let Some(path) = args.output {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&path, serde_json::to_string_pretty(&result)?)?;
        log::info!("Summary written to {}", path.display());
    }
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
