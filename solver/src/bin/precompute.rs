use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use qwixx::env_config;
use qwixx::generational::{project_to_canonical, run_generational, GenerationalOptions, RawValues};
use qwixx::state_computation::{compute_all_state_values, greedy_state_values, ComputeOptions};
use qwixx::storage::{file_exists, save_state_values};
use qwixx::tables::Tables;
use qwixx::types::{QwixxContext, StateValues};

#[derive(Parser, Debug)]
#[command(
    name = "qwixx-precompute",
    about = "Compute the Qwixx value table by backward induction"
)]
struct Args {
    /// Output table (default: $QWIXX_TABLE or data/qwixx.bin)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stop after this many states (partial table)
    #[arg(long)]
    max_states: Option<usize>,

    /// Stop after this many seconds (partial table)
    #[arg(long)]
    time_limit: Option<u64>,

    /// Use the parallel generational engine over the raw state space
    #[arg(long)]
    generational: bool,

    /// Worker threads for the generational engine (default: rayon thread count)
    #[arg(long, requires = "generational")]
    workers: Option<usize>,

    /// Generation cap for the generational engine
    #[arg(long, default_value_t = 100)]
    max_generations: usize,

    /// Write the zero look-ahead baseline table instead
    #[arg(long, conflicts_with = "generational")]
    greedy: bool,

    /// Overwrite an existing table
    #[arg(long)]
    force: bool,
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    env_config::init_base_path()?;
    let num_threads = env_config::init_rayon_threads()?;
    let output = args.output.unwrap_or_else(env_config::table_path);

    if file_exists(&output) && !args.force {
        log::info!(
            "{} already exists, skipping (use --force to recompute)",
            output.display()
        );
        return Ok(());
    }

    log::info!("Qwixx precomputation tool");
    let values: StateValues = if args.greedy {
        log::info!("Mode: greedy baseline");
        greedy_state_values(&Tables::new())
    } else if args.generational {
        let options = GenerationalOptions {
            workers: args.workers.unwrap_or(num_threads),
            max_generations: args.max_generations,
        };
        log::info!(
            "Mode: generational ({} workers, at most {} generations)",
            options.workers,
            options.max_generations
        );
        let tables = Tables::new();
        let result = run_generational(&tables, &options)?;
        if !result.converged {
            log::warn!("Projecting a table that has not converged");
        }
        project_to_canonical(&tables, &RawValues(&result.values))?
    } else {
        let options = ComputeOptions {
            max_states: args.max_states,
            time_limit: args.time_limit.map(Duration::from_secs),
        };
        log::info!("Mode: backward induction");
        let mut ctx = QwixxContext::new();
        let summary = compute_all_state_values(&mut ctx, &options)?;
        if !summary.complete {
            log::warn!(
                "Partial table: indices {}.. are final, the rest are pending",
                summary.lowest_index
            );
        }
        ctx.state_values
    };

    save_state_values(&values, &output)?;
    log::info!("Precomputation complete.");
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
