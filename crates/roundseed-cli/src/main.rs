//! CLI for roundseed: run entropy rounds and inspect their scores.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "roundseed")]
#[command(about = "roundseed: fair, auditable round seeds from many small entropy sources")]
#[command(version = roundseed_core::VERSION)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one round with the default collectors and print its record as JSON
    Round {
        /// Round config JSON (missing fields take defaults)
        #[arg(long)]
        config: Option<String>,

        /// Fixed round id (default: round-<uuid>)
        #[arg(long)]
        round_id: Option<String>,

        /// Previous round hash, 64 lowercase hex characters
        #[arg(long)]
        prev_hash: Option<String>,

        /// Contributor credited with the award
        #[arg(long)]
        miner: Option<String>,

        /// Seconds to wait for collectors before substituting random bytes
        #[arg(long)]
        timeout_sec: Option<f64>,

        /// Pretty-print the record
        #[arg(long)]
        pretty: bool,
    },

    /// Score one buffer and print the breakdown as JSON
    Score {
        /// Buffer as lowercase hex
        #[arg(long, conflicts_with = "file")]
        hex: Option<String>,

        /// Buffer as a raw binary file
        #[arg(long)]
        file: Option<String>,

        /// File of earlier rounds, one hex buffer per line
        #[arg(long)]
        prior: Option<String>,
    },

    /// Screen a raw binary file for repetition, similarity and low entropy
    Detect {
        /// Current contribution (raw binary)
        #[arg(long)]
        file: String,

        /// Previous round's contribution from the same source (raw binary)
        #[arg(long)]
        prev: Option<String>,
    },

    /// Map a score in [0, 100] to its token reward
    Reward {
        /// Score; fractional values are rounded
        score: f64,
    },

    /// Hash a UTF-8 string with one of the supported algorithms
    Hash {
        /// sha256, sha512, blake3 or keccak256
        #[arg(long, default_value = "sha256")]
        algo: String,

        input: String,
    },

    /// List the built-in collectors and whether they are available
    Scan,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();

    let code = match cli.command {
        Commands::Round {
            config,
            round_id,
            prev_hash,
            miner,
            timeout_sec,
            pretty,
        } => commands::round::run(commands::round::RoundCommandConfig {
            config_path: config.as_deref(),
            round_id,
            prev_hash,
            miner,
            timeout_sec,
            pretty,
        }),
        Commands::Score { hex, file, prior } => {
            commands::score::run(hex.as_deref(), file.as_deref(), prior.as_deref())
        }
        Commands::Detect { file, prev } => commands::detect::run(&file, prev.as_deref()),
        Commands::Reward { score } => commands::reward::run(score),
        Commands::Hash { algo, input } => commands::hash::run(&algo, &input),
        Commands::Scan => commands::scan::run(),
    };

    std::process::exit(code);
}
