use std::path::Path;

use log::{error, info};
use roundseed_core::{
    BalanceLedger, ConfigError, RoundConfig, RoundError, RoundOrchestrator, load_config_from_path,
};

use super::EXIT_FAILURE;

pub struct RoundCommandConfig<'a> {
    pub config_path: Option<&'a str>,
    pub round_id: Option<String>,
    pub prev_hash: Option<String>,
    pub miner: Option<String>,
    pub timeout_sec: Option<f64>,
    pub pretty: bool,
}

fn resolve_config(cmd: RoundCommandConfig<'_>) -> Result<RoundConfig, ConfigError> {
    let mut config = match cmd.config_path {
        Some(path) => load_config_from_path(Path::new(path))?,
        None => RoundConfig::default(),
    };
    config.apply_env_overrides()?;

    if let Some(id) = cmd.round_id {
        config.round_id = Some(id);
    }
    if let Some(hash) = cmd.prev_hash {
        config.prev_root_hash = hash;
    }
    if let Some(miner) = cmd.miner {
        config.miner_id = miner;
    }
    if let Some(secs) = cmd.timeout_sec {
        config.collect_timeout_secs = secs;
    }
    config.validate()?;
    Ok(config)
}

pub fn run(cmd: RoundCommandConfig<'_>) -> i32 {
    let pretty = cmd.pretty;
    let config = match resolve_config(cmd) {
        Ok(c) => c,
        Err(e) => {
            error!("invalid configuration: {e}");
            return EXIT_FAILURE;
        }
    };
    let miner = config.miner_id.clone();

    let orchestrator = match RoundOrchestrator::with_default_collectors(config) {
        Ok(o) => o,
        Err(e) => {
            error!("invalid configuration: {e}");
            return EXIT_FAILURE;
        }
    };
    info!("collecting from {} collectors", orchestrator.collector_count());

    let record = match orchestrator.run_round() {
        Ok(r) => r,
        // Commit mismatches are logged by the orchestrator itself.
        Err(RoundError::Commit(_)) => return EXIT_FAILURE,
        Err(e) => {
            error!("round failed: {e}");
            return EXIT_FAILURE;
        }
    };

    match record.settle(&BalanceLedger::new(), &miner) {
        Ok(ledger) => info!("{miner} balance: {} tokens", ledger.balance_of(&miner)),
        Err(e) => error!("could not credit {miner:?}: {e}"),
    }

    let rendered = if pretty {
        record.to_json_pretty()
    } else {
        record.to_json()
    };
    match rendered {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(e) => {
            error!("failed to render record: {e}");
            EXIT_FAILURE
        }
    }
}
