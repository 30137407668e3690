use log::error;
use roundseed_core::{ScoreOptions, compute_reward, score};

use super::{EXIT_FAILURE, print_json, read_bytes};

fn parse_priors(path: &str) -> Option<Vec<Vec<u8>>> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            error!("failed to read {path}: {e}");
            return None;
        }
    };
    let mut priors = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match hex::decode(line) {
            Ok(b) => priors.push(b),
            Err(e) => {
                error!("{path}:{}: not a hex buffer: {e}", n + 1);
                return None;
            }
        }
    }
    Some(priors)
}

pub fn run(hex_input: Option<&str>, file: Option<&str>, prior: Option<&str>) -> i32 {
    let buffer = match (hex_input, file) {
        (Some(h), _) => match hex::decode(h.trim()) {
            Ok(b) => b,
            Err(e) => {
                error!("--hex is not valid hex: {e}");
                return EXIT_FAILURE;
            }
        },
        (None, Some(path)) => match read_bytes(path) {
            Some(b) => b,
            None => return EXIT_FAILURE,
        },
        (None, None) => {
            error!("one of --hex or --file is required");
            return EXIT_FAILURE;
        }
    };

    let mut options = ScoreOptions::default();
    if let Some(path) = prior {
        match parse_priors(path) {
            Some(p) => options.prior_rounds = p,
            None => return EXIT_FAILURE,
        }
    }

    let breakdown = score(&[buffer], &options);
    let reward = compute_reward(i64::from(breakdown.score));
    print_json(
        &serde_json::json!({
            "score": breakdown,
            "reward": reward,
        }),
        true,
    );
    0
}
