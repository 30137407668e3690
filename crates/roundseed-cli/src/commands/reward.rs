use log::error;
use roundseed_core::compute_reward_f64;

use super::{EXIT_FAILURE, print_json};

pub fn run(score: f64) -> i32 {
    match compute_reward_f64(score) {
        Ok(reward) => {
            print_json(&serde_json::json!(reward), true);
            0
        }
        Err(e) => {
            error!("{e}");
            EXIT_FAILURE
        }
    }
}
