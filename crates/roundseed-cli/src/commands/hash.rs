use log::error;
use roundseed_core::HashAlgorithm;

use super::EXIT_FAILURE;

pub fn run(algo: &str, input: &str) -> i32 {
    let algorithm = match algo.parse::<HashAlgorithm>() {
        Ok(a) => a,
        Err(e) => {
            error!("{e}");
            return EXIT_FAILURE;
        }
    };
    match algorithm.digest_hex(input.as_bytes()) {
        Ok(digest) => {
            println!("{digest}  {algorithm}");
            0
        }
        Err(e) => {
            error!("{e}");
            EXIT_FAILURE
        }
    }
}
