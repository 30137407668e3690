use roundseed_core::detect;

use super::{EXIT_FAILURE, print_json, read_bytes};

pub fn run(file: &str, prev: Option<&str>) -> i32 {
    let Some(current) = read_bytes(file) else {
        return EXIT_FAILURE;
    };
    let previous = match prev {
        Some(path) => match read_bytes(path) {
            Some(b) => Some(b),
            None => return EXIT_FAILURE,
        },
        None => None,
    };

    let result = detect(&current, previous.as_deref());
    print_json(&serde_json::json!(result), true);
    0
}
