pub mod detect;
pub mod hash;
pub mod reward;
pub mod round;
pub mod scan;
pub mod score;

use log::error;
use serde_json::Value;

/// Process exit code for a failed command.
pub const EXIT_FAILURE: i32 = 1;

/// Read a whole file as raw bytes, logging on failure.
pub fn read_bytes(path: &str) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            error!("failed to read {path}: {e}");
            None
        }
    }
}

/// Print a JSON value to stdout.
pub fn print_json(value: &Value, pretty: bool) {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match rendered {
        Ok(s) => println!("{s}"),
        Err(e) => error!("failed to render JSON: {e}"),
    }
}
