use roundseed_core::{HashAlgorithm, default_collectors};

pub fn run() -> i32 {
    let collectors = default_collectors();
    println!("Found {} built-in collector(s):\n", collectors.len());
    for c in &collectors {
        let info = c.info();
        let mark = if c.is_available() { "\u{2705}" } else { "\u{274C}" };
        println!("  {mark} {:<10} {:<12} {}", info.name, info.kind.to_string(), info.description);
    }

    println!("\nHash algorithms:\n");
    for algo in HashAlgorithm::ALL {
        let status = if algo.is_available() { "available" } else { "unavailable" };
        println!("  {:<10} {:>3} bytes  {status}", algo.to_string(), algo.output_len());
    }
    0
}
