//! Perf harness CLI entry point.

fn main() {
    if let Err(e) = perf_harness_cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
