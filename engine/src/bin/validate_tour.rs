//! Quick tour descriptor validation utility

use std::{env, path::Path, process::ExitCode};
use tour_engine::io::{validate_tour, Tour};

fn main() -> ExitCode {
    tour_engine::init_logging();

    let args: Vec<String> = env::args().collect();
    let tour_path = args.get(1).map(String::as_str).unwrap_or("tour.json");

    let path = Path::new(tour_path);
    println!("Validating tour: {}", path.display());

    let tour = match Tour::load_from_file(path) {
        Ok(tour) => tour,
        Err(e) => {
            eprintln!("✗ Failed to load tour: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("✓ Tour loaded successfully!");
    println!("  States: {}", tour.states.len());
    println!("  Links: {}", tour.link_count());
    println!("  First state: {}", tour.first_state_id);

    let result = validate_tour(&tour);
    for warning in &result.warnings {
        println!("  warning: {warning}");
    }
    for error in &result.errors {
        eprintln!("  error: {error}");
    }

    if result.is_valid {
        println!("✓ Tour is valid");
        ExitCode::SUCCESS
    } else {
        eprintln!("✗ Tour has {} error(s)", result.errors.len());
        ExitCode::FAILURE
    }
}
