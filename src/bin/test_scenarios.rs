//! Scenario test runner CLI
//!
//! Usage:
//!   cargo run --bin test-scenarios                      # Run all scenarios
//!   cargo run --bin test-scenarios -- driving/          # Run one category
//!   cargo run --bin test-scenarios -- combat/shoot_idle_enemy
//!   cargo run --bin test-scenarios -- --verbose         # Full expected/actual on failure
//!   cargo run --bin test-scenarios -- --list            # List matching files only

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tankbattle::testing::{SCENARIOS_DIR, TestResult, parse_test_file, run_test};

fn main() {
    let args: Vec<String> = env::args().collect();
    let verbose = args.iter().skip(1).any(|a| a == "--verbose" || a == "-v");
    let list_only = args.iter().skip(1).any(|a| a == "--list");
    let filter = args.iter().skip(1).find(|a| !a.starts_with('-')).cloned();

    let scenarios_path = Path::new(SCENARIOS_DIR);
    if !scenarios_path.is_dir() {
        eprintln!("No scenarios directory at {}", SCENARIOS_DIR);
        eprintln!("Create scenario files in {}/<category>/", SCENARIOS_DIR);
        std::process::exit(1);
    }

    let tests = discover_tests(scenarios_path, filter.as_deref());
    if tests.is_empty() {
        eprintln!("No scenario files match {:?}", filter.unwrap_or_default());
        std::process::exit(1);
    }

    if list_only {
        for path in &tests {
            println!("{}", path.strip_prefix(scenarios_path).unwrap_or(path).display());
        }
        return;
    }

    println!("Scenario Tests");
    println!("==============\n");

    let mut passed = 0;
    let mut not_passed: Vec<String> = Vec::new();
    let mut current_category = String::new();

    for test_path in &tests {
        let rel_path = test_path.strip_prefix(scenarios_path).unwrap_or(test_path);

        let category = rel_path
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        if category != current_category && !category.is_empty() {
            println!("\n{}/", category);
            current_category = category;
        }

        let test_name = rel_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let (description, result) = match parse_test_file(test_path) {
            Ok(def) => (def.description.clone(), run_test(&def)),
            Err(message) => (None, TestResult::Error { message }),
        };
        print_result(&test_name, description.as_deref(), &result, verbose);

        if matches!(result, TestResult::Pass { .. }) {
            passed += 1;
        } else {
            not_passed.push(rel_path.display().to_string());
        }
    }

    println!("\n==============");
    println!("Results: {} passed, {} not passed", passed, not_passed.len());
    for path in &not_passed {
        println!("  - {}", path);
    }

    if !not_passed.is_empty() {
        std::process::exit(1);
    }
}

fn discover_tests(base: &Path, filter: Option<&str>) -> Vec<PathBuf> {
    let mut tests = Vec::new();
    discover_tests_recursive(base, base, filter, &mut tests);
    tests.sort();
    tests
}

fn discover_tests_recursive(
    base: &Path,
    current: &Path,
    filter: Option<&str>,
    tests: &mut Vec<PathBuf>,
) {
    let Ok(entries) = fs::read_dir(current) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if path.is_dir() {
            discover_tests_recursive(base, &path, filter, tests);
        } else if path.extension().is_some_and(|e| e == "toml") {
            let matches = filter.is_none_or(|f| path.strip_prefix(base).unwrap_or(&path).to_string_lossy().contains(f));
            if matches {
                tests.push(path);
            }
        }
    }
}

fn print_result(name: &str, description: Option<&str>, result: &TestResult, verbose: bool) {
    let dots = ".".repeat(40 - name.len().min(39));

    match result {
        TestResult::Pass { frames } => {
            println!("  {} {} PASS ({} frames)", name, dots, frames);
        }
        TestResult::Fail { error } => {
            println!("  {} {} FAIL", name, dots);
            if let Some(description) = description.filter(|_| verbose) {
                println!("    ({})", description);
            }
            if verbose {
                println!("    {}", error);
            } else {
                println!("    {}", error.message);
            }
        }
        TestResult::Error { message } => {
            println!("  {} {} ERROR", name, dots);
            println!("    {}", message);
        }
    }
}
