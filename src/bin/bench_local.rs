//! `bench_local.rs`: quick local timing runner (no Criterion)
//!
//! PURPOSE
//! -------
//! - Fast, ad-hoc timing for a handful of muddles on *your* machine.
//! - Builds the lexicon once, then solves each case several times and reports the median.
//!
//! HOW TO RUN
//! ----------
//! - Optimized build:                `cargo run --bin bench_local --release`
//! - Bigger word list:               `cargo run --bin bench_local --release -- -w words.txt`
//! - Multiple repeats:               `cargo run --bin bench_local --release -- -r 5`
//! - Print solutions:                `cargo run --bin bench_local --release -- -p 2`
//!
//! NOTES
//! -----
//! - Not statistically rigorous; use the same machine and `--release` for comparable numbers.
//! - Cases live in `get_cases()` below.
//! - One warm-up run per case is done (not included in timing).
//! - Lexicon construction is timed separately from the solves.

use clap::Parser;
use std::hint::black_box;
use std::time::Instant;
use muddle::grid::Grid;
use muddle::lexicon::LexiconIndex;
use muddle::problem::Problem;
use muddle::solver;
use muddle::word_list::WordList;

/// Simple local benchmark runner: build the lexicon once, time several muddles.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the word list file (one word per line)
    #[arg(
        short,
        long,
        default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/test_lexicon.txt")
    )]
    words: String,

    /// Number of repeats per case (use >1 to reduce noise; median is reported)
    #[arg(short = 'r', long = "repeats", default_value_t = 1)]
    num_repeats: usize,

    /// Print up to this many solutions per case (0 = print none)
    #[arg(short = 'p', long = "print", default_value_t = 0)]
    print_limit: usize,
}

/// A benchmark case: rack and starting pattern in compact notation.
#[derive(Clone)]
struct Case {
    name: &'static str,
    letters: &'static str,
    pattern: &'static str,
}

fn get_cases() -> Vec<Case> {
    vec![
        Case {
            name: "heart, open",
            letters: "heart/ember/abuse/resin/trend",
            pattern: "-----/-----/-----/-----/-----",
        },
        Case {
            name: "heart, diagonal hints",
            letters: "heart/ember/abuse/resin/trend",
            pattern: "h----/-m---/--u--/---i-/----d",
        },
        Case {
            name: "heart, first row",
            letters: "heart/ember/abuse/resin/trend",
            pattern: "heart/-----/-----/-----/-----",
        },
        Case {
            name: "scrambled rack",
            letters: "aabbd/eeeee/ehimn/nrrrr/sstt u",
            pattern: "-----/-----/-----/-----/-----",
        },
    ]
}

/// Small helper: robust central tendency for small samples.
fn median(mut xs: Vec<f64>) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.sort_by(f64::total_cmp);
    let n = xs.len();
    if n % 2 == 1 {
        xs[n / 2]
    } else {
        0.5 * (xs[n / 2 - 1] + xs[n / 2])
    }
}

const MAX_NAME_LEN: usize = 32;

fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    // Build the lexicon once. This is *not* included in per-case timing.
    eprintln!("Loading word list from: {}", cli.words);
    let t_load = Instant::now();
    let word_list = WordList::load_from_path(&cli.words)?;
    let index = LexiconIndex::from_word_list(&word_list).map_err(|e| std::io::Error::other(e.display_detailed()))?;
    eprintln!(
        "Indexed {} words ({} nodes) in {:.3}s",
        word_list.len(),
        index.node_count(),
        t_load.elapsed().as_secs_f64()
    );

    let mut summary: Vec<(&str, f64, usize, usize)> = Vec::new();

    for (idx, case) in get_cases().iter().enumerate() {
        eprintln!("\n[{:02}] {}", idx + 1, case.name);
        let problem = match Problem::new(case.letters, &case.pattern.split('/').collect::<Vec<_>>()) {
            Ok(problem) => problem,
            Err(e) => {
                eprintln!("  ✗ Bad case: {}", e.display_detailed());
                continue;
            }
        };

        // One *warm-up* execution per case; its timing is ignored.
        if let Err(e) = solver::solve_muddle(&index, &problem) {
            eprintln!("  ✗ Warm-up failed: {}", e.display_detailed());
            continue;
        }

        let mut times = Vec::with_capacity(cli.num_repeats);
        let mut last_solutions: Vec<Grid> = Vec::new();
        let mut last_branches = 0;

        for rep in 0..cli.num_repeats {
            let t_solve = Instant::now();
            let result = match solver::solve_muddle(&index, black_box(&problem)) {
                Ok(result) => result,
                Err(e) => {
                    eprintln!("  ✗ Run {}/{} failed: {}", rep + 1, cli.num_repeats, e);
                    continue;
                }
            };
            let solve_secs = t_solve.elapsed().as_secs_f64();

            times.push(solve_secs);
            last_branches = result.stats.branches;
            last_solutions = result.solutions;

            eprintln!(
                "  run {:>2}/{:>2}: {:.3}s ({} solutions, {} branches)",
                rep + 1,
                cli.num_repeats,
                solve_secs,
                last_solutions.len(),
                last_branches
            );
        }

        let med = median(times);

        for grid in last_solutions.iter().take(cli.print_limit) {
            println!("{grid}\n");
        }

        summary.push((case.name, med, last_solutions.len(), last_branches));
    }

    eprintln!("\n==== Summary ====");
    eprintln!("{:<MAX_NAME_LEN$} | {:>10} | {:>11} | {:>10}", "case", "median (s)", "# solutions", "branches");
    eprintln!("{:-<MAX_NAME_LEN$}-+-{:-<10}-+-{:-<11}-+-{:-<10}", "", "", "", "");
    for (name, med, num_solutions, branches) in &summary {
        eprintln!("{name:<MAX_NAME_LEN$} | {med:>10.3} | {num_solutions:>11} | {branches:>10}");
    }

    Ok(())
}
