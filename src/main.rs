use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand, ValueEnum};

use muddle::lexicon::{LexiconError, LexiconIndex};
use muddle::problem::Problem;
use muddle::rack::Rack;
use muddle::solver::{self, PuzzleSolver, SolveStatus};
use muddle::word_list::WordList;

/// Muddle solver: symmetric 5×5 word squares from 25 letters
#[derive(Parser, Debug)]
#[command(author, version, long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"), about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve a muddle and print every completed grid
    Solve(SolveArgs),

    /// Build a lexicon from a word list and save it as a snapshot
    BuildSnapshot {
        /// Word list (one word per line)
        #[arg(short, long)]
        words: PathBuf,

        /// Where to write the snapshot (overwritten if present)
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Run one lexicon query and print the matching words
    Query(QueryArgs),
}

/// Where the lexicon comes from: a word list or a prebuilt snapshot.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct LexiconSource {
    /// Word list (one word per line)
    #[arg(short, long)]
    words: Option<PathBuf>,

    /// Snapshot written by `build-snapshot`
    #[arg(short, long)]
    snapshot: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SolveArgs {
    #[command(flatten)]
    lexicon: LexiconSource,

    /// Problem file: five rack rows, then five pattern rows
    #[arg(conflicts_with_all = ["letters", "pattern"], required_unless_present = "letters")]
    problem: Option<PathBuf>,

    /// Rack in compact notation, e.g. heart/ember/abuse/resin/trend
    #[arg(short, long, requires = "pattern")]
    letters: Option<String>,

    /// Starting pattern in compact notation, '-' for unknown cells
    #[arg(short, long, requires = "letters")]
    pattern: Option<String>,

    /// Stop searching after this many seconds
    #[arg(short, long)]
    timeout: Option<f64>,

    /// Also save the problem to this file (never overwrites)
    #[arg(long)]
    save: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum QueryKind {
    /// Words containing TEXT
    Contains,
    /// Words starting with TEXT
    Starts,
    /// Words ending with TEXT
    Ends,
    /// Words containing TEXT, other letters from --rack
    ContainsLett,
    /// Words starting with TEXT, other letters from --rack
    StartsLett,
    /// Words ending with TEXT, other letters from --rack
    EndsLett,
    /// Words matching the fixed pattern TEXT ('-' = any), free cells from --rack
    Pattern,
}

#[derive(Args, Debug)]
struct QueryArgs {
    #[command(flatten)]
    lexicon: LexiconSource,

    #[arg(value_enum)]
    kind: QueryKind,

    text: String,

    /// Letters available for free positions ('?' is a blank)
    #[arg(short, long, default_value = "")]
    rack: String,

    /// Only words of exactly this length (contains/starts/ends)
    #[arg(long)]
    len: Option<usize>,

    /// Maximum number of results to print
    #[arg(short = 'n', long, default_value_t = 100)]
    num_results: usize,
}

/// Entry point of the muddle CLI.
///
/// Delegates to [`try_main`], catching any errors and printing them
/// in a user-friendly way before exiting with code 1.
fn main() -> ExitCode {
    // Set up logging
    let debug_enabled = std::env::var("MUDDLE_DEBUG").is_ok();
    muddle::log::init_logger(debug_enabled);

    if let Err(e) = try_main() {
        // Print the error message to stderr, with detailed formatting where available
        if let Some(solver_err) = e.downcast_ref::<solver::SolverError>() {
            eprintln!("Error: {}", solver_err.display_detailed());
        } else if let Some(lexicon_err) = e.downcast_ref::<LexiconError>() {
            eprintln!("Error: {}", lexicon_err.display_detailed());
        } else {
            eprintln!("Error: {e}");
        }
        // Exit explicitly with a nonzero code so scripts can detect failure
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Solve(args) => run_solve(&args),
        Command::BuildSnapshot { words, out } => {
            let t_build = Instant::now();
            let index = LexiconIndex::from_word_list(&WordList::load_from_path(&words)?)?;
            index.save_snapshot(&out)?;
            eprintln!(
                "Indexed {} words ({} nodes) in {:.3}s; snapshot written to {}",
                index.len(),
                index.node_count(),
                t_build.elapsed().as_secs_f64(),
                out.display()
            );
            Ok(())
        }
        Command::Query(args) => run_query(&args),
    }
}

fn load_lexicon(source: &LexiconSource) -> Result<LexiconIndex, Box<dyn std::error::Error>> {
    let t_load = Instant::now();
    let index = match (&source.words, &source.snapshot) {
        (_, Some(snapshot)) => LexiconIndex::load_snapshot(snapshot)?,
        (Some(words), None) => LexiconIndex::from_word_list(&WordList::load_from_path(words)?)?,
        (None, None) => return Err("either --words or --snapshot is required".into()),
    };
    eprintln!("Loaded lexicon ({} nodes) in {:.3}s", index.node_count(), t_load.elapsed().as_secs_f64());
    Ok(index)
}

/// Load the lexicon and the problem, solve, and print every grid on stdout.
/// Diagnostics (status, timings, counts) go to stderr.
fn run_solve(args: &SolveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let problem = match (&args.problem, &args.letters, &args.pattern) {
        (Some(path), _, _) => Problem::load_from_path(path)?,
        (None, Some(letters), Some(pattern)) => {
            Problem::from_notation(letters, pattern).map_err(solver::SolverError::from)?
        }
        _ => return Err("give a problem file, or both --letters and --pattern".into()),
    };
    if let Some(path) = &args.save {
        problem.save_to_path(path)?;
    }

    let index = load_lexicon(&args.lexicon)?;

    let mut puzzle_solver = PuzzleSolver::new(&index);
    if let Some(secs) = args.timeout {
        let limit = Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid --timeout {secs}: {e}"))?;
        puzzle_solver = puzzle_solver.with_time_budget(limit);
    }
    puzzle_solver.set_problem(&problem);
    let result = puzzle_solver.solve()?;

    for (i, grid) in result.solutions.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{grid}");
    }

    match &result.status {
        SolveStatus::Exhausted if result.is_empty() => eprintln!("✓ Search complete: no solutions"),
        SolveStatus::Exhausted => eprintln!("✓ Search complete"),
        SolveStatus::Unsolvable(reason) => eprintln!("✗ Unsolvable: {reason}"),
        SolveStatus::TimedOut { elapsed } => {
            eprintln!("⚠️  Timed out after {:.1}s; some solutions may not have been returned", elapsed.as_secs_f64());
        }
    }
    eprintln!(
        "Solved in {:.3}s ({} solutions, {} branches, {} candidates).",
        result.elapsed.as_secs_f64(),
        result.len(),
        result.stats.branches,
        result.stats.candidates_considered
    );
    Ok(())
}

fn run_query(args: &QueryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let index = load_lexicon(&args.lexicon)?;
    let rack = Rack::from(args.rack.as_str());
    let text = args.text.to_lowercase();

    let results: Box<dyn Iterator<Item = String> + '_> = match (args.kind, args.len) {
        (QueryKind::Contains, None) => Box::new(index.contains_substring(&text)),
        (QueryKind::Contains, Some(len)) => {
            Box::new(index.contains_substring(&text).filter(move |word| word.chars().count() == len))
        }
        (QueryKind::Starts, None) => Box::new(index.starts_with(&text)),
        (QueryKind::Starts, Some(len)) => Box::new(index.starts_with_len(&text, len)),
        (QueryKind::Ends, None) => Box::new(index.ends_with(&text)),
        (QueryKind::Ends, Some(len)) => Box::new(index.ends_with_len(&text, len)),
        (QueryKind::ContainsLett, _) => Box::new(
            index
                .contains_lett(&text, &rack)
                .map(|m| format!("{} (at {})", m.word, m.offset)),
        ),
        (QueryKind::StartsLett, _) => Box::new(index.starts_with_lett(&text, &rack)),
        (QueryKind::EndsLett, _) => Box::new(index.ends_with_lett(&text, &rack)),
        (QueryKind::Pattern, _) => Box::new(index.find_pattern_with_letters(&rack, &text)),
    };

    let mut shown = 0usize;
    for word in results.take(args.num_results) {
        println!("{word}");
        shown += 1;
    }
    eprintln!("{shown} results");
    Ok(())
}
