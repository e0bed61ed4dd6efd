use crate::lexicon::{LexiconError, LexiconIndex};
use crate::log::init_logger;
use crate::problem::Problem;
use crate::solver::{PuzzleSolver, SolveStatus, SolverError};
use crate::word_list::WordList;
use std::time::Duration;
use wasm_bindgen::prelude::*;

use serde_wasm_bindgen::to_value;

/// Structured error information for JavaScript consumers
#[derive(serde::Serialize)]
struct WasmError {
    /// Error code (e.g., "E001", "S002", "L003")
    code: String,
    /// Display message
    message: String,
    /// Short description of error type
    description: String,
    /// Detailed explanation
    details: String,
    /// Optional helpful suggestion
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<String>,
}

impl From<SolverError> for WasmError {
    fn from(e: SolverError) -> Self {
        // For InvalidProblem, extract the nested ParseError details
        match &e {
            SolverError::InvalidProblem(pe) => WasmError {
                code: pe.code().to_string(),
                message: pe.to_string(),
                description: pe.description().to_string(),
                details: pe.details().to_string(),
                help: pe.help().map(str::to_string),
            },
            _ => WasmError {
                code: e.code().to_string(),
                message: e.to_string(),
                description: e.description().to_string(),
                details: e.details().to_string(),
                help: e.help().map(str::to_string),
            },
        }
    }
}

impl From<LexiconError> for WasmError {
    fn from(e: LexiconError) -> Self {
        WasmError {
            code: e.code().to_string(),
            message: e.to_string(),
            description: e.description().to_string(),
            details: e.details().to_string(),
            help: e.help().map(str::to_string),
        }
    }
}

impl From<WasmError> for JsValue {
    fn from(e: WasmError) -> Self {
        let mut msg = format!("Error {}: {}", e.code, e.message);

        if !e.details.is_empty() {
            msg.push_str(&format!("\n\n{}", e.details));
        }

        if let Some(help) = e.help {
            msg.push_str(&format!("\n\nSuggestion: {help}"));
        }

        // Create a JavaScript Error object with the formatted message
        js_sys::Error::new(&msg).into()
    }
}

fn serialization_error(what: &str, e: &serde_wasm_bindgen::Error, code: &str) -> WasmError {
    WasmError {
        code: code.to_string(),
        message: format!("serialization failed: {e}"),
        description: format!("Failed to serialize {what}"),
        details: format!("The {what} could not be converted to JavaScript format."),
        help: Some("This is an internal error. Please report this issue.".to_string()),
    }
}

/// Force every `LazyLock<Regex>` to compile now rather than on the first query.
///
/// If you add a new `LazyLock<Regex>` anywhere in the crate, add it here too.
fn validate_internal_regexes() {
    let _ = &*crate::word_list::WORD_RE;
    log::debug!("Internal regex patterns validated successfully");
}

/// Initialize muddle logging and validation with the specified debug setting.
///
/// This function must be called from JavaScript after the WASM module loads.
#[wasm_bindgen]
pub fn initialize(debug_enabled: bool) {
    console_error_panic_hook::set_once();
    validate_internal_regexes();
    init_logger(debug_enabled);

    log::info!("WASM module initialized");
}

#[derive(serde::Serialize)]
struct WasmSolveResult {
    /// Each solution as five uppercase rows
    solutions: Vec<Vec<String>>,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    branches: usize,
    elapsed_ms: f64,
}

/// JS entry: (letters: string, pattern: string, words: string[], timeout_ms?: number)
///
/// `letters` and `pattern` use compact notation (`"heart/ember/abuse/resin/trend"`,
/// `"h----/-----/--u--/-----/-----"`). The lexicon is built from `words` on each call.
#[wasm_bindgen]
pub fn solve_muddle_wasm(
    letters: &str,
    pattern: &str,
    words: JsValue,
    timeout_ms: Option<u32>,
) -> Result<JsValue, JsValue> {
    let words: Vec<String> = serde_wasm_bindgen::from_value(words).map_err(|e| WasmError {
        code: "WASM001".to_string(),
        message: format!("words must be string[]: {e}"),
        description: "Invalid word-list format".to_string(),
        details: "The words parameter must be a JavaScript array of strings.".to_string(),
        help: Some("Pass a string array, e.g. ['heart', 'ember', 'abuse']".to_string()),
    })?;

    let problem = Problem::from_notation(letters, pattern).map_err(|e| WasmError::from(SolverError::from(e)))?;
    let index = LexiconIndex::from_words(&words).map_err(WasmError::from)?;

    let mut solver = PuzzleSolver::new(&index);
    if let Some(ms) = timeout_ms {
        solver = solver.with_time_budget(Duration::from_millis(u64::from(ms)));
    }
    solver.set_problem(&problem);
    let result = solver.solve().map_err(WasmError::from)?;

    let (status, reason) = match &result.status {
        SolveStatus::Exhausted => ("exhausted".to_string(), None),
        SolveStatus::Unsolvable(reason) => ("unsolvable".to_string(), Some(reason.to_string())),
        SolveStatus::TimedOut { .. } => ("timed_out".to_string(), None),
    };

    let wasm_result = WasmSolveResult {
        solutions: result
            .solutions
            .iter()
            .map(|grid| grid.rows().iter().map(|row| row.to_ascii_uppercase()).collect())
            .collect(),
        status,
        reason,
        branches: result.stats.branches,
        elapsed_ms: result.elapsed.as_secs_f64() * 1000.0,
    };

    to_value(&wasm_result).map_err(|e| serialization_error("solver result", &e, "WASM002").into())
}

/// Parse newline-separated word-list text into the words the lexicon would index.
///
/// # Errors
/// Returns a `JsValue` error if the result cannot be serialized.
#[wasm_bindgen]
pub fn parse_word_list(text: &str) -> Result<JsValue, JsValue> {
    let word_list = WordList::parse_from_str(text);
    to_value(&word_list.words).map_err(|e| serialization_error("word list", &e, "WASM003").into())
}

/// Generate a debug report users can copy/paste when reporting issues.
#[wasm_bindgen]
pub fn get_debug_info(letters: &str, pattern: &str, error_message: &str, word_list_size: usize) -> String {
    use std::fmt::Write;
    let mut report = String::new();

    // writing to a String never fails
    let _ = writeln!(&mut report, "=== MUDDLE DEBUG REPORT ===");
    let _ = writeln!(&mut report, "Version: {}", env!("CARGO_PKG_VERSION"));
    let _ = writeln!(&mut report, "Commit: {}", env!("GIT_HASH_FULL"));
    let _ = writeln!(
        &mut report,
        "Generated: {}",
        js_sys::Date::new_0().to_iso_string().as_string().unwrap_or_else(|| "unknown".to_string())
    );
    let _ = writeln!(&mut report);

    let _ = writeln!(&mut report, "## Error");
    let _ = writeln!(&mut report, "{error_message}");
    let _ = writeln!(&mut report);

    let _ = writeln!(&mut report, "## Input");
    let _ = writeln!(&mut report, "Letters: {letters}");
    let _ = writeln!(&mut report, "Pattern: {pattern}");
    let _ = writeln!(&mut report, "Word List Size: {word_list_size}");
    let _ = writeln!(&mut report);

    let _ = writeln!(&mut report, "## Environment");
    if let Some(window) = web_sys::window() {
        if let Ok(user_agent) = window.navigator().user_agent() {
            let _ = writeln!(&mut report, "User Agent: {user_agent}");
        }
        let _ = writeln!(
            &mut report,
            "Location: {}",
            window.location().href().unwrap_or_else(|_| "unknown".to_string())
        );
    }
    let _ = writeln!(&mut report);

    let _ = writeln!(&mut report, "## Instructions");
    let _ = writeln!(&mut report, "Please copy this entire report and paste it when reporting the issue.");
    let _ = writeln!(&mut report);

    let _ = writeln!(&mut report, "=== END DEBUG REPORT ===");

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(target_arch = "wasm32")]
    fn test_get_debug_info_structure() {
        let report = get_debug_info("heart/ember/abuse/resin/trend", "-----/-----/-----/-----/-----", "bad input", 1000);

        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "=== MUDDLE DEBUG REPORT ===");
        assert_eq!(lines[1], format!("Version: {}", env!("CARGO_PKG_VERSION")));
        assert!(lines[2].starts_with("Commit: "));
        assert!(lines[3].starts_with("Generated: "));
        assert_eq!(lines[5], "## Error");
        assert_eq!(lines[6], "bad input");
        assert_eq!(lines[8], "## Input");
        assert_eq!(lines[9], "Letters: heart/ember/abuse/resin/trend");
        assert_eq!(lines[10], "Pattern: -----/-----/-----/-----/-----");
        assert_eq!(lines[11], "Word List Size: 1000");
        let end = lines.iter().position(|&l| l == "=== END DEBUG REPORT ===");
        assert!(end.is_some());
    }

    #[test]
    fn test_all_regexes_validated() {
        // panics if any listed regex fails to compile
        validate_internal_regexes();
    }
}
