//! Interactive confirmation.

use std::io;
use std::io::{BufRead, Write};

/// Shows `question` and reads one line of input.
///
/// Returns `true` only for an explicit `y`/`yes` answer; end of input
/// counts as a refusal.
pub fn confirm(question: &str) -> bool {
    print!("{question}");
    let _ = io::stdout().flush();
    let Some(Ok(line)) = io::stdin().lock().lines().next() else {
        return false;
    };
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}
