//! Interactive question loop
//!
//! Reads one question per line and prints the closest corpus question for
//! every embedding method.

use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::debug;

use crate::state::{AppState, MethodResults};

const EXIT_WORDS: [&str; 3] = ["exit", "quit", "bye"];

fn is_exit(line: &str) -> bool {
    EXIT_WORDS.iter().any(|word| line.eq_ignore_ascii_case(word))
}

/// Print `score | text` for the first match of each method
pub fn write_best_matches<W: Write>(writer: &mut W, results: &[MethodResults<'_>]) -> Result<()> {
    for method in results {
        match method.matches.first() {
            Some(best) => writeln!(writer, "{}: {:.4} | {}", method.method, best.score, best.text)?,
            None => writeln!(writer, "{}: no match", method.method)?,
        }
    }
    Ok(())
}

/// Run the ask loop until an exit word or EOF
pub fn run_ask<R: BufRead, W: Write>(state: &AppState, mut reader: R, mut writer: W) -> Result<()> {
    let mut line = String::new();

    loop {
        write!(writer, "> ")?;
        writer.flush()?;

        line.clear();
        if reader.read_line(&mut line)? == 0 {
            debug!("EOF on input, leaving ask loop");
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if is_exit(question) {
            writeln!(writer, "Goodbye!")?;
            break;
        }

        let results = state.query(question, 1)?;
        write_best_matches(&mut writer, &results)?;
    }

    Ok(())
}
