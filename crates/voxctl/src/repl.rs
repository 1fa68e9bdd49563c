//! REPL - interactive read-eval-print loop over the interpreter.

use anyhow::Result;
use std::io::{self, BufRead};
use vox_common::Interpreter;

use crate::output;
use crate::turnlog::TurnEntry;

pub async fn start_repl(interpreter: &mut Interpreter) -> Result<()> {
    output::print_welcome();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        output::print_prompt();

        let input = match lines.next() {
            Some(Ok(line)) => line.trim().to_string(),
            Some(Err(e)) => {
                output::display_error(&format!("Error reading input: {}", e));
                continue;
            }
            None => break, // EOF
        };

        if input.is_empty() {
            continue;
        }

        if matches!(input.as_str(), "exit" | "quit") {
            output::display_info("Voice systems offline. Goodbye.");
            break;
        }

        run_turn(interpreter, &input).await;
        println!();
    }

    Ok(())
}

/// Process one turn and append it to the turn log.
pub async fn run_turn(interpreter: &mut Interpreter, input: &str) -> bool {
    let (mut entry, started) = TurnEntry::start(input);
    let answered = interpreter.process(input).await;

    entry.answered = answered;
    entry.duration_ms = started.elapsed().as_millis() as u64;
    if let Err(e) = entry.write() {
        tracing::debug!(error = %e, "turn log write failed");
    }

    answered
}
