//! Interactive prompt loop

use crate::agent::Agent;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Banner printed when the session starts
pub const WELCOME: &str =
    "Welcome to the AI Ticket Assistant!\nType 'exit' or 'quit' to end the session.\n";

/// Prompt printed before each question
pub const PROMPT: &str = "Enter your question: ";

/// Words that end the session, compared case-insensitively
pub const EXIT_COMMANDS: [&str; 3] = ["exit", "quit", "bye"];

/// Whether `line` asks to end the session
#[must_use]
pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    EXIT_COMMANDS.iter().any(|cmd| line.eq_ignore_ascii_case(cmd))
}

/// Read questions from `input` until an exit command or end of input
///
/// Each answer is written to `out`. A failed turn is reported and the
/// session carries on.
///
/// # Errors
///
/// Returns an I/O error if reading `input` or writing `out` fails.
pub async fn run_session<R, W>(agent: &mut Agent, input: R, out: &mut W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "{WELCOME}")?;
    let mut lines = input.lines();

    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if is_exit_command(question) {
            writeln!(out, "Goodbye!")?;
            break;
        }

        match agent.ask(question).await {
            Ok(answer) => writeln!(out, "\nFinal Answer:\n{answer}\n")?,
            Err(err) => writeln!(out, "Warning: Error: {err}\n")?,
        }
    }
    Ok(())
}
