//! Interactive question-answering loop.

use std::io::{self, BufRead, Write};

use anyhow::Result;

/// Inputs that end the session, matched case-insensitively.
pub const EXIT_KEYWORDS: [&str; 3] = ["sair", "exit", "quit"];

/// True when the trimmed input is one of the exit keywords.
pub fn is_exit_command(input: &str) -> bool {
    EXIT_KEYWORDS
        .iter()
        .any(|keyword| input.eq_ignore_ascii_case(keyword))
}

/// Drives the chat session over arbitrary reader/writer pairs.
///
/// Each question runs through `ask` (retrieval plus answering); an error is
/// printed and the loop continues, so one failed query never ends the
/// session. Empty lines re-prompt, exit keywords or end of input terminate.
pub fn run_loop<R, W, F>(mut reader: R, writer: &mut W, mut ask: F) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    F: FnMut(&str) -> Result<String>,
{
    writeln!(
        writer,
        "Chat started. Type 'sair', 'exit' or 'quit' to leave."
    )?;
    writeln!(writer, "{}", "-".repeat(50))?;

    let mut line = String::new();
    loop {
        write!(writer, "\nAsk your question: ")?;
        writer.flush()?;
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if is_exit_command(query) {
            writeln!(writer, "Ending the chat. Goodbye!")?;
            break;
        }

        writeln!(writer, "\nQUESTION: {query}")?;
        match ask(query) {
            Ok(answer) => writeln!(writer, "ANSWER: {answer}")?,
            Err(err) => writeln!(writer, "Error answering your question: {err:#}")?,
        }
        writeln!(writer, "{}", "-".repeat(50))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_with_input(input: &str, ask: impl FnMut(&str) -> Result<String>) -> String {
        let mut output = Vec::new();
        run_loop(Cursor::new(input.to_string()), &mut output, ask).expect("loop");
        String::from_utf8(output).expect("utf8 output")
    }

    #[test]
    fn exit_keywords_match_any_case() {
        for keyword in ["sair", "SAIR", "Exit", "qUiT"] {
            assert!(is_exit_command(keyword), "{keyword} should exit");
        }
        assert!(!is_exit_command("exitt"));
        assert!(!is_exit_command("continue"));
    }

    #[test]
    fn exit_keyword_terminates_without_asking() {
        let mut asked = 0;
        let output = run_with_input("exit\n", |_| {
            asked += 1;
            Ok(String::new())
        });
        assert_eq!(asked, 0);
        assert!(output.contains("Goodbye!"));
    }

    #[test]
    fn uppercase_portuguese_exit_works() {
        let output = run_with_input("SAIR\n", |_| unreachable!("must not ask"));
        assert!(output.contains("Goodbye!"));
    }

    #[test]
    fn empty_lines_are_skipped() {
        let mut questions = Vec::new();
        run_with_input("\n   \nwhat is this?\nquit\n", |q| {
            questions.push(q.to_string());
            Ok("an answer".into())
        });
        assert_eq!(questions, vec!["what is this?"]);
    }

    #[test]
    fn answers_are_printed_with_the_question() {
        let output = run_with_input("what was the revenue?\nexit\n", |_| {
            Ok("Revenue in 2024 was $5M.".into())
        });
        assert!(output.contains("QUESTION: what was the revenue?"));
        assert!(output.contains("ANSWER: Revenue in 2024 was $5M."));
    }

    #[test]
    fn a_failed_question_does_not_end_the_session() {
        let mut calls = 0;
        let output = run_with_input("first\nsecond\nexit\n", |_| {
            calls += 1;
            if calls == 1 {
                anyhow::bail!("store unreachable")
            }
            Ok("recovered".into())
        });
        assert_eq!(calls, 2);
        assert!(output.contains("Error answering your question"));
        assert!(output.contains("store unreachable"));
        assert!(output.contains("ANSWER: recovered"));
    }

    #[test]
    fn end_of_input_terminates_cleanly() {
        let output = run_with_input("", |_| unreachable!("must not ask"));
        assert!(output.contains("Chat started"));
    }
}
