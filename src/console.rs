//! Interactive console: reads questions from stdin, prints answers to stdout.
//!
//! Lines starting with `/` are console commands:
//!
//! ```text
//! /export <id-or-name>   write a grade report
//! /quit                  leave the console
//! ```
//!
//! Runs until `/quit` or stdin is closed.

use std::io::{BufRead, Write};

use tracing::{info, warn};

use crate::report::ReportGenerator;
use crate::router::{extract_identifier, Assistant};

/// What the console should do with one input line.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Ask(&'a str),
    Export(&'a str),
    Quit,
    Skip,
    Unknown(&'a str),
}

fn parse_line(line: &str) -> Command<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Command::Skip;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Ask(line);
    };
    let (cmd, arg) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    match cmd {
        "quit" | "exit" | "q" => Command::Quit,
        "export" if !arg.trim().is_empty() => Command::Export(arg.trim()),
        _ => Command::Unknown(cmd),
    }
}

/// Serve the console over `input`/`output` until quit or EOF.
pub fn run<R: BufRead, W: Write>(
    assistant: &Assistant,
    reports: &ReportGenerator,
    input: R,
    mut output: W,
) -> std::io::Result<()> {
    info!("console started");
    writeln!(output, "─────────────────────────────────")?;
    writeln!(output, " Grades assistant  (/quit to exit)")?;
    writeln!(output, "─────────────────────────────────")?;

    let mut lines = input.lines();
    loop {
        write!(output, "> ")?;
        output.flush()?;

        let Some(line) = lines.next() else {
            writeln!(output)?;
            info!("stdin closed, console exiting");
            break;
        };
        let line = line?;

        match parse_line(&line) {
            Command::Skip => {}
            Command::Quit => break,
            Command::Ask(query) => {
                writeln!(output, "{}", assistant.answer(query))?;
                if let Some(id) = extract_identifier(query) {
                    writeln!(output, "(use /export {id} to generate a report)")?;
                }
            }
            Command::Export(key) => {
                let outcome = reports.generate(&assistant.knowledge(), key);
                match &outcome.path {
                    Some(path) => {
                        writeln!(output, "{}", outcome.message)?;
                        writeln!(output, "File: {}", path.display())?;
                    }
                    None => writeln!(output, "error: {}", outcome.message)?,
                }
            }
            Command::Unknown(cmd) => {
                warn!(%cmd, "unknown console command");
                writeln!(output, "unknown command: /{cmd}  (try /export <id> or /quit)")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, RetrievalMode};
    use crate::records::StudentRecord;
    use std::io::Cursor;

    #[test]
    fn parse_commands() {
        assert_eq!(parse_line("   "), Command::Skip);
        assert_eq!(parse_line(" hola "), Command::Ask("hola"));
        assert_eq!(parse_line("/quit"), Command::Quit);
        assert_eq!(parse_line("/export 2024001"), Command::Export("2024001"));
        assert_eq!(parse_line("/export  María González "), Command::Export("María González"));
        assert_eq!(parse_line("/export"), Command::Unknown("export"));
        assert_eq!(parse_line("/help"), Command::Unknown("help"));
    }

    #[test]
    fn session_answers_and_hints_export() {
        let tmp = tempfile::TempDir::new().unwrap();
        let assistant = Assistant::new(
            vec![StudentRecord {
                id: "2024001".into(),
                name: "Ana Pérez".into(),
                program: "Sistemas".into(),
                semester: None,
                average: Some(90.0),
                courses: Vec::new(),
            }],
            None,
            RetrievalMode::Keyword,
        )
        .unwrap();
        let reports = ReportGenerator::new(Config::test_default(tmp.path()).export);

        let input = Cursor::new("Matrícula 2024001\n\n/export 2099999\n/quit\nignored\n");
        let mut out = Vec::new();
        run(&assistant, &reports, input, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("**Student:** Ana Pérez"));
        assert!(out.contains("(use /export 2024001 to generate a report)"));
        assert!(out.contains("error: No data found for student '2099999'"));
        assert!(!out.contains("ignored"));
    }
}
