//! Line-oriented console state machine.
//!
//! The console has a single state, "awaiting input". Each line read from a
//! [`LineSource`] is classified with [`MetaCommand::classify`] and either
//! ignored (blank), ends the session (terminate keyword), or is executed and
//! rendered. A failing statement is reported and the loop continues; an
//! interrupt only prints a hint. End of input ends the session cleanly.
//!
//! Line editing is not part of this module: the CLI plugs in an editor-backed
//! source, tests plug in [`ScriptedLines`].

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use roster_core::MetaCommand;
use rusqlite::Connection;
use tracing::{debug, warn};

use crate::error::Result;
use crate::session::{self, QueryOutcome, ResultSet};

/// Default prompt.
pub const PROMPT: &str = "SQL> ";

/// Printed when the user interrupts the prompt.
pub const INTERRUPT_HINT: &str = "Use 'exit' or 'quit' to disconnect";

const RULE_WIDTH: usize = 80;

/// One read attempt from a line source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    Line(String),
    Interrupted,
    Eof,
}

/// Source of console input lines.
pub trait LineSource {
    /// Reads the next line, showing `prompt` if the source is interactive.
    fn next_line(&mut self, prompt: &str) -> std::io::Result<LineEvent>;
}

/// A fixed sequence of events, then end of input.
#[derive(Debug, Default)]
pub struct ScriptedLines {
    events: VecDeque<LineEvent>,
}

impl ScriptedLines {
    /// Creates a source yielding `lines` in order.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            events: lines.into_iter().map(|l| LineEvent::Line(l.into())).collect(),
        }
    }

    /// Creates a source yielding arbitrary events in order.
    pub fn from_events(events: impl IntoIterator<Item = LineEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl LineSource for ScriptedLines {
    fn next_line(&mut self, _prompt: &str) -> std::io::Result<LineEvent> {
        Ok(self.events.pop_front().unwrap_or(LineEvent::Eof))
    }
}

/// Reads lines from any buffered reader without echoing a prompt.
///
/// Used when stdin is not a terminal.
pub struct ReaderLines<R> {
    reader: R,
}

impl<R: BufRead> ReaderLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderLines<R> {
    fn next_line(&mut self, _prompt: &str) -> std::io::Result<LineEvent> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(LineEvent::Eof);
        }
        Ok(LineEvent::Line(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Counters describing a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsoleSummary {
    /// Commands executed, successful or not.
    pub commands: usize,
    /// Commands that failed.
    pub errors: usize,
    /// Interrupts received.
    pub interrupts: usize,
    /// `true` if a terminate keyword ended the session, `false` on end of input.
    pub terminated: bool,
}

/// Interactive console over an open connection.
pub struct Console<'c, W: Write> {
    conn: &'c Connection,
    out: W,
    prompt: String,
}

impl<'c, W: Write> Console<'c, W> {
    pub fn new(conn: &'c Connection, out: W) -> Self {
        Self {
            conn,
            out,
            prompt: PROMPT.to_string(),
        }
    }

    /// Replaces the prompt text.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Runs until a terminate keyword or end of input.
    ///
    /// # Errors
    ///
    /// Only I/O failures on the line source or the output end the loop with
    /// an error; statement failures are printed and counted.
    pub fn run(&mut self, source: &mut dyn LineSource) -> Result<ConsoleSummary> {
        let mut summary = ConsoleSummary::default();
        loop {
            let line = match source.next_line(&self.prompt)? {
                LineEvent::Eof => break,
                LineEvent::Interrupted => {
                    summary.interrupts += 1;
                    writeln!(self.out, "\n{INTERRUPT_HINT}")?;
                    continue;
                }
                LineEvent::Line(line) => line,
            };

            let command = MetaCommand::classify(&line);
            match command {
                MetaCommand::Empty => continue,
                MetaCommand::Terminate => {
                    summary.terminated = true;
                    break;
                }
                _ => {}
            }

            summary.commands += 1;
            debug!(?command, "Executing console command");
            match session::execute(self.conn, &command) {
                Ok(outcome) => self.render(&outcome)?,
                Err(e) => {
                    summary.errors += 1;
                    warn!(error = %e, "Console command failed");
                    writeln!(self.out, "Error: {e}")?;
                }
            }
        }
        writeln!(self.out, "Disconnecting...")?;
        self.out.flush()?;
        Ok(summary)
    }

    fn render(&mut self, outcome: &QueryOutcome) -> Result<()> {
        match outcome {
            QueryOutcome::Rows(set) => render_result_set(&mut self.out, set)?,
            QueryOutcome::Executed { .. } => writeln!(self.out, "Query executed successfully")?,
            QueryOutcome::Idle => {}
        }
        Ok(())
    }
}

/// Writes headers, a rule, the rows and a row-count footer.
pub fn render_result_set<W: Write>(out: &mut W, set: &ResultSet) -> std::io::Result<()> {
    writeln!(out, "\n{}", set.columns.join(" | "))?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    if set.is_empty() {
        return writeln!(out, "(0 rows)");
    }
    for row in &set.rows {
        let cells = row.iter().map(|v| v.display()).collect::<Vec<_>>();
        writeln!(out, "{}", cells.join(" | "))?;
    }
    writeln!(out, "\n({} rows)", set.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(conn: &Connection, source: &mut dyn LineSource) -> (String, ConsoleSummary) {
        let mut out = Vec::new();
        let summary = Console::new(conn, &mut out).run(source).unwrap();
        (String::from_utf8(out).unwrap(), summary)
    }

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (a INTEGER, b TEXT); INSERT INTO t VALUES (1, NULL);")
            .unwrap();
        conn
    }

    #[test]
    fn test_renders_rows_with_footer() {
        let conn = setup();
        let (out, summary) = run(&conn, &mut ScriptedLines::new(["SELECT a, b FROM t", "exit"]));
        assert!(out.contains("\na | b\n"));
        assert!(out.contains(&"-".repeat(80)));
        assert!(out.contains("\n1 | NULL\n"));
        assert!(out.contains("(1 rows)"));
        assert!(summary.terminated);
        assert_eq!(summary.commands, 1);
    }

    #[test]
    fn test_zero_rows_marker() {
        let conn = setup();
        let (out, _) = run(&conn, &mut ScriptedLines::new(["SELECT a FROM t WHERE a > 5"]));
        assert!(out.contains("a\n"));
        assert!(out.contains("(0 rows)"));
    }

    #[test]
    fn test_error_does_not_end_session() {
        let conn = setup();
        let (out, summary) = run(
            &conn,
            &mut ScriptedLines::new(["SELECT * FROM nope", "INSERT INTO t VALUES (2, 'x')", "q"]),
        );
        assert!(out.contains("Error: "));
        assert!(out.contains("Query executed successfully"));
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.commands, 2);
    }

    #[test]
    fn test_interrupt_prints_hint_and_continues() {
        let conn = setup();
        let mut source = ScriptedLines::from_events([
            LineEvent::Interrupted,
            LineEvent::Line("\\dt".into()),
        ]);
        let (out, summary) = run(&conn, &mut source);
        assert!(out.contains(INTERRUPT_HINT));
        assert!(out.contains("table_name"));
        assert_eq!(summary.interrupts, 1);
        assert!(!summary.terminated);
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let conn = setup();
        let (out, summary) = run(&conn, &mut ScriptedLines::new(["", "   ", "QUIT"]));
        assert_eq!(summary.commands, 0);
        assert_eq!(out, "Disconnecting...\n");
    }

    #[test]
    fn test_reader_lines_strips_newlines() {
        let mut source = ReaderLines::new("\\dt\r\nexit\n".as_bytes());
        assert_eq!(source.next_line(PROMPT).unwrap(), LineEvent::Line("\\dt".into()));
        assert_eq!(source.next_line(PROMPT).unwrap(), LineEvent::Line("exit".into()));
        assert_eq!(source.next_line(PROMPT).unwrap(), LineEvent::Eof);
    }
}
