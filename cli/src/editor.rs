//! Line source backed by `rustyline`, used when stdin is a terminal.

use roster_sqlite::{LineEvent, LineSource};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

pub struct EditorLines {
    editor: DefaultEditor,
}

impl EditorLines {
    pub fn new() -> Result<Self, String> {
        let editor =
            DefaultEditor::new().map_err(|e| format!("Failed to initialize line editor: {e}"))?;
        Ok(Self { editor })
    }
}

impl LineSource for EditorLines {
    fn next_line(&mut self, prompt: &str) -> std::io::Result<LineEvent> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    // History is best-effort.
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(LineEvent::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(LineEvent::Interrupted),
            Err(ReadlineError::Eof) => Ok(LineEvent::Eof),
            Err(ReadlineError::Io(e)) => Err(e),
            Err(e) => Err(std::io::Error::other(e.to_string())),
        }
    }
}
