//! Console input classification.
//!
//! Every line typed at the console maps to exactly one [`MetaCommand`].
//! Shorthand follows `psql`: `\dt` lists tables, `\l` lists databases and
//! `\d <table>` describes a table. Anything else is passed through as a
//! raw statement.

/// Words that end a console session, compared case-insensitively.
pub const TERMINATE_KEYWORDS: [&str; 3] = ["exit", "quit", "q"];

/// A classified console input line.
///
/// # Examples
///
/// ```
/// use roster_core::MetaCommand;
///
/// assert_eq!(MetaCommand::classify("  "), MetaCommand::Empty);
/// assert_eq!(MetaCommand::classify("QUIT"), MetaCommand::Terminate);
/// assert_eq!(MetaCommand::classify("\\dt"), MetaCommand::ListTables);
/// assert_eq!(
///     MetaCommand::classify("\\d students"),
///     MetaCommand::DescribeTable("students".into())
/// );
/// assert_eq!(
///     MetaCommand::classify("select 1"),
///     MetaCommand::Raw("select 1".into())
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    /// Blank input; re-prompt.
    Empty,
    /// End the session.
    Terminate,
    /// `\dt`
    ListTables,
    /// `\l`
    ListDatabases,
    /// `\d <table>`
    DescribeTable(String),
    /// Statement text executed as-is.
    Raw(String),
}

impl MetaCommand {
    /// Classifies one line of console input.
    pub fn classify(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return MetaCommand::Empty;
        }
        if TERMINATE_KEYWORDS
            .iter()
            .any(|kw| line.eq_ignore_ascii_case(kw))
        {
            return MetaCommand::Terminate;
        }
        match line {
            "\\dt" => return MetaCommand::ListTables,
            "\\l" => return MetaCommand::ListDatabases,
            _ => {}
        }
        if let Some(rest) = line.strip_prefix("\\d") {
            if rest.starts_with(char::is_whitespace) {
                if let Some(table) = rest.split_whitespace().next() {
                    return MetaCommand::DescribeTable(table.to_string());
                }
            }
        }
        MetaCommand::Raw(line.to_string())
    }

    /// Returns `true` if the session should stop after this command.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MetaCommand::Terminate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_are_empty() {
        assert_eq!(MetaCommand::classify(""), MetaCommand::Empty);
        assert_eq!(MetaCommand::classify(" \t "), MetaCommand::Empty);
    }

    #[test]
    fn test_terminate_keywords_case_insensitive() {
        for input in ["exit", "EXIT", "Quit", "q", "Q", "  quit  "] {
            assert_eq!(MetaCommand::classify(input), MetaCommand::Terminate, "{input}");
        }
        assert!(MetaCommand::classify("q").is_terminal());
    }

    #[test]
    fn test_terminate_keyword_must_be_whole_line() {
        assert_eq!(
            MetaCommand::classify("quit now"),
            MetaCommand::Raw("quit now".into())
        );
    }

    #[test]
    fn test_shorthand_commands() {
        assert_eq!(MetaCommand::classify("\\dt"), MetaCommand::ListTables);
        assert_eq!(MetaCommand::classify("\\l"), MetaCommand::ListDatabases);
        assert_eq!(
            MetaCommand::classify("\\d   classes  extra"),
            MetaCommand::DescribeTable("classes".into())
        );
    }

    #[test]
    fn test_describe_without_table_is_raw() {
        assert_eq!(MetaCommand::classify("\\d"), MetaCommand::Raw("\\d".into()));
        assert_eq!(
            MetaCommand::classify("\\dx"),
            MetaCommand::Raw("\\dx".into())
        );
    }

    #[test]
    fn test_raw_statement_passes_through() {
        let sql = "SELECT name FROM schools WHERE name = 'q'";
        assert_eq!(MetaCommand::classify(sql), MetaCommand::Raw(sql.into()));
    }
}
