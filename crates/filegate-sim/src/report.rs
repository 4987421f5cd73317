//! Console input and end-of-run reporting.

use std::io::{BufRead, Write};

use crate::error::SimError;

/// Header printed before the deferred operation list.
pub const DEFERRED_HEADER: &str = "Deferred Array Operations:";

/// Prompt shown when the client count is not given on the command line.
pub const CLIENT_COUNT_PROMPT: &str = "Enter the number of clients: ";

/// Write the deferred operation labels, numbered from 1.
pub fn write_deferred_report(out: &mut impl Write, labels: &[String]) -> std::io::Result<()> {
    writeln!(out, "{DEFERRED_HEADER}")?;
    for (i, label) in labels.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, label)?;
    }
    out.flush()
}

/// Prompt for and parse the client count.
///
/// # Errors
///
/// Returns `SimError::Config` if the line is not a non-negative integer.
pub fn prompt_client_count(
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<usize, SimError> {
    write!(output, "{CLIENT_COUNT_PROMPT}")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let trimmed = line.trim();
    trimmed
        .parse()
        .map_err(|e| SimError::Config(format!("invalid client count {trimmed:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn deferred_report_is_one_indexed() {
        let mut out = Vec::new();
        let labels = vec!["Write by Client 2".to_string(), "Read by Client 2".to_string()];
        write_deferred_report(&mut out, &labels).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Deferred Array Operations:\n1. Write by Client 2\n2. Read by Client 2\n"
        );
    }

    #[test]
    fn empty_report_has_only_header() {
        let mut out = Vec::new();
        write_deferred_report(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Deferred Array Operations:\n");
    }

    #[test]
    fn prompt_parses_count() {
        let mut input = Cursor::new("4\n");
        let mut output = Vec::new();

        assert_eq!(prompt_client_count(&mut input, &mut output).unwrap(), 4);
        assert_eq!(String::from_utf8(output).unwrap(), CLIENT_COUNT_PROMPT);
    }

    #[test]
    fn prompt_rejects_garbage() {
        let mut input = Cursor::new("many\n");
        let result = prompt_client_count(&mut input, &mut Vec::new());
        assert!(matches!(result, Err(SimError::Config(_))));
    }
}
