//! Input selection: file path or piped stdin.

use std::io::{self, IsTerminal, Read};
use std::path::Path;

/// Detect whether the given CLI input argument represents stdin.
///
/// Returns `true` if input is `Some("-")`, or if input is `None` and stdin is not a terminal.
pub fn is_stdin_input(input: Option<&Path>) -> bool {
    match input {
        Some(p) => p.as_os_str() == "-",
        None => !io::stdin().is_terminal(),
    }
}

/// Read all of stdin to a string (blocking).
pub fn read_stdin_to_string() -> io::Result<String> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: the `None` case depends on terminal state (`is_terminal()`), so we skip it.

    #[test]
    fn is_stdin_input_dash() {
        assert!(is_stdin_input(Some(Path::new("-"))));
    }

    #[test]
    fn is_stdin_input_file_path() {
        assert!(!is_stdin_input(Some(Path::new("file.md"))));
    }

    #[test]
    fn is_stdin_input_empty_string() {
        assert!(!is_stdin_input(Some(Path::new(""))));
    }
}
