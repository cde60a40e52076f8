use std::io::{self, Read};

use anyhow::Error;

pub mod analyze;
pub mod generate;
pub mod hatch;

/// Note text from the command line, or all of stdin when none was given.
fn read_note(text: Option<String>) -> Result<String, Error> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(strip_line_ending(buffer))
        }
    }
}

/// Drops the single line ending that `echo` and editors leave after piped text.
fn strip_line_ending(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}
