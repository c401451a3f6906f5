//! Interactive input

use std::io::{self, BufRead, IsTerminal};

use console::{Key, Term};

use crate::convert::DEFAULT_IDENTIFIER;

pub(crate) const PROMPT: &str = "Please enter a name for this main menu background";

/// Read the mod name from one line of input.
///
/// End of input without a line gives [`DEFAULT_IDENTIFIER`].
pub(crate) fn read_identifier<R: BufRead>(mut input: R) -> io::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(DEFAULT_IDENTIFIER.to_string());
    }
    Ok(line.trim().to_string())
}

/// Wait for a key press, but only when someone is there to press one.
pub(crate) fn pause() {
    if !io::stdin().is_terminal() {
        return;
    }
    println!("Press any key to exit...");
    wait_for_key(|| Term::stdout().read_key());
}

/// Block on `read_key`, logging rather than failing if the terminal cannot be read.
fn wait_for_key<F: FnOnce() -> io::Result<Key>>(read_key: F) -> Option<Key> {
    match read_key() {
        Ok(key) => Some(key),
        Err(e) => {
            tracing::debug!("Could not wait for a key press: {e}");
            None
        }
    }
}
