//! Mod identifier rules

use super::ConvertError;

/// Identifier used when standard input ends before a name is entered.
pub const DEFAULT_IDENTIFIER: &str = "Default";

const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Check that `identifier` can be used as a file name on every platform.
///
/// # Errors
///
/// Returns [`ConvertError::InvalidIdentifier`] for an empty name, `.` or
/// `..`, or a name containing path separators, `<>:"|?*`, or control
/// characters.
pub fn validate_identifier(identifier: &str) -> Result<(), ConvertError> {
    let reason = if identifier.is_empty() {
        Some("the name is empty")
    } else if identifier == "." || identifier == ".." {
        Some("the name is a relative path")
    } else if identifier.contains(['/', '\\']) {
        Some("the name contains a path separator")
    } else if identifier.contains(FORBIDDEN_CHARS) {
        Some("the name contains a character that is not allowed in file names")
    } else if identifier.chars().any(char::is_control) {
        Some("the name contains a control character")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConvertError::InvalidIdentifier {
            identifier: identifier.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
