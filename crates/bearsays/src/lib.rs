//! Cool bear says stuff.
//!
//! Renders a message inside a framed speech bubble with a bear underneath.

#![warn(missing_docs)]

/// Message used when none is given.
pub const DEFAULT_MESSAGE: &str = "Hello, I'm a bear!";

/// Minimum interior width of the bubble, in columns.
pub const MIN_WIDTH: usize = 21;

const BEAR: &str = "    / \n  ʕ•ᴥ•ʔ*\n";

/// Renders `message` in a speech bubble above the bear.
///
/// The bubble grows to fit long messages and is never narrower than
/// [`MIN_WIDTH`].
#[must_use]
pub fn render(message: &str) -> String {
    let len = message.chars().count();
    let width = len.max(MIN_WIDTH);
    let border = "═".repeat(width + 1);
    let padding = " ".repeat(width - len);

    format!(" ╔{border}╗\n ║ {message}{padding}║\n ╚{border}╝\n{BEAR}")
}

/// Joins command-line words into a message, falling back to
/// [`DEFAULT_MESSAGE`].
#[must_use]
pub fn message_from_args<S: AsRef<str>>(args: &[S]) -> String {
    if args.is_empty() {
        return DEFAULT_MESSAGE.to_string();
    }
    args.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ")
}
