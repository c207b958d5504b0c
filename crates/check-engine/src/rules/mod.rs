pub mod blog_outline;
pub mod messaging;
pub mod referential;
pub mod script;

/// Minimum trimmed length for any free-text field that is checked.
pub const MIN_TEXT_CHARS: usize = 10;

/// Character count of the trimmed text.
pub(crate) fn trimmed_len(text: &str) -> usize {
    text.trim().chars().count()
}
