//! Editor text parsing.
//!
//! The todo editor presents subject and content as one editable block. The
//! contract holds in both directions: the first line is the subject,
//! everything after the first newline is the content, and both sides are
//! stored trimmed.

use crate::entity::Todo;

/// Splits an editable text block into `(subject, content)`.
///
/// The first line (trimmed) becomes the subject. The remaining lines keep
/// their internal line breaks and are trimmed as a whole to become the
/// content. A block without a newline yields an empty content.
///
/// # Example
///
/// ```
/// use todoflow_core::text::parse_editor_text;
///
/// let (subject, content) = parse_editor_text("Buy milk\n2 liters\nwhole fat\n");
/// assert_eq!(subject, "Buy milk");
/// assert_eq!(content, "2 liters\nwhole fat");
/// ```
#[must_use]
pub fn parse_editor_text(text: &str) -> (String, String) {
    match text.split_once('\n') {
        Some((first, rest)) => (first.trim().to_owned(), rest.trim().to_owned()),
        None => (text.trim().to_owned(), String::new()),
    }
}

/// Renders a todo back into a single editable block.
///
/// The inverse of [`parse_editor_text`], used to seed the modify dialog: the
/// subject alone when the content is empty, otherwise subject and content
/// joined by a newline.
#[must_use]
pub fn editor_text(todo: &Todo) -> String {
    if todo.content.is_empty() {
        todo.subject.clone()
    } else {
        format!("{}\n{}", todo.subject, todo.content)
    }
}
