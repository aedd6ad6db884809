//! Markup sanitization for user-supplied text.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Cleaner that allows no tags at all; text content survives, and
/// `script`/`style` elements are dropped together with their content.
static PLAIN_TEXT: LazyLock<ammonia::Builder<'static>> = LazyLock::new(|| {
    let mut builder = ammonia::Builder::empty();
    builder
        .clean_content_tags(HashSet::from(["script", "style"]))
        .strip_comments(true);
    builder
});

/// Strip markup from a free-text field before it is persisted.
///
/// The result is plain text, not HTML: entities in the cleaner's output are
/// decoded, so `&` is stored as `&`. Templates escape it on render.
#[must_use]
pub fn sanitize(input: &str) -> String {
    let cleaned = PLAIN_TEXT.clean(input).to_string();
    html_escape::decode_html_entities(&cleaned).into_owned()
}
