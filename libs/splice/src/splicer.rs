//! Block splicer
//!
//! Pure document surgery: remove a resolved span, or insert text at an
//! offset. Everything outside the span/offset is preserved byte-for-byte.
//! No re-validation of the surrounding markup is attempted; boundary
//! correctness is the locator's job.

use crate::span::Span;

/// Return a new document with `span` removed.
pub fn excise(doc: &str, span: Span) -> String {
    debug_assert!(span.end <= doc.len());

    let mut out = String::with_capacity(doc.len() - span.len());
    out.push_str(&doc[..span.start]);
    out.push_str(&doc[span.end..]);
    out
}

/// Return a new document with `text` inserted at `offset`.
pub fn insert_after(doc: &str, offset: usize, text: &str) -> String {
    debug_assert!(offset <= doc.len());

    let mut out = String::with_capacity(doc.len() + text.len());
    out.push_str(&doc[..offset]);
    out.push_str(text);
    out.push_str(&doc[offset..]);
    out
}
