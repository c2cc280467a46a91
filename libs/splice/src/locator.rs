//! Fragment locator
//!
//! Recovers a fragment's exact `[start, end)` span from the one thing
//! the markup carries: an anchor substring unique to the identifier,
//! somewhere inside the fragment. The start is found by walking backward
//! from the anchor to the nearest opening token; the end is resolved by
//! the kind's shape policy.

use crate::error::SpliceError;
use crate::fragment::{Fragment, FragmentShape, Identifier, InsertionPoint, KindConfig};
use crate::scanner::find_matching_close;
use crate::span::Span;

/// Outcome of a locate call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    /// The identifier's fragment and its resolved span.
    Found(Fragment),

    /// The identifier has not been published into this document.
    Absent,

    /// The anchor exists but no opening token precedes it. The document
    /// is inconsistent; callers should log it and proceed as if the
    /// fragment were absent rather than risk corrupting the document.
    OrphanedAnchor { anchor_pos: usize },
}

/// Locate the fragment carrying `id` in `doc`.
///
/// Returns an error only when the fragment demonstrably starts but
/// cannot be closed under its shape policy; mutating such a document
/// would corrupt it.
pub fn locate(doc: &str, kind: &KindConfig, id: &Identifier) -> Result<Located, SpliceError> {
    let anchor = kind.anchor_for(id);

    let anchor_pos = match doc.find(&anchor) {
        Some(pos) => pos,
        // The common "never published" case.
        None => return Ok(Located::Absent),
    };

    // Nearest opening token preceding the anchor is the fragment start.
    let start = match doc[..anchor_pos].rfind(&kind.opening_token) {
        Some(pos) => pos,
        None => return Ok(Located::OrphanedAnchor { anchor_pos }),
    };

    let end = resolve_end(doc, kind, id.as_str(), start)?;

    Ok(Located::Found(Fragment {
        kind: kind.name.clone(),
        identifier: id.clone(),
        span: Span::new(start, end),
    }))
}

/// Resolve where the fragment opening at `start` ends, per the kind's
/// shape policy.
fn resolve_end(
    doc: &str,
    kind: &KindConfig,
    id: &str,
    start: usize,
) -> Result<usize, SpliceError> {
    match &kind.shape {
        FragmentShape::FixedDepth {
            open_token,
            close_token,
        } => find_matching_close(doc, start, open_token, close_token).ok_or_else(|| {
            SpliceError::UnclosedFragment {
                kind: kind.name.clone(),
                identifier: id.to_string(),
                start,
            }
        }),

        FragmentShape::SiblingDelimited { terminator } => {
            // Scan strictly after this fragment's own opening token so a
            // fragment never matches itself.
            let scan_from = start + kind.opening_token.len();
            let rest = &doc[scan_from..];

            let next_sibling = rest.find(&kind.opening_token);
            let terminator_pos = terminator.as_deref().and_then(|t| rest.find(t));

            // Whichever boundary occurs first in the forward scan wins;
            // the next sibling is the earlier match whenever both exist
            // in the same section.
            let end = match (next_sibling, terminator_pos) {
                (Some(s), Some(t)) => s.min(t),
                (Some(s), None) => s,
                (None, Some(t)) => t,
                (None, None) => rest.len(),
            };

            Ok(scan_from + end)
        }
    }
}

/// Resolve the offset at which a freshly rendered fragment of `kind`
/// should be inserted into `doc`.
pub fn insertion_offset(doc: &str, kind: &KindConfig) -> Result<usize, SpliceError> {
    let container_start = |token: &str| -> Result<usize, SpliceError> {
        doc.find(token)
            .map(|pos| pos + token.len())
            .ok_or_else(|| SpliceError::InsertionPointNotFound {
                kind: kind.name.clone(),
                token: token.to_string(),
            })
    };

    match &kind.insertion {
        InsertionPoint::ContainerStart { container_token } => container_start(container_token),

        InsertionPoint::AfterLastSibling { container_token } => {
            match doc.rfind(&kind.opening_token) {
                Some(last) => resolve_end(doc, kind, "?", last),
                // Empty container: first fragment of its kind.
                None => container_start(container_token),
            }
        }
    }
}
