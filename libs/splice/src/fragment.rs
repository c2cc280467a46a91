//! Fragment data model
//!
//! A fragment is a self-contained, identifier-keyed region of a page:
//! one rendered item card, one gallery slot. The markup carries the
//! identifier only *inside* the fragment (the anchor), never on the
//! opening or closing tags, so a fragment's span has to be recovered by
//! the locator rather than read off the markup.

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, document-unique key for a fragment, stored in its rendered
/// decimal-string form (e.g. a zero-padded page number like `047`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Zero-padded decimal form, the way page numbers appear in markup:
    /// `Identifier::padded(47, 3)` renders as `047`.
    pub fn padded(n: u64, width: usize) -> Self {
        Self(format!("{n:0width$}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-kind policy for resolving where a fragment ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FragmentShape {
    /// The fragment is exactly one balanced open/close pair, found by
    /// depth counting over a bounded token vocabulary. The vocabulary may
    /// be broader than the fragment's own opening token (e.g. counting
    /// `<div ` / `</div>` for a fragment that opens with
    /// `<div class="gallery-slot"`); the opening token must start with
    /// the open side of the vocabulary.
    FixedDepth {
        open_token: String,
        close_token: String,
    },

    /// The fragment ends where the next same-kind sibling begins, or at
    /// an enclosing terminator token (e.g. `</section>`) when it is the
    /// last sibling, or at end-of-document when neither exists.
    SiblingDelimited { terminator: Option<String> },
}

/// Where a freshly rendered fragment is spliced into a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertionPoint {
    /// Insert as the container's first child, so the newest item renders
    /// first.
    ContainerStart { container_token: String },

    /// Insert immediately after the last extant sibling. Falls back to
    /// the start of the container when no sibling exists yet.
    AfterLastSibling { container_token: String },
}

/// Static description of one fragment kind: how its instances open, how
/// they are anchored to an identifier, how they end, and where new ones
/// are inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindConfig {
    /// Kind name, e.g. `card` or `slot`.
    pub name: String,

    /// Literal prefix beginning every fragment of this kind, e.g.
    /// `<div class="nft-card">`.
    pub opening_token: String,

    /// Template yielding a substring that occurs only inside the
    /// identifier's fragment; `{id}` is replaced with the identifier,
    /// e.g. `<div class="nft-id">#{id}</div>`.
    pub anchor_pattern: String,

    pub shape: FragmentShape,

    pub insertion: InsertionPoint,
}

impl KindConfig {
    /// Instantiate the anchor pattern for an identifier.
    pub fn anchor_for(&self, id: &Identifier) -> String {
        self.anchor_pattern.replace("{id}", id.as_str())
    }
}

/// A discovered fragment: a read-only view into one document.
///
/// Any splice at or before `span.start` invalidates the offsets; spans
/// must be re-located before reuse against a new document value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub kind: String,
    pub identifier: Identifier,
    pub span: Span,
}
