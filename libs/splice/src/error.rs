//! Error types for fragment location and splicing

use thiserror::Error;

/// Errors from resolving fragment boundaries or insertion points.
///
/// "Fragment not found" is never an error; an unpublished identifier is
/// the common case and the locator reports it as a normal outcome. These
/// errors mean a document is malformed in a way that makes mutating it
/// unsafe: a fragment that started but cannot be closed under its shape
/// policy, or a configured insertion container that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpliceError {
    #[error("fragment {kind} #{identifier} opens at offset {start} but has no matching close")]
    UnclosedFragment {
        kind: String,
        identifier: String,
        start: usize,
    },

    #[error("insertion container {token:?} for kind {kind} not found in document")]
    InsertionPointNotFound { kind: String, token: String },
}
