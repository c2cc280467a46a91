//! Render collaborator
//!
//! Fragment markup is produced by the caller; the orchestrator never
//! inspects the fields it passes through.

use galleria_splice::Identifier;
use serde_json::Value;

/// Renders the inner text of a fragment. Must be pure: the same inputs
/// always yield the same markup, which is what makes republishing
/// idempotent.
pub trait FragmentRenderer: Send + Sync {
    fn render_fragment(&self, kind: &str, id: &Identifier, fields: &Value) -> String;
}

impl<F> FragmentRenderer for F
where
    F: Fn(&str, &Identifier, &Value) -> String + Send + Sync,
{
    fn render_fragment(&self, kind: &str, id: &Identifier, fields: &Value) -> String {
        self(kind, id, fields)
    }
}
