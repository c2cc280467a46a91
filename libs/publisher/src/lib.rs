//! # Galleria Publisher
//!
//! Publish orchestration for identifier-keyed page fragments.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ publisher: publish lifecycle                │
//! │  - checking → creating/overwriting          │
//! │  - excise old fragment, insert new one      │
//! │  - commit each mutated document             │
//! └─────────────────────────────────────────────┘
//!          ↓                        ↓
//! ┌──────────────────┐   ┌──────────────────────┐
//! │ splice: locate + │   │ store: fetch/commit  │
//! │ excise + insert  │   │ with version tokens  │
//! └──────────────────┘   └──────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **At most one fragment per identifier**: overwriting always excises
//!    the old fragment (in memory) before inserting the new one.
//! 2. **Nothing external changes before commit**: splicing is pure; an
//!    abort before the commit phase is a guaranteed no-op.
//! 3. **Conflicts surface, never merge**: a version-token mismatch is a
//!    terminal failure, never a silent retry with stale content.
//! 4. **Partial failure is reported as such**: if one document commits
//!    and a sibling does not, the outcome says exactly that.

mod events;
mod layout;
mod publish;
mod records;
mod render;
mod store;

pub use events::{EventLog, LoggedEvent, PublishEvent};
pub use layout::{DocumentTarget, SiteLayout};
pub use publish::{PublishOutcome, PublishRequest, PublishState, Publisher};
pub use records::{upsert_record, RecordError};
pub use render::FragmentRenderer;
pub use store::{ContentStore, FsStore, MemoryStore, StoreError, VersionToken};

// Re-export the splice data model for convenience
pub use galleria_splice::{Fragment, FragmentShape, Identifier, InsertionPoint, KindConfig, Span};
