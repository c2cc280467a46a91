//! # Galleria Splice
//!
//! In-memory primitives for locating and splicing identifier-keyed
//! fragments inside a published page.
//!
//! A page is a large semi-structured document containing many repeated
//! templated fragments (an item card, a gallery slot), each tagged with a
//! unique identifier somewhere *inside* the fragment but never on its
//! closing markup. This crate finds a fragment's exact `[start, end)` span
//! from that interior anchor and produces new document values with the
//! span removed or new text inserted.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ locator: anchor → fragment span             │
//! │  - backward walk to the opening token       │
//! │  - shape-driven end resolution              │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ scanner: depth-counting close finder        │
//! └─────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────┐
//! │ splicer: excise / insert_after              │
//! │  (pure, byte-preserving outside the span)   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Everything here is pure, synchronous computation over `&str`; no I/O,
//! no logging. The publisher crate threads document values through these
//! functions and talks to the backing store.

mod error;
mod fragment;
mod locator;
mod scanner;
mod span;
mod splicer;

pub use error::SpliceError;
pub use fragment::{Fragment, FragmentShape, Identifier, InsertionPoint, KindConfig};
pub use locator::{insertion_offset, locate, Located};
pub use scanner::find_matching_close;
pub use span::Span;
pub use splicer::{excise, insert_after};
