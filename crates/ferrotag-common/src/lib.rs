//! Shared types used across the ferrotag crates.

pub mod entities;
pub mod normalize;
pub mod span;

// Re-export commonly used types
pub use entities::{Entity, EntityKind};
pub use normalize::{normalize_char, normalize_chars, normalize_term, strip_diacritics};
pub use span::Span;
