//! # Pagesmith Model
//!
//! The in-memory page document: a root [`Layout`] whose ordered children are
//! ids into a flat table of [`ComponentInstance`]s. Nestable instances carry
//! their own ordered `children`, so the whole page forms a single tree.
//!
//! ```text
//! Page
//!  ├─ layout (root)  children: [a, b]
//!  └─ components: { a, b { children: [c] }, c }
//! ```
//!
//! Everything here is plain data plus lookups. Mutation rules (validation,
//! history, events) live in `pagesmith-editor`.

pub mod component;
pub mod page;
pub mod style;
pub mod tree;

pub use component::*;
pub use page::*;
pub use style::*;
pub use tree::{IntegrityError, ParentRef};

/// Free-form prop bag, keyed by prop name
pub type Props = serde_json::Map<String, serde_json::Value>;
