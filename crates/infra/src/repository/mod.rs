//! Item repository boundary.
//!
//! An opaque key-value document collection keyed by item name. The
//! reconciliation engine only ever talks to it through [`ItemRepository`].

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryItemRepository;
pub use postgres::PostgresItemRepository;
pub use r#trait::{ItemRepository, RepositoryError};
