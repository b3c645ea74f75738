//! Compass record store
//!
//! In-memory persistence for the counseling domain with the one guarantee the
//! business rules need: multi-record writes are atomic. See
//! [`MemoryStore::transaction`].
//!
//! # Example
//!
//! ```rust,ignore
//! use compass_store::MemoryStore;
//!
//! let store = MemoryStore::new();
//! store.transaction(|inner| {
//!     inner.insert_meeting(meeting)?;
//!     inner.insert_agenda_item(item)
//! })?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::{MemoryStore, StoreInner};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
