//! MongoDB administration layer for flangio
//!
//! # Layers
//! - [`store::DocumentStore`]: one call per store operation, with a MongoDB
//!   implementation ([`MongoStore`]) and an in-process one ([`MemoryStore`])
//! - [`gate`]: the JSON validation gate for raw request payloads
//! - [`admin::Admin`]: the operations the console exposes, each returning an
//!   [`Envelope`](flangio_common::Envelope)

pub mod admin;
pub mod connection;
pub mod document;
pub mod gate;
pub mod identity;
pub mod index;
pub mod memory;
pub mod mongo;
pub mod query;
pub mod store;

pub use admin::Admin;
pub use connection::{Connection, Namespace, PoolConfig, StoreConfig};
pub use flangio_common::{Envelope, FlangioError, Result};
pub use gate::{parse_object, Payload};
pub use index::{IndexDirection, IndexSpec};
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use query::FindQuery;
pub use store::{DatabaseInfo, DocumentStore, INDEX_METADATA_COLLECTION, RESERVED_DATABASE};
