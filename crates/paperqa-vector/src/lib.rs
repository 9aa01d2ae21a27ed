//! paperqa-vector
//!
//! LanceDB-backed chunk store: schema, table helpers, the embedding writer,
//! load-or-build bootstrap and the vector retriever.

pub mod bootstrap;
pub mod schema;
pub mod search;
pub mod table;
pub mod writer;

pub use bootstrap::{bootstrap, is_populated, remove_index};
pub use search::{LanceVectorStore, VectorRetriever};
pub use writer::LanceDbIndexer;
