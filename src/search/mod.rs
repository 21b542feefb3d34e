//! Knowledge-base retrieval
//!
//! Documents are chunked and held in an inverted index; the assistant asks
//! it for context through the `Retriever` trait.

mod index;

pub use index::{Chunk, DocumentIndex, IndexStats, CHUNK_OVERLAP, CHUNK_SIZE, DEFAULT_TOP_K};
