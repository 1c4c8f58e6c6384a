//! The lexical index: a trie from normalized headwords to entry references,
//! its persisted format and the builder that fills it.

pub mod builder;
pub mod codec;
pub mod entry;
pub mod index;

pub use builder::{BuildStats, IndexBuilder};
pub use codec::{FORMAT_VERSION, INDEX_MAGIC, IndexHeader};
pub use entry::EntryRef;
pub use index::{IndexStats, LexicalIndex};
