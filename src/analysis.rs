//! Text normalization: the stages that turn headwords and queries into index keys.

pub mod accent;
pub mod converter;
pub mod normalizer;
pub mod stemmer;

pub use converter::{ScriptConverter, TableConverter};
pub use normalizer::Normalizer;
pub use stemmer::{NoopStemmer, SnowballStemmer, Stemmer, SuffixStemmer};
