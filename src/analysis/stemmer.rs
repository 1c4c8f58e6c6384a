//! Morphological stemming used to expand queries.

use std::fmt;
use std::fmt::Debug;

use rust_stemmers::Algorithm;

use crate::config::{StemmerAlgorithm, StemmerConfig};
use crate::error::{LexidxError, Result};

/// Produces candidate base forms for a query.
///
/// An empty candidate list means "no opinion"; the caller then falls back
/// to the trimmed input.
pub trait Stemmer: Send + Sync + Debug {
    fn stem(&self, text: &str) -> Result<Vec<String>>;
}

/// Never proposes candidates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStemmer;

impl Stemmer for NoopStemmer {
    fn stem(&self, _text: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// English inflection rules.
///
/// Candidates are the input itself followed by the base forms obtained by
/// undoing plural, past tense, progressive and comparative endings. Only
/// single words are stemmed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SuffixStemmer;

impl SuffixStemmer {
    const MIN_STEM: usize = 2;

    fn push(candidates: &mut Vec<String>, stem: &str, tail: &str) {
        if stem.chars().count() < Self::MIN_STEM {
            return;
        }
        let candidate = format!("{}{}", stem, tail);
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }

    /// `stopp` -> `stop`
    fn undouble(stem: &str) -> Option<&str> {
        let bytes = stem.as_bytes();
        let n = bytes.len();
        if n >= 3
            && bytes[n - 1] == bytes[n - 2]
            && bytes[n - 1].is_ascii_alphabetic()
            && !matches!(bytes[n - 1], b'a' | b'e' | b'i' | b'o' | b'u' | b'l' | b's' | b'z')
        {
            Some(&stem[..n - 1])
        } else {
            None
        }
    }
}

impl Stemmer for SuffixStemmer {
    fn stem(&self, text: &str) -> Result<Vec<String>> {
        let word = text.trim();
        if word.is_empty() || word.contains(char::is_whitespace) {
            return Ok(Vec::new());
        }

        let mut out = vec![word.to_string()];
        let c = &mut out;

        if let Some(s) = word.strip_suffix("ies") {
            Self::push(c, s, "y");
        } else if let Some(s) = word.strip_suffix("ves") {
            Self::push(c, s, "f");
            Self::push(c, s, "fe");
        } else if let Some(s) = word.strip_suffix("es") {
            if s.ends_with(['s', 'x', 'z', 'o']) || s.ends_with("ch") || s.ends_with("sh") {
                Self::push(c, s, "");
            }
            Self::push(c, s, "e");
        } else if let Some(s) = word.strip_suffix('s') {
            if !s.ends_with(['s', 'u', 'i']) {
                Self::push(c, s, "");
            }
        }

        if let Some(s) = word.strip_suffix("ied") {
            Self::push(c, s, "y");
        } else if let Some(s) = word.strip_suffix("ed") {
            if let Some(u) = Self::undouble(s) {
                Self::push(c, u, "");
            }
            Self::push(c, s, "");
            Self::push(c, s, "e");
        }

        if let Some(s) = word.strip_suffix("ing") {
            if let Some(u) = Self::undouble(s) {
                Self::push(c, u, "");
            }
            Self::push(c, s, "");
            Self::push(c, s, "e");
        }

        if let Some(s) = word.strip_suffix("iest") {
            Self::push(c, s, "y");
        } else if let Some(s) = word.strip_suffix("ier") {
            Self::push(c, s, "y");
        } else if let Some(s) = word.strip_suffix("est") {
            if let Some(u) = Self::undouble(s) {
                Self::push(c, u, "");
            }
            Self::push(c, s, "");
        } else if let Some(s) = word.strip_suffix("er") {
            if let Some(u) = Self::undouble(s) {
                Self::push(c, u, "");
            }
            Self::push(c, s, "");
        }

        Ok(out)
    }
}

/// Snowball stemmer from `rust-stemmers`.
///
/// Yields the input and, when it differs, its lower-cased Snowball stem.
pub struct SnowballStemmer {
    language: String,
    inner: rust_stemmers::Stemmer,
}

impl SnowballStemmer {
    pub fn new(language: &str) -> Result<Self> {
        let algorithm = algorithm_for(language).ok_or_else(|| {
            LexidxError::normalization_stage(format!("no snowball stemmer for '{}'", language))
        })?;
        Ok(Self {
            language: language.to_ascii_lowercase(),
            inner: rust_stemmers::Stemmer::create(algorithm),
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl Debug for SnowballStemmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowballStemmer")
            .field("language", &self.language)
            .finish()
    }
}

impl Stemmer for SnowballStemmer {
    fn stem(&self, text: &str) -> Result<Vec<String>> {
        let word = text.trim();
        if word.is_empty() || word.contains(char::is_whitespace) {
            return Ok(Vec::new());
        }
        let lowered = word.to_lowercase();
        let stemmed = self.inner.stem(&lowered);
        let mut out = vec![word.to_string()];
        if stemmed != word {
            out.push(stemmed.into_owned());
        }
        Ok(out)
    }
}

fn algorithm_for(language: &str) -> Option<Algorithm> {
    let algorithm = match language.to_ascii_lowercase().as_str() {
        "arabic" => Algorithm::Arabic,
        "danish" => Algorithm::Danish,
        "dutch" => Algorithm::Dutch,
        "english" => Algorithm::English,
        "finnish" => Algorithm::Finnish,
        "french" => Algorithm::French,
        "german" => Algorithm::German,
        "greek" => Algorithm::Greek,
        "hungarian" => Algorithm::Hungarian,
        "italian" => Algorithm::Italian,
        "norwegian" => Algorithm::Norwegian,
        "portuguese" => Algorithm::Portuguese,
        "romanian" => Algorithm::Romanian,
        "russian" => Algorithm::Russian,
        "spanish" => Algorithm::Spanish,
        "swedish" => Algorithm::Swedish,
        "tamil" => Algorithm::Tamil,
        "turkish" => Algorithm::Turkish,
        _ => return None,
    };
    Some(algorithm)
}

/// Instantiate the stemmer described by `config`.
pub fn build_stemmer(config: &StemmerConfig) -> Result<Box<dyn Stemmer>> {
    match config.algorithm {
        StemmerAlgorithm::Suffix => Ok(Box::new(SuffixStemmer)),
        StemmerAlgorithm::Snowball => Ok(Box::new(SnowballStemmer::new(&config.language)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stems(word: &str) -> Vec<String> {
        SuffixStemmer.stem(word).unwrap()
    }

    #[test]
    fn test_suffix_plurals() {
        assert_eq!(stems("apples"), vec!["apples", "apple"]);
        assert_eq!(stems("berries"), vec!["berries", "berry"]);
        assert_eq!(stems("boxes"), vec!["boxes", "box", "boxe"]);
        assert!(stems("leaves").contains(&"leaf".to_string()));
        assert_eq!(stems("glass"), vec!["glass"]);
    }

    #[test]
    fn test_suffix_verbs() {
        assert!(stems("stopped").contains(&"stop".to_string()));
        assert!(stems("running").contains(&"run".to_string()));
        assert!(stems("making").contains(&"make".to_string()));
        assert!(stems("carried").contains(&"carry".to_string()));
        assert!(stems("walked").contains(&"walk".to_string()));
    }

    #[test]
    fn test_suffix_keeps_input_first() {
        assert_eq!(stems("apple")[0], "apple");
        assert_eq!(stems("xyz123"), vec!["xyz123"]);
    }

    #[test]
    fn test_phrases_are_not_stemmed() {
        assert!(stems("ice creams").is_empty());
        assert!(stems("   ").is_empty());
    }

    #[test]
    fn test_snowball() {
        let stemmer = SnowballStemmer::new("English").unwrap();
        assert_eq!(stemmer.language(), "english");
        assert_eq!(stemmer.stem("running").unwrap(), vec!["running", "run"]);
        assert_eq!(stemmer.stem("run").unwrap(), vec!["run"]);
    }

    #[test]
    fn test_unknown_snowball_language() {
        let err = SnowballStemmer::new("klingon").unwrap_err();
        assert!(matches!(err, LexidxError::NormalizationStage(_)));
    }

    #[test]
    fn test_build_stemmer_from_config() {
        let stemmer = build_stemmer(&StemmerConfig::default()).unwrap();
        assert_eq!(stemmer.stem("cats").unwrap(), vec!["cats", "cat"]);
    }
}
