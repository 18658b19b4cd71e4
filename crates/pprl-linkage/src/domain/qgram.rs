//! Q-gram sets
//!
//! A q-gram set is the fuzzy fingerprint of a record's sensitive attributes:
//! every contiguous substring of length q, with duplicates removed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::LinkageError;

/// Default q-gram length
pub const DEFAULT_Q: usize = 2;

/// Immutable set of q-grams
///
/// Backed by an ordered set so iteration (and therefore logging) is stable.
/// Encoding does not depend on iteration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QGramSet {
    grams: BTreeSet<String>,
}

impl QGramSet {
    /// Derive q-grams from raw attribute values
    ///
    /// Each value is lowercased and stripped of whitespace before slicing.
    /// A value shorter than `q` characters is a missing value and rejected.
    pub fn from_attribute_values<I, S>(values: I, q: usize) -> Result<Self, LinkageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if q == 0 {
            return Err(LinkageError::InvalidParameter(
                "q-gram length must be > 0".to_string(),
            ));
        }

        let mut grams = BTreeSet::new();
        for value in values {
            let chars: Vec<char> = value
                .as_ref()
                .to_lowercase()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            if chars.len() < q {
                return Err(LinkageError::InvalidParameter(format!(
                    "attribute value {:?} is shorter than q={}",
                    value.as_ref(),
                    q
                )));
            }
            for window in chars.windows(q) {
                grams.insert(window.iter().collect());
            }
        }
        Ok(Self { grams })
    }

    /// Number of distinct q-grams
    pub fn len(&self) -> usize {
        self.grams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grams.is_empty()
    }

    pub fn contains(&self, gram: &str) -> bool {
        self.grams.contains(gram)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.grams.iter().map(String::as_str)
    }

    /// Number of q-grams shared with `other`
    pub fn common_count(&self, other: &QGramSet) -> usize {
        self.grams.intersection(&other.grams).count()
    }
}

impl<S: Into<String>> FromIterator<S> for QGramSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            grams: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl std::fmt::Display for QGramSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.grams.is_empty() {
            return write!(f, "set()");
        }
        write!(f, "{{")?;
        for (i, gram) in self.grams.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'")?;
            for c in gram.chars() {
                match c {
                    '\\' => write!(f, "\\\\")?,
                    '\'' => write!(f, "\\'")?,
                    '\n' => write!(f, "\\n")?,
                    '\t' => write!(f, "\\t")?,
                    c => write!(f, "{}", c)?,
                }
            }
            write!(f, "'")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_attribute_values_unions_grams() {
        let qs = QGramSet::from_attribute_values(["Hello", "lo w"], 2).unwrap();
        let expected: QGramSet = ["he", "el", "ll", "lo", "ow"].into_iter().collect();
        assert_eq!(qs, expected, "whitespace removed and duplicates collapsed");
    }

    #[test]
    fn test_short_value_is_missing() {
        let result = QGramSet::from_attribute_values(["smith", "a"], 2);
        assert!(matches!(result, Err(LinkageError::InvalidParameter(_))));
    }

    #[test]
    fn test_duplicates_collapse() {
        let qs: QGramSet = ["ab", "ab", "cd"].into_iter().collect();
        assert_eq!(qs.len(), 2);
    }

    #[test]
    fn test_common_count() {
        let a: QGramSet = ["ab", "bc", "cd"].into_iter().collect();
        let b: QGramSet = ["bc", "cd", "de"].into_iter().collect();
        assert_eq!(a.common_count(&b), 2);
    }

    #[test]
    fn test_display_is_set_literal() {
        let qs: QGramSet = ["ab", "cd"].into_iter().collect();
        assert_eq!(qs.to_string(), "{'ab', 'cd'}");
        assert_eq!(QGramSet::default().to_string(), "set()");

        let quoted: QGramSet = ["a'", "\\n"].into_iter().collect();
        assert_eq!(quoted.to_string(), r"{'\\n', 'a\''}");
    }
}
