//! `Path`: an ordered sequence of label strings with a canonical textual
//! form.
//!
//! A `Path` is the leaf value a `NameTree` normally carries, and the value
//! `Prefix::matches` compares against.

use std::fmt;

use crate::error::Result;
use crate::nametree::{LeafShow, NameTree};
use crate::parser::Parser;

/// The set of characters that may appear unescaped inside a label.
pub(crate) const SHOWABLE: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_:.#$%-";

pub(crate) fn is_showable(c: char) -> bool {
    SHOWABLE.contains(c)
}

/// An ordered sequence of UTF-8 label strings.
///
/// Two paths are equal iff their canonical textual forms (`show`) are
/// equal. The empty path's canonical form is the empty string; every other
/// path's canonical form is `"/" + labels.join("/")`.
#[derive(Clone, Debug, Default, Eq, PartialOrd, Ord, Hash)]
pub struct Path {
    labels: Vec<String>,
}

impl Path {
    /// The canonical empty path.
    pub fn empty() -> Self {
        Path { labels: Vec::new() }
    }

    /// Builds a path directly from labels, without going through the
    /// parser. Does not validate that `labels` only contain showable
    /// characters -- callers constructing paths programmatically are
    /// trusted, the same way `dtab/path.py`'s `Path(*elems)` is.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Path {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses `s` as a path. The empty string is a parse error -- a lone
    /// `/` is required to denote the empty path.
    pub fn read(s: &str) -> Result<Self> {
        Parser::parse_all_path(s)
    }

    /// The path's labels, in order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Appends another path's labels, in place.
    pub fn append_path(&mut self, other: &Path) {
        self.labels.extend(other.labels.iter().cloned());
    }

    /// Appends a single raw label, in place.
    pub fn append_label<S: Into<String>>(&mut self, label: S) {
        self.labels.push(label.into());
    }

    /// Appends a run of raw labels taken from a prefix suffix, in place.
    pub fn append_labels<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.extend(labels.into_iter().map(Into::into));
    }

    /// Appends the value wrapped by a `NameTree::Leaf(Path)`, unwrapping
    /// it first. A direct translation of `dtab/path.py`'s `Path.append`,
    /// which special-cases `Leaf` values for convenience; not exercised by
    /// the grammar or the lookup engine, kept for API parity.
    pub fn append_leaf(&mut self, leaf: NameTree<Path>) {
        if let NameTree::Leaf(p) = leaf {
            self.append_path(&p);
        }
    }

    /// True iff `self`'s canonical form starts with `other`'s.
    pub fn startswith(&self, other: &Path) -> bool {
        self.show().starts_with(&other.show())
    }

    /// The canonical textual form: `"/" + labels.join("/")`, or the empty
    /// string for the empty path.
    pub fn show(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            let mut s = String::new();
            for label in &self.labels {
                s.push('/');
                s.push_str(label);
            }
            s
        }
    }

    /// Element-wise concatenation of two paths.
    pub fn concat(&self, other: &Path) -> Path {
        let mut labels = self.labels.clone();
        labels.extend(other.labels.iter().cloned());
        Path { labels }
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.show() == other.show()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.show())
    }
}

impl LeafShow for Path {
    fn leaf_show(&self) -> String {
        format!("Path({})", self.show())
    }
}

impl<'a> From<&'a str> for Path {
    /// Builds a single-label path whose one label is the entire input
    /// string, verbatim -- a leading `/` is taken as a literal character of
    /// the label, not a separator, so `Path::from("/foo").show()` is
    /// `"//foo"`, not `"/foo"`. Use `Path::read` to parse grammar text.
    fn from(label: &'a str) -> Self {
        Path {
            labels: vec![label.to_string()],
        }
    }
}

impl ::std::ops::Add for Path {
    type Output = Path;
    fn add(self, rhs: Path) -> Path {
        self.concat(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_show_is_empty_string() {
        assert_eq!("", Path::empty().show());
    }

    #[test]
    fn canonical_form() {
        let p = Path::from_labels(vec!["a", "b", "c"]);
        assert_eq!("/a/b/c", p.show());
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(Path::from_labels(vec!["a"]), Path::from_labels(vec!["a"]));
        assert_ne!(Path::from_labels(vec!["a"]), Path::from_labels(vec!["b"]));
    }

    #[test]
    fn startswith() {
        let p = Path::from_labels(vec!["a", "b", "c"]);
        let prefix = Path::from_labels(vec!["a", "b"]);
        assert!(p.startswith(&prefix));
        assert!(!prefix.startswith(&p));
    }

    #[test]
    fn concat() {
        let a = Path::from_labels(vec!["a"]);
        let b = Path::from_labels(vec!["b", "c"]);
        assert_eq!(Path::from_labels(vec!["a", "b", "c"]), a.concat(&b));
    }

    #[test]
    fn read_empty_string_is_an_error() {
        assert!(Path::read("").is_err());
    }

    #[test]
    fn read_lone_slash_is_empty_path() {
        assert_eq!(Path::empty(), Path::read("/").unwrap());
    }

    use proptest::prelude::*;

    fn label_strategy() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_]{1,8}"
    }

    proptest! {
        #[test]
        fn show_roundtrips_through_read(labels in prop::collection::vec(label_strategy(), 1..6)) {
            let path = Path::from_labels(labels);
            let parsed = Path::read(&path.show()).unwrap();
            prop_assert_eq!(path, parsed);
        }

        #[test]
        fn concat_preserves_total_label_count(
            a in prop::collection::vec(label_strategy(), 0..4),
            b in prop::collection::vec(label_strategy(), 0..4),
        ) {
            let expected = a.len() + b.len();
            let concatenated = Path::from_labels(a).concat(&Path::from_labels(b));
            prop_assert_eq!(expected, concatenated.size());
        }
    }
}
