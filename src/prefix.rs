//! `Prefix`: an ordered sequence of `Elem`s matched position-wise against a
//! `Path`, used as the left-hand side of a `Dentry`.

use crate::error::Result;
use crate::parser::Parser;
use crate::path::Path;

/// One element of a `Prefix`: either a literal label or the `*` wildcard,
/// which matches any single label.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Elem {
    /// A literal label. Always non-empty.
    Label(String),
    /// The `*` wildcard, matching any one label.
    Any,
}

impl Elem {
    /// True iff this element matches `label` at a given path position.
    fn matches(&self, label: &str) -> bool {
        match self {
            Elem::Any => true,
            Elem::Label(s) => s == label,
        }
    }

    /// The diagnostic debug form used by `Prefix::show`: `Label(foo)` or
    /// `AnyElem`, matching `dtab/dtab.py`'s `Label.__str__`/`AnyElem.__str__`.
    fn debug_show(&self) -> String {
        match self {
            Elem::Label(s) => format!("Label({})", s),
            Elem::Any => "AnyElem".to_string(),
        }
    }
}

/// An ordered sequence of `Elem`s.
///
/// `matches(path)` holds iff `self.size() <= path.size()` and each element
/// matches the path label at the same position; the empty prefix matches
/// every path.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Prefix {
    elems: Vec<Elem>,
}

impl Prefix {
    /// The empty prefix, which matches every path.
    pub fn empty() -> Self {
        Prefix { elems: Vec::new() }
    }

    pub fn new(elems: Vec<Elem>) -> Self {
        Prefix { elems }
    }

    /// Parses `s` as a dentry prefix. The empty string parses to
    /// `Prefix::empty()`, with no error.
    pub fn read(s: &str) -> Result<Self> {
        Parser::parse_all_dentry_prefix(s)
    }

    pub fn elems(&self) -> &[Elem] {
        &self.elems
    }

    pub fn size(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn matches(&self, path: &Path) -> bool {
        if self.size() > path.size() {
            return false;
        }
        self.elems
            .iter()
            .zip(path.labels())
            .all(|(elem, label)| elem.matches(label))
    }

    /// Comma-separated debug form of the elements, used only for the
    /// diagnostic `Dentry::show` -- not the prefix grammar's own syntax,
    /// and not round-trippable through `Prefix::read`. See
    /// `dtab/dtab.py`'s `Prefix.show`.
    pub fn show(&self) -> String {
        self.elems
            .iter()
            .map(Elem::debug_show)
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(feature = "serialize")]
mod serialize {
    use super::Prefix;
    use serde::ser::Serializer;

    pub fn serialize<S>(prefix: &Prefix, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&prefix.show())
    }
}

#[cfg(feature = "serialize")]
pub use self::serialize::serialize;

#[cfg(test)]
mod tests {
    use super::*;

    fn path(labels: &[&str]) -> Path {
        Path::from_labels(labels.iter().map(|s| s.to_string()))
    }

    #[test]
    fn empty_matches_every_path() {
        assert!(Prefix::empty().matches(&path(&["a", "b"])));
        assert!(Prefix::empty().matches(&Path::empty()));
    }

    #[test]
    fn label_matches_only_equal_label() {
        let prefix = Prefix::new(vec![Elem::Label("a".into())]);
        assert!(prefix.matches(&path(&["a", "b"])));
        assert!(!prefix.matches(&path(&["x", "b"])));
    }

    #[test]
    fn wildcard_matches_any_label() {
        let prefix = Prefix::new(vec![Elem::Label("a".into()), Elem::Any, Elem::Label("c".into())]);
        assert!(prefix.matches(&path(&["a", "b", "c", "d"])));
        assert!(prefix.matches(&path(&["a", "anything", "c"])));
        assert!(!prefix.matches(&path(&["a", "b", "x"])));
    }

    #[test]
    fn too_long_prefix_does_not_match() {
        let prefix = Prefix::new(vec![Elem::Label("a".into()), Elem::Label("b".into())]);
        assert!(!prefix.matches(&path(&["a"])));
    }

    #[test]
    fn show_is_comma_separated_debug_form() {
        let prefix = Prefix::new(vec![Elem::Label("foo".into()), Elem::Any, Elem::Label("bar".into())]);
        assert_eq!("Label(foo),AnyElem,Label(bar)", prefix.show());
    }

    #[test]
    fn read_empty_string_is_empty_prefix() {
        assert_eq!(Prefix::empty(), Prefix::read("").unwrap());
    }
}
