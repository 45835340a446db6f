//! `Dentry` and `Dtab`: a single rewrite rule, and an ordered list of them
//! with a `lookup` operation.

use std::fmt;
use std::sync::RwLock;

use crate::error::Result;
use crate::nametree::{LeafShow, NameTree};
use crate::parser::Parser;
use crate::path::Path;
use crate::prefix::{Elem, Prefix};

/// The result of resolving a path through a dtab: either a further `Path`
/// to keep resolving, or an already-`Bound` address. In the upstream Python
/// implementation `Name.Path` is literally an alias for `Path` itself
/// (`dtab/name.py`); `Name::Path` here is the same zero-cost identity.
/// `Name::Bound` stands in for the out-of-scope address-binding
/// collaborator and is never produced by anything in this crate --
/// `Dtab::lookup_name` only ever constructs `Name::Path`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Name {
    Path(Path),
    Bound,
}

impl LeafShow for Name {
    fn leaf_show(&self) -> String {
        match self {
            Name::Path(p) => p.leaf_show(),
            Name::Bound => "Name.Bound".to_string(),
        }
    }
}

/// A single delegation-table rule: a `Prefix` to match, and the `NameTree`
/// to rewrite into when it does.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Dentry {
    #[cfg_attr(feature = "serialize", serde(serialize_with = "crate::prefix::serialize"))]
    prefix: Prefix,
    #[cfg_attr(feature = "serialize", serde(serialize_with = "crate::nametree::serialize"))]
    tree: NameTree<Path>,
}

impl Dentry {
    pub fn new(prefix: Prefix, tree: NameTree<Path>) -> Self {
        Dentry { prefix, tree }
    }

    /// The special no-op dentry whose prefix (a single label literally
    /// containing `/`) can never be produced by the parser. Used as an
    /// internal sentinel; see `dtab/dtab.py`'s `Dentry.nop`.
    pub fn nop() -> Self {
        Dentry {
            prefix: Prefix::new(vec![Elem::Label("/".to_string())]),
            tree: NameTree::Neg,
        }
    }

    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    pub fn tree(&self) -> &NameTree<Path> {
        &self.tree
    }

    /// Parses a single `prefix '=>' tree` entry.
    pub fn read(s: &str) -> Result<Self> {
        Parser::parse_all_dentry(s)
    }

    /// `"{prefix.show}=>{tree.show}"` -- a diagnostic form, not grammar
    /// text (`Prefix::show` is not round-trippable; see `Prefix::show`'s
    /// docs).
    pub fn show(&self) -> String {
        format!("{}=>{}", self.prefix.show(), self.tree.show())
    }
}

impl fmt::Display for Dentry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Dentry({})", self.show())
    }
}

impl PartialEq for Dentry {
    fn eq(&self, other: &Self) -> bool {
        self.prefix.show() == other.prefix.show() && self.tree.show() == other.tree.show()
    }
}

impl Eq for Dentry {}

/// An ordered list of `Dentry`s with a `lookup` operation.
///
/// Iteration and rendering use insertion order; `lookup` scans in reverse
/// insertion order so that later rules take precedence.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Dtab {
    dentries: Vec<Dentry>,
}

impl Dtab {
    pub fn new(dentries: Vec<Dentry>) -> Self {
        Dtab { dentries }
    }

    pub fn empty() -> Self {
        Dtab::default()
    }

    /// A dtab equal to `Dtab::read("/=>!")`: the empty prefix unconditionally
    /// rewrites to `Fail`.
    pub fn fail() -> Self {
        lazy_static::lazy_static! {
            static ref FAIL: Dtab = Dtab::read("/=>!").expect("'/=>!' is always a valid dtab");
        }
        FAIL.clone()
    }

    /// Parses a `dentry (';' dentry)* ';'?` dtab. The empty string parses
    /// to `Dtab::empty()`, with no error.
    pub fn read(s: &str) -> Result<Self> {
        Parser::parse_all_dtab(s)
    }

    pub fn dentries(&self) -> &[Dentry] {
        &self.dentries
    }

    pub fn len(&self) -> usize {
        self.dentries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dentries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dentry> {
        self.dentries.iter()
    }

    /// Returns a new `Dtab` with `dentry` appended.
    pub fn add(&self, dentry: Dentry) -> Self {
        let mut dentries = self.dentries.clone();
        dentries.push(dentry);
        Dtab { dentries }
    }

    /// Concatenates two dtabs, preserving insertion order. If either side
    /// is empty, returns the other untouched.
    pub fn concat(&self, other: &Dtab) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        let mut dentries = self.dentries.clone();
        dentries.extend(other.dentries.iter().cloned());
        Dtab { dentries }
    }

    /// Rewrites `path` using this dtab's rules.
    ///
    /// Scans dentries in reverse insertion order (last rule wins); for
    /// each whose prefix matches `path`, appends the suffix of `path` past
    /// the matched prefix onto the matched dentry's tree via `map`. Returns
    /// `Neg` with no matches, the sole match with one, or an `Alt` of the
    /// matches (in scan order) with more than one. Total: never errors.
    pub fn lookup(&self, path: &Path) -> NameTree<Path> {
        let matches: Vec<NameTree<Path>> = self
            .dentries
            .iter()
            .rev()
            .filter(|dentry| dentry.prefix.matches(path))
            .map(|dentry| {
                let suffix: Vec<String> = path.labels()[dentry.prefix.size()..].to_vec();
                dentry.tree.clone().map(&move |pfx: Path| {
                    let mut rewritten = pfx;
                    rewritten.append_labels(suffix.clone());
                    rewritten
                })
            })
            .collect();

        match matches.len() {
            0 => NameTree::Neg,
            1 => matches.into_iter().next().unwrap(),
            _ => NameTree::Alt(matches),
        }
    }

    /// Like `lookup`, but wraps each resolved leaf in `Name::Path`, the way
    /// a caller resolving a name all the way through binding would see it
    /// (`Name::Bound` never appears here -- address binding itself is out
    /// of scope for this crate).
    pub fn lookup_name(&self, path: &Path) -> NameTree<Name> {
        self.lookup(path).map(&Name::Path)
    }

    /// `";".join(d.show for d in dentries)`.
    pub fn show(&self) -> String {
        self.dentries
            .iter()
            .map(Dentry::show)
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl fmt::Display for Dtab {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Dtab({})", self.show())
    }
}

impl<'a> IntoIterator for &'a Dtab {
    type Item = &'a Dentry;
    type IntoIter = std::slice::Iter<'a, Dentry>;
    fn into_iter(self) -> Self::IntoIter {
        self.dentries.iter()
    }
}

impl ::std::ops::Add<Dentry> for Dtab {
    type Output = Dtab;
    fn add(self, rhs: Dentry) -> Dtab {
        self.add(rhs)
    }
}

impl ::std::ops::Add for Dtab {
    type Output = Dtab;
    fn add(self, rhs: Dtab) -> Dtab {
        self.concat(&rhs)
    }
}

lazy_static::lazy_static! {
    static ref BASE: RwLock<Dtab> = RwLock::new(Dtab::empty());
}

/// Reads the process-wide "base" dtab, applied to every request in this
/// process. Set at process startup and not usually changed thereafter; a
/// clone of the current snapshot, so readers never observe a half-assigned
/// dtab even across threads.
pub fn base() -> Dtab {
    BASE.read().expect("dtab base lock poisoned").clone()
}

/// Replaces the process-wide "base" dtab.
pub fn set_base(dtab: Dtab) {
    *BASE.write().expect("dtab base lock poisoned") = dtab;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(s: &str) -> Dtab {
        Dtab::read(s).unwrap()
    }

    fn path(labels: &[&str]) -> Path {
        Path::from_labels(labels.iter().map(|s| s.to_string()))
    }

    #[test]
    fn empty_dtab_is_neutral_for_concat() {
        let d = read("/foo=>/bar");
        assert_eq!(d, Dtab::empty().concat(&d));
        assert_eq!(d, d.concat(&Dtab::empty()));
    }

    #[test]
    fn concat_preserves_insertion_order() {
        let a = read("/foo=>/bar");
        let b = read("/foo=>/biz;/biz=>/$/inet/0/8080;/bar=>/$/inet/0/9090");
        let combined = a.concat(&b);
        let expected = read("/foo=>/bar;/foo=>/biz;/biz=>/$/inet/0/8080;/bar=>/$/inet/0/9090");
        assert_eq!(expected, combined);
    }

    #[test]
    fn wildcard_lookup_rewrites_suffix() {
        let d = read("/a/*/c => /d");
        let result = d.lookup(&path(&["a", "b", "c", "e", "f"]));
        assert_eq!(NameTree::Leaf(path(&["d", "e", "f"])), result);
    }

    #[test]
    fn no_match_yields_neg() {
        let d = read("/a=>/b");
        assert_eq!(NameTree::Neg, d.lookup(&path(&["x"])));
    }

    #[test]
    fn lookup_name_wraps_leaves_in_name_path() {
        let d = read("/a/*/c => /d");
        let result = d.lookup_name(&path(&["a", "b", "c", "e", "f"]));
        assert_eq!(NameTree::Leaf(Name::Path(path(&["d", "e", "f"]))), result);
    }

    #[test]
    fn last_rule_wins_ordering() {
        let d = read("/a=>/one;/a=>/two");
        let result = d.lookup(&path(&["a"]));
        assert_eq!(
            NameTree::Alt(vec![NameTree::Leaf(path(&["two"])), NameTree::Leaf(path(&["one"]))]),
            result
        );
    }

    #[test]
    fn lookup_is_total_on_empty_dtab() {
        assert_eq!(NameTree::Neg, Dtab::empty().lookup(&path(&["anything"])));
    }

    #[test]
    fn fail_dtab_always_fails() {
        let result = Dtab::fail().lookup(&path(&["whatever"]));
        assert_eq!(NameTree::Fail, result);
    }

    #[test]
    fn dentry_equality_uses_show() {
        let a = Dentry::read("/foo=>/bar").unwrap();
        let b = Dentry::read("/foo => /bar").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn leading_slash_dtab_has_two_dentries_in_order() {
        let d = read("/=>!;/foo=>/bar");
        assert_eq!(2, d.len());
        assert!(d.dentries()[0].prefix().is_empty());
        assert_eq!(&NameTree::Fail, d.dentries()[0].tree());
        assert_eq!(Prefix::new(vec![Elem::Label("foo".into())]), d.dentries()[1].prefix().clone());
    }

    #[test]
    fn base_roundtrips_through_set_and_get() {
        let previous = base();
        let d = read("/foo=>/bar");
        set_base(d.clone());
        assert_eq!(d, base());
        set_base(previous);
    }

    #[test]
    fn nop_prefix_is_unconstructible_via_parser() {
        // `Dentry::nop`'s prefix contains a label that is literally "/",
        // which the parser can never produce (`/` always terminates a
        // label).
        let nop = Dentry::nop();
        assert_eq!("Label(/)", nop.prefix().show());
    }

    use proptest::prelude::*;

    fn label_strategy() -> impl Strategy<Value = String> {
        "[a-z]{1,4}"
    }

    proptest! {
        /// Appending a second dentry with the same literal prefix always
        /// wins the lookup, regardless of what the first dentry rewrote to.
        #[test]
        fn last_rule_always_wins(
            label in label_strategy(),
            first_dst in label_strategy(),
            second_dst in label_strategy(),
        ) {
            let dtab = Dtab::read(&format!("/{} => /{}", label, first_dst)).unwrap()
                .add(Dentry::read(&format!("/{} => /{}", label, second_dst)).unwrap());
            let result = dtab.lookup(&path(&[&label]));
            prop_assert_eq!(NameTree::Leaf(path(&[&second_dst])), result);
        }

        /// A dtab with no matching dentry always fails to resolve, no
        /// matter how many non-matching rules it carries.
        #[test]
        fn unmatched_path_is_always_neg(
            rule_label in label_strategy(),
            rule_dst in label_strategy(),
            lookup_label in label_strategy(),
        ) {
            prop_assume!(rule_label != lookup_label);
            let dtab = Dtab::read(&format!("/{} => /{}", rule_label, rule_dst)).unwrap();
            prop_assert_eq!(NameTree::Neg, dtab.lookup(&path(&[&lookup_label])));
        }
    }
}
